use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use service::catalog::domain::{Category, Product, ProductInput};
use service::catalog::query::{parse_sort_key, ProductFilter, ProductQuery};
use service::pagination::{Page, PageRequest};

use crate::errors::JsonApiError;
use crate::metrics::record_mutation;
use crate::state::AppState;

fn default_page_number() -> i32 { PageRequest::DEFAULT_PAGE_NUMBER }
fn default_page_size() -> i32 { PageRequest::DEFAULT_PAGE_SIZE }

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    /// Case-sensitive name fragment
    pub name: Option<String>,
    /// Inclusive lower price bound
    #[serde(default, with = "rust_decimal::serde::str_option")]
    #[param(value_type = Option<f64>)]
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound
    #[serde(default, with = "rust_decimal::serde::str_option")]
    #[param(value_type = Option<f64>)]
    pub max_price: Option<Decimal>,
    /// `id`, `name` or `price`
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_desc: bool,
    #[serde(default = "default_page_number")]
    pub page_number: i32,
    #[serde(default = "default_page_size")]
    pub page_size: i32,
}

impl ProductListParams {
    fn into_query(self) -> Result<ProductQuery, JsonApiError> {
        Ok(ProductQuery {
            sort_by: parse_sort_key(self.sort_by.as_deref())?,
            filter: ProductFilter { name: self.name, min_price: self.min_price, max_price: self.max_price },
            sort_desc: self.sort_desc,
            page: PageRequest { page_number: self.page_number, page_size: self.page_size },
        })
    }
}

#[utoipa::path(
    get, path = "/api/products", tag = "products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Page of products", body = crate::openapi::ProductPageDoc),
        (status = 400, description = "Invalid Query", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<AppState>, Query(params): Query<ProductListParams>) -> Result<Json<Page<Product>>, JsonApiError> {
    let page = state.products.list(params.into_query()?).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/api/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ProductDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Product>, JsonApiError> {
    Ok(Json(state.products.get(id).await?))
}

#[utoipa::path(
    post, path = "/api/products", tag = "products",
    request_body = crate::openapi::ProductInputDoc,
    responses((status = 201, description = "Created", body = crate::openapi::ProductDoc))
)]
pub async fn create(State(state): State<AppState>, Json(input): Json<ProductInput>) -> Result<impl IntoResponse, JsonApiError> {
    let created = state.products.create(input).await?;
    record_mutation("product", "create");
    let location = format!("/api/products/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

#[utoipa::path(
    put, path = "/api/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = crate::openapi::ProductInputDoc,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Path and body id differ", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(State(state): State<AppState>, Path(id): Path<i32>, Json(input): Json<ProductInput>) -> Result<StatusCode, JsonApiError> {
    state.products.update(id, input).await?;
    record_mutation("product", "update");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete, path = "/api/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Soft-deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    state.products.delete(id).await?;
    record_mutation("product", "delete");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/products/{id}/categories", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Active categories of the product", body = [crate::openapi::CategoryDoc]),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn categories(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Vec<Category>>, JsonApiError> {
    Ok(Json(state.products.categories(id).await?))
}

#[utoipa::path(
    put, path = "/api/products/{id}/categories/{category_id}", tag = "products",
    params(
        ("id" = i32, Path, description = "Product ID"),
        ("category_id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Product is in the category"),
        (status = 404, description = "Product or category not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn attach_category(State(state): State<AppState>, Path((id, category_id)): Path<(i32, i32)>) -> Result<StatusCode, JsonApiError> {
    state.products.attach_category(id, category_id).await?;
    record_mutation("product_category", "attach");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete, path = "/api/products/{id}/categories/{category_id}", tag = "products",
    params(
        ("id" = i32, Path, description = "Product ID"),
        ("category_id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Membership removed"),
        (status = 404, description = "Product or membership not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn detach_category(State(state): State<AppState>, Path((id, category_id)): Path<(i32, i32)>) -> Result<StatusCode, JsonApiError> {
    state.products.detach_category(id, category_id).await?;
    record_mutation("product_category", "detach");
    Ok(StatusCode::NO_CONTENT)
}
