use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use service::catalog::domain::{Category, CategoryInput};
use service::catalog::query::{parse_sort_key, CategoryFilter, CategoryQuery};
use service::pagination::{Page, PageRequest};

use crate::errors::JsonApiError;
use crate::metrics::record_mutation;
use crate::state::AppState;

fn default_page_number() -> i32 { PageRequest::DEFAULT_PAGE_NUMBER }
fn default_page_size() -> i32 { PageRequest::DEFAULT_PAGE_SIZE }

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryListParams {
    /// Case-sensitive name fragment
    pub name: Option<String>,
    /// `id` or `name`
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_desc: bool,
    #[serde(default = "default_page_number")]
    pub page_number: i32,
    #[serde(default = "default_page_size")]
    pub page_size: i32,
}

impl CategoryListParams {
    fn into_query(self) -> Result<CategoryQuery, JsonApiError> {
        Ok(CategoryQuery {
            sort_by: parse_sort_key(self.sort_by.as_deref())?,
            filter: CategoryFilter { name: self.name },
            sort_desc: self.sort_desc,
            page: PageRequest { page_number: self.page_number, page_size: self.page_size },
        })
    }
}

#[utoipa::path(
    get, path = "/api/categories", tag = "categories",
    params(CategoryListParams),
    responses(
        (status = 200, description = "Page of categories", body = crate::openapi::CategoryPageDoc),
        (status = 400, description = "Invalid Query", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<AppState>, Query(params): Query<CategoryListParams>) -> Result<Json<Page<Category>>, JsonApiError> {
    let page = state.categories.list(params.into_query()?).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/api/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::CategoryDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Category>, JsonApiError> {
    Ok(Json(state.categories.get(id).await?))
}

#[utoipa::path(
    post, path = "/api/categories", tag = "categories",
    request_body = crate::openapi::CategoryInputDoc,
    responses((status = 201, description = "Created", body = crate::openapi::CategoryDoc))
)]
pub async fn create(State(state): State<AppState>, Json(input): Json<CategoryInput>) -> Result<impl IntoResponse, JsonApiError> {
    let created = state.categories.create(input).await?;
    record_mutation("category", "create");
    let location = format!("/api/categories/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

#[utoipa::path(
    put, path = "/api/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = crate::openapi::CategoryInputDoc,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Path and body id differ", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(State(state): State<AppState>, Path(id): Path<i32>, Json(input): Json<CategoryInput>) -> Result<StatusCode, JsonApiError> {
    state.categories.update(id, input).await?;
    record_mutation("category", "update");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete, path = "/api/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Soft-deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    state.categories.delete(id).await?;
    record_mutation("category", "delete");
    Ok(StatusCode::NO_CONTENT)
}
