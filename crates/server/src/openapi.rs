use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    pub detail: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDoc {
    pub id: i32,
    pub name: String,
    pub is_deleted: bool,
}

/// `id` is ignored on create and must equal the path id on update.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInputDoc {
    pub id: Option<i32>,
    pub name: String,
    pub is_deleted: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDoc {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub is_deleted: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInputDoc {
    pub id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_deleted: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPageDoc {
    pub total_items: u64,
    pub page_number: i32,
    pub page_size: i32,
    pub total_pages: u64,
    pub items: Vec<CategoryDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageDoc {
    pub total_items: u64,
    pub page_number: i32,
    pub page_size: i32,
    pub total_pages: u64,
    pub items: Vec<ProductDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::categories::list,
        crate::routes::categories::get,
        crate::routes::categories::create,
        crate::routes::categories::update,
        crate::routes::categories::delete,
        crate::routes::products::list,
        crate::routes::products::get,
        crate::routes::products::create,
        crate::routes::products::update,
        crate::routes::products::delete,
        crate::routes::products::categories,
        crate::routes::products::attach_category,
        crate::routes::products::detach_category,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            CategoryDoc,
            CategoryInputDoc,
            ProductDoc,
            ProductInputDoc,
            CategoryPageDoc,
            ProductPageDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "categories"),
        (name = "products")
    )
)]
pub struct ApiDoc;
