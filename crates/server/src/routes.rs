use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use common::types::Health;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::metrics;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod categories;
pub mod products;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics_text() -> impl IntoResponse {
    metrics::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: catalog API plus operational endpoints
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/categories", get(categories::list).post(categories::create))
        .route(
            "/api/categories/:id",
            get(categories::get).put(categories::update).delete(categories::delete),
        )
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/:id",
            get(products::get).put(products::update).delete(products::delete),
        )
        .route("/api/products/:id/categories", get(products::categories))
        .route(
            "/api/products/:id/categories/:category_id",
            put(products::attach_category).delete(products::detach_category),
        )
        .with_state(state);

    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .route("/api-docs/openapi.json", get(openapi_json));

    api.merge(ops)
        .layer(middleware::from_fn(metrics::track))
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
