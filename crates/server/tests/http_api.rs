//! Router-level tests over the in-memory store (no database, no sockets).

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use server::routes::build_router;
use server::AppState;
use tower::ServiceExt;

fn app() -> Router {
    build_router(AppState::in_memory())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Option<String>, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let location = res.headers().get(header::LOCATION).map(|v| v.to_str().unwrap().to_owned());
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, location, json)
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, _, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn category_create_filter_delete_flow() {
    let app = app();
    let (status, location, body) = send(&app, Method::POST, "/api/categories", Some(json!({ "name": "Tools" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(location.as_deref(), Some("/api/categories/1"));
    assert_eq!(body, json!({ "id": 1, "name": "Tools", "isDeleted": false }));

    let (status, _, page) = send(&app, Method::GET, "/api/categories?name=Too", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalItems"], 1);
    assert_eq!(page["pageNumber"], 1);
    assert_eq!(page["pageSize"], 10);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["items"][0]["name"], "Tools");

    let (status, _, _) = send(&app, Method::DELETE, "/api/categories/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, page) = send(&app, Method::GET, "/api/categories?name=Too", None).await;
    assert_eq!(page["totalItems"], 0);
    assert_eq!(page["items"], json!([]));

    let (status, _, body) = send(&app, Method::GET, "/api/categories/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    let (status, _, _) = send(&app, Method::DELETE, "/api/categories/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_ignores_body_id() {
    let app = app();
    let (_, _, body) = send(&app, Method::POST, "/api/categories", Some(json!({ "id": 50, "name": "Garden" }))).await;
    assert_eq!(body["id"], 1);
}

#[tokio::test]
async fn fifteen_products_second_page() {
    let app = app();
    for i in 1..=15 {
        let (status, _, _) = send(&app, Method::POST, "/api/products", Some(json!({ "name": format!("p{i:02}"), "description": "", "price": i }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _, page) = send(&app, Method::GET, "/api/products?pageNumber=2&pageSize=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalItems"], 15);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["items"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn mismatched_update_is_bad_request_without_mutation() {
    let app = app();
    for name in ["a", "b", "c"] {
        send(&app, Method::POST, "/api/products", Some(json!({ "name": name, "description": "", "price": 1.5 }))).await;
    }
    let body = json!({ "id": 4, "name": "changed", "description": "", "price": 9 });
    let (status, _, err) = send(&app, Method::PUT, "/api/products/3", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Bad Request");

    let (_, _, product) = send(&app, Method::GET, "/api/products/3", None).await;
    assert_eq!(product["name"], "c");
    assert_eq!(product["price"], 1.5);
}

#[tokio::test]
async fn update_replaces_fields_and_returns_no_content() {
    let app = app();
    send(&app, Method::POST, "/api/products", Some(json!({ "name": "Hammer", "description": "steel", "price": 10 }))).await;
    let body = json!({ "id": 1, "name": "Mallet", "description": "rubber", "price": 12.25, "isDeleted": false });
    let (status, _, _) = send(&app, Method::PUT, "/api/products/1", Some(body)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, _, product) = send(&app, Method::GET, "/api/products/1", None).await;
    assert_eq!(product, json!({ "id": 1, "name": "Mallet", "description": "rubber", "price": 12.25, "isDeleted": false }));

    let (status, _, _) = send(&app, Method::PUT, "/api/products/9", Some(json!({ "id": 9, "name": "x", "price": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn price_range_and_sorting() {
    let app = app();
    for (name, price) in [("w", 25.0), ("x", 10.0), ("y", 9.99), ("z", 20.0), ("v", 15.5)] {
        send(&app, Method::POST, "/api/products", Some(json!({ "name": name, "description": "", "price": price }))).await;
    }
    let (status, _, page) = send(&app, Method::GET, "/api/products?minPrice=10&maxPrice=20&sortBy=price&sortDesc=true", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = page["items"].as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["z", "v", "x"]);

    let (_, _, page) = send(&app, Method::GET, "/api/products?sortBy=NAME", None).await;
    assert_eq!(page["items"][0]["name"], "v");
}

#[tokio::test]
async fn unknown_sort_key_is_rejected() {
    let (status, _, body) = send(&app(), Method::GET, "/api/categories?sortBy=price", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Query");
}

#[tokio::test]
async fn product_category_membership() {
    let app = app();
    send(&app, Method::POST, "/api/categories", Some(json!({ "name": "Tools" }))).await;
    send(&app, Method::POST, "/api/products", Some(json!({ "name": "Hammer", "description": "", "price": 10 }))).await;

    let (status, _, _) = send(&app, Method::PUT, "/api/products/1/categories/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, Method::PUT, "/api/products/1/categories/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, Method::PUT, "/api/products/1/categories/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, list) = send(&app, Method::GET, "/api/products/1/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([{ "id": 1, "name": "Tools", "isDeleted": false }]));

    let (status, _, _) = send(&app, Method::DELETE, "/api/products/1/categories/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, Method::DELETE, "/api/products/1/categories/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, Method::GET, "/api/products/2/categories", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_and_openapi_are_exposed() {
    let app = app();
    send(&app, Method::POST, "/api/categories", Some(json!({ "name": "Tools" }))).await;

    let res = app.clone().oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("catalog_http_requests_total"));
    assert!(text.contains("catalog_mutations_total"));

    let (status, _, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/products"].is_object());
}

#[tokio::test]
async fn id_sort_stays_ascending_when_descending_is_requested() {
    let app = app();
    for name in ["a", "b", "c"] {
        send(&app, Method::POST, "/api/categories", Some(json!({ "name": name }))).await;
    }
    let (status, _, page) = send(&app, Method::GET, "/api/categories?sortBy=id&sortDesc=true", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = page["items"].as_array().unwrap().iter().map(|c| c["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let (_, _, page) = send(&app, Method::GET, "/api/categories?sortBy=name&sortDesc=true", None).await;
    assert_eq!(page["items"][0]["name"], "c");
}
