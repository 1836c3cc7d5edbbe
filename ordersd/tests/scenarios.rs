//! End-to-end HTTP scenarios against the in-memory wiring (S1-S5). The
//! concurrent-dispatcher scenario (S6) needs a real Postgres outbox table
//! and lives in `orders-outbox`'s own test suite instead.

use std::sync::Arc;
use std::time::Instant;

use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use orders_app::{AddItemToOrder, CreateOrder, StaticPricingCatalog, SystemClock, TracingLogger};
use orders_outbox::NoopEventSink;
use orders_store::InMemoryOrderRepository;

use ordersd::api::{create_router, ApiState};

fn wire() -> axum::Router {
    let repository = Arc::new(InMemoryOrderRepository::new());
    let sink = NoopEventSink::new(false);
    let pricing = Arc::new(StaticPricingCatalog::new());
    let clock = Arc::new(SystemClock);
    let logger = Arc::new(TracingLogger);

    let create_order = Arc::new(CreateOrder::new(repository.clone(), sink.clone(), clock.clone(), logger.clone()));
    let add_item_to_order = Arc::new(AddItemToOrder::new(repository, sink, pricing, clock, logger));

    create_router(Arc::new(ApiState {
        create_order,
        add_item_to_order,
        started_at: Instant::now(),
    }))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(path: &str, body: Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn s1_create_then_inspect_returns_empty_order() {
    let router = wire();
    let response = router.oneshot(post("/orders", json!({}))).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let body = body_json(response).await;
    assert!(body["orderId"].as_str().unwrap().starts_with("ORD-"));
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total"]["amount"], 0.0);
    assert_eq!(body["total"]["currency"], "USD");
}

#[tokio::test]
async fn s2_add_item_prices_from_catalog() {
    let router = wire();
    let create_response = router
        .clone()
        .oneshot(post("/orders", json!({"orderId": "ORD-E2E-PRICING"})))
        .await
        .unwrap();
    assert_eq!(create_response.status(), axum::http::StatusCode::CREATED);

    let response = router
        .oneshot(post(
            "/orders/ORD-E2E-PRICING/items",
            json!({"productId": "LAPTOP-001", "quantity": 2}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["items"][0]["productId"], "LAPTOP-001");
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["items"][0]["unitPrice"]["amount"], 1299.99);
    assert_eq!(body["total"]["amount"], 2599.98);
}

#[tokio::test]
async fn s3_adding_same_product_twice_merges_quantity() {
    let router = wire();
    router
        .clone()
        .oneshot(post("/orders", json!({"orderId": "ORD-E2E-MERGE"})))
        .await
        .unwrap();
    router
        .clone()
        .oneshot(post(
            "/orders/ORD-E2E-MERGE/items",
            json!({"productId": "LAPTOP-001", "quantity": 2}),
        ))
        .await
        .unwrap();

    let response = router
        .oneshot(post(
            "/orders/ORD-E2E-MERGE/items",
            json!({"productId": "LAPTOP-001", "quantity": 3}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;

    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["quantity"], 5);
    assert_eq!(body["total"]["amount"], 6499.95);
}

#[tokio::test]
async fn s4_adding_item_in_different_currency_is_rejected() {
    let router = wire();
    router
        .clone()
        .oneshot(post("/orders", json!({"orderId": "ORD-E2E-CURRENCY"})))
        .await
        .unwrap();
    router
        .clone()
        .oneshot(post(
            "/orders/ORD-E2E-CURRENCY/items",
            json!({"productId": "LAPTOP-001", "quantity": 1}),
        ))
        .await
        .unwrap();

    let response = router
        .oneshot(post(
            "/orders/ORD-E2E-CURRENCY/items",
            json!({"productId": "KEYBOARD-EU-001", "quantity": 1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["kind"], "validation");
}

#[tokio::test]
async fn s5_duplicate_order_id_is_rejected() {
    let router = wire();
    let first = router
        .clone()
        .oneshot(post("/orders", json!({"orderId": "ORD-DUP"})))
        .await
        .unwrap();
    assert_eq!(first.status(), axum::http::StatusCode::CREATED);

    let second = router.oneshot(post("/orders", json!({"orderId": "ORD-DUP"}))).await.unwrap();
    assert_eq!(second.status(), axum::http::StatusCode::CONFLICT);
    let body = body_json(second).await;
    assert_eq!(body["error"]["reason"], "duplicate_order_id");
}

#[tokio::test]
async fn get_order_by_id_is_not_implemented() {
    let router = wire();
    let response = router
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/orders/ORD-ANY")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let router = wire();
    let response = router
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/health")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}
