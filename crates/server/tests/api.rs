use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::ServerState;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine.seed_reference_values().await.unwrap();
    server::router(ServerState {
        engine: Arc::new(engine),
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, body) = send(app, post("/api/transactions", body)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn health_is_plain_json() {
    let app = app().await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_route_is_enveloped() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn create_and_fetch_a_transaction() {
    let app = app().await;
    let created = create(
        &app,
        json!({
            "fromUserId": "u1",
            "toUserId": "u2",
            "type": "PHYSICAL_SALE",
            "monetaryAmount": 35.5,
            "description": "calculus textbook, 3rd edition"
        }),
    )
    .await;
    assert_eq!(created["status"], "PENDING");
    assert_eq!(created["riskLevel"], "NORMAL");
    assert_eq!(created["monetaryAmount"], 35.5);
    assert_eq!(created["humanValueAmount"], 0.0);

    let id = created["id"].as_str().unwrap();
    let (status, body) = send(&app, get(&format!("/api/transactions/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["type"], "PHYSICAL_SALE");
}

#[tokio::test]
async fn invalid_bodies_are_400() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post(
            "/api/transactions",
            json!({"fromUserId": "u1", "toUserId": "u2", "type": "BARTER", "description": "swap"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TRANSACTION_CREATE_FAILED");

    let (status, body) = send(
        &app,
        post(
            "/api/transactions",
            json!({"fromUserId": "u1", "toUserId": "u2", "type": "LOAN", "description": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TRANSACTION_CREATE_FAILED");

    let (status, _) = send(
        &app,
        post(
            "/api/transactions",
            json!({
                "fromUserId": "u1",
                "toUserId": "u2",
                "type": "PHYSICAL_SALE",
                "monetaryAmount": 10.123,
                "description": "three decimals"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blocked_candidate_is_400_and_not_stored() {
    let app = app().await;
    let (status, body) = send(
        &app,
        post(
            "/api/transactions",
            json!({
                "fromUserId": "u1",
                "toUserId": "u2",
                "type": "FAVOR_GIFT",
                "humanValueAmount": 6000,
                "description": "help moving"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TRANSACTION_CREATE_FAILED");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("blocked by risk control")
    );

    let (_, body) = send(&app, get("/api/transactions?userId=u1")).await;
    assert_eq!(body["data"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn listing_paginates_and_validates() {
    let app = app().await;
    for i in 0..3 {
        create(
            &app,
            json!({
                "fromUserId": "u1",
                "toUserId": format!("buyer{i}"),
                "type": "PHYSICAL_SALE",
                "monetaryAmount": 5,
                "description": "stack of lecture notes"
            }),
        )
        .await;
    }

    let (status, body) = send(&app, get("/api/transactions?userId=u1&page=2&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["data"]["pagination"],
        json!({"total": 3, "page": 2, "limit": 2, "pages": 2})
    );

    let (status, body) = send(&app, get("/api/transactions?limit=500")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TRANSACTION_QUERY_FAILED");

    let (status, _) = send(&app, get("/api/transactions?startDate=soon")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        get("/api/transactions?startDate=2026-10-02&endDate=2026-10-01"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/transactions?riskLevel=MAYBE")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        get("/api/transactions?page=100000000000000000&limit=100"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TRANSACTION_QUERY_FAILED");
}

#[tokio::test]
async fn missing_transaction_is_404() {
    let app = app().await;

    let (status, body) = send(
        &app,
        get("/api/transactions/5f0c6a55-1d47-4f36-9d36-0d5d8f5d6a11"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TRANSACTION_NOT_FOUND");

    let (status, body) = send(&app, get("/api/transactions/not-a-uuid")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TRANSACTION_NOT_FOUND");

    let (status, body) = send(
        &app,
        post(
            "/api/transactions/5f0c6a55-1d47-4f36-9d36-0d5d8f5d6a11/review",
            json!({"riskLevel": "NORMAL"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TRANSACTION_NOT_FOUND");
}

#[tokio::test]
async fn review_records_reviewer_and_reason() {
    let app = app().await;
    let created = create(
        &app,
        json!({
            "fromUserId": "u1",
            "toUserId": "u2",
            "type": "LABOR_SERVICE",
            "humanValueAmount": 40,
            "description": "fixed a bike chain"
        }),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/transactions/{id}/review"))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-reviewer-id", "moderator-7")
        .body(Body::from(
            json!({"riskLevel": "REVIEW", "reason": "odd pattern"}).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["riskLevel"], "REVIEW");
    assert_eq!(body["data"]["status"], "PENDING");

    let (status, body) = send(
        &app,
        post(
            &format!("/api/transactions/{id}/review"),
            json!({"status": "COMPLETED"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TRANSACTION_REVIEW_FAILED");

    let (status, body) = send(&app, get(&format!("/api/transactions/{id}/reviews"))).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = body["data"].as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["reviewerId"], "moderator-7");
    assert_eq!(reviews[0]["reason"], "odd pattern");
    assert_eq!(reviews[0]["previousRiskLevel"], "NORMAL");
}

#[tokio::test]
async fn blank_reviewer_header_is_enveloped() {
    let app = app().await;
    let created = create(
        &app,
        json!({
            "fromUserId": "u1",
            "toUserId": "u2",
            "type": "PHYSICAL_SALE",
            "monetaryAmount": 8,
            "description": "graphing calculator"
        }),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/transactions/{id}/review"))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-reviewer-id", "   ")
        .body(Body::from(json!({"riskLevel": "REVIEW"}).to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "TRANSACTION_REVIEW_FAILED");

    let (_, body) = send(&app, get(&format!("/api/transactions/{id}/reviews"))).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn risk_statistics() {
    let app = app().await;
    create(
        &app,
        json!({
            "fromUserId": "u1",
            "toUserId": "u2",
            "type": "FAVOR_GIFT",
            "humanValueAmount": 120.25,
            "description": "cooked dinner for the floor"
        }),
    )
    .await;

    let (status, body) = send(&app, get("/api/risk/users/u2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], "u2");
    assert_eq!(body["data"]["humanValueTotal"], 120.25);

    let (status, body) = send(&app, get("/api/risk/pairs/u2/u1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["transactionCount"], 1);
    assert_eq!(body["data"]["humanValueTotal"], 120.25);
}

#[tokio::test]
async fn reference_values_are_seeded() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/reference-values")).await;
    assert_eq!(status, StatusCode::OK);
    let values = body["data"].as_array().unwrap();
    assert_eq!(values.len(), 8);
    assert!(values.iter().all(|v| v["defaultValue"].as_f64().unwrap() > 0.0));
}
