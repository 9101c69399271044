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
use server::{IdentityConfig, IdentityGate, ServerState, router};

const ALICE: i64 = 1;
const BOB: i64 = 2;

struct TestApp {
    router: Router,
    identity: IdentityGate,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        let identity = IdentityGate::new(IdentityConfig::new("api-test-secret"));
        let state = ServerState::new(engine, identity.clone());
        Self {
            router: router(state),
            identity,
        }
    }

    fn token(&self, user_id: i64) -> String {
        self.identity.issue(user_id, None).unwrap()
    }

    async fn raw(
        &self,
        method: &str,
        uri: &str,
        user: Option<i64>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token(user_id)),
            );
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        user: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.raw(method, uri, user, body).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn category(&self, name: &str) -> String {
        let (status, body) = self
            .call("POST", "/categories", Some(ALICE), Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::new().await;

    for (method, uri) in [
        ("GET", "/expenses"),
        ("POST", "/expenses"),
        ("GET", "/expenses/export"),
        ("GET", "/expenses/summary"),
        ("GET", "/expenses/00000000-0000-0000-0000-000000000000"),
        ("PUT", "/expenses/00000000-0000-0000-0000-000000000000"),
        ("DELETE", "/expenses/00000000-0000-0000-0000-000000000000"),
        ("POST", "/categories"),
    ] {
        let (status, body) = app.call(method, uri, None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"], "Unauthorized");
    }

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/expenses")
                .header(header::AUTHORIZATION, "Bearer garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn categories_are_public_to_read_and_unique() {
    let app = TestApp::new().await;
    app.category("Food").await;

    let (status, body) = app
        .call("POST", "/categories", Some(BOB), Some(json!({ "name": "FOOD" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = app
        .call("POST", "/categories", Some(BOB), Some(json!({ "name": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call("POST", "/categories", Some(BOB), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.call("GET", "/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Food");
}

#[tokio::test]
async fn food_lunch_end_to_end() {
    let app = TestApp::new().await;
    let food = app.category("Food").await;

    let (status, created) = app
        .call(
            "POST",
            "/expenses",
            Some(ALICE),
            Some(json!({
                "title": "Lunch",
                "amount": 12.50,
                "categoryId": food,
                "date": "2024-03-05"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["amount"], json!(12.5));
    assert!(created["amount"].is_number());
    assert_eq!(created["authorId"], ALICE);
    assert_eq!(created["date"], "2024-03-05T00:00:00Z");
    assert_eq!(created["description"], Value::Null);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call("GET", &format!("/expenses/{id}"), Some(BOB), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("title").is_none());

    let (status, body) = app
        .call("GET", &format!("/expenses/{id}"), Some(ALICE), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["name"], "Food");
    assert_eq!(body["categoryId"], food.as_str());

    let (status, summary) = app
        .call("GET", "/expenses/summary", Some(ALICE), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        summary["byCategory"],
        json!([{ "categoryId": food, "category": "Food", "total": 12.5 }])
    );
    assert_eq!(
        summary["monthlyBreakdown"],
        json!([{ "month": "2024-03-01T00:00:00Z", "total": 12.5 }])
    );
}

#[tokio::test]
async fn create_expense_validation() {
    let app = TestApp::new().await;
    let food = app.category("Food").await;

    let cases = [
        (json!({ "amount": 1, "categoryId": food }), StatusCode::BAD_REQUEST),
        (json!({ "title": "x", "categoryId": food }), StatusCode::BAD_REQUEST),
        (json!({ "title": "x", "amount": 1 }), StatusCode::BAD_REQUEST),
        (
            json!({ "title": "x", "amount": "abc", "categoryId": food }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "title": "x", "amount": -5, "categoryId": food }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "title": "x", "amount": 1, "categoryId": "not-a-uuid" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "title": "x", "amount": 1, "categoryId": food, "date": "someday" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "title": "x", "amount": 1, "categoryId": "00000000-0000-0000-0000-000000000000" }),
            StatusCode::NOT_FOUND,
        ),
    ];

    for (body, expected) in cases {
        let (status, _) = app
            .call("POST", "/expenses", Some(ALICE), Some(body.clone()))
            .await;
        assert_eq!(status, expected, "{body}");
    }

    let status = app.raw("POST", "/expenses", Some(ALICE), None).await.status();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_and_delete_respect_ownership() {
    let app = TestApp::new().await;
    let food = app.category("Food").await;
    let travel = app.category("Travel").await;

    let (_, created) = app
        .call(
            "POST",
            "/expenses",
            Some(ALICE),
            Some(json!({
                "title": "Lunch",
                "amount": "12.50",
                "categoryId": food,
                "date": "2024-03-05T12:00:00Z",
                "description": "Pasta"
            })),
        )
        .await;
    let uri = format!("/expenses/{}", created["id"].as_str().unwrap());

    let (status, _) = app
        .call("PUT", &uri, Some(BOB), Some(json!({ "title": "Stolen" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.call("DELETE", &uri, Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app
        .call("PUT", &uri, Some(ALICE), Some(json!({ "amount": 15 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["amount"], json!(15.0));
    assert_eq!(updated["title"], "Lunch");
    assert_eq!(updated["description"], "Pasta");
    assert_eq!(updated["date"], created["date"]);
    assert_eq!(updated["authorId"], ALICE);

    let (status, _) = app
        .call(
            "PUT",
            &uri,
            Some(ALICE),
            Some(json!({ "categoryId": "00000000-0000-0000-0000-000000000000", "title": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = app
        .call(
            "PUT",
            &uri,
            Some(ALICE),
            Some(json!({ "categoryId": travel, "description": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Lunch");
    assert_eq!(updated["category"]["name"], "Travel");
    assert_eq!(updated["description"], Value::Null);

    let (status, body) = app.call("DELETE", &uri, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Expense deleted successfully");

    let (status, _) = app.call("GET", &uri, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_or_malformed_ids_are_not_found() {
    let app = TestApp::new().await;

    for uri in [
        "/expenses/00000000-0000-0000-0000-000000000000",
        "/expenses/not-a-uuid",
    ] {
        let (status, _) = app.call("GET", uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        let (status, _) = app
            .call("PUT", uri, Some(BOB), Some(json!({ "title": "x" })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        let (status, _) = app.call("DELETE", uri, Some(BOB), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn listing_is_paginated() {
    let app = TestApp::new().await;
    let food = app.category("Food").await;

    for day in 1..=12 {
        let (status, _) = app
            .call(
                "POST",
                "/expenses",
                Some(ALICE),
                Some(json!({
                    "title": format!("day {day}"),
                    "amount": 1,
                    "categoryId": food,
                    "date": format!("2024-01-{day:02}")
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .call("GET", "/expenses?page=2&pageSize=5", Some(ALICE), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["meta"],
        json!({ "page": 2, "pageSize": 5, "total": 12, "totalPages": 3 })
    );
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["day 7", "day 6", "day 5", "day 4", "day 3"]);

    let (_, body) = app
        .call("GET", "/expenses?page=abc&pageSize=1000", Some(ALICE), None)
        .await;
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["pageSize"], 100);
    assert_eq!(body["data"].as_array().unwrap().len(), 12);

    let (_, body) = app.call("GET", "/expenses", Some(BOB), None).await;
    assert_eq!(
        body["meta"],
        json!({ "page": 1, "pageSize": 10, "total": 0, "totalPages": 1 })
    );

    let (status, body) = app
        .call("GET", "/expenses?page=1000000000000000000", Some(ALICE), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(
        body["meta"],
        json!({ "page": 1_000_000_000_000_000_000_u64, "pageSize": 10, "total": 12, "totalPages": 2 })
    );
}

#[tokio::test]
async fn export_is_csv_attachment() {
    let app = TestApp::new().await;
    let food = app.category("Food").await;

    app.call(
        "POST",
        "/expenses",
        Some(ALICE),
        Some(json!({
            "title": "Dinner, \"fancy\"",
            "amount": "30",
            "categoryId": food,
            "date": "2024-03-06T19:30:00Z",
            "description": "line one\nline two"
        })),
    )
    .await;

    let response = app.raw("GET", "/expenses/export", Some(ALICE), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"expenses.csv\""
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(
        text,
        "Date,Title,Category,Amount,Description\n\
         2024-03-06T19:30:00.000Z,\"Dinner, \"\"fancy\"\"\",Food,30.00,\"line one\nline two\"\n"
    );
}
