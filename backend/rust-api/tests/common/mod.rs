#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use gameforge_api::middlewares::auth::{JwtClaims, JwtService};
use gameforge_api::services::file_store::InMemoryFileStore;
use gameforge_api::services::store::InMemoryGameStore;
use gameforge_api::{config::Config, create_router, services::AppState};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    Config {
        mongo_uri: String::new(),
        mongo_database: "gameforge_test".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        object_storage: None,
    }
}

pub fn create_test_app() -> Router {
    create_test_app_with_files().0
}

/// Variant that hands back the file store, for tests asserting on stored
/// thumbnail objects.
pub fn create_test_app_with_files() -> (Router, Arc<InMemoryFileStore>) {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let files = Arc::new(InMemoryFileStore::new());
    let app_state = Arc::new(AppState::with_stores(
        test_config(),
        Arc::new(InMemoryGameStore::new()),
        files.clone(),
    ));

    (create_router(app_state), files)
}

pub fn token_for(user_id: &str, role: &str) -> String {
    let now = chrono::Utc::now().timestamp() as usize;
    JwtService::new(TEST_JWT_SECRET)
        .generate_token(JwtClaims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: now + 3600,
            iat: now,
        })
        .expect("token minting")
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub fn math_game_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Practice sums",
        "is_publish_immediately": false,
        "operation": "addition",
        "difficulty": "easy",
        "game_type": "classic",
        "theme": "space",
        "question_count": 3,
        "score_per_question": 10.0
    })
}

/// Creates a game through the API and returns its id.
pub async fn create_math_game(app: &Router, token: &str, body: Value) -> String {
    let (status, json) = send_json(
        app,
        "POST",
        "/api/v1/games/math-generator",
        Some(token),
        Some(body),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);
    assert_eq!(json["template"]["slug"], "math-generator");
    json["id"].as_str().unwrap().to_string()
}

/// Discovers the correct answer for one question by submitting a value no
/// generated question can have as its answer.
pub async fn discover_correct_answer(app: &Router, game_id: &str, index: usize) -> i64 {
    let (status, json) = send_json(
        app,
        "POST",
        &format!("/api/v1/games/math-generator/{}/check-answer", game_id),
        None,
        Some(json!({
            "answers": [{ "question_index": index, "selected_answer": -999 }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let result = &json["results"][0];
    assert_eq!(result["is_correct"], false);
    result["correct_answer"]
        .as_i64()
        .expect("graded-but-wrong result carries the correct answer")
}
