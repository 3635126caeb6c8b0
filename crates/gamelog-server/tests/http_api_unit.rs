// crates/gamelog-server/tests/http_api_unit.rs
// ============================================================================
// Module: HTTP API Tests
// Description: Router-level tests for the game log HTTP surface.
// Purpose: Validate status codes, bodies, headers, and backend wiring.
// ============================================================================

//! ## Overview
//! Drives the axum router in-process with `tower::ServiceExt::oneshot`:
//! - `POST /log` stores events with the forwarded client address
//! - `POST /score` enforces signatures with a uniform 403 body
//! - `GET /score` returns the ranked top ten
//! - Oversized bodies, malformed JSON, and CORS preflight
//! - A server built from configuration wires filesystem and `SQLite` backends

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header;
use gamelog_config::GameLogConfig;
use gamelog_core::FixedClock;
use gamelog_core::GameLogService;
use gamelog_core::GameName;
use gamelog_core::InMemoryEventStore;
use gamelog_core::InMemoryScoreStore;
use gamelog_core::InMemorySecretResolver;
use gamelog_core::Timestamp;
use gamelog_core::sign_body;
use gamelog_server::GameLogServer;
use gamelog_server::build_router;
use gamelog_store_sqlite::SqliteDatabase;
use gamelog_store_sqlite::SqliteStoreConfig;
use http_body_util::BodyExt;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;
use time::macros::datetime;
use tower::ServiceExt;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const SECRET: &str = "s3cr3t";

struct Api {
    router: Router,
    events: InMemoryEventStore,
    clock: Arc<FixedClock>,
}

fn api_with_limit(max_body_bytes: usize) -> Api {
    let events = InMemoryEventStore::new();
    let clock = Arc::new(FixedClock::new(Timestamp::new(datetime!(2024-06-01 12:00 UTC))));
    let secrets = InMemorySecretResolver::new()
        .with_secret(GameName::parse("tetris").unwrap(), SECRET)
        .with_secret(GameName::parse("pong").unwrap(), "other");
    let service = GameLogService::new(
        Arc::new(events.clone()),
        Arc::new(InMemoryScoreStore::new()),
        Arc::new(secrets),
        clock.clone(),
    );
    Api {
        router: build_router(service, max_body_bytes),
        events,
        clock,
    }
}

fn api() -> Api {
    api_with_limit(1024 * 1024)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn post(uri: &str, body: &[u8], authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(body.to_vec())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn score_body(game: &str, player: &str, score: i64) -> Vec<u8> {
    serde_json::to_vec(&json!({"game_name": game, "player_id": player, "score": score})).unwrap()
}

async fn register(api: &Api, game: &str, player: &str, score: i64) -> (StatusCode, Value) {
    let body = score_body(game, player, score);
    let signature = sign_body(&body, SECRET).unwrap();
    send(&api.router, post("/score", &body, Some(&format!("Bearer {signature}")))).await
}

// ============================================================================
// SECTION: POST /log
// ============================================================================

#[tokio::test]
async fn log_stores_event_with_forwarded_address() {
    let api = api();
    let request = Request::builder()
        .method("POST")
        .uri("/log")
        .header("x-forwarded-for", "203.0.113.5, 10.0.0.1")
        .body(Body::from(r#"{"game_name":"tetris","payload":{"lines":4}}"#))
        .unwrap();
    let (status, body) = send(&api.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let keys = api.events.keys().unwrap();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].as_str().starts_with("logs/game=tetris/dt=2024-06-01/"));
    let stored: Value = serde_json::from_slice(&api.events.get(&keys[0]).unwrap().unwrap()).unwrap();
    assert_eq!(stored["remoteAddr"], "203.0.113.5");
    assert_eq!(stored["payload"], json!({"lines": 4}));
}

#[tokio::test]
async fn log_rejects_malformed_and_nameless_bodies() {
    let api = api();
    let bodies: [&[u8]; 3] = [b"{not json", br#"{"payload":{}}"#, br#"{"game_name":""}"#];
    for body in bodies {
        let (status, response) = send(&api.router, post("/log", body, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["message"].is_string());
    }
    assert!(api.events.keys().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let api = api_with_limit(64);
    let payload = format!(r#"{{"game_name":"tetris","payload":"{}"}}"#, "x".repeat(128));
    for uri in ["/log", "/score"] {
        let (status, body) = send(&api.router, post(uri, payload.as_bytes(), None)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({"message": "Request body too large"}));
    }
    assert!(api.events.keys().unwrap().is_empty());
}

// ============================================================================
// SECTION: POST /score
// ============================================================================

#[tokio::test]
async fn signed_score_is_registered() {
    let api = api();
    let (status, body) = register(&api, "tetris", "alice", 120).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn bare_hex_signature_is_accepted() {
    let api = api();
    let body = score_body("tetris", "bob", 5);
    let signature = sign_body(&body, SECRET).unwrap();
    let (status, _) = send(&api.router, post("/score", &body, Some(&signature))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn authorization_failures_are_indistinguishable() {
    let api = api();
    let body = score_body("tetris", "eve", 9_999);
    let wrong = sign_body(&body, "guess").unwrap();
    let unknown_body = score_body("ghost", "eve", 1);
    let unknown_sig = sign_body(&unknown_body, SECRET).unwrap();

    let cases = vec![
        post("/score", &body, None),
        post("/score", &body, Some("Bearer zz-not-hex")),
        post("/score", &body, Some(&format!("Bearer {wrong}"))),
        post("/score", &unknown_body, Some(&format!("Bearer {unknown_sig}"))),
    ];
    for request in cases {
        let (status, response) = send(&api.router, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(response, json!({"message": "Invalid signature"}));
    }
    let (_, listed) = send(&api.router, get("/score?game_name=tetris")).await;
    assert_eq!(listed["scores"], json!([]));
}

#[tokio::test]
async fn score_with_missing_game_is_bad_request() {
    let api = api();
    let body = br#"{"player_id":"p","score":1}"#;
    let (status, _) = send(&api.router, post("/score", body, Some("Bearer 00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// SECTION: GET /score
// ============================================================================

#[tokio::test]
async fn leaderboard_is_ranked_and_scoped() {
    let api = api();
    register(&api, "tetris", "p1", 100).await;
    api.clock.advance(time::Duration::seconds(1));
    register(&api, "tetris", "p2", 200).await;
    api.clock.advance(time::Duration::seconds(1));
    register(&api, "tetris", "p3", 200).await;

    let (status, body) = send(&api.router, get("/score?game_name=tetris")).await;
    assert_eq!(status, StatusCode::OK);
    let players: Vec<&str> = body["scores"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["player_id"].as_str().unwrap())
        .collect();
    assert_eq!(players, vec!["p3", "p2", "p1"]);
    let first = &body["scores"][0];
    assert_eq!(first["game_name"], "tetris");
    assert_eq!(first["score"], 200);
    assert_eq!(first["timestamp"], "2024-06-01T12:00:02Z");

    let (_, other) = send(&api.router, get("/score?game_name=pong")).await;
    assert_eq!(other["scores"], json!([]));
}

#[tokio::test]
async fn leaderboard_is_capped_at_ten() {
    let api = api();
    for score in 0 .. 15 {
        register(&api, "tetris", "p", score).await;
    }
    let (_, body) = send(&api.router, get("/score?game_name=tetris")).await;
    let scores = body["scores"].as_array().unwrap();
    assert_eq!(scores.len(), 10);
    assert_eq!(scores[0]["score"], 14);
    assert_eq!(scores[9]["score"], 5);
}

#[tokio::test]
async fn leaderboard_requires_game_name() {
    let api = api();
    let (status, body) = send(&api.router, get("/score")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

// ============================================================================
// SECTION: Cross-Cutting
// ============================================================================

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let api = api();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/score")
        .header(header::ORIGIN, "https://game.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = api.router.clone().oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn healthz_reports_ready() {
    let api = api();
    let (status, body) = send(&api.router, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ============================================================================
// SECTION: Configured Backends
// ============================================================================

fn configured_server(dir: &Path) -> GameLogServer {
    let database = dir.join("gamelog.db");
    let content = format!(
        r#"
[event_store]
type = "filesystem"
root = "{events}"
prefix = "archive"

[score_store]
type = "sqlite"
path = "{database}"

[secrets]
type = "sqlite"
"#,
        events = dir.join("events").display(),
        database = database.display(),
    );
    let config = GameLogConfig::from_toml_str(&content).unwrap();
    SqliteDatabase::open(&SqliteStoreConfig::new(&database))
        .unwrap()
        .provision_secret(&GameName::parse("tetris").unwrap(), SECRET)
        .unwrap();
    GameLogServer::from_config(config).unwrap()
}

#[tokio::test]
async fn server_from_config_wires_filesystem_and_sqlite() {
    let dir = TempDir::new().unwrap();
    let server = configured_server(dir.path());
    let router = server.router();

    let (status, _) = send(
        &router,
        post("/log", br#"{"game_name":"tetris","payload":{"wave":2}}"#, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let partition = dir.path().join("events/archive/logs/game=tetris");
    let day = fs::read_dir(&partition).unwrap().next().unwrap().unwrap().path();
    assert_eq!(fs::read_dir(day).unwrap().count(), 1);

    let body = score_body("tetris", "carol", 77);
    let signature = sign_body(&body, SECRET).unwrap();
    let (status, _) =
        send(&router, post("/score", &body, Some(&format!("Bearer {signature}")))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = send(&router, get("/score?game_name=tetris")).await;
    assert_eq!(listed["scores"][0]["player_id"], "carol");

    let (status, _) = send(&router, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
}
