// crates/gamelog-client/tests/client_unit.rs
// ============================================================================
// Module: Client Unit Tests
// Description: Wire-level tests for the blocking client against stub servers.
// Purpose: Validate request shape, signing, status mapping, and disablement.
// ============================================================================

//! ## Overview
//! Each test runs a one-shot `tiny_http` server on an ephemeral port,
//! captures the request the client sends, and replies with a canned response.

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

use std::thread;
use std::thread::JoinHandle;

use gamelog_client::ClientConfig;
use gamelog_client::ClientError;
use gamelog_client::GameLogClient;
use gamelog_core::sign_body;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Stub Server
// ============================================================================

const SECRET: &str = "client-secret";

struct Captured {
    method: String,
    url: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

fn header_value(request: &tiny_http::Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_string())
}

fn stub(status: u16, response_body: &str) -> (String, JoinHandle<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let base = format!("http://{}", server.server_addr());
    let response_body = response_body.to_string();
    let handle = thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut body = Vec::new();
        request.as_reader().read_to_end(&mut body).unwrap();
        let captured = Captured {
            method: request.method().to_string(),
            url: request.url().to_string(),
            authorization: header_value(&request, "Authorization"),
            content_type: header_value(&request, "Content-Type"),
            body,
        };
        let response = Response::from_string(response_body)
            .with_status_code(status)
            .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
        request.respond(response).unwrap();
        captured
    });
    (base, handle)
}

fn client(base: &str) -> GameLogClient {
    GameLogClient::new(ClientConfig::new(base, SECRET)).unwrap()
}

// ============================================================================
// SECTION: Posts
// ============================================================================

#[test]
fn log_posts_signed_json() {
    let (base, server) = stub(200, "{}");
    client(&base).log("tetris", &json!({"lines": 4})).unwrap();
    let captured = server.join().unwrap();

    assert_eq!(captured.method, "POST");
    assert_eq!(captured.url, "/log");
    assert_eq!(captured.content_type.as_deref(), Some("application/json"));
    let body: Value = serde_json::from_slice(&captured.body).unwrap();
    assert_eq!(body, json!({"game_name": "tetris", "payload": {"lines": 4}}));
    let expected = format!("Bearer {}", sign_body(&captured.body, SECRET).unwrap());
    assert_eq!(captured.authorization.as_deref(), Some(expected.as_str()));
}

#[test]
fn register_score_returns_assigned_id() {
    let (base, server) = stub(200, r#"{"id":"abc-123"}"#);
    let id = client(&base).register_score("tetris", "alice", 42).unwrap();
    assert_eq!(id.unwrap().as_str(), "abc-123");

    let captured = server.join().unwrap();
    assert_eq!(captured.url, "/score");
    let body: Value = serde_json::from_slice(&captured.body).unwrap();
    assert_eq!(body, json!({"game_name": "tetris", "player_id": "alice", "score": 42}));
    let expected = format!("Bearer {}", sign_body(&captured.body, SECRET).unwrap());
    assert_eq!(captured.authorization.as_deref(), Some(expected.as_str()));
}

#[test]
fn non_200_maps_to_status_error_with_message() {
    let (base, server) = stub(403, r#"{"message":"Invalid signature"}"#);
    let err = client(&base).register_score("tetris", "mallory", 1).unwrap_err();
    server.join().unwrap();
    match err {
        ClientError::Status {
            status,
            message,
        } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Invalid signature");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn log_detached_completes_in_background() {
    let (base, server) = stub(200, "{}");
    let handle = client(&base).log_detached("tetris", json!({"bg": true}));
    handle.join().unwrap().unwrap();
    let captured = server.join().unwrap();
    assert_eq!(captured.url, "/log");
}

// ============================================================================
// SECTION: Reads
// ============================================================================

#[test]
fn score_list_decodes_entries_and_encodes_query() {
    let (base, server) = stub(
        200,
        r#"{"scores":[{"game_name":"space race","timestamp":"2024-05-05T10:00:00Z","player_id":"p1","score":900}]}"#,
    );
    let scores = client(&base).score_list("space race").unwrap();
    let captured = server.join().unwrap();

    assert_eq!(captured.method, "GET");
    assert_eq!(captured.url, "/score?game_name=space+race");
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].player_id, "p1");
    assert_eq!(scores[0].score, 900);
    assert_eq!(scores[0].timestamp.to_rfc3339().unwrap(), "2024-05-05T10:00:00Z");
}

#[test]
fn malformed_leaderboard_is_decode_error() {
    let (base, server) = stub(200, "not json");
    let result = client(&base).score_list("tetris");
    server.join().unwrap();
    assert!(matches!(result, Err(ClientError::Decode(_))));
}

// ============================================================================
// SECTION: Disablement and Config
// ============================================================================

#[test]
fn disabled_client_performs_no_io() {
    let config = ClientConfig {
        enabled: false,
        ..ClientConfig::new("http://127.0.0.1:9", SECRET)
    };
    let client = GameLogClient::new(config).unwrap();
    client.log("tetris", &json!({})).unwrap();
    assert!(client.register_score("tetris", "p", 1).unwrap().is_none());
    assert!(client.score_list("tetris").unwrap().is_empty());
}

#[test]
fn unreachable_server_is_transport_error() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let base = format!("http://{}", server.server_addr());
    drop(server);
    let result = client(&base).log("tetris", &json!({}));
    assert!(matches!(result, Err(ClientError::Transport(_))));
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = GameLogClient::new(ClientConfig::new("file:///tmp", SECRET));
    assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
}
