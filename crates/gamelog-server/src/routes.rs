// crates/gamelog-server/src/routes.rs
// ============================================================================
// Module: HTTP Routes
// Description: Axum router and handlers for the game log API.
// Purpose: Translate HTTP requests into service calls and errors into
//          status codes with JSON bodies.
// Dependencies: axum, gamelog-core, tower-http, tracing
// ============================================================================

//! ## Overview
//! Routes:
//! - `POST /log` appends an event; `200 {}`
//! - `POST /score` registers a signed score; `200 {"id": ...}`
//! - `GET /score?game_name=` returns the top ten scores
//! - `GET /healthz` reports store readiness
//!
//! Service calls are synchronous and may block on storage, so handlers move
//! onto a blocking section of the multi-threaded runtime when one is
//! available. Errors render as `{"message": ...}`, including bodies rejected
//! by the size limit before a handler runs; every authorization failure uses
//! the same message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use gamelog_core::GameLogError;
use gamelog_core::GameLogService;
use gamelog_core::ScoreRecord;
use gamelog_core::Timestamp;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use tracing::warn;

// ============================================================================
// SECTION: State
// ============================================================================

/// Header carrying the originating client address behind a proxy.
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Message returned for bodies over the configured limit.
const BODY_TOO_LARGE: &str = "Request body too large";

/// Shared handler state.
struct ServerState {
    /// Request service.
    service: GameLogService,
}

/// Builds the API router over a service.
#[must_use]
pub fn build_router(service: GameLogService, max_body_bytes: usize) -> Router {
    let state = Arc::new(ServerState {
        service,
    });
    Router::new()
        .route("/log", post(handle_log))
        .route("/score", post(handle_register_score).get(handle_list_scores))
        .route("/healthz", get(handle_healthz))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Query string for leaderboard reads.
#[derive(Debug, Deserialize)]
struct ScoreQuery {
    /// Game to list.
    #[serde(default)]
    game_name: String,
}

/// Leaderboard entry as rendered to clients.
#[derive(Debug, Serialize)]
struct ScoreView {
    /// Game name.
    game_name: String,
    /// Server-assigned registration time.
    timestamp: Timestamp,
    /// Player identifier.
    player_id: String,
    /// Score value.
    score: i64,
}

impl From<ScoreRecord> for ScoreView {
    fn from(record: ScoreRecord) -> Self {
        Self {
            game_name: record.game_name.as_str().to_string(),
            timestamp: record.timestamp,
            player_id: record.player_id,
            score: record.score,
        }
    }
}

/// Leaderboard response body.
#[derive(Debug, Serialize)]
struct ScoreListResponse {
    /// Ranked entries.
    scores: Vec<ScoreView>,
}

/// Score registration response body.
#[derive(Debug, Serialize)]
struct RegisterResponse {
    /// Assigned record id.
    id: String,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `POST /log`.
async fn handle_log(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejection_response(&rejection),
    };
    let remote_addr = forwarded_for(&headers);
    match run_blocking(|| state.service.log_event(&body, &remote_addr)) {
        Ok(_) => (StatusCode::OK, Json(json!({}))).into_response(),
        Err(err) => error_response(&err, "Failed to insert log"),
    }
}

/// Handles `POST /score`.
async fn handle_register_score(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejection_response(&rejection),
    };
    let authorization = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
    match run_blocking(|| state.service.register_score(&body, authorization)) {
        Ok(record) => (
            StatusCode::OK,
            Json(RegisterResponse {
                id: record.id.as_str().to_string(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&err, "Failed to register score"),
    }
}

/// Handles `GET /score`.
async fn handle_list_scores(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ScoreQuery>,
) -> Response {
    match run_blocking(|| state.service.top_scores(&query.game_name)) {
        Ok(records) => (
            StatusCode::OK,
            Json(ScoreListResponse {
                scores: records.into_iter().map(ScoreView::from).collect(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&err, "Failed to get scores"),
    }
}

/// Handles `GET /healthz`.
async fn handle_healthz(State(state): State<Arc<ServerState>>) -> Response {
    match run_blocking(|| state.service.readiness()) {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))).into_response(),
        Err(err) => {
            warn!(error = %err, "readiness check failed");
            message_response(StatusCode::SERVICE_UNAVAILABLE, "Service unavailable")
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs a storage-bound call, shifting to a blocking section when available.
fn run_blocking<T>(call: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(call)
        }
        _ => call(),
    }
}

/// Returns the first `X-Forwarded-For` hop, or an empty string.
fn forwarded_for(headers: &HeaderMap) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|hop| hop.trim().to_string())
        .unwrap_or_default()
}

/// Renders a body extraction failure, such as exceeding the size limit.
fn body_rejection_response(rejection: &BytesRejection) -> Response {
    let status = rejection.status();
    warn!(status = %status, reason = %rejection.body_text(), "request body rejected");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        message_response(status, BODY_TOO_LARGE)
    } else {
        message_response(status, &rejection.body_text())
    }
}

/// Maps a service error to a response and records it.
fn error_response(err: &GameLogError, failure_message: &'static str) -> Response {
    match err {
        GameLogError::Validation(reason) => {
            warn!(reason = %reason, "request rejected");
            message_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        GameLogError::PayloadTooLarge(reason) => {
            warn!(reason = %reason, "request rejected");
            message_response(StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE)
        }
        GameLogError::Authorization(reason) => {
            warn!(reason = %reason, "authorization rejected");
            message_response(StatusCode::FORBIDDEN, &err.to_string())
        }
        GameLogError::WriteFailure(cause) | GameLogError::ReadFailure(cause) => {
            error!(cause = %cause, "{failure_message}");
            message_response(StatusCode::INTERNAL_SERVER_ERROR, failure_message)
        }
    }
}

/// Builds a `{"message": ...}` response.
fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
