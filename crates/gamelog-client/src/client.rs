// crates/gamelog-client/src/client.rs
// ============================================================================
// Module: Game Log Client
// Description: HTTP client for the game log API.
// Purpose: Submit events and signed scores; read leaderboards.
// Dependencies: gamelog-core, reqwest, url
// ============================================================================

//! ## Overview
//! Every POST body is serialized once, signed with HMAC-SHA256 over exactly
//! those bytes, and sent with `Authorization: Bearer <hex>`. Redirects are not
//! followed and responses are read up to a fixed limit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use gamelog_core::ScoreId;
use gamelog_core::Timestamp;
use gamelog_core::sign_body;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Maximum response body read from the server.
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Client construction settings.
#[derive(Clone)]
pub struct ClientConfig {
    /// Server base URL (`http` or `https`).
    pub base_url: String,
    /// Game shared secret used to sign posts.
    pub secret: String,
    /// When false, every operation succeeds without I/O.
    pub enabled: bool,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl ClientConfig {
    /// Creates an enabled config with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secret: secret.into(),
            enabled: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Creates a disabled config; operations return immediately.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            base_url: String::new(),
            secret: String::new(),
            enabled: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("secret", &"<redacted>")
            .field("enabled", &self.enabled)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("invalid client config: {0}")]
    InvalidConfig(String),
    /// Network or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Server answered with a non-200 status.
    #[error("error response from game log server: {status} {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, if any.
        message: String,
    },
    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// Request body could not be encoded or signed.
    #[error("encode error: {0}")]
    Encode(String),
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Leaderboard entry returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoreEntry {
    /// Game name.
    pub game_name: String,
    /// Registration time.
    pub timestamp: Timestamp,
    /// Player identifier.
    pub player_id: String,
    /// Score value.
    pub score: i64,
}

/// Leaderboard response body.
#[derive(Deserialize)]
struct ScoreListBody {
    /// Ranked entries.
    scores: Vec<ScoreEntry>,
}

/// Registration response body.
#[derive(Deserialize)]
struct RegisterBody {
    /// Assigned record id.
    id: String,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking game log client. Cheap to clone.
#[derive(Clone)]
pub struct GameLogClient {
    /// Shared state.
    inner: Arc<ClientInner>,
}

/// Immutable client state.
struct ClientInner {
    /// Signing secret.
    secret: String,
    /// Base URL ending in `/`; `None` when disabled.
    base: Option<Url>,
    /// HTTP client.
    http: Client,
}

impl fmt::Debug for GameLogClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameLogClient")
            .field("base", &self.inner.base.as_ref().map(Url::as_str))
            .finish_non_exhaustive()
    }
}

impl GameLogClient {
    /// Builds a client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] when an enabled config has an
    /// unusable base URL or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base = if config.enabled { Some(parse_base_url(&config.base_url)?) } else { None };
        let http = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ClientError::InvalidConfig(err.to_string()))?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                secret: config.secret,
                base,
                http,
            }),
        })
    }

    /// Returns whether the client performs network I/O.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.base.is_some()
    }

    /// Submits a telemetry event.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failures or non-200 responses.
    pub fn log(&self, game_name: &str, payload: &Value) -> Result<(), ClientError> {
        let Some(base) = &self.inner.base else {
            return Ok(());
        };
        let body = json!({ "game_name": game_name, "payload": payload });
        self.post(base, "log", &body).map(|_| ())
    }

    /// Submits a telemetry event on a background thread.
    ///
    /// The handle may be dropped; the submission still runs to completion.
    pub fn log_detached(
        &self,
        game_name: &str,
        payload: Value,
    ) -> JoinHandle<Result<(), ClientError>> {
        let client = self.clone();
        let game_name = game_name.to_string();
        thread::spawn(move || client.log(&game_name, &payload))
    }

    /// Submits a signed score and returns the assigned id.
    ///
    /// Returns `Ok(None)` when the client is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failures, non-200 responses, or an
    /// undecodable response.
    pub fn register_score(
        &self,
        game_name: &str,
        player_id: &str,
        score: i64,
    ) -> Result<Option<ScoreId>, ClientError> {
        let Some(base) = &self.inner.base else {
            return Ok(None);
        };
        let body = json!({ "game_name": game_name, "player_id": player_id, "score": score });
        let bytes = self.post(base, "score", &body)?;
        let decoded: RegisterBody =
            serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))?;
        Ok(Some(ScoreId::new(decoded.id)))
    }

    /// Fetches the leaderboard for a game.
    ///
    /// Returns an empty list when the client is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failures, non-200 responses, or an
    /// undecodable response.
    pub fn score_list(&self, game_name: &str) -> Result<Vec<ScoreEntry>, ClientError> {
        let Some(base) = &self.inner.base else {
            return Ok(Vec::new());
        };
        let mut url = endpoint(base, "score")?;
        url.query_pairs_mut().append_pair("game_name", game_name);
        let response = self
            .inner
            .http
            .get(url)
            .send()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        let bytes = read_success(response)?;
        let decoded: ScoreListBody =
            serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))?;
        Ok(decoded.scores)
    }

    /// Serializes, signs, and posts a body; returns the response bytes.
    fn post(&self, base: &Url, path: &str, body: &Value) -> Result<Vec<u8>, ClientError> {
        let bytes = serde_json::to_vec(body).map_err(|err| ClientError::Encode(err.to_string()))?;
        let signature = sign_body(&bytes, &self.inner.secret)
            .map_err(|err| ClientError::Encode(err.to_string()))?;
        let response = self
            .inner
            .http
            .post(endpoint(base, path)?)
            .header(AUTHORIZATION, format!("Bearer {signature}"))
            .header(CONTENT_TYPE, "application/json")
            .body(bytes)
            .send()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        read_success(response)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses and normalizes the base URL so relative joins append.
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let normalized =
        if trimmed.ends_with('/') { trimmed.to_string() } else { format!("{trimmed}/") };
    let url = Url::parse(&normalized).map_err(|err| ClientError::InvalidConfig(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ClientError::InvalidConfig(format!("unsupported scheme: {scheme}"))),
    }
}

/// Resolves an API path against the base URL.
fn endpoint(base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path).map_err(|err| ClientError::InvalidConfig(err.to_string()))
}

/// Reads a bounded response body, mapping non-200 statuses to errors.
fn read_success(response: Response) -> Result<Vec<u8>, ClientError> {
    let status = response.status();
    let limit = u64::try_from(MAX_RESPONSE_BYTES).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    response
        .take(limit)
        .read_to_end(&mut bytes)
        .map_err(|err| ClientError::Transport(err.to_string()))?;
    if bytes.len() > MAX_RESPONSE_BYTES {
        return Err(ClientError::Decode("response exceeds size limit".to_string()));
    }
    if status != reqwest::StatusCode::OK {
        let message = serde_json::from_slice::<Value>(&bytes)
            .ok()
            .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
