// crates/gamelog-core/src/runtime/service.rs
// ============================================================================
// Module: Game Log Service
// Description: Request validation, authorization, and store delegation.
// Purpose: Give every host surface one implementation of the request paths.
// Dependencies: crate::{core, interfaces, runtime}, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`GameLogService`] owns one handle per storage role plus a clock. It parses
//! raw request bodies, assigns server timestamps, gates score writes on the
//! game's HMAC signature, and maps every component failure into the
//! [`GameLogError`] taxonomy. It performs no retries and no logging; hosts log
//! and render errors.
//!
//! Score write order: parse and validate the body, resolve the game's secret,
//! verify the signature over the raw body, then register.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::GameName;
use crate::core::LogEvent;
use crate::core::ObjectKey;
use crate::core::ScoreRecord;
use crate::core::ScoreRegistration;
use crate::interfaces::EventStoreError;
use crate::interfaces::SecretError;
use crate::interfaces::SharedClock;
use crate::interfaces::SharedEventStore;
use crate::interfaces::SharedScoreStore;
use crate::interfaces::SharedSecretResolver;
use crate::runtime::ranking::DEFAULT_LIST_LIMIT;
use crate::runtime::signature::verify_signature;

// ============================================================================
// SECTION: Request Bodies
// ============================================================================

/// Body of an event submission.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSubmission {
    /// Target game.
    #[serde(default)]
    pub game_name: String,
    /// Opaque event payload.
    #[serde(default)]
    pub payload: Value,
}

/// Body of a score submission.
///
/// `player_id` and `score` may be absent or `null`; both read as their zero
/// values.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreSubmission {
    /// Target game.
    #[serde(default)]
    pub game_name: String,
    /// Player identifier.
    #[serde(default)]
    pub player_id: Option<String>,
    /// Score value.
    #[serde(default)]
    pub score: Option<i64>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Internal reason for an authorization rejection.
///
/// The reason is available to host logs only; [`GameLogError`] renders the same
/// message for every reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationFailure {
    /// No secret is provisioned for the game.
    UnknownGame,
    /// Signature was missing, malformed, or did not match.
    SignatureMismatch,
}

impl fmt::Display for AuthorizationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGame => f.write_str("unknown game"),
            Self::SignatureMismatch => f.write_str("signature mismatch"),
        }
    }
}

/// Service errors surfaced to hosts.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `Authorization` displays the same text regardless of its reason.
#[derive(Debug, Error)]
pub enum GameLogError {
    /// Request body or parameters failed validation.
    #[error("invalid request: {0}")]
    Validation(String),
    /// Request content is too large to store.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    /// Score write was not authorized.
    #[error("Invalid signature")]
    Authorization(AuthorizationFailure),
    /// A storage write failed.
    #[error("write failed: {0}")]
    WriteFailure(String),
    /// A metadata or score read failed.
    #[error("read failed: {0}")]
    ReadFailure(String),
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Request service over the configured stores.
#[derive(Clone)]
pub struct GameLogService {
    /// Event store handle.
    events: SharedEventStore,
    /// Score store handle.
    scores: SharedScoreStore,
    /// Secret resolver handle.
    secrets: SharedSecretResolver,
    /// Timestamp source.
    clock: SharedClock,
}

impl GameLogService {
    /// Creates a service over explicit store handles.
    #[must_use]
    pub fn new(
        events: SharedEventStore,
        scores: SharedScoreStore,
        secrets: SharedSecretResolver,
        clock: SharedClock,
    ) -> Self {
        Self {
            events,
            scores,
            secrets,
            clock,
        }
    }

    /// Accepts a raw event body and appends it to the event store.
    ///
    /// # Errors
    ///
    /// Returns [`GameLogError::Validation`] for unparsable bodies, invalid
    /// game names, or events the store refuses as malformed,
    /// [`GameLogError::PayloadTooLarge`] when the stored event would exceed the
    /// store's size cap, and [`GameLogError::WriteFailure`] when the append
    /// fails in the backend.
    pub fn log_event(&self, body: &[u8], remote_addr: &str) -> Result<ObjectKey, GameLogError> {
        let submission: LogSubmission = parse_body(body)?;
        let game_name = parse_game_name(&submission.game_name)?;
        let event = LogEvent {
            game_name,
            server_timestamp: self.clock.now(),
            remote_addr: remote_addr.to_string(),
            payload: submission.payload,
        };
        self.events.append(&event).map_err(|err| match err {
            EventStoreError::Invalid(_) => GameLogError::Validation(err.to_string()),
            EventStoreError::TooLarge(_) => GameLogError::PayloadTooLarge(err.to_string()),
            EventStoreError::Io(_) | EventStoreError::Backend(_) => {
                GameLogError::WriteFailure(err.to_string())
            }
        })
    }

    /// Accepts a raw, signed score body and registers a new score record.
    ///
    /// # Errors
    ///
    /// Returns [`GameLogError::Validation`] for invalid bodies,
    /// [`GameLogError::Authorization`] for unknown games or bad signatures,
    /// [`GameLogError::ReadFailure`] when the secret lookup fails, and
    /// [`GameLogError::WriteFailure`] when registration fails.
    pub fn register_score(
        &self,
        body: &[u8],
        authorization: Option<&str>,
    ) -> Result<ScoreRecord, GameLogError> {
        let submission: ScoreSubmission = parse_body(body)?;
        let game_name = parse_game_name(&submission.game_name)?;
        let secret = match self.secrets.get_secret(&game_name) {
            Ok(secret) => secret,
            Err(SecretError::GameNotFound(_)) => {
                return Err(GameLogError::Authorization(AuthorizationFailure::UnknownGame));
            }
            Err(SecretError::Read(message)) => return Err(GameLogError::ReadFailure(message)),
        };
        verify_signature(&game_name, body, authorization, &secret)
            .map_err(|_| GameLogError::Authorization(AuthorizationFailure::SignatureMismatch))?;
        let registration = ScoreRegistration {
            id: None,
            game_name,
            player_id: submission.player_id.unwrap_or_default(),
            score: submission.score.unwrap_or_default(),
            timestamp: self.clock.now(),
        };
        self.scores
            .register(registration)
            .map_err(|err| GameLogError::WriteFailure(err.to_string()))
    }

    /// Returns the leaderboard for a game.
    ///
    /// # Errors
    ///
    /// Returns [`GameLogError::Validation`] for invalid game names and
    /// [`GameLogError::ReadFailure`] when the query fails.
    pub fn top_scores(&self, game_name: &str) -> Result<Vec<ScoreRecord>, GameLogError> {
        let game_name = parse_game_name(game_name)?;
        self.scores
            .list_top(&game_name, DEFAULT_LIST_LIMIT)
            .map_err(|err| GameLogError::ReadFailure(err.to_string()))
    }

    /// Checks readiness of every configured store.
    ///
    /// # Errors
    ///
    /// Returns [`GameLogError::ReadFailure`] naming the first unavailable store.
    pub fn readiness(&self) -> Result<(), GameLogError> {
        self.events.readiness().map_err(|err| GameLogError::ReadFailure(err.to_string()))?;
        self.scores.readiness().map_err(|err| GameLogError::ReadFailure(err.to_string()))?;
        self.secrets.readiness().map_err(|err| GameLogError::ReadFailure(err.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a JSON request body.
fn parse_body<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T, GameLogError> {
    serde_json::from_slice(body).map_err(|err| GameLogError::Validation(err.to_string()))
}

/// Validates a game name from request input.
fn parse_game_name(raw: &str) -> Result<GameName, GameLogError> {
    GameName::parse(raw).map_err(|err| GameLogError::Validation(err.to_string()))
}
