// crates/gamelog-core/src/interfaces/mod.rs
// ============================================================================
// Module: Game Log Interfaces
// Description: Backend-agnostic storage, secret, and clock interfaces.
// Purpose: Define the seams where concrete backends plug into the service.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Each storage role has exactly one trait. Hosts select one implementation
//! per role at startup from configuration. Implementations must be safe to
//! share across request threads and must not retry internally: failures
//! surface to the caller immediately.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::GameName;
use crate::core::LogEvent;
use crate::core::ObjectKey;
use crate::core::ScoreRecord;
use crate::core::ScoreRegistration;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Event Store
// ============================================================================

/// Event store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - A failed append leaves no partially written object visible.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// Event or derived key failed validation.
    #[error("event store invalid input: {0}")]
    Invalid(String),
    /// Serialized event exceeds the store's size cap.
    #[error("event store object too large: {0}")]
    TooLarge(String),
    /// Local I/O failure.
    #[error("event store io error: {0}")]
    Io(String),
    /// Storage backend rejected the write.
    #[error("event store backend error: {0}")]
    Backend(String),
}

/// Append-only store for telemetry events.
pub trait EventStore: Send + Sync {
    /// Persists an event under `logs/game=<name>/dt=<YYYY-MM-DD>/<id>.json`,
    /// where the date is the UTC date of `event.server_timestamp` and the id is
    /// freshly generated for every call.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError`] when the write fails.
    fn append(&self, event: &LogEvent) -> Result<ObjectKey, EventStoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), EventStoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Score Store
// ============================================================================

/// Score store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ScoreStoreError {
    /// Store I/O error.
    #[error("score store io error: {0}")]
    Io(String),
    /// Stored data failed to decode.
    #[error("score store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("score store error: {0}")]
    Store(String),
}

/// Store for per-game score records.
pub trait ScoreStore: Send + Sync {
    /// Creates or overwrites a score record.
    ///
    /// A registration without an id always creates a new record with a fresh
    /// identifier. A registration with an id overwrites that record in place.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreStoreError`] when the write fails.
    fn register(&self, registration: ScoreRegistration) -> Result<ScoreRecord, ScoreStoreError>;

    /// Returns at most `limit` records for a single game ordered by score
    /// descending, then timestamp descending, then id ascending.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreStoreError`] when the query fails.
    fn list_top(
        &self,
        game_name: &GameName,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, ScoreStoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreStoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), ScoreStoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Secret Resolver
// ============================================================================

/// Secret resolution errors.
///
/// # Invariants
/// - `GameNotFound` is distinct from read failures.
#[derive(Debug, Error)]
pub enum SecretError {
    /// No metadata record exists for the game.
    #[error("game not found: {0}")]
    GameNotFound(String),
    /// Metadata lookup failed.
    #[error("secret lookup failed: {0}")]
    Read(String),
}

/// Read-only lookup of per-game shared secrets.
pub trait SecretResolver: Send + Sync {
    /// Returns the secret for a game.
    ///
    /// A record whose secret is absent or not a string resolves to the empty
    /// string.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::GameNotFound`] when no record matches and
    /// [`SecretError::Read`] when the lookup fails.
    fn get_secret(&self, game_name: &GameName) -> Result<String, SecretError>;

    /// Reports resolver readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] when the backing store is unavailable.
    fn readiness(&self) -> Result<(), SecretError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Source of server-assigned timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current UTC instant.
    fn now(&self) -> Timestamp;
}

// ============================================================================
// SECTION: Shared Handles
// ============================================================================

/// Shared event store handle.
pub type SharedEventStore = Arc<dyn EventStore>;
/// Shared score store handle.
pub type SharedScoreStore = Arc<dyn ScoreStore>;
/// Shared secret resolver handle.
pub type SharedSecretResolver = Arc<dyn SecretResolver>;
/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;
