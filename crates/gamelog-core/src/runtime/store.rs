// crates/gamelog-core/src/runtime/store.rs
// ============================================================================
// Module: Game Log In-Memory Stores
// Description: In-memory event store, score store, and secret resolver.
// Purpose: Provide deterministic backends without external dependencies.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! These backends keep all state in process memory. They back the `memory`
//! configuration options and the test suites; they are not durable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::EventId;
use crate::core::GameName;
use crate::core::GameSecret;
use crate::core::LogEvent;
use crate::core::ObjectKey;
use crate::core::ScoreId;
use crate::core::ScoreRecord;
use crate::core::ScoreRegistration;
use crate::interfaces::EventStore;
use crate::interfaces::EventStoreError;
use crate::interfaces::ScoreStore;
use crate::interfaces::ScoreStoreError;
use crate::interfaces::SecretError;
use crate::interfaces::SecretResolver;
use crate::runtime::ranking::top_scores;

// ============================================================================
// SECTION: Event Store
// ============================================================================

/// In-memory append-only event store keyed by derived object key.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventStore {
    /// Serialized event bodies keyed by object key.
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryEventStore {
    /// Creates an empty event store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored body for a key.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Io`] when the store mutex is poisoned.
    pub fn get(&self, key: &ObjectKey) -> Result<Option<Vec<u8>>, EventStoreError> {
        let guard = self
            .objects
            .lock()
            .map_err(|_| EventStoreError::Io("event store mutex poisoned".to_string()))?;
        Ok(guard.get(key.as_str()).cloned())
    }

    /// Returns every stored key in lexical order.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Io`] when the store mutex is poisoned.
    pub fn keys(&self) -> Result<Vec<ObjectKey>, EventStoreError> {
        let guard = self
            .objects
            .lock()
            .map_err(|_| EventStoreError::Io("event store mutex poisoned".to_string()))?;
        Ok(guard.keys().map(ObjectKey::new).collect())
    }
}

impl EventStore for InMemoryEventStore {
    fn append(&self, event: &LogEvent) -> Result<ObjectKey, EventStoreError> {
        let bytes =
            event.to_json_bytes().map_err(|err| EventStoreError::Invalid(err.to_string()))?;
        let key = event.object_key(&EventId::generate());
        let mut guard = self
            .objects
            .lock()
            .map_err(|_| EventStoreError::Io("event store mutex poisoned".to_string()))?;
        if guard.contains_key(key.as_str()) {
            return Err(EventStoreError::Backend(format!("object already exists: {key}")));
        }
        guard.insert(key.as_str().to_string(), bytes);
        drop(guard);
        Ok(key)
    }
}

// ============================================================================
// SECTION: Score Store
// ============================================================================

/// In-memory score store keyed by score identifier.
#[derive(Debug, Default, Clone)]
pub struct InMemoryScoreStore {
    /// Score records keyed by id.
    records: Arc<Mutex<BTreeMap<ScoreId, ScoreRecord>>>,
}

impl InMemoryScoreStore {
    /// Creates an empty score store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreStoreError::Store`] when the store mutex is poisoned.
    pub fn get(&self, id: &ScoreId) -> Result<Option<ScoreRecord>, ScoreStoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| ScoreStoreError::Store("score store mutex poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreStoreError::Store`] when the store mutex is poisoned.
    pub fn record_count(&self) -> Result<usize, ScoreStoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| ScoreStoreError::Store("score store mutex poisoned".to_string()))?;
        Ok(guard.len())
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn register(&self, registration: ScoreRegistration) -> Result<ScoreRecord, ScoreStoreError> {
        let record = registration.into_record();
        self.records
            .lock()
            .map_err(|_| ScoreStoreError::Store("score store mutex poisoned".to_string()))?
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn list_top(
        &self,
        game_name: &GameName,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, ScoreStoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| ScoreStoreError::Store("score store mutex poisoned".to_string()))?;
        Ok(top_scores(guard.values(), game_name, limit))
    }
}

// ============================================================================
// SECTION: Secret Resolver
// ============================================================================

/// Secret resolver over a fixed set of game secrets.
#[derive(Debug, Default, Clone)]
pub struct InMemorySecretResolver {
    /// Secrets keyed by game; `None` models a missing secret field.
    secrets: BTreeMap<GameName, Option<String>>,
}

impl InMemorySecretResolver {
    /// Creates a resolver with no provisioned games.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver from provisioned game secrets.
    #[must_use]
    pub fn from_secrets(secrets: impl IntoIterator<Item = GameSecret>) -> Self {
        Self {
            secrets: secrets
                .into_iter()
                .map(|secret| (secret.game_name, secret.secret))
                .collect(),
        }
    }

    /// Adds or replaces a game's secret.
    #[must_use]
    pub fn with_secret(mut self, game_name: GameName, secret: impl Into<String>) -> Self {
        self.secrets.insert(game_name, Some(secret.into()));
        self
    }
}

impl SecretResolver for InMemorySecretResolver {
    fn get_secret(&self, game_name: &GameName) -> Result<String, SecretError> {
        self.secrets
            .get(game_name)
            .map(|secret| secret.clone().unwrap_or_default())
            .ok_or_else(|| SecretError::GameNotFound(game_name.to_string()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
