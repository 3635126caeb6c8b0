// crates/gamelog-store-object/src/event_store.rs
// ============================================================================
// Module: Object Store Event Store
// Description: EventStore implementation over an ObjectStoreClient.
// Purpose: Write each telemetry event as one immutable JSON object.
// Dependencies: gamelog-core
// ============================================================================

//! ## Overview
//! Each append derives `logs/game=<name>/dt=<YYYY-MM-DD>/<uuid>.json` from the
//! event, prefixes it with the configured root, and issues a single write.
//! Invariants:
//! - The game segment is validated as a single key segment before any I/O.
//! - Serialized events larger than the configured cap are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use gamelog_core::EventId;
use gamelog_core::EventStore;
use gamelog_core::EventStoreError;
use gamelog_core::LogEvent;
use gamelog_core::ObjectKey;

use crate::client::MAX_TOTAL_PATH_LENGTH;
use crate::client::ObjectStoreClient;
use crate::client::ObjectStoreError;
use crate::client::normalize_prefix;
use crate::client::validate_relative_path;
use crate::client::validate_segment;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default cap on a single serialized event (4 MiB).
///
/// A stored event carries its payload twice, so the cap is sized well above
/// the default 1 MiB request body limit.
pub const DEFAULT_MAX_OBJECT_BYTES: usize = 4 * 1024 * 1024;

/// Content type recorded on written objects.
const EVENT_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Event Store
// ============================================================================

/// Event store writing one object per event.
#[derive(Clone)]
pub struct ObjectStoreEventStore {
    /// Blob client.
    client: Arc<dyn ObjectStoreClient>,
    /// Normalized root prefix (empty or ending in `/`).
    root_prefix: String,
    /// Maximum serialized event size.
    max_object_bytes: usize,
}

impl ObjectStoreEventStore {
    /// Creates an event store over the given client.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Invalid`] when the prefix is unsafe or the
    /// size cap is zero.
    pub fn new(
        client: Arc<dyn ObjectStoreClient>,
        prefix: Option<&str>,
        max_object_bytes: usize,
    ) -> Result<Self, ObjectStoreError> {
        if max_object_bytes == 0 {
            return Err(ObjectStoreError::Invalid(
                "max_object_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            client,
            root_prefix: normalize_prefix(prefix.unwrap_or(""))?,
            max_object_bytes,
        })
    }

    /// Builds the full storage key for an event.
    fn storage_key(&self, event: &LogEvent, id: &EventId) -> Result<String, ObjectStoreError> {
        validate_segment(&format!("game={}", event.game_name))?;
        let relative = event.object_key(id);
        validate_relative_path(relative.as_str())?;
        let full = format!("{}{}", self.root_prefix, relative);
        if full.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ObjectStoreError::Invalid("object key exceeds length limit".to_string()));
        }
        Ok(full)
    }
}

impl EventStore for ObjectStoreEventStore {
    fn append(&self, event: &LogEvent) -> Result<ObjectKey, EventStoreError> {
        let key = self.storage_key(event, &EventId::generate()).map_err(EventStoreError::from)?;
        let bytes = event.to_json_bytes().map_err(|err| EventStoreError::Invalid(err.to_string()))?;
        if bytes.len() > self.max_object_bytes {
            return Err(ObjectStoreError::TooLarge {
                path: key,
                max_bytes: self.max_object_bytes,
                actual_bytes: bytes.len(),
            }
            .into());
        }
        self.client.put(&key, bytes, Some(EVENT_CONTENT_TYPE))?;
        Ok(ObjectKey::new(key))
    }

    fn readiness(&self) -> Result<(), EventStoreError> {
        self.client.readiness().map_err(EventStoreError::from)
    }
}

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

impl From<ObjectStoreError> for EventStoreError {
    fn from(err: ObjectStoreError) -> Self {
        match err {
            ObjectStoreError::Invalid(_) => Self::Invalid(err.to_string()),
            ObjectStoreError::TooLarge { .. } => Self::TooLarge(err.to_string()),
            ObjectStoreError::Io(_) => Self::Io(err.to_string()),
            ObjectStoreError::Backend(_) | ObjectStoreError::AlreadyExists(_) => {
                Self::Backend(err.to_string())
            }
        }
    }
}
