// crates/gamelog-core/src/core/records.rs
// ============================================================================
// Module: Game Log Records
// Description: Log events, score records, and per-game secrets.
// Purpose: Define the persisted record shapes shared by all backends.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Log events are immutable once appended. Score records are created by a
//! registration and may be overwritten in place by re-registering under the
//! same identifier. Game secrets are provisioned out of band and only read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::EventId;
use crate::core::identifiers::GameName;
use crate::core::identifiers::ObjectKey;
use crate::core::identifiers::ScoreId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Log Events
// ============================================================================

/// Leading segment of every event object key.
pub const EVENT_KEY_ROOT: &str = "logs";

/// Telemetry event accepted for a game.
///
/// # Invariants
/// - `server_timestamp` is assigned at ingestion, never supplied by clients.
/// - `payload` is stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Tenant partition key.
    pub game_name: GameName,
    /// Ingestion instant used for date partitioning.
    pub server_timestamp: Timestamp,
    /// Best-effort client address; untrusted and possibly empty.
    #[serde(default)]
    pub remote_addr: String,
    /// Opaque client payload.
    #[serde(default)]
    pub payload: Value,
}

/// Persisted event body, adding the compact payload text for legacy readers.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedLogEvent<'a> {
    /// Ingestion instant.
    server_timestamp: &'a Timestamp,
    /// Client address.
    remote_addr: &'a str,
    /// Game name.
    game_name: &'a GameName,
    /// Payload as a JSON value.
    payload: &'a Value,
    /// Payload as compact JSON text.
    payload_json: String,
}

impl LogEvent {
    /// Derives the event's partitioned object key for a generated identifier.
    #[must_use]
    pub fn object_key(&self, event_id: &EventId) -> ObjectKey {
        ObjectKey::new(format!(
            "{EVENT_KEY_ROOT}/game={}/dt={}/{event_id}.json",
            self.game_name,
            self.server_timestamp.date_partition()
        ))
    }

    /// Serializes the event into the persisted JSON object body.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let persisted = PersistedLogEvent {
            server_timestamp: &self.server_timestamp,
            remote_addr: &self.remote_addr,
            game_name: &self.game_name,
            payload: &self.payload,
            payload_json: serde_json::to_string(&self.payload)?,
        };
        serde_json::to_vec(&persisted)
    }
}

// ============================================================================
// SECTION: Scores
// ============================================================================

/// Score record as stored and ranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    /// Stable identifier assigned at first registration.
    pub id: ScoreId,
    /// Game the score belongs to.
    pub game_name: GameName,
    /// Registration instant.
    pub timestamp: Timestamp,
    /// Player identifier supplied by the client.
    #[serde(rename = "playerID")]
    pub player_id: String,
    /// Score value.
    pub score: i64,
}

/// Input to a score registration.
///
/// When `id` is `None` a fresh identifier is assigned and a new record is
/// created; otherwise the record with that identifier is overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRegistration {
    /// Identifier to overwrite, if any.
    pub id: Option<ScoreId>,
    /// Game the score belongs to.
    pub game_name: GameName,
    /// Player identifier.
    pub player_id: String,
    /// Score value.
    pub score: i64,
    /// Registration instant.
    pub timestamp: Timestamp,
}

impl ScoreRegistration {
    /// Resolves the registration into a record, generating an id when unset.
    #[must_use]
    pub fn into_record(self) -> ScoreRecord {
        let id = match self.id {
            Some(id) if !id.as_str().is_empty() => id,
            _ => ScoreId::generate(),
        };
        ScoreRecord {
            id,
            game_name: self.game_name,
            timestamp: self.timestamp,
            player_id: self.player_id,
            score: self.score,
        }
    }
}

// ============================================================================
// SECTION: Secrets
// ============================================================================

/// Per-game shared secret used as the HMAC key for score writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSecret {
    /// Lookup key.
    pub game_name: GameName,
    /// Secret value; `None` models a record without a usable secret field.
    #[serde(default)]
    pub secret: Option<String>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    fn game(name: &str) -> GameName {
        GameName::parse(name).unwrap()
    }

    #[test]
    fn persisted_event_carries_payload_value_and_text() {
        let event = LogEvent {
            game_name: game("pong"),
            server_timestamp: Timestamp::new(datetime!(2024-02-03 04:05:06 UTC)),
            remote_addr: "10.0.0.1".to_string(),
            payload: json!({"level": 3, "tags": ["a"]}),
        };
        let value: Value = serde_json::from_slice(&event.to_json_bytes().unwrap()).unwrap();
        assert_eq!(value["gameName"], "pong");
        assert_eq!(value["serverTimestamp"], "2024-02-03T04:05:06Z");
        assert_eq!(value["remoteAddr"], "10.0.0.1");
        assert_eq!(value["payload"], json!({"level": 3, "tags": ["a"]}));
        assert_eq!(value["payloadJson"], r#"{"level":3,"tags":["a"]}"#);
    }

    #[test]
    fn object_key_partitions_by_game_and_utc_date() {
        let event = LogEvent {
            game_name: game("pong"),
            server_timestamp: Timestamp::new(datetime!(2024-12-31 23:59:59 UTC)),
            remote_addr: String::new(),
            payload: Value::Null,
        };
        let id = EventId::generate();
        let key = event.object_key(&id);
        assert_eq!(key.as_str(), format!("logs/game=pong/dt=2024-12-31/{id}.json"));
    }

    #[test]
    fn score_record_uses_wire_field_names() {
        let record = ScoreRecord {
            id: ScoreId::new("abc"),
            game_name: game("pong"),
            timestamp: Timestamp::new(datetime!(2024-02-03 04:05:06 UTC)),
            player_id: "p1".to_string(),
            score: 42,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["playerID"], "p1");
        assert_eq!(value["gameName"], "pong");
        assert_eq!(value["id"], "abc");
    }

    #[test]
    fn registration_without_id_generates_one() {
        let registration = ScoreRegistration {
            id: None,
            game_name: game("pong"),
            player_id: "p1".to_string(),
            score: 1,
            timestamp: Timestamp::new(datetime!(2024-01-01 00:00 UTC)),
        };
        let first = registration.clone().into_record();
        let second = registration.into_record();
        assert!(!first.id.as_str().is_empty());
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn registration_with_empty_id_is_treated_as_unset() {
        let record = ScoreRegistration {
            id: Some(ScoreId::new("")),
            game_name: game("pong"),
            player_id: "p1".to_string(),
            score: 1,
            timestamp: Timestamp::new(datetime!(2024-01-01 00:00 UTC)),
        }
        .into_record();
        assert!(!record.id.as_str().is_empty());
    }
}
