// crates/gamelog-core/src/core/identifiers.rs
// ============================================================================
// Module: Game Log Identifiers
// Description: Canonical identifiers for games, events, scores, and blob keys.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, thiserror, uuid
// ============================================================================

//! ## Overview
//! Game names are the tenant partition key and become an object-key segment,
//! so they are validated at construction. Event and score identifiers are
//! opaque strings; freshly generated identifiers are UUID v4 values drawn from
//! the operating system CSPRNG.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum game name length in bytes.
///
/// The `game=<name>` object key segment must stay within 255 bytes.
pub const MAX_GAME_NAME_BYTES: usize = 255 - "game=".len();

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Identifier was empty after trimming.
    #[error("{0} must be non-empty")]
    Empty(&'static str),
    /// Identifier exceeded the length limit.
    #[error("{field} exceeds {max_bytes} bytes")]
    TooLong {
        /// Field label.
        field: &'static str,
        /// Maximum allowed bytes.
        max_bytes: usize,
    },
    /// Identifier contained characters that are unsafe in a storage key.
    #[error("{0} contains invalid characters")]
    InvalidCharacters(&'static str),
}

// ============================================================================
// SECTION: Game Name
// ============================================================================

/// Game identifier used to partition events, scores, and secrets.
///
/// # Invariants
/// - Non-empty, at most [`MAX_GAME_NAME_BYTES`] bytes.
/// - Contains no path separators or control characters and is not `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameName(String);

impl GameName {
    /// Parses and validates a game name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the name is empty, too long, or unsafe.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        if raw.trim().is_empty() {
            return Err(IdentifierError::Empty("game_name"));
        }
        if raw.len() > MAX_GAME_NAME_BYTES {
            return Err(IdentifierError::TooLong {
                field: "game_name",
                max_bytes: MAX_GAME_NAME_BYTES,
            });
        }
        if raw == "." || raw == ".." || raw.contains(['/', '\\']) || raw.chars().any(char::is_control)
        {
            return Err(IdentifierError::InvalidCharacters("game_name"));
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the game name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for GameName {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GameName> for String {
    fn from(value: GameName) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Record Identifiers
// ============================================================================

/// Score record identifier, stable across re-registrations.
///
/// # Invariants
/// - Opaque UTF-8 string; generated values are hyphenated UUID v4 text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreId(String);

impl ScoreId {
    /// Creates a score identifier from an existing value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random score identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ScoreId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Log event identifier; the final segment of the event's object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Generates a fresh random event identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Blob storage key returned by event appends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Creates an object key from a derived key string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
