// crates/gamelog-core/src/core/time.rs
// ============================================================================
// Module: Game Log Time Model
// Description: UTC timestamps for ingestion, ranking, and date partitioning.
// Purpose: Provide one canonical instant type with a stable RFC 3339 wire form.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Every event and score carries a server-assigned UTC instant. The core never
//! reads wall-clock time directly; callers obtain timestamps from an injected
//! [`crate::interfaces::Clock`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Timestamp conversion errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// Value is outside the representable range.
    #[error("timestamp out of range: {0}")]
    OutOfRange(String),
}

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical UTC instant used for events and scores.
///
/// # Invariants
/// - The wrapped value always carries a UTC offset.
/// - Serializes as RFC 3339 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(#[serde(with = "time::serde::rfc3339")] OffsetDateTime);

impl Timestamp {
    /// Wraps a date-time, normalizing it to UTC.
    #[must_use]
    pub fn new(value: OffsetDateTime) -> Self {
        Self(value.to_offset(UtcOffset::UTC))
    }

    /// Builds a timestamp from unix epoch nanoseconds.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::OutOfRange`] when the value cannot be represented.
    pub fn from_unix_nanos(nanos: i64) -> Result<Self, TimestampError> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
            .map(Self)
            .map_err(|err| TimestampError::OutOfRange(err.to_string()))
    }

    /// Returns unix epoch nanoseconds.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::OutOfRange`] outside the `i64` nanosecond range.
    pub fn unix_nanos(&self) -> Result<i64, TimestampError> {
        i64::try_from(self.0.unix_timestamp_nanos())
            .map_err(|err| TimestampError::OutOfRange(err.to_string()))
    }

    /// Formats the timestamp as RFC 3339 text.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::OutOfRange`] for years RFC 3339 cannot express.
    pub fn to_rfc3339(&self) -> Result<String, TimestampError> {
        self.0.format(&Rfc3339).map_err(|err| TimestampError::OutOfRange(err.to_string()))
    }

    /// Returns the `YYYY-MM-DD` partition label for this instant.
    #[must_use]
    pub fn date_partition(&self) -> String {
        let date = self.0.date();
        format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
    }

    /// Returns the wrapped date-time.
    #[must_use]
    pub const fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Ok(text) => f.write_str(&text),
            Err(_) => self.0.fmt(f),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
