// crates/gamelog-core/src/core/mod.rs
// ============================================================================
// Module: Game Log Core Types
// Description: Canonical identifiers, timestamps, and persisted records.
// Purpose: Provide stable, serializable types shared by every backend.
// Dependencies: serde, time, uuid
// ============================================================================

//! ## Overview
//! Core types are the single source of truth for the persisted wire forms of
//! log events and score records. Backends serialize these types directly.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod records;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::EventId;
pub use identifiers::GameName;
pub use identifiers::IdentifierError;
pub use identifiers::MAX_GAME_NAME_BYTES;
pub use identifiers::ObjectKey;
pub use identifiers::ScoreId;
pub use records::EVENT_KEY_ROOT;
pub use records::GameSecret;
pub use records::LogEvent;
pub use records::ScoreRecord;
pub use records::ScoreRegistration;
pub use self::time::Timestamp;
pub use self::time::TimestampError;
