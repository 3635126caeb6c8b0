// crates/gamelog-core/src/lib.rs
// ============================================================================
// Module: Game Log Core Library
// Description: Public API surface for the Game Log core.
// Purpose: Expose records, storage interfaces, and the request service.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Game Log core is the storage and integrity layer of a multi-tenant event
//! logging and leaderboard backend. It defines the append-only event log
//! contract, score registration with ranked retrieval, and HMAC-SHA256
//! signature verification for score writes. It is backend-agnostic: concrete
//! stores plug in through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::Clock;
pub use interfaces::EventStore;
pub use interfaces::EventStoreError;
pub use interfaces::ScoreStore;
pub use interfaces::ScoreStoreError;
pub use interfaces::SecretError;
pub use interfaces::SecretResolver;
pub use interfaces::SharedClock;
pub use interfaces::SharedEventStore;
pub use interfaces::SharedScoreStore;
pub use interfaces::SharedSecretResolver;
pub use runtime::AuthorizationFailure;
pub use runtime::DEFAULT_LIST_LIMIT;
pub use runtime::FixedClock;
pub use runtime::GameLogError;
pub use runtime::GameLogService;
pub use runtime::InMemoryEventStore;
pub use runtime::InMemoryScoreStore;
pub use runtime::InMemorySecretResolver;
pub use runtime::SignatureError;
pub use runtime::SystemClock;
pub use runtime::sign_body;
pub use runtime::verify_signature;
