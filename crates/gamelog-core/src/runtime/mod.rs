// crates/gamelog-core/src/runtime/mod.rs
// ============================================================================
// Module: Game Log Runtime
// Description: Signature verification, ranking, clocks, stores, and the service.
// Purpose: Implement the request paths shared by every host surface.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold the logic every host surface calls into: the HMAC
//! signature verifier, score ranking, in-memory backends, and
//! [`GameLogService`], which validates requests and maps component failures
//! into [`GameLogError`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod clock;
pub mod ranking;
pub mod service;
pub mod signature;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use clock::FixedClock;
pub use clock::SystemClock;
pub use ranking::DEFAULT_LIST_LIMIT;
pub use ranking::compare_rank;
pub use ranking::top_scores;
pub use service::AuthorizationFailure;
pub use service::GameLogError;
pub use service::GameLogService;
pub use service::LogSubmission;
pub use service::ScoreSubmission;
pub use signature::MAX_AUTH_HEADER_BYTES;
pub use signature::SignatureError;
pub use signature::parse_bearer_token;
pub use signature::sign_body;
pub use signature::verify_signature;
pub use store::InMemoryEventStore;
pub use store::InMemoryScoreStore;
pub use store::InMemorySecretResolver;
