// crates/gamelog-client/src/lib.rs
// ============================================================================
// Module: Game Log Client Library
// Description: Blocking SDK for submitting events and scores.
// Purpose: Let game processes log telemetry and read leaderboards.
// Dependencies: gamelog-core, reqwest, url
// ============================================================================

//! ## Overview
//! [`GameLogClient`] posts events and signed scores to a game log server and
//! reads leaderboards. Enablement and the shared secret are fixed at
//! construction; a disabled client performs no network I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::ClientConfig;
pub use client::ClientError;
pub use client::DEFAULT_TIMEOUT_MS;
pub use client::GameLogClient;
pub use client::ScoreEntry;
