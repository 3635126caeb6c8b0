// crates/gamelog-server/src/lib.rs
// ============================================================================
// Module: Game Log Server Library
// Description: HTTP API, backend wiring, and logging setup.
// Purpose: Expose event logging and leaderboards over HTTP.
// Dependencies: gamelog-core, gamelog-config, axum, tower-http, tracing
// ============================================================================

//! ## Overview
//! The server accepts telemetry events on `POST /log`, signed score
//! submissions on `POST /score`, and serves leaderboards on `GET /score`.
//! Backends are selected once at startup from [`gamelog_config::GameLogConfig`].
//!
//! Security posture: request bodies and headers are untrusted; authorization
//! failures are reported uniformly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod routes;
pub mod server;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use routes::build_router;
pub use server::GameLogServer;
pub use server::ServerError;
pub use server::build_service;
pub use telemetry::init_logging;
