// crates/gamelog-config/src/lib.rs
// ============================================================================
// Module: Game Log Config Library
// Description: Configuration model, validation, and example generation.
// Purpose: Single source of truth for gamelog.toml semantics.
// Dependencies: gamelog-core, gamelog-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `gamelog-config` defines the server configuration model. Loading is
//! strict and fail-closed: unknown backends, malformed addresses, unsafe
//! prefixes, and duplicate game secrets are rejected before startup.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
