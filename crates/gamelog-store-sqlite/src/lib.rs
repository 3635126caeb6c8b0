// crates/gamelog-store-sqlite/src/lib.rs
// ============================================================================
// Module: Game Log SQLite Store Library
// Description: SQLite-backed score store and secret resolver.
// Purpose: Provide the relational backend for scores and game metadata.
// Dependencies: gamelog-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! One `SQLite` database holds both the `scores` table and the `games`
//! metadata table. [`SqliteScoreStore`] and [`SqliteSecretResolver`] share a
//! single [`SqliteDatabase`] handle so one file serves both roles.
//! Security posture: database contents are untrusted and decoded fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteDatabase;
pub use store::SqliteScoreStore;
pub use store::SqliteSecretResolver;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
