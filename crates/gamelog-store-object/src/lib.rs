// crates/gamelog-store-object/src/lib.rs
// ============================================================================
// Module: Game Log Object Store Library
// Description: Blob-storage EventStore with S3 and filesystem clients.
// Purpose: Persist telemetry events as immutable partitioned objects.
// Dependencies: gamelog-core, aws-sdk-s3, tempfile, tokio
// ============================================================================

//! ## Overview
//! [`ObjectStoreEventStore`] derives a partitioned key for every event and
//! writes the serialized body through an [`ObjectStoreClient`]. Clients are
//! provided for S3-compatible storage, the local filesystem, and memory.
//! Invariants:
//! - Every write is single-shot and atomic; no partial object is visible.
//! - Keys are validated as relative paths without traversal.
//!
//! Security posture: storage is untrusted; keys and sizes are validated.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod event_store;
pub mod filesystem;
pub mod s3;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::InMemoryObjectStoreClient;
pub use client::ObjectStoreClient;
pub use client::ObjectStoreError;
pub use event_store::DEFAULT_MAX_OBJECT_BYTES;
pub use event_store::ObjectStoreEventStore;
pub use filesystem::FilesystemObjectStoreClient;
pub use s3::S3ObjectStoreClient;
pub use s3::S3Settings;
