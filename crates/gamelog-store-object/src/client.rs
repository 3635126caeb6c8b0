// crates/gamelog-store-object/src/client.rs
// ============================================================================
// Module: Object Store Client
// Description: Minimal blob client abstraction, errors, and key validation.
// Purpose: Decouple event persistence from any specific storage provider.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! An [`ObjectStoreClient`] writes whole objects by key, once. Keys are
//! `/`-separated relative paths; [`validate_relative_path`] rejects absolute
//! paths, traversal, backslashes, and overlong segments before any I/O.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Component;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a single key segment.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total key length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Object-store errors.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// Invalid configuration or key input.
    #[error("object store invalid: {0}")]
    Invalid(String),
    /// Local I/O failure.
    #[error("object store io error: {0}")]
    Io(String),
    /// Backend returned an error.
    #[error("object store backend error: {0}")]
    Backend(String),
    /// An object already exists at the key.
    #[error("object already exists: {0}")]
    AlreadyExists(String),
    /// Object exceeds size limits.
    #[error("object too large: {path} ({actual_bytes} > {max_bytes})")]
    TooLarge {
        /// Object path.
        path: String,
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual size in bytes.
        actual_bytes: usize,
    },
}

// ============================================================================
// SECTION: Client Trait
// ============================================================================

/// Minimal object-store client abstraction.
pub trait ObjectStoreClient: Send + Sync {
    /// Writes a single object atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when the write fails.
    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), ObjectStoreError>;

    /// Confirms the storage target is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when the target is unavailable.
    fn readiness(&self) -> Result<(), ObjectStoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Client
// ============================================================================

/// In-memory object store client for tests and local runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryObjectStoreClient {
    /// Stored objects keyed by full key.
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryObjectStoreClient {
    /// Creates an empty client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored key in lexical order.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Io`] when the lock is poisoned.
    pub fn keys(&self) -> Result<Vec<String>, ObjectStoreError> {
        Ok(self
            .objects
            .lock()
            .map_err(|_| ObjectStoreError::Io("object store lock poisoned".to_string()))?
            .keys()
            .cloned()
            .collect())
    }

    /// Returns the bytes stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Io`] when the lock is poisoned.
    pub fn object(&self, key: &str) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        Ok(self
            .objects
            .lock()
            .map_err(|_| ObjectStoreError::Io("object store lock poisoned".to_string()))?
            .get(key)
            .cloned())
    }
}

impl ObjectStoreClient for InMemoryObjectStoreClient {
    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), ObjectStoreError> {
        let mut guard = self
            .objects
            .lock()
            .map_err(|_| ObjectStoreError::Io("object store lock poisoned".to_string()))?;
        if guard.contains_key(key) {
            return Err(ObjectStoreError::AlreadyExists(key.to_string()));
        }
        guard.insert(key.to_string(), bytes);
        drop(guard);
        Ok(())
    }
}

// ============================================================================
// SECTION: Key Validation
// ============================================================================

/// Normalizes a root prefix to `segment/.../` form (or empty).
///
/// # Errors
///
/// Returns [`ObjectStoreError::Invalid`] for absolute or traversing prefixes.
pub fn normalize_prefix(raw: &str) -> Result<String, ObjectStoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.starts_with('/') {
        return Err(ObjectStoreError::Invalid(
            "prefix must be relative (no leading slash)".to_string(),
        ));
    }
    let normalized = trimmed.strip_suffix('/').unwrap_or(trimmed);
    validate_relative_path(normalized)?;
    Ok(format!("{normalized}/"))
}

/// Validates a relative object key.
///
/// # Errors
///
/// Returns [`ObjectStoreError::Invalid`] when the key is empty, absolute,
/// traversing, contains backslashes, or exceeds length limits.
pub fn validate_relative_path(path: &str) -> Result<(), ObjectStoreError> {
    if path.is_empty() {
        return Err(ObjectStoreError::Invalid("path must be set".to_string()));
    }
    if path.contains('\\') {
        return Err(ObjectStoreError::Invalid("path must not contain backslashes".to_string()));
    }
    if path.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ObjectStoreError::Invalid("path exceeds length limit".to_string()));
    }
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return Err(ObjectStoreError::Invalid("path must be relative".to_string()));
    }
    for component in candidate.components() {
        let Component::Normal(value) = component else {
            return Err(ObjectStoreError::Invalid(
                "path must be relative without traversal".to_string(),
            ));
        };
        validate_segment(&value.to_string_lossy())?;
    }
    Ok(())
}

/// Validates a single key segment.
///
/// # Errors
///
/// Returns [`ObjectStoreError::Invalid`] for empty, dot, or overlong segments
/// and segments containing separators.
pub fn validate_segment(value: &str) -> Result<(), ObjectStoreError> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(ObjectStoreError::Invalid("segment is invalid".to_string()));
    }
    if value.len() > MAX_PATH_COMPONENT_LENGTH {
        return Err(ObjectStoreError::Invalid("segment exceeds length limit".to_string()));
    }
    if value.contains(['/', '\\']) {
        return Err(ObjectStoreError::Invalid("segment contains invalid characters".to_string()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
