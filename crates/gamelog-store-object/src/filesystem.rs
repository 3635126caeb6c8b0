// crates/gamelog-store-object/src/filesystem.rs
// ============================================================================
// Module: Filesystem Object Store Client
// Description: Local-directory blob client with atomic no-clobber writes.
// Purpose: Run the event store without cloud storage (dev, single host).
// Dependencies: tempfile
// ============================================================================

//! ## Overview
//! Objects live at `<root>/<key>`. A write goes to a temporary file in the
//! destination directory, is flushed to disk, and is then linked into place
//! only if no file exists there yet; readers never observe partial objects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::client::ObjectStoreClient;
use crate::client::ObjectStoreError;
use crate::client::validate_relative_path;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Object-store client backed by a local directory.
#[derive(Debug, Clone)]
pub struct FilesystemObjectStoreClient {
    /// Root directory holding every object.
    root: PathBuf,
}

impl FilesystemObjectStoreClient {
    /// Opens (creating if needed) a root directory.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when the root cannot be created or is not
    /// a directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ObjectStoreError> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(ObjectStoreError::Invalid("filesystem root must be set".to_string()));
        }
        fs::create_dir_all(&root).map_err(|err| ObjectStoreError::Io(err.to_string()))?;
        if !root.is_dir() {
            return Err(ObjectStoreError::Invalid(format!(
                "filesystem root is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self {
            root,
        })
    }

    /// Resolves an object key to a path under the root.
    fn path_for(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        validate_relative_path(key)?;
        Ok(self.root.join(key))
    }
}

impl ObjectStoreClient for FilesystemObjectStoreClient {
    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), ObjectStoreError> {
        let path = self.path_for(key)?;
        let parent = path
            .parent()
            .ok_or_else(|| ObjectStoreError::Invalid("object key has no parent".to_string()))?;
        fs::create_dir_all(parent).map_err(|err| ObjectStoreError::Io(err.to_string()))?;
        let mut staged =
            NamedTempFile::new_in(parent).map_err(|err| ObjectStoreError::Io(err.to_string()))?;
        staged.write_all(&bytes).map_err(|err| ObjectStoreError::Io(err.to_string()))?;
        staged.as_file().sync_all().map_err(|err| ObjectStoreError::Io(err.to_string()))?;
        staged.persist_noclobber(&path).map_err(|err| {
            if err.error.kind() == ErrorKind::AlreadyExists {
                ObjectStoreError::AlreadyExists(key.to_string())
            } else {
                ObjectStoreError::Io(err.error.to_string())
            }
        })?;
        Ok(())
    }

    fn readiness(&self) -> Result<(), ObjectStoreError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(ObjectStoreError::Io(format!("filesystem root missing: {}", self.root.display())))
        }
    }
}
