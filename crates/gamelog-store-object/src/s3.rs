// crates/gamelog-store-object/src/s3.rs
// ============================================================================
// Module: S3 Object Store Client
// Description: S3-compatible blob client driven from synchronous callers.
// Purpose: Persist event objects to AWS S3, MinIO, or compatible services.
// Dependencies: aws-config, aws-sdk-s3, tokio
// ============================================================================

//! ## Overview
//! [`S3ObjectStoreClient`] owns a private Tokio runtime so the synchronous
//! [`ObjectStoreClient`] API can be called from both plain threads and async
//! handlers. Writes use `If-None-Match: *` so an existing object is never
//! replaced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use tokio::runtime::Handle;
use tokio::runtime::Runtime;
use tokio::runtime::RuntimeFlavor;

use crate::client::ObjectStoreClient;
use crate::client::ObjectStoreError;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// HTTP status returned when a conditional write finds an existing object.
const PRECONDITION_FAILED: u16 = 412;

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    /// Bucket name.
    pub bucket: String,
    /// Optional region override; falls back to the AWS environment chain.
    pub region: Option<String>,
    /// Optional custom endpoint (e.g. a MinIO URL).
    pub endpoint: Option<String>,
    /// Use path-style addressing instead of virtual-hosted buckets.
    pub force_path_style: bool,
}

// ============================================================================
// SECTION: Runtime Helpers
// ============================================================================

/// Blocks on an object-store future using a compatible runtime.
fn block_on_with_runtime<F, T>(runtime: &Runtime, future: F) -> Result<T, ObjectStoreError>
where
    F: Future<Output = Result<T, ObjectStoreError>> + Send + 'static,
    T: Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) if matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) => {
            tokio::task::block_in_place(|| handle.block_on(future))
        }
        Ok(_) => {
            // Current-thread runtimes cannot block in place; drive on a helper thread.
            let (tx, rx) = std::sync::mpsc::sync_channel(1);
            std::thread::spawn(move || {
                let result = Runtime::new()
                    .map_err(|err| ObjectStoreError::Io(err.to_string()))
                    .and_then(|runtime| runtime.block_on(future));
                let _ = tx.send(result);
            });
            rx.recv().unwrap_or_else(|_| {
                Err(ObjectStoreError::Io("object store worker thread failed".to_string()))
            })
        }
        Err(_) => runtime.block_on(future),
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// S3-backed object-store client.
pub struct S3ObjectStoreClient {
    /// Underlying S3 client.
    client: Client,
    /// Bucket name.
    bucket: String,
    /// Tokio runtime for blocking S3 operations.
    runtime: Option<Arc<Runtime>>,
}

impl Drop for S3ObjectStoreClient {
    fn drop(&mut self) {
        // Dropping a runtime inside async context panics; release it elsewhere.
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl S3ObjectStoreClient {
    /// Builds a client for the given bucket settings.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when settings are invalid or the runtime
    /// cannot be created.
    pub fn new(settings: &S3Settings) -> Result<Self, ObjectStoreError> {
        if settings.bucket.trim().is_empty() {
            return Err(ObjectStoreError::Invalid("bucket must be set".to_string()));
        }
        let runtime = Runtime::new().map_err(|err| ObjectStoreError::Io(err.to_string()))?;
        let region = settings.region.clone();
        let endpoint = settings.endpoint.clone();
        let shared_config = block_on_with_runtime(&runtime, async {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(Region::new(region));
            }
            if let Some(endpoint) = endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            Ok(loader.load().await)
        })?;
        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if settings.force_path_style {
            s3_builder = s3_builder.force_path_style(true);
        }
        Ok(Self {
            client: Client::from_conf(s3_builder.build()),
            bucket: settings.bucket.clone(),
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// Returns the runtime or an error if shut down.
    fn runtime(&self) -> Result<&Runtime, ObjectStoreError> {
        self.runtime
            .as_ref()
            .map(AsRef::as_ref)
            .ok_or_else(|| ObjectStoreError::Io("object store runtime closed".to_string()))
    }
}

impl ObjectStoreClient for S3ObjectStoreClient {
    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), ObjectStoreError> {
        let bucket = self.bucket.clone();
        let key = key.to_string();
        let client = self.client.clone();
        let content_type = content_type.map(str::to_string);
        block_on_with_runtime(self.runtime()?, async move {
            let mut request = client
                .put_object()
                .bucket(bucket)
                .key(key.clone())
                .if_none_match("*")
                .body(ByteStream::from(bytes));
            if let Some(content_type) = content_type {
                request = request.content_type(content_type);
            }
            match request.send().await {
                Ok(_) => Ok(()),
                Err(err) => {
                    let status = err.raw_response().map(|response| response.status().as_u16());
                    if status == Some(PRECONDITION_FAILED) {
                        Err(ObjectStoreError::AlreadyExists(key))
                    } else {
                        Err(ObjectStoreError::Backend(err.to_string()))
                    }
                }
            }
        })
    }

    fn readiness(&self) -> Result<(), ObjectStoreError> {
        let bucket = self.bucket.clone();
        let client = self.client.clone();
        block_on_with_runtime(self.runtime()?, async move {
            client
                .head_bucket()
                .bucket(bucket)
                .send()
                .await
                .map_err(|err| ObjectStoreError::Backend(err.to_string()))?;
            Ok(())
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
