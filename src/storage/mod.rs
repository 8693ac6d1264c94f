//! Storage backends
//!
//! The `put`/`get` contract exposed to the rest of the system. Callers
//! build lists of [`PutRequest`]/[`GetRequest`] and stay agnostic of
//! whether a local directory or a remote object store serves them; both
//! backends share the same window-based fan-out and the same
//! callback-once-per-request contract.

use std::path::PathBuf;

use crate::config::{BackendKind, Config};
use crate::error::TransferError;
use crate::s3::credentials::Credentials;
use crate::s3::{S3Client, S3ClientConfig};

pub mod materialize;

mod local;
mod s3;
mod timing;

pub use self::local::LocalStorageBackend;
pub use self::s3::S3StorageBackend;
pub use self::timing::TimedBackend;

/// One object to upload
#[derive(Debug, Clone)]
pub struct PutRequest {
    /// Source file to read
    pub filename: PathBuf,
    /// Destination object key
    pub object_key: String,
    /// Precomputed hex SHA256 of the payload; when absent the payload is
    /// sent unsigned (the server skips its integrity check)
    pub content_hash: Option<String>,
}

impl PutRequest {
    pub fn new(filename: impl Into<PathBuf>, object_key: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            object_key: object_key.into(),
            content_hash: None,
        }
    }

    pub fn with_content_hash(mut self, content_hash: impl Into<String>) -> Self {
        self.content_hash = Some(content_hash.into());
        self
    }
}

/// One object to download
#[derive(Debug, Clone)]
pub struct GetRequest {
    /// Object key to fetch
    pub object_key: String,
    /// Destination path to materialize at
    pub filename: PathBuf,
    /// POSIX permission bits to apply to the materialized file
    pub mode: Option<u32>,
}

impl GetRequest {
    pub fn new(object_key: impl Into<String>, filename: impl Into<PathBuf>) -> Self {
        Self {
            object_key: object_key.into(),
            filename: filename.into(),
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Success callback for uploads. May be invoked concurrently from multiple
/// worker threads; implementations must be safe for concurrent invocation.
pub type PutCallback<'a> = dyn Fn(&PutRequest) + Send + Sync + 'a;

/// Success callback for downloads. Same concurrency contract as
/// [`PutCallback`].
pub type GetCallback<'a> = dyn Fn(&GetRequest) + Send + Sync + 'a;

/// The backend-agnostic transfer contract.
///
/// Each request in a batch is transferred exactly once; its callback fires
/// exactly once on success and not at all past a failure. A failed batch
/// call returns the first error observed at join time, identifying the
/// failing object; callbacks already fired by other workers stand.
pub trait StorageBackend: Send + Sync {
    fn put(&self, requests: &[PutRequest], on_success: &PutCallback) -> Result<(), TransferError>;

    fn get(&self, requests: &[GetRequest], on_success: &GetCallback) -> Result<(), TransferError>;
}

/// Build the configured backend, wrapped in timing instrumentation.
pub fn from_config(config: &Config) -> Result<Box<dyn StorageBackend>, TransferError> {
    match config.backend {
        BackendKind::Local => {
            let local = config
                .local
                .as_ref()
                .ok_or_else(|| TransferError::Config("missing local section".into()))?;
            Ok(Box::new(TimedBackend::new(LocalStorageBackend::new(
                &local.root,
                config.transfer.worker_count,
                config.transfer.batch_size,
            ))))
        }
        BackendKind::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| TransferError::Config("missing s3 section".into()))?;
            let credentials = Credentials::from_config(s3)?;
            let client_config = S3ClientConfig {
                region: s3.region.clone(),
                endpoint: s3.endpoint.clone(),
                port: s3.port,
                tls: s3.tls,
                worker_count: config.transfer.worker_count,
                batch_size: config.transfer.batch_size,
                path_style_hosts: s3.path_style_hosts.clone(),
            };
            Ok(Box::new(TimedBackend::new(S3StorageBackend::new(
                S3Client::new(credentials, client_config),
                &s3.bucket,
            ))))
        }
    }
}
