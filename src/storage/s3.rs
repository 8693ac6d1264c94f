//! Remote object-store backend
//!
//! Thin adapter binding an [`S3Client`] to a bucket behind the
//! [`StorageBackend`] contract.

use super::{GetCallback, GetRequest, PutCallback, PutRequest, StorageBackend};
use crate::error::TransferError;
use crate::s3::S3Client;

/// Serves put/get batches from one bucket of a remote store
pub struct S3StorageBackend {
    client: S3Client,
    bucket: String,
}

impl S3StorageBackend {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl StorageBackend for S3StorageBackend {
    fn put(&self, requests: &[PutRequest], on_success: &PutCallback) -> Result<(), TransferError> {
        self.client.upload_files(&self.bucket, requests, on_success)
    }

    fn get(&self, requests: &[GetRequest], on_success: &GetCallback) -> Result<(), TransferError> {
        self.client
            .download_files(&self.bucket, requests, on_success)
    }
}
