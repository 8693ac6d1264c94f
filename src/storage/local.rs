//! Local-filesystem backend
//!
//! Mirrors the remote client's worker-pool batching, but reads and writes
//! a local root directory instead of issuing HTTP. Exists so callers can
//! swap backends without changing call sites, and so the batch fan-out can
//! be tested without a network.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::materialize::materialize;
use super::{GetCallback, GetRequest, PutCallback, PutRequest, StorageBackend};
use crate::batch;
use crate::error::TransferError;

/// Stores objects as files at `root/<object_key>`
pub struct LocalStorageBackend {
    root: PathBuf,
    worker_count: usize,
    batch_size: usize,
}

impl LocalStorageBackend {
    pub fn new(root: impl Into<PathBuf>, worker_count: usize, batch_size: usize) -> Self {
        Self {
            root: root.into(),
            worker_count,
            batch_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, object_key: &str) -> PathBuf {
        self.root.join(object_key)
    }
}

impl StorageBackend for LocalStorageBackend {
    fn put(&self, requests: &[PutRequest], on_success: &PutCallback) -> Result<(), TransferError> {
        fs::create_dir_all(&self.root).map_err(|e| TransferError::io(&self.root, e))?;

        batch::run_windows(
            requests.len(),
            self.worker_count,
            self.batch_size,
            |worker, window| {
                debug!(worker, count = window.len(), "local put window");
                for &idx in window {
                    let req = &requests[idx];
                    let contents =
                        fs::read(&req.filename).map_err(|e| TransferError::io(&req.filename, e))?;
                    let dst = self.object_path(&req.object_key);
                    fs::write(&dst, contents).map_err(|e| TransferError::io(&dst, e))?;
                    on_success(req);
                }
                Ok(())
            },
        )
    }

    fn get(&self, requests: &[GetRequest], on_success: &GetCallback) -> Result<(), TransferError> {
        batch::run_windows(
            requests.len(),
            self.worker_count,
            self.batch_size,
            |worker, window| {
                debug!(worker, count = window.len(), "local get window");
                for &idx in window {
                    let req = &requests[idx];
                    let src = self.object_path(&req.object_key);
                    let contents = fs::read(&src).map_err(|e| TransferError::io(&src, e))?;
                    materialize(&contents, &req.filename, req.mode)?;
                    on_success(req);
                }
                Ok(())
            },
        )
    }
}
