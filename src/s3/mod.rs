//! Object-store client
//!
//! Moves batches of small objects to and from an S3-compatible store with
//! raw HTTP/1.1 request pipelining over a bounded set of persistent
//! connections.
//!
//! # Design
//!
//! - A batch call spins up a fresh set of worker threads (at most
//!   `worker_count`, never more than there are requests) and joins all of
//!   them before returning.
//! - Requests are partitioned into windows of `worker_count * batch_size`;
//!   within a window, request `i` goes to worker `i % worker_count`.
//! - Per window a worker opens one fresh connection, signs and pipelines
//!   its requests, then drains responses in send order. Reconnecting at
//!   every window boundary bounds the blast radius of a dead connection to
//!   `batch_size` requests.
//! - Every worker reports its outcome through its join handle; the first
//!   failure fails the whole call. Workers that already finished may have
//!   fired their callbacks by then.
//!
//! # Example
//!
//! ```no_run
//! use shuttlr::s3::{S3Client, S3ClientConfig};
//! use shuttlr::s3::credentials::Credentials;
//! use shuttlr::storage::PutRequest;
//!
//! # fn main() -> Result<(), shuttlr::TransferError> {
//! let credentials = Credentials::from_env()?;
//! let client = S3Client::new(credentials, S3ClientConfig::default());
//!
//! let requests = vec![PutRequest::new("/tmp/a.o", "1f3870be274f6c49")];
//! client.upload_files("artifacts", &requests, |r| {
//!     println!("uploaded {}", r.object_key);
//! })?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

pub mod credentials;
pub mod endpoint;
pub mod signer;

mod connection;
mod request;
mod response;

use crate::batch;
use crate::error::TransferError;
use crate::storage::materialize::materialize;
use crate::storage::{GetRequest, PutRequest};
use connection::Connection;
use credentials::Credentials;
use endpoint::Endpoint;
use response::ResponseReader;

/// Client configuration
#[derive(Debug, Clone)]
pub struct S3ClientConfig {
    pub region: String,
    /// Explicit host override; replaces the resolved host but not the
    /// region-derived addressing style
    pub endpoint: Option<String>,
    pub port: u16,
    pub tls: bool,
    pub worker_count: usize,
    pub batch_size: usize,
    /// Region name -> host for private path-style deployments
    pub path_style_hosts: HashMap<String, String>,
}

impl Default for S3ClientConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            port: 443,
            tls: true,
            worker_count: 32,
            batch_size: 32,
            path_style_hosts: HashMap::new(),
        }
    }
}

/// Batched, pipelined object-store client
pub struct S3Client {
    credentials: Credentials,
    config: S3ClientConfig,
    tls: Option<Arc<rustls::ClientConfig>>,
}

impl S3Client {
    /// Create a new client. The TLS configuration is built once and shared
    /// read-only by all workers.
    pub fn new(credentials: Credentials, config: S3ClientConfig) -> Self {
        let tls = config.tls.then(connection::tls_client_config);
        Self {
            credentials,
            config,
            tls,
        }
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    /// The endpoint a bucket resolves to under this client's configuration.
    pub fn endpoint_for(&self, bucket: &str) -> Endpoint {
        let mut endpoint =
            Endpoint::resolve(&self.config.region, bucket, &self.config.path_style_hosts);
        if let Some(host) = &self.config.endpoint {
            endpoint.host = host.clone();
        }
        endpoint
    }

    /// Download a single object, blocking until the body is written to
    /// `filename`.
    pub fn download_file(
        &self,
        bucket: &str,
        object_key: &str,
        filename: &Path,
    ) -> Result<(), TransferError> {
        let endpoint = self.endpoint_for(bucket);
        let mut conn = Connection::open(&endpoint.host, self.config.port, self.tls.as_ref())?;

        let bytes = request::get_request(
            &self.credentials,
            &endpoint.host,
            &self.config.region,
            &endpoint.object_path(bucket, object_key),
            Utc::now(),
        );
        conn.write_all(&bytes).map_err(TransferError::Connection)?;
        conn.flush().map_err(TransferError::Connection)?;

        let mut reader = ResponseReader::new(conn);
        let response = reader.read_response().map_err(TransferError::Connection)?;
        if !response.is_ok() {
            return Err(TransferError::Transfer {
                key: object_key.to_string(),
                status: response.status_line,
            });
        }

        fs::write(filename, &response.body).map_err(|e| TransferError::io(filename, e))?;
        debug!(key = object_key, bytes = response.body.len(), "downloaded");
        Ok(())
    }

    /// Upload a batch of files.
    ///
    /// `on_success` fires exactly once per request after its 200 response
    /// is parsed, and may be invoked concurrently from multiple worker
    /// threads. On failure the call returns the first error; callbacks
    /// already fired by other workers stand.
    pub fn upload_files<F>(
        &self,
        bucket: &str,
        requests: &[PutRequest],
        on_success: F,
    ) -> Result<(), TransferError>
    where
        F: Fn(&PutRequest) + Send + Sync,
    {
        let endpoint = self.endpoint_for(bucket);
        batch::run_windows(
            requests.len(),
            self.config.worker_count,
            self.config.batch_size,
            |worker, window| self.upload_window(&endpoint, bucket, requests, worker, window, &on_success),
        )?;
        info!(bucket, count = requests.len(), "upload batch complete");
        Ok(())
    }

    /// Download a batch of objects, atomically materializing each at its
    /// destination path. Same callback contract as [`upload_files`].
    ///
    /// [`upload_files`]: S3Client::upload_files
    pub fn download_files<F>(
        &self,
        bucket: &str,
        requests: &[GetRequest],
        on_success: F,
    ) -> Result<(), TransferError>
    where
        F: Fn(&GetRequest) + Send + Sync,
    {
        let endpoint = self.endpoint_for(bucket);
        batch::run_windows(
            requests.len(),
            self.config.worker_count,
            self.config.batch_size,
            |worker, window| {
                self.download_window(&endpoint, bucket, requests, worker, window, &on_success)
            },
        )?;
        info!(bucket, count = requests.len(), "download batch complete");
        Ok(())
    }

    /// Pipeline one window of PUTs on a fresh connection and drain the
    /// responses in send order.
    fn upload_window<F>(
        &self,
        endpoint: &Endpoint,
        bucket: &str,
        requests: &[PutRequest],
        worker: usize,
        window: &[usize],
        on_success: &F,
    ) -> Result<(), TransferError>
    where
        F: Fn(&PutRequest) + Send + Sync,
    {
        debug!(worker, pipelined = window.len(), "opening upload window");
        let mut conn = Connection::open(&endpoint.host, self.config.port, self.tls.as_ref())?;

        for &idx in window {
            let req = &requests[idx];
            let body =
                fs::read(&req.filename).map_err(|e| TransferError::io(&req.filename, e))?;
            let bytes = request::put_request(
                &self.credentials,
                &endpoint.host,
                &self.config.region,
                &endpoint.object_path(bucket, &req.object_key),
                &body,
                req.content_hash.as_deref(),
                Utc::now(),
            );
            conn.write_all(&bytes).map_err(TransferError::Connection)?;
        }
        conn.flush().map_err(TransferError::Connection)?;

        let mut reader = ResponseReader::new(conn);
        for &idx in window {
            let response = reader.read_response().map_err(TransferError::Connection)?;
            if !response.is_ok() {
                return Err(TransferError::Transfer {
                    key: requests[idx].object_key.clone(),
                    status: response.status_line,
                });
            }
            on_success(&requests[idx]);
        }
        Ok(())
    }

    /// Pipeline one window of GETs; materialize each 200 body atomically.
    fn download_window<F>(
        &self,
        endpoint: &Endpoint,
        bucket: &str,
        requests: &[GetRequest],
        worker: usize,
        window: &[usize],
        on_success: &F,
    ) -> Result<(), TransferError>
    where
        F: Fn(&GetRequest) + Send + Sync,
    {
        debug!(worker, pipelined = window.len(), "opening download window");
        let mut conn = Connection::open(&endpoint.host, self.config.port, self.tls.as_ref())?;

        for &idx in window {
            let bytes = request::get_request(
                &self.credentials,
                &endpoint.host,
                &self.config.region,
                &endpoint.object_path(bucket, &requests[idx].object_key),
                Utc::now(),
            );
            conn.write_all(&bytes).map_err(TransferError::Connection)?;
        }
        conn.flush().map_err(TransferError::Connection)?;

        let mut reader = ResponseReader::new(conn);
        for &idx in window {
            let response = reader.read_response().map_err(TransferError::Connection)?;
            let req = &requests[idx];
            if !response.is_ok() {
                return Err(TransferError::Transfer {
                    key: req.object_key.clone(),
                    status: response.status_line,
                });
            }
            materialize(&response.body, &req.filename, req.mode)?;
            on_success(req);
        }
        Ok(())
    }
}
