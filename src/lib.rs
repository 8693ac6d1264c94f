//! shuttlr
//!
//! Batched, pipelined object-transfer client for content-addressed build
//! artifacts. Moves thousands of small objects between a local cache and
//! an S3-compatible store using raw HTTP/1.1 request pipelining over a
//! bounded set of persistent connections.
//!
//! # Features
//!
//! - **Two backends, one contract**: a local-filesystem backend and a
//!   remote object-store backend behind the same [`StorageBackend`] trait
//! - **Pipelined batches**: each worker pipelines up to `batch_size`
//!   signed requests on one connection before reconnecting
//! - **In-crate SigV4 signing**: deterministic, byte-exact request
//!   signatures
//! - **Atomic materialization**: readers never observe a partially
//!   written download
//!
//! # Example
//!
//! ```no_run
//! use shuttlr::{storage, Config, PutRequest};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let backend = storage::from_config(&config)?;
//!
//!     let requests = vec![PutRequest::new("/tmp/a.o", "1f3870be274f6c49")];
//!     backend.put(&requests, &|r| println!("stored {}", r.object_key))?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod s3;
pub mod storage;

mod batch;

// Re-export commonly used types
pub use config::Config;
pub use error::TransferError;
pub use storage::{GetRequest, PutRequest, StorageBackend};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
