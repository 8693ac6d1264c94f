//! Transfer errors
//!
//! One error type covers the whole transfer path: every failure, no matter
//! which worker thread hit it, travels through the same channel back to the
//! joining caller.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by transfer calls
#[derive(Error, Debug)]
pub enum TransferError {
    /// Malformed signing inputs. Unreachable in correct usage.
    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Connection error: {0}")]
    Connection(#[source] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// The store answered something other than `HTTP/1.1 200 OK`.
    #[error("Transfer failed for '{key}': {status}")]
    Transfer { key: String, status: String },

    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to materialize '{path}': {source}")]
    Materialize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot resolve endpoint '{0}'")]
    Endpoint(String),

    #[error("Credentials error: {0}")]
    Credentials(#[from] crate::s3::credentials::CredentialsError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TransferError {
    /// Wrap a local-file failure with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
