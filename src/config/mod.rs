//! Configuration module for shuttlr
//!
//! Handles loading and parsing of YAML configuration files with support for
//! environment variable expansion and validation. The configuration decides
//! which storage backend serves transfers and how the batch engine is tuned.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendKind,
    #[serde(default)]
    pub s3: Option<S3Config>,
    #[serde(default)]
    pub local: Option<LocalConfig>,
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Which storage backend serves put/get calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    S3,
}

/// Batch engine tuning shared by both backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Worker threads spun up per batch call
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Requests one worker pipelines on a single connection before
    /// reconnecting
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_worker_count() -> usize {
    32
}

fn default_batch_size() -> usize {
    32
}

/// Remote object-store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Explicit host override; replaces the resolved endpoint host but not
    /// the region-derived addressing style
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_tls")]
    pub tls: bool,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
    /// Region name -> host for private path-style deployments. Object keys
    /// sent to these hosts are prefixed with `bucket/`.
    #[serde(default)]
    pub path_style_hosts: HashMap<String, String>,
}

fn default_port() -> u16 {
    443
}

fn default_tls() -> bool {
    true
}

/// Local-filesystem backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Root directory; objects live at `root/<object_key>`
    pub root: PathBuf,
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        ConfigLoader::load(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            BackendKind::S3 => {
                let s3 = self.s3.as_ref().ok_or_else(|| {
                    ConfigError::ValidationError("backend is 's3' but no s3 section given".into())
                })?;
                if s3.bucket.is_empty() {
                    return Err(ConfigError::ValidationError("bucket cannot be empty".into()));
                }
                if s3.region.is_empty() {
                    return Err(ConfigError::ValidationError("region cannot be empty".into()));
                }
            }
            BackendKind::Local => {
                let local = self.local.as_ref().ok_or_else(|| {
                    ConfigError::ValidationError(
                        "backend is 'local' but no local section given".into(),
                    )
                })?;
                if local.root.as_os_str().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "local root cannot be empty".into(),
                    ));
                }
            }
        }

        if self.transfer.worker_count == 0 {
            return Err(ConfigError::ValidationError(
                "worker_count must be at least 1".into(),
            ));
        }
        if self.transfer.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "batch_size must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
