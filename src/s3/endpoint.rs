//! Endpoint resolution
//!
//! Maps a logical region name to a connectable host and decides how the
//! bucket is encoded into requests. Pure lookup, no network I/O.
//!
//! Rules:
//! - `us-east-1` uses the global virtual-hosted form `bucket.s3.amazonaws.com`.
//! - A region listed in the injected path-style host table (private,
//!   self-hosted deployments) connects to that host and prefixes object
//!   paths with `bucket/`.
//! - Any other region falls back to the regional virtual-hosted form
//!   `bucket.s3-{region}.amazonaws.com`.

use std::collections::HashMap;

/// How the bucket name is encoded into a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingStyle {
    /// Bucket is part of the host name; object path is `/<key>`
    VirtualHosted,
    /// Bucket is part of the URL path; object path is `/<bucket>/<key>`
    PathStyle,
}

/// A resolved endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub addressing: AddressingStyle,
}

impl Endpoint {
    /// Resolve a (region, bucket) pair against a configured path-style
    /// host table.
    pub fn resolve(region: &str, bucket: &str, path_style_hosts: &HashMap<String, String>) -> Self {
        if let Some(host) = path_style_hosts.get(region) {
            return Self {
                host: host.clone(),
                addressing: AddressingStyle::PathStyle,
            };
        }

        if region == "us-east-1" {
            Self {
                host: format!("{}.s3.amazonaws.com", bucket),
                addressing: AddressingStyle::VirtualHosted,
            }
        } else {
            Self {
                host: format!("{}.s3-{}.amazonaws.com", bucket, region),
                addressing: AddressingStyle::VirtualHosted,
            }
        }
    }

    /// The request path for an object, per addressing style.
    pub fn object_path(&self, bucket: &str, object_key: &str) -> String {
        match self.addressing {
            AddressingStyle::VirtualHosted => format!("/{}", object_key),
            AddressingStyle::PathStyle => format!("/{}/{}", bucket, object_key),
        }
    }
}
