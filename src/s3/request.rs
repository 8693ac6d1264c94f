//! Signed request framing
//!
//! Builds the raw HTTP/1.1 bytes for a single signed PUT or GET, ready to
//! be pipelined onto a connection. Single request, single response shape
//! only; no redirects, no retries.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::credentials::Credentials;
use super::signer::{self, EMPTY_PAYLOAD_SHA256, UNSIGNED_PAYLOAD};

/// Frame a signed `PUT <object_path>` carrying `body`.
///
/// `content_hash` is the precomputed hex digest of the body; when absent
/// the unsigned-payload sentinel is used and the server skips its
/// integrity check.
pub(crate) fn put_request(
    credentials: &Credentials,
    host: &str,
    region: &str,
    object_path: &str,
    body: &[u8],
    content_hash: Option<&str>,
    timestamp: DateTime<Utc>,
) -> Vec<u8> {
    let mut headers = base_headers(credentials, host);
    headers.insert("content-length".to_string(), body.len().to_string());

    let payload_hash = content_hash.unwrap_or(UNSIGNED_PAYLOAD);
    signer::sign_request(
        credentials,
        "PUT",
        object_path,
        region,
        "s3",
        timestamp,
        payload_hash,
        &mut headers,
    );

    frame("PUT", object_path, &headers, body)
}

/// Frame a signed `GET <object_path>`.
pub(crate) fn get_request(
    credentials: &Credentials,
    host: &str,
    region: &str,
    object_path: &str,
    timestamp: DateTime<Utc>,
) -> Vec<u8> {
    let mut headers = base_headers(credentials, host);
    signer::sign_request(
        credentials,
        "GET",
        object_path,
        region,
        "s3",
        timestamp,
        EMPTY_PAYLOAD_SHA256,
        &mut headers,
    );

    frame("GET", object_path, &headers, &[])
}

fn base_headers(credentials: &Credentials, host: &str) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("host".to_string(), host.to_string());
    if let Some(token) = credentials.session_token() {
        headers.insert("x-amz-security-token".to_string(), token.to_string());
    }
    headers
}

fn frame(method: &str, path: &str, headers: &BTreeMap<String, String>, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(512 + body.len());
    out.extend_from_slice(method.as_bytes());
    out.push(b' ');
    out.extend_from_slice(path.as_bytes());
    out.extend_from_slice(b" HTTP/1.1\r\n");
    for (name, value) in headers {
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}
