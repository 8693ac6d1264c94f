//! Worker-owned transport streams
//!
//! A `Connection` is created for exactly one window, owned by exactly one
//! worker, and dropped once that window's responses are drained. It is a
//! plain TCP stream or a TLS stream over TCP, depending on the endpoint
//! configuration (private path-style deployments typically run without
//! TLS; everything else terminates TLS).

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConnection, StreamOwned};

use crate::error::TransferError;

/// Build the shared TLS client configuration (webpki trust roots).
///
/// Built once per client and shared read-only by all workers.
pub(crate) fn tls_client_config() -> Arc<rustls::ClientConfig> {
    let roots = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.into(),
    };
    Arc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
}

/// A persistent stream carrying one window's pipelined requests
pub(crate) enum Connection {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Connection {
    /// Open a connection to `host:port`, wrapping it in TLS when a client
    /// config is given.
    pub(crate) fn open(
        host: &str,
        port: u16,
        tls: Option<&Arc<rustls::ClientConfig>>,
    ) -> Result<Self, TransferError> {
        let tcp = TcpStream::connect((host, port)).map_err(TransferError::Connection)?;

        match tls {
            None => Ok(Self::Plain(tcp)),
            Some(config) => {
                let server_name = ServerName::try_from(host.to_string())
                    .map_err(|_| TransferError::Endpoint(host.to_string()))?;
                let session = ClientConnection::new(Arc::clone(config), server_name)?;
                Ok(Self::Tls(Box::new(StreamOwned::new(session, tcp))))
            }
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(stream) => stream.read(buf),
            Self::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(stream) => stream.write(buf),
            Self::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(stream) => stream.flush(),
            Self::Tls(stream) => stream.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_refused_port_is_connection_error() {
        // Port 1 on loopback is essentially never listening.
        let result = Connection::open("127.0.0.1", 1, None);
        assert!(matches!(result, Err(TransferError::Connection(_))));
    }

    #[test]
    fn test_tls_config_builds() {
        let config = tls_client_config();
        assert!(Arc::strong_count(&config) >= 1);
    }
}
