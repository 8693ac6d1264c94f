//! Pipelined HTTP/1.1 response parsing
//!
//! Reads responses off one connection in strict arrival order, which by
//! HTTP pipelining is the order the requests were written. Each parsed
//! response is handed back to the request that produced it by position.
//!
//! Only the shapes an object store produces are handled: a status line,
//! headers, and a body framed by `content-length` or chunked
//! transfer-encoding (error responses from some stores are chunked).

use std::collections::BTreeMap;
use std::io::{self, BufRead, BufReader, Read};

/// One parsed HTTP response
#[derive(Debug)]
pub(crate) struct HttpResponse {
    pub status_line: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Success is exactly this status line; anything else is a transfer
    /// failure regardless of the body.
    pub(crate) fn is_ok(&self) -> bool {
        self.status_line == "HTTP/1.1 200 OK"
    }
}

/// Reads consecutive responses from a pipelined connection
pub(crate) struct ResponseReader<R: Read> {
    inner: BufReader<R>,
}

impl<R: Read> ResponseReader<R> {
    pub(crate) fn new(stream: R) -> Self {
        Self {
            inner: BufReader::new(stream),
        }
    }

    /// Read the next response off the stream, blocking until complete.
    ///
    /// A connection closing anywhere before the response is complete is an
    /// `UnexpectedEof` error, never a shorter response.
    pub(crate) fn read_response(&mut self) -> io::Result<HttpResponse> {
        let status_line = self.require_line("connection closed before status line")?;

        let mut headers = BTreeMap::new();
        loop {
            let line = self.require_line("connection closed inside headers")?;
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        let chunked = headers
            .get("transfer-encoding")
            .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));

        let body = if chunked {
            self.read_chunked_body()?
        } else {
            let length = headers
                .get("content-length")
                .map(|v| {
                    v.parse::<usize>().map_err(|_| {
                        io::Error::new(io::ErrorKind::InvalidData, "bad content-length")
                    })
                })
                .transpose()?
                .unwrap_or(0);
            self.read_exact_body(length)?
        };

        Ok(HttpResponse {
            status_line,
            headers,
            body,
        })
    }

    /// Read a CRLF-terminated line, without the terminator. `None` at EOF,
    /// which is distinct from an empty line.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        let n = self.inner.read_until(b'\n', &mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        while buf.last() == Some(&b'\n') || buf.last() == Some(&b'\r') {
            buf.pop();
        }
        String::from_utf8(buf)
            .map(Some)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "non-utf8 header line"))
    }

    /// Read a line that the protocol requires to exist; EOF here means the
    /// peer closed mid-response.
    fn require_line(&mut self, context: &'static str) -> io::Result<String> {
        self.read_line()?
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, context))
    }

    fn read_exact_body(&mut self, length: usize) -> io::Result<Vec<u8>> {
        let mut body = vec![0u8; length];
        self.inner.read_exact(&mut body)?;
        Ok(body)
    }

    fn read_chunked_body(&mut self) -> io::Result<Vec<u8>> {
        let mut body = Vec::new();
        loop {
            let size_line = self.require_line("connection closed before chunk size")?;
            let size = usize::from_str_radix(size_line.split(';').next().unwrap_or("").trim(), 16)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "bad chunk size"))?;
            if size == 0 {
                // Drain optional trailers up to the final empty line.
                loop {
                    if self.require_line("connection closed inside trailers")?.is_empty() {
                        break;
                    }
                }
                return Ok(body);
            }
            let start = body.len();
            body.resize(start + size, 0);
            self.inner.read_exact(&mut body[start..])?;
            // Chunk data is followed by CRLF.
            self.require_line("connection closed after chunk data")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_single_response() {
        let raw = b"HTTP/1.1 200 OK\r\ncontent-length: 5\r\netag: \"abc\"\r\n\r\nhello";
        let mut reader = ResponseReader::new(Cursor::new(raw.to_vec()));
        let response = reader.read_response().unwrap();
        assert!(response.is_ok());
        assert_eq!(response.headers["etag"], "\"abc\"");
        assert_eq!(response.body, b"hello");
    }

    #[test]
    fn test_parse_pipelined_responses_in_order() {
        let raw = b"HTTP/1.1 200 OK\r\ncontent-length: 3\r\n\r\noneHTTP/1.1 200 OK\r\ncontent-length: 3\r\n\r\ntwo";
        let mut reader = ResponseReader::new(Cursor::new(raw.to_vec()));
        assert_eq!(reader.read_response().unwrap().body, b"one");
        assert_eq!(reader.read_response().unwrap().body, b"two");
    }

    #[test]
    fn test_non_200_status_line() {
        let raw = b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\n\r\n";
        let mut reader = ResponseReader::new(Cursor::new(raw.to_vec()));
        let response = reader.read_response().unwrap();
        assert!(!response.is_ok());
        assert_eq!(response.status_line, "HTTP/1.1 404 Not Found");
    }

    #[test]
    fn test_missing_content_length_means_empty_body() {
        let raw = b"HTTP/1.1 200 OK\r\n\r\n";
        let mut reader = ResponseReader::new(Cursor::new(raw.to_vec()));
        assert!(reader.read_response().unwrap().body.is_empty());
    }

    #[test]
    fn test_chunked_body() {
        let raw = b"HTTP/1.1 403 Forbidden\r\ntransfer-encoding: chunked\r\n\r\n4\r\nwxyz\r\n3\r\nabc\r\n0\r\n\r\n";
        let mut reader = ResponseReader::new(Cursor::new(raw.to_vec()));
        let response = reader.read_response().unwrap();
        assert_eq!(response.body, b"wxyzabc");
    }

    #[test]
    fn test_eof_before_status_line() {
        let mut reader = ResponseReader::new(Cursor::new(Vec::new()));
        let err = reader.read_response().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_eof_after_status_line_is_error() {
        // A close right after the status line must not parse as a
        // successful empty-bodied response.
        let raw = b"HTTP/1.1 200 OK\r\n";
        let mut reader = ResponseReader::new(Cursor::new(raw.to_vec()));
        let err = reader.read_response().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_eof_inside_headers_is_error() {
        let raw = b"HTTP/1.1 200 OK\r\ncontent-length: 5\r\n";
        let mut reader = ResponseReader::new(Cursor::new(raw.to_vec()));
        let err = reader.read_response().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_eof_inside_chunked_body_is_error() {
        let raw = b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n4\r\nwxyz\r\n";
        let mut reader = ResponseReader::new(Cursor::new(raw.to_vec()));
        let err = reader.read_response().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_truncated_body_is_error() {
        let raw = b"HTTP/1.1 200 OK\r\ncontent-length: 10\r\n\r\nshort";
        let mut reader = ResponseReader::new(Cursor::new(raw.to_vec()));
        assert!(reader.read_response().is_err());
    }
}
