//! The per-request record handed to the log sink.
//!
//! A record lives for exactly one request/response cycle: built once the
//! head and body are read, logged, then dropped.

use std::borrow::Cow;
use std::fmt;

use axum::body::Bytes;
use axum::http::{header, HeaderMap};

/// Methods the server answers. Everything else gets 501.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggedMethod {
    Get,
    Post,
}

impl LoggedMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for LoggedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path, method, headers and body of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    /// Request target as received, query included.
    pub path: String,
    pub method: LoggedMethod,
    /// Header pairs in wire order, names in their original case.
    pub headers: Vec<(String, String)>,
    /// Exactly `Content-Length` bytes, or empty.
    pub body: Bytes,
}

impl RequestRecord {
    pub fn new(
        path: String,
        method: LoggedMethod,
        headers: Vec<(String, String)>,
        body: Bytes,
    ) -> Self {
        Self {
            path,
            method,
            headers,
            body,
        }
    }

    /// Render headers as a wire-format block, one `name: value` line each.
    pub fn header_block(&self) -> String {
        let mut block = String::new();
        for (name, value) in &self.headers {
            block.push_str(name);
            block.push_str(": ");
            block.push_str(value);
            block.push('\n');
        }
        block
    }

    /// Body decoded as UTF-8. Invalid sequences become U+FFFD.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// All values of `name`, in received order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for RequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Path: {}", self.path)?;
        writeln!(f, "Method: {}", self.method)?;
        writeln!(f, "Headers: {}", self.header_block())?;
        write!(f, "Body: {}", self.body_text())
    }
}

/// Header pairs from a parsed map, for requests with no captured head.
///
/// Names come out lowercase and repeated names grouped, so this is only a
/// fallback for the wire capture.
pub fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Declared body length. Absent or malformed values count as 0.
pub fn content_length(headers: &HeaderMap) -> usize {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0)
}
