//! Request handlers.
//!
//! GET and POST on any path are logged and answered `200 OK`. Every other
//! method is answered `501 Not Implemented` without a record.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use thiserror::Error;

use crate::http::record::{content_length, header_pairs, LoggedMethod, RequestRecord};
use crate::net::WireLog;
use crate::observability::RecordSink;

/// Body of every successful response.
pub const RESPONSE_BODY: &[u8] = b"OK";

/// Cap on up-front allocation; larger bodies grow the buffer as they arrive.
const MAX_PREALLOCATION: usize = 64 * 1024;

/// State shared with handlers.
#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn RecordSink>,
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "Request abandoned");
        StatusCode::BAD_REQUEST.into_response()
    }
}

pub async fn log_get(state: State<AppState>, request: Request) -> Result<Response, HandlerError> {
    log_request(state, LoggedMethod::Get, request).await
}

pub async fn log_post(state: State<AppState>, request: Request) -> Result<Response, HandlerError> {
    log_request(state, LoggedMethod::Post, request).await
}

/// Log the request, then reply `200 OK`.
async fn log_request(
    State(state): State<AppState>,
    method: LoggedMethod,
    request: Request,
) -> Result<Response, HandlerError> {
    let (parts, body) = request.into_parts();
    let target = parts.uri.to_string();

    // Served over a socket, the connection's wire log holds the head as sent.
    let wire = parts.extensions.get::<WireLog>();
    let head = wire.and_then(|wire| wire.take_head(method.as_str(), &target));

    let length = content_length(&parts.headers);
    let body = if length > 0 {
        read_body(body, length).await?
    } else {
        Bytes::new()
    };
    if let Some(wire) = wire {
        wire.skip(body.len());
    }

    let (path, headers) = match head {
        Some(head) => (head.target, head.headers),
        None => (target, header_pairs(&parts.headers)),
    };
    let record = RequestRecord::new(path, method, headers, body);
    state.sink.record(&record);

    Ok(Response::new(Body::from(RESPONSE_BODY)))
}

/// Answer for methods without a handler.
pub async fn not_implemented() -> Response {
    StatusCode::NOT_IMPLEMENTED.into_response()
}

/// Read exactly `length` bytes of the body, or fewer if it ends first.
async fn read_body(body: Body, length: usize) -> Result<Bytes, axum::Error> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::with_capacity(length.min(MAX_PREALLOCATION));

    while buf.len() < length {
        match stream.next().await {
            Some(chunk) => buf.extend_from_slice(&chunk?),
            None => break,
        }
    }
    buf.truncate(length);

    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_body_stops_at_declared_length() {
        let body = read_body(Body::from("hello world"), 5).await.unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn read_body_returns_short_bodies_as_is() {
        let body = read_body(Body::from("hi"), 10).await.unwrap();
        assert_eq!(&body[..], b"hi");
    }
}
