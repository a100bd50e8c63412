//! HTTP server setup and the accept loop.
//!
//! # Responsibilities
//! - Create the Axum Router with the logging handler
//! - Wire up the trace layer for access logging
//! - Accept connections and serve each on its own HTTP/1 connection task
//! - Stop accepting when shutdown is signalled

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, MethodRouter},
    Extension, Router,
};
use hyper::server::conn::http1;
use hyper_util::{rt::TokioIo, service::TowerToHyperService};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Instrument, Level};

use crate::config::ServerConfig;
use crate::http::handler::{log_get, log_post, not_implemented, AppState};
use crate::net::{
    ConnectionPermit, ConnectionTracker, Listener, ListenerError, RecordingStream, WireLog,
};
use crate::observability::RecordSink;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// HTTP server that logs every GET and POST it receives.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    connections: ConnectionTracker,
}

impl HttpServer {
    /// Create a new HTTP server writing records to `sink`.
    pub fn new(config: ServerConfig, sink: Arc<dyn RecordSink>) -> Self {
        let router = Self::build_router(AppState { sink });
        Self {
            router,
            config,
            connections: ConnectionTracker::new(),
        }
    }

    /// Build the Axum router with all middleware layers.
    pub(crate) fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", logging_methods())
            .route("/{*path}", logging_methods())
            .fallback(not_implemented)
            .with_state(state)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                    .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
            )
    }

    /// Accept and serve connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr().map_err(ListenerError::Accept)?;
        tracing::info!(address = %addr, "HTTP server starting");

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr, permit)) => self.spawn_connection(stream, peer_addr, permit),
                    Err(ListenerError::Closed) => return Err(ListenerError::Closed.into()),
                    Err(e) => tracing::warn!(error = %e, "Accept failed"),
                },
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream, peer_addr: SocketAddr, permit: ConnectionPermit) {
        let guard = self.connections.track();
        let span = tracing::debug_span!("connection", id = %guard.id(), peer = %peer_addr);
        let wire = WireLog::new();
        let service = TowerToHyperService::new(self.router.clone().layer(Extension(wire.clone())));
        let stream = RecordingStream::new(stream, wire);
        let keep_alive = self.config.listener.keep_alive;

        tokio::spawn(
            async move {
                let _permit = permit;
                let _guard = guard;

                let mut builder = http1::Builder::new();
                builder.keep_alive(keep_alive);
                if let Err(e) = builder
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    tracing::debug!(error = %e, "Connection error");
                }
            }
            .instrument(span),
        );
    }

    /// Handle for observing how many connections are being served.
    pub fn connections(&self) -> ConnectionTracker {
        self.connections.clone()
    }
}

fn logging_methods() -> MethodRouter<AppState> {
    get(log_get)
        .post(log_post)
        .head(not_implemented)
        .fallback(not_implemented)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{LoggedMethod, RequestRecord};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct VecSink(Mutex<Vec<RequestRecord>>);

    impl RecordSink for VecSink {
        fn record(&self, record: &RequestRecord) {
            self.0.lock().unwrap().push(record.clone());
        }
    }

    fn router() -> (Router, Arc<VecSink>) {
        let sink = Arc::new(VecSink::default());
        let router = HttpServer::build_router(AppState { sink: sink.clone() });
        (router, sink)
    }

    #[tokio::test]
    async fn get_is_logged_and_answered_ok() {
        let (router, sink) = router();
        let response = router
            .oneshot(
                Request::get("/health?verbose=1")
                    .header("host", "localhost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("content-type").is_none());
        assert_eq!(&to_bytes(response.into_body(), 16).await.unwrap()[..], b"OK");

        let records = sink.0.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "/health?verbose=1");
        assert_eq!(records[0].method.as_str(), "GET");
        assert_eq!(records[0].header_block(), "host: localhost\n");
        assert_eq!(records[0].method, LoggedMethod::Get);
        assert_eq!(records[0].body_text(), "");
    }

    #[tokio::test]
    async fn post_body_is_cut_at_content_length() {
        let (router, sink) = router();
        let response = router
            .oneshot(
                Request::post("/echo")
                    .header("content-length", "5")
                    .body(Body::from("hello world"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sink.0.lock().unwrap()[0].body_text(), "hello");
    }

    #[tokio::test]
    async fn post_without_content_length_logs_empty_body() {
        let (router, sink) = router();
        router
            .oneshot(Request::post("/").body(Body::from("ignored")).unwrap())
            .await
            .unwrap();

        assert_eq!(sink.0.lock().unwrap()[0].body_text(), "");
    }

    #[tokio::test]
    async fn other_methods_are_not_implemented() {
        for method in ["PUT", "DELETE", "HEAD", "OPTIONS", "PATCH"] {
            let (router, sink) = router();
            let response = router
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri("/anything")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED, "{method}");
            assert!(sink.0.lock().unwrap().is_empty(), "{method}");
        }
    }

    #[tokio::test]
    async fn asterisk_form_gets_not_implemented() {
        let (router, sink) = router();
        let response = router
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("*")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
