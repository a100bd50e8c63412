//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, hyper HTTP/1 connection, Axum router)
//!     → handler.rs (raw head from the wire log, Content-Length bytes of body)
//!     → record.rs (path, method, headers, body)
//!     → RecordSink
//!     → 200 "OK"
//! ```

pub mod handler;
pub mod record;
pub mod server;

pub use handler::{AppState, HandlerError, RESPONSE_BODY};
pub use record::{content_length, header_pairs, LoggedMethod, RequestRecord};
pub use server::{HttpServer, ServerError};
