//! Request logger library.
//!
//! An HTTP server that logs the path, method, headers and body of every
//! GET and POST it receives and answers each with `200 OK`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ServerConfig;
pub use http::{HttpServer, RequestRecord};
pub use lifecycle::Shutdown;
pub use observability::{RecordSink, TracingSink};
