//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http handler
//!     → sink.rs (one record per GET/POST request)
//!     → logging.rs (subscriber: filter + pretty/JSON output)
//!     → stdout
//! ```

pub mod logging;
pub mod sink;

pub use logging::{init_logging, LoggingError};
pub use sink::{RecordSink, TracingSink};
