//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, connection limit)
//!     → connection.rs (id, live-connection count)
//!     → capture.rs (copy of every byte read, for raw request heads)
//!     → Hand off to HTTP layer
//! ```

pub mod capture;
pub mod connection;
pub mod listener;

pub use capture::{RawHead, RecordingStream, WireLog};
pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{ConnectionPermit, Listener, ListenerError};
