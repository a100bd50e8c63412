//! Destinations for request records.

use crate::http::RequestRecord;

/// Where request records go. One instance lives for the whole process and
/// is shared by every connection task.
pub trait RecordSink: Send + Sync {
    fn record(&self, record: &RequestRecord);
}

/// Writes each record as a single INFO event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn record(&self, record: &RequestRecord) {
        tracing::info!(
            target: "request_logger::record",
            path = %record.path,
            method = %record.method,
            headers = %record.header_block(),
            body = %record.body_text(),
            "Request received"
        );
    }
}
