use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use shared::protocol::AnalyticsRecord;
use tracing::debug;

/// Append-only event sink. Pushes are best-effort: implementations must
/// swallow internal failures rather than surface them to callers.
pub trait AnalyticsSink: Send + Sync {
    fn push(&self, record: AnalyticsRecord);

    fn push_named(&self, event: &str, fields: Map<String, Value>) {
        self.push(AnalyticsRecord::new(event, fields));
    }
}

/// In-memory event log, the diagnostic surface for the showcase page:
/// external callers can push named events and read back a snapshot of
/// everything recorded so far.
#[derive(Default)]
pub struct EventLog {
    records: Mutex<Vec<AnalyticsRecord>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<AnalyticsRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AnalyticsSink for EventLog {
    fn push(&self, record: AnalyticsRecord) {
        debug!(event = %record.event, "analytics record");
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

/// Sink that drops every record, for callers that opt out of analytics.
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn push(&self, _record: AnalyticsRecord) {}
}
