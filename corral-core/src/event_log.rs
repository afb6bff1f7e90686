//! Host event log boundary.

/// Sink for human-readable host events (an audit or application log).
pub trait EventLog: Send + Sync {
    /// Report an informational message under a source label.
    fn report_info(&self, source: &str, message: &str);
}

/// An [`EventLog`] that forwards to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventLog;

impl EventLog for TracingEventLog {
    fn report_info(&self, source: &str, message: &str) {
        tracing::info!(source, "{message}");
    }
}

impl<L: EventLog + ?Sized> EventLog for std::sync::Arc<L> {
    fn report_info(&self, source: &str, message: &str) {
        (**self).report_info(source, message);
    }
}
