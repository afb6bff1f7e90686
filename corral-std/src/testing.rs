//! Testing utilities for Corral.
//!
//! In-memory stand-ins for the host services a dispatcher talks to.
//!
//! # Features
//!
//! - [`RecordingScheduler`]: A scheduler that records registrations and runs callbacks on request
//! - [`MemoryEventLog`]: An event log that keeps every entry in memory

use corral_core::{
    BoxError, Directive, EventLog, Job, OperationCallback, OperationHandle, Scheduler,
};
use std::{
    collections::HashSet,
    fmt,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

// ============================================================================
// Recording Scheduler
// ============================================================================

/// An operation registered with a [`RecordingScheduler`].
#[derive(Clone)]
pub struct RecordedOperation {
    /// The operation name.
    pub name: String,
    /// The interval for recurring operations, `None` for on-demand ones.
    pub interval: Option<Duration>,
    /// The callback the dispatcher handed over.
    pub callback: OperationCallback,
}

impl fmt::Debug for RecordedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordedOperation")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// A scheduler that records every registration and never runs anything on
/// its own.
///
/// # Example
///
/// ```rust,ignore
/// let scheduler = Arc::new(RecordingScheduler::new());
/// // ...dispatch against it...
/// scheduler.run("Cleanup", &EmptyDirective)?;
/// ```
#[derive(Clone, Default)]
pub struct RecordingScheduler {
    operations: Arc<Mutex<Vec<RecordedOperation>>>,
    refused: Arc<Mutex<HashSet<String>>>,
    runs: Arc<AtomicU64>,
}

impl RecordingScheduler {
    /// Create a scheduler with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse registrations of `name` from now on.
    pub fn fail_on(&self, name: impl Into<String>) {
        self.refused
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into());
    }

    /// Everything registered so far, in registration order.
    pub fn operations(&self) -> Vec<RecordedOperation> {
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The last registration of `name`.
    pub fn operation(&self, name: &str) -> Option<RecordedOperation> {
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|op| op.name == name)
            .cloned()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|op| op.name.clone())
            .collect()
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the callback registered as `name` once, like the scheduler's
    /// worker would.
    pub fn run(&self, name: &str, directive: &dyn Directive) -> Result<(), BoxError> {
        let operation = self
            .operation(name)
            .ok_or_else(|| format!("no operation named `{name}`"))?;
        let job = Job::new(name, self.runs.fetch_add(1, Ordering::SeqCst) + 1);
        (operation.callback)(&job, directive)
    }

    fn record(
        &self,
        name: &str,
        interval: Option<Duration>,
        callback: OperationCallback,
    ) -> Result<Arc<dyn OperationHandle>, BoxError> {
        if self
            .refused
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
        {
            return Err(format!("operation `{name}` refused").into());
        }

        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedOperation {
                name: name.to_owned(),
                interval,
                callback: Arc::clone(&callback),
            });

        Ok(Arc::new(RecordedHandle {
            name: name.to_owned(),
            callback,
            runs: Arc::clone(&self.runs),
        }))
    }
}

impl fmt::Debug for RecordingScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingScheduler")
            .field("operations", &self.names())
            .finish_non_exhaustive()
    }
}

impl Scheduler for RecordingScheduler {
    fn start_recurring(
        &self,
        name: &str,
        interval: Duration,
        callback: OperationCallback,
    ) -> Result<Arc<dyn OperationHandle>, BoxError> {
        self.record(name, Some(interval), callback)
    }

    fn create_on_demand(
        &self,
        name: &str,
        callback: OperationCallback,
    ) -> Result<Arc<dyn OperationHandle>, BoxError> {
        self.record(name, None, callback)
    }
}

struct RecordedHandle {
    name: String,
    callback: OperationCallback,
    runs: Arc<AtomicU64>,
}

impl fmt::Debug for RecordedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordedHandle").field(&self.name).finish()
    }
}

impl OperationHandle for RecordedHandle {
    fn name(&self) -> &str {
        &self.name
    }

    /// Runs the callback synchronously on the calling thread.
    fn trigger(&self, directive: Box<dyn Directive>) -> Result<(), BoxError> {
        let job = Job::new(
            self.name.as_str(),
            self.runs.fetch_add(1, Ordering::SeqCst) + 1,
        );
        (self.callback)(&job, &*directive)
    }
}

// ============================================================================
// Memory Event Log
// ============================================================================

/// An event log that keeps `(source, message)` pairs in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventLog {
    entries: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemoryEventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reported entry, oldest first.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventLog for MemoryEventLog {
    fn report_info(&self, source: &str, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((source.to_owned(), message.to_owned()));
    }
}
