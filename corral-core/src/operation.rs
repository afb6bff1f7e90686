//! # External Scheduler Boundary
//!
//! Corral never runs background work itself. It hands an
//! [`OperationCallback`] to a host-provided [`Scheduler`] and records the
//! returned handle in one of two host-owned registries
//! ([`RecurringOperations`], [`OnDemandOperations`]). Whatever the scheduler
//! does afterwards (queueing, retries, cancellation) is outside this crate.

use crate::error::BoxError;
use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// A unit of work the scheduler is executing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    operation: String,
    run_id: u64,
}

impl Job {
    /// Create a job for the named operation.
    pub fn new(operation: impl Into<String>, run_id: u64) -> Self {
        Self {
            operation: operation.into(),
            run_id,
        }
    }

    /// The operation this job belongs to.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Scheduler-assigned run identifier.
    pub fn run_id(&self) -> u64 {
        self.run_id
    }
}

/// Parameters the scheduler passes along with a job.
///
/// Any `Debug + Send + Sync + 'static` type is a directive.
pub trait Directive: Any + Debug + Send + Sync {
    /// Upcast for downcasting to the handler's directive type.
    fn as_any(&self) -> &dyn Any;

    /// Fully-qualified name of the directive type.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Debug + Send + Sync> Directive for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// The directive used by handlers that take no parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyDirective;

/// What the scheduler calls to run an operation.
///
/// The error is the handler's own error value, returned unchanged.
pub type OperationCallback =
    Arc<dyn Fn(&Job, &dyn Directive) -> Result<(), BoxError> + Send + Sync>;

/// A scheduler-side handle to a registered operation.
pub trait OperationHandle: Send + Sync + Debug {
    /// The registered operation name.
    fn name(&self) -> &str;

    /// Ask the scheduler to run the operation once with the given directive.
    fn trigger(&self, directive: Box<dyn Directive>) -> Result<(), BoxError>;
}

/// The host's job-queue engine.
pub trait Scheduler: Send + Sync {
    /// Register an operation the scheduler runs every `interval`.
    fn start_recurring(
        &self,
        name: &str,
        interval: Duration,
        callback: OperationCallback,
    ) -> Result<Arc<dyn OperationHandle>, BoxError>;

    /// Register an operation that only runs when triggered.
    fn create_on_demand(
        &self,
        name: &str,
        callback: OperationCallback,
    ) -> Result<Arc<dyn OperationHandle>, BoxError>;
}

/// A recurring operation and its interval.
#[derive(Debug, Clone)]
pub struct RecurringOperation {
    /// Scheduler handle.
    pub handle: Arc<dyn OperationHandle>,
    /// Time between runs.
    pub interval: Duration,
}

/// Host-owned operations keyed by name.
///
/// Names are the host's responsibility; registering an existing name
/// replaces the previous entry.
pub struct OperationRegistry<T> {
    entries: RwLock<BTreeMap<String, T>>,
}

/// Registry of recurring operations.
pub type RecurringOperations = OperationRegistry<RecurringOperation>;

/// Registry of on-demand operations.
pub type OnDemandOperations = OperationRegistry<Arc<dyn OperationHandle>>;

impl<T: Clone> OperationRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Look up an operation.
    pub fn get(&self, name: &str) -> Option<T> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// `true` if an operation with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, name: &str, entry: T) -> Option<T> {
        let previous = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), entry);

        if previous.is_some() {
            tracing::warn!(operation = name, "replacing registered operation");
        }
        previous
    }
}

impl OperationRegistry<RecurringOperation> {
    /// Record a recurring operation.
    pub fn add(
        &self,
        name: &str,
        handle: Arc<dyn OperationHandle>,
        interval: Duration,
    ) -> Option<RecurringOperation> {
        self.insert(name, RecurringOperation { handle, interval })
    }
}

impl OperationRegistry<Arc<dyn OperationHandle>> {
    /// Record an on-demand operation.
    pub fn add(
        &self,
        name: &str,
        handle: Arc<dyn OperationHandle>,
    ) -> Option<Arc<dyn OperationHandle>> {
        self.insert(name, handle)
    }
}

impl<T: Clone> Default for OperationRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for OperationRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_map().entries(entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Handle(&'static str);

    impl OperationHandle for Handle {
        fn name(&self) -> &str {
            self.0
        }

        fn trigger(&self, _directive: Box<dyn Directive>) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[test]
    fn directive_downcasts_to_concrete_type() {
        let directive: &dyn Directive = &EmptyDirective;
        let any = directive.as_any();
        assert!(any.downcast_ref::<EmptyDirective>().is_some());
        assert!(directive.type_name().ends_with("EmptyDirective"));
    }

    #[test]
    fn recurring_registry_keeps_interval() {
        let registry = RecurringOperations::new();
        let interval = Duration::from_secs(600);
        registry.add("Cleanup", Arc::new(Handle("Cleanup")), interval);

        let op = registry.get("Cleanup").expect("registered");
        assert_eq!(op.interval, Duration::from_secs(600));
        assert_eq!(op.handle.name(), "Cleanup");
        assert!(registry.get("Other").is_none());
    }

    #[test]
    fn duplicate_name_replaces_entry() {
        let registry = OnDemandOperations::new();
        assert!(registry.add("Reindex", Arc::new(Handle("a"))).is_none());
        assert!(registry.add("Reindex", Arc::new(Handle("b"))).is_some());
        assert_eq!(registry.len(), 1);
        let name = registry.get("Reindex").map(|h| h.name().to_owned());
        assert_eq!(name.as_deref(), Some("b"));
    }
}
