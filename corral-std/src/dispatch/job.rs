//! Background task dispatch.

use crate::catalog::{Discovered, HandlerCatalog, JobEntry};
use crate::host::JobHost;
use corral_core::{
    ConfigNode, ConfigTreeResolver, Directive, DispatchError, Dispatcher, Job, OperationCallback,
    Schedule,
};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Where a [`JobDispatcher`] is in its dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Nothing dispatched yet.
    Idle,
    /// Scanning modules for background tasks.
    Discovering,
    /// Registering discovered tasks with the scheduler.
    Registering,
    /// The last cycle finished (successfully or not).
    Done,
}

/// The handler types registered by one dispatch cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registrations {
    /// Fully-qualified names of recurring task types.
    pub recurring: Vec<&'static str>,
    /// Fully-qualified names of on-demand task types.
    pub on_demand: Vec<&'static str>,
}

impl Registrations {
    /// `true` if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.recurring.is_empty() && self.on_demand.is_empty()
    }

    /// The event-log message describing the cycle.
    ///
    /// Each non-empty category is a label line followed by a JSON array of
    /// type names.
    pub fn summary(&self) -> String {
        let mut message = String::new();
        section(
            &mut message,
            "Recurring background operation types:",
            &self.recurring,
        );
        section(
            &mut message,
            "On-demand background operation types:",
            &self.on_demand,
        );
        message
    }
}

fn section(message: &mut String, label: &str, names: &[&'static str]) {
    if names.is_empty() {
        return;
    }
    let listing = serde_json::to_string_pretty(names).unwrap_or_else(|_| format!("{names:?}"));
    message.push_str(label);
    message.push('\n');
    message.push_str(&listing);
    message.push('\n');
}

/// Registers discovered background tasks with the host's scheduler.
///
/// Tasks are not run at dispatch time. Each registration hands the
/// scheduler a callback that, on every run, reads the current configuration,
/// resolves the task's slice, builds a fresh task instance and calls it.
///
/// # Example
/// ```ignore
/// let host = JobHost::builder("Billing", config, vault, scheduler).build();
/// let dispatcher = JobDispatcher::new(host, HandlerCatalog::with_module(module));
/// let registered = dispatcher.dispatch()?;
/// ```
pub struct JobDispatcher<C, V> {
    host: JobHost<C, V>,
    catalog: HandlerCatalog<V>,
    resolver: ConfigTreeResolver,
    phase: Mutex<JobPhase>,
}

impl<C, V> JobDispatcher<C, V>
where
    C: ConfigNode,
    V: Send + Sync + 'static,
{
    /// Create a dispatcher for `host` scanning `catalog`.
    pub fn new(host: JobHost<C, V>, catalog: HandlerCatalog<V>) -> Self {
        Self {
            host,
            catalog,
            resolver: ConfigTreeResolver::new(),
            phase: Mutex::new(JobPhase::Idle),
        }
    }

    /// Use a custom configuration resolver.
    pub fn with_resolver(mut self, resolver: ConfigTreeResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// The host services.
    pub fn host(&self) -> &JobHost<C, V> {
        &self.host
    }

    /// The catalog being scanned.
    pub fn catalog(&self) -> &HandlerCatalog<V> {
        &self.catalog
    }

    /// The current phase.
    pub fn phase(&self) -> JobPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, phase: JobPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
        tracing::debug!(host = self.host.name(), ?phase, "job dispatch phase");
    }

    fn run(&self) -> Result<Registrations, DispatchError> {
        self.enter(JobPhase::Discovering);
        let jobs = self.catalog.jobs();
        if jobs.is_empty() {
            tracing::debug!(host = self.host.name(), "no background tasks discovered");
            return Ok(Registrations::default());
        }

        self.enter(JobPhase::Registering);
        let mut registered = Registrations::default();
        for job in &jobs {
            self.register(job, &mut registered)?;
        }

        self.host.event_log().report_info(
            &format!("{} - BackgroundOperations", self.host.name()),
            &registered.summary(),
        );
        tracing::info!(
            host = self.host.name(),
            recurring = registered.recurring.len(),
            on_demand = registered.on_demand.len(),
            "registered background operations"
        );

        Ok(registered)
    }

    fn register(
        &self,
        job: &Discovered<JobEntry<V>>,
        registered: &mut Registrations,
    ) -> Result<(), DispatchError> {
        let descriptor = job.descriptor();
        let operation = descriptor.operation();

        let config = self.host.config().current();
        let slice = self.resolver.resolve(&*config, descriptor.config_type());
        if slice.is_none() {
            tracing::debug!(
                handler = descriptor.type_name(),
                config = descriptor.config_type_name(),
                "no configuration slice, binding none"
            );
        }

        job.entry()
            .probe(slice, self.host.services())
            .map_err(|source| DispatchError::Construction {
                handler: descriptor.type_name(),
                source,
            })?;

        let callback = self.callback(job);
        let scheduler = self.host.scheduler();
        let rejected = |source| DispatchError::Scheduler { operation, source };

        match descriptor.schedule() {
            Schedule::Recurring(interval) => {
                let handle = scheduler
                    .start_recurring(operation, interval, callback)
                    .map_err(rejected)?;
                self.host.recurring().add(operation, handle, interval);
                registered.recurring.push(descriptor.type_name());
                tracing::debug!(operation, ?interval, "registered recurring operation");
            }
            Schedule::OnDemand | Schedule::None => {
                let handle = scheduler
                    .create_on_demand(operation, callback)
                    .map_err(rejected)?;
                self.host.on_demand().add(operation, handle);
                registered.on_demand.push(descriptor.type_name());
                tracing::debug!(operation, "registered on-demand operation");
            }
        }

        Ok(())
    }

    fn callback(&self, job: &Discovered<JobEntry<V>>) -> OperationCallback {
        let entry = *job.entry();
        let operation = job.descriptor().operation();
        let config_type = job.descriptor().config_type();
        let source = Arc::clone(self.host.config());
        let services = self.host.services().clone();
        let resolver = self.resolver;

        Arc::new(move |run: &Job, directive: &dyn Directive| {
            let run_id = run.run_id();
            let _span = tracing::debug_span!("background_operation", operation, run_id).entered();

            let config = source.current();
            let slice = resolver.resolve(&*config, config_type);
            entry.invoke(slice, &services, run, directive)
        })
    }
}

impl<C, V> Dispatcher for JobDispatcher<C, V>
where
    C: ConfigNode,
    V: Send + Sync + 'static,
{
    type Output<'a>
        = Result<Registrations, DispatchError>
    where
        Self: 'a;

    /// Register every discovered background task.
    ///
    /// Finding no tasks is not an error: nothing is registered and nothing
    /// is logged. The first construction or scheduler failure aborts the
    /// cycle; tasks registered before it stay registered.
    fn dispatch(&self) -> Self::Output<'_> {
        let result = self.run();
        self.enter(JobPhase::Done);
        result
    }
}

impl<C, V> fmt::Debug for JobDispatcher<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDispatcher")
            .field("host", &self.host)
            .field("catalog", &self.catalog)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_omits_empty_categories() {
        let registered = Registrations {
            recurring: vec!["app::Cleanup"],
            on_demand: Vec::new(),
        };

        let summary = registered.summary();
        let header = "Recurring background operation types:\n[";
        assert!(summary.starts_with(header));
        assert!(summary.contains("\"app::Cleanup\""));
        assert!(!summary.contains("On-demand"));
    }

    #[test]
    fn summary_lists_both_categories_in_order() {
        let registered = Registrations {
            recurring: vec!["app::Cleanup"],
            on_demand: vec!["app::Reindex", "app::Export"],
        };

        let summary = registered.summary();
        let recurring = summary.find("Recurring").expect("recurring section");
        let on_demand = summary.find("On-demand").expect("on-demand section");
        assert!(recurring < on_demand);
        assert!(summary.contains("\"app::Export\""));
    }

    #[test]
    fn empty_registrations_have_empty_summary() {
        assert!(Registrations::default().is_empty());
        assert_eq!(Registrations::default().summary(), "");
    }
}
