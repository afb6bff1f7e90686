//! The host services a [`JobDispatcher`](crate::JobDispatcher) works with.

use crate::catalog::TaskServices;
use arc_swap::ArcSwap;
use corral_core::{
    EventLog, OnDemandOperations, RecurringOperations, Scheduler, TracingEventLog,
    ValidationResultMap,
};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Where the current configuration root comes from.
///
/// Background task callbacks read the configuration again on every run, so
/// a reloadable source makes reloads visible to the next run.
pub trait ConfigSource<C>: Send + Sync {
    /// The configuration root as of now.
    fn current(&self) -> Arc<C>;
}

/// A configuration that never changes.
impl<C: Send + Sync> ConfigSource<C> for Arc<C> {
    fn current(&self) -> Arc<C> {
        Arc::clone(self)
    }
}

/// A configuration that can be swapped atomically at runtime.
impl<C: Send + Sync> ConfigSource<C> for ArcSwap<C> {
    fn current(&self) -> Arc<C> {
        self.load_full()
    }
}

/// Host application services for background task dispatch.
///
/// Built with [`JobHost::builder`]. Registries and validation results
/// default to fresh empty instances; the event log defaults to
/// [`TracingEventLog`].
pub struct JobHost<C, V> {
    name: Cow<'static, str>,
    config: Arc<dyn ConfigSource<C>>,
    services: TaskServices<V>,
    scheduler: Arc<dyn Scheduler>,
    event_log: Arc<dyn EventLog>,
}

impl<C, V> JobHost<C, V> {
    /// Start building a host named `name`.
    pub fn builder(
        name: impl Into<Cow<'static, str>>,
        config: Arc<dyn ConfigSource<C>>,
        vault: Arc<V>,
        scheduler: Arc<dyn Scheduler>,
    ) -> JobHostBuilder<C, V> {
        JobHostBuilder {
            name: name.into(),
            config,
            vault,
            scheduler,
            recurring: None,
            on_demand: None,
            validation_results: None,
            event_log: None,
        }
    }

    /// The application name, used as the event-log source prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration source.
    pub fn config(&self) -> &Arc<dyn ConfigSource<C>> {
        &self.config
    }

    /// Services handed to every task.
    pub fn services(&self) -> &TaskServices<V> {
        &self.services
    }

    /// The shared vault handle.
    pub fn vault(&self) -> &Arc<V> {
        self.services.vault()
    }

    /// Recurring operation registry.
    pub fn recurring(&self) -> &Arc<RecurringOperations> {
        self.services.recurring()
    }

    /// On-demand operation registry.
    pub fn on_demand(&self) -> &Arc<OnDemandOperations> {
        self.services.on_demand()
    }

    /// Results of earlier validation passes.
    pub fn validation_results(&self) -> &Arc<ValidationResultMap> {
        self.services.validation_results()
    }

    /// The external scheduler.
    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    /// The host's event log.
    pub fn event_log(&self) -> &Arc<dyn EventLog> {
        &self.event_log
    }
}

impl<C, V> fmt::Debug for JobHost<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHost")
            .field("name", &self.name)
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

/// Builder for [`JobHost`].
pub struct JobHostBuilder<C, V> {
    name: Cow<'static, str>,
    config: Arc<dyn ConfigSource<C>>,
    vault: Arc<V>,
    scheduler: Arc<dyn Scheduler>,
    recurring: Option<Arc<RecurringOperations>>,
    on_demand: Option<Arc<OnDemandOperations>>,
    validation_results: Option<Arc<ValidationResultMap>>,
    event_log: Option<Arc<dyn EventLog>>,
}

impl<C, V> JobHostBuilder<C, V> {
    /// Use an existing recurring operation registry.
    pub fn recurring(mut self, registry: Arc<RecurringOperations>) -> Self {
        self.recurring = Some(registry);
        self
    }

    /// Use an existing on-demand operation registry.
    pub fn on_demand(mut self, registry: Arc<OnDemandOperations>) -> Self {
        self.on_demand = Some(registry);
        self
    }

    /// Share validation results computed earlier in the startup pass.
    pub fn validation_results(mut self, results: Arc<ValidationResultMap>) -> Self {
        self.validation_results = Some(results);
        self
    }

    /// Report dispatch summaries to this event log.
    pub fn event_log(mut self, event_log: Arc<dyn EventLog>) -> Self {
        self.event_log = Some(event_log);
        self
    }

    /// Build the host.
    pub fn build(self) -> JobHost<C, V> {
        let event_log = self.event_log.unwrap_or_else(|| Arc::new(TracingEventLog));
        JobHost {
            name: self.name,
            config: self.config,
            services: TaskServices::new(
                self.vault,
                self.recurring.unwrap_or_default(),
                self.on_demand.unwrap_or_default(),
                self.validation_results.unwrap_or_default(),
            ),
            scheduler: self.scheduler,
            event_log,
        }
    }
}
