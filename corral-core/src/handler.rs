//! # Handlers
//!
//! Handlers are the units of work Corral discovers and dispatches. There are
//! two extension points:
//!
//! - **Background tasks** ([`BackgroundTask`] + [`BackgroundOperation`]):
//!   registered with the host's scheduler, run later, once per scheduler
//!   invocation, on a freshly constructed instance.
//! - **Validators** ([`Validator`]): run synchronously during a validation
//!   pass, yielding [`ValidationFinding`]s.
//!
//! Each handler declares the configuration type it depends on. The
//! dispatcher finds the matching slice of the host's configuration tree and
//! hands it to the handler.
//!
//! The type parameter `V` is the host's vault: the long-lived
//! repository/session handle shared with every handler.

use crate::config::ConfigNode;
use crate::error::BoxError;
use crate::finding::{ValidationFinding, ValidationResults};
use crate::operation::{Directive, Job, OnDemandOperations, RecurringOperations};
use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// When a background operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Not scheduled (validators).
    None,
    /// Re-run by the scheduler at a fixed interval.
    Recurring(Duration),
    /// Run only when triggered.
    OnDemand,
}

impl Schedule {
    /// A recurring schedule expressed in minutes.
    pub const fn every_minutes(minutes: u64) -> Self {
        Schedule::Recurring(Duration::from_secs(minutes * 60))
    }

    /// The interval of a recurring schedule.
    pub fn interval(&self) -> Option<Duration> {
        match self {
            Schedule::Recurring(interval) => Some(*interval),
            _ => None,
        }
    }
}

/// The extension-point tag of a background task.
///
/// Usually written with `#[background_operation(name = "...")]`, adding
/// `interval_minutes = N` for recurring operations.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not tagged as a background operation",
    label = "missing `BackgroundOperation` tag",
    note = "Add `#[background_operation(name = \"...\")]` to the type."
)]
pub trait BackgroundOperation {
    /// Operation name registered with the scheduler.
    const NAME: &'static str;

    /// Whether the operation recurs or runs on demand.
    const SCHEDULE: Schedule = Schedule::OnDemand;
}

/// Everything a background task is constructed with.
pub struct TaskContext<C, V> {
    /// The task's configuration slice; `None` when the tree has no match.
    pub config: Option<C>,
    /// The host's shared vault handle.
    pub vault: Arc<V>,
    /// Host registry of recurring operations.
    pub recurring: Arc<RecurringOperations>,
    /// Host registry of on-demand operations.
    pub on_demand: Arc<OnDemandOperations>,
    /// Results of an earlier validation pass for the task's configuration type.
    pub validation_results: Option<Arc<ValidationResults>>,
}

impl<C: fmt::Debug, V> fmt::Debug for TaskContext<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("config", &self.config)
            .field("recurring", &self.recurring.names())
            .field("on_demand", &self.on_demand.names())
            .field("validation_results", &self.validation_results)
            .finish_non_exhaustive()
    }
}

/// A background task handler.
///
/// A new instance is created through [`create`](Self::create) for every
/// scheduler invocation, so instances never see each other's state.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a background task for vault `{V}`",
    label = "missing `BackgroundTask<{V}>` implementation",
    note = "Implement `create` and `task` for the vault type `{V}`."
)]
pub trait BackgroundTask<V>: Sized + Send + 'static {
    /// The configuration slice this task depends on.
    type Config: ConfigNode + Clone;

    /// Parameters accepted from the scheduler; use
    /// [`EmptyDirective`](crate::EmptyDirective) when there are none.
    type Directive: Directive;

    /// Construct an instance bound to its context.
    fn create(ctx: TaskContext<Self::Config, V>) -> Result<Self, BoxError>;

    /// Run the task once.
    fn task(&mut self, job: &Job, directive: &Self::Directive) -> Result<(), BoxError>;
}

/// A configuration validator.
///
/// The instance is consumed by [`validate`](Self::validate); the returned
/// iterator may produce findings lazily.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a validator for vault `{V}`",
    label = "missing `Validator<{V}>` implementation",
    note = "Implement `create` and `validate` for the vault type `{V}`."
)]
pub trait Validator<V>: Sized + 'static {
    /// The configuration slice this validator checks.
    type Config: ConfigNode;

    /// Construct an instance.
    fn create() -> Result<Self, BoxError>;

    /// Validate the slice. Yielding `Err` ends the whole validation pass.
    fn validate<'a>(
        self,
        vault: &'a V,
        config: &'a Self::Config,
    ) -> impl Iterator<Item = Result<ValidationFinding, BoxError>> + 'a;
}

/// Static description of a discovered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    config_type: TypeId,
    config_type_name: &'static str,
    schedule: Schedule,
    operation: &'static str,
    directive_type_name: Option<&'static str>,
}

impl HandlerDescriptor {
    /// Describe a background task.
    pub fn job<V, T>() -> Self
    where
        T: BackgroundTask<V> + BackgroundOperation,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            config_type: TypeId::of::<T::Config>(),
            config_type_name: type_name::<T::Config>(),
            schedule: T::SCHEDULE,
            operation: T::NAME,
            directive_type_name: Some(type_name::<T::Directive>()),
        }
    }

    /// Describe a validator. Its operation name is its type name.
    pub fn validator<V, T>() -> Self
    where
        T: Validator<V>,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            config_type: TypeId::of::<T::Config>(),
            config_type_name: type_name::<T::Config>(),
            schedule: Schedule::None,
            operation: type_name::<T>(),
            directive_type_name: None,
        }
    }

    /// The handler's concrete type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully-qualified handler type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The configuration type the handler depends on.
    pub fn config_type(&self) -> TypeId {
        self.config_type
    }

    /// Name of the configuration type.
    pub fn config_type_name(&self) -> &'static str {
        self.config_type_name
    }

    /// Scheduling marker.
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Operation name.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Directive type of a background task.
    pub fn directive_type_name(&self) -> Option<&'static str> {
        self.directive_type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::EmptyDirective;
    use std::any::Any;

    #[derive(Clone)]
    struct Mail;

    impl ConfigNode for Mail {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct Cleanup;

    impl BackgroundOperation for Cleanup {
        const NAME: &'static str = "Cleanup";
        const SCHEDULE: Schedule = Schedule::every_minutes(10);
    }

    impl BackgroundTask<()> for Cleanup {
        type Config = Mail;
        type Directive = EmptyDirective;

        fn create(_ctx: TaskContext<Mail, ()>) -> Result<Self, BoxError> {
            Ok(Cleanup)
        }

        fn task(&mut self, _job: &Job, _directive: &EmptyDirective) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[test]
    fn job_descriptor_carries_tag_and_config_type() {
        let descriptor = HandlerDescriptor::job::<(), Cleanup>();

        assert_eq!(descriptor.operation(), "Cleanup");
        assert_eq!(
            descriptor.schedule().interval(),
            Some(Duration::from_secs(600))
        );
        assert_eq!(descriptor.config_type(), TypeId::of::<Mail>());
        assert!(descriptor.type_name().ends_with("Cleanup"));
        assert!(
            descriptor
                .directive_type_name()
                .is_some_and(|name| name.ends_with("EmptyDirective"))
        );
    }

    #[test]
    fn on_demand_is_the_default_schedule() {
        struct Reindex;
        impl BackgroundOperation for Reindex {
            const NAME: &'static str = "Reindex";
        }
        assert_eq!(Reindex::SCHEDULE, Schedule::OnDemand);
        assert_eq!(Schedule::OnDemand.interval(), None);
    }
}
