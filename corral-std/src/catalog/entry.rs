//! Type-erased handler entries.
//!
//! An entry is a small table of function pointers monomorphized for one
//! handler type. Calling through it is ordinary static dispatch into the
//! handler's trait methods, so handler errors come back exactly as the
//! handler returned them.
//!
//! Entry constructors are `const fn` so they can be used in `static`
//! registrations.

use corral_core::{
    BackgroundOperation, BackgroundTask, BoxError, ConfigNode, Directive, DispatchError,
    HandlerDescriptor, Job, OnDemandOperations, RecurringOperations, TaskContext, ValidationFinding,
    ValidationResultMap, Validator,
};
use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::Arc;

/// Findings of one running validator.
pub type FindingStream<'a> = Box<dyn Iterator<Item = Result<ValidationFinding, BoxError>> + 'a>;

type ProbeFn<V> = fn(Option<&dyn ConfigNode>, &TaskServices<V>) -> Result<(), BoxError>;
type InvokeFn<V> =
    fn(Option<&dyn ConfigNode>, &TaskServices<V>, &Job, &dyn Directive) -> Result<(), BoxError>;
type RunFn<V> = for<'a> fn(&'a V, &'a dyn ConfigNode) -> Result<FindingStream<'a>, DispatchError>;

/// Configuration-independent services every background task is built with.
pub struct TaskServices<V> {
    vault: Arc<V>,
    recurring: Arc<RecurringOperations>,
    on_demand: Arc<OnDemandOperations>,
    validation_results: Arc<ValidationResultMap>,
}

impl<V> TaskServices<V> {
    /// Bundle the host's services.
    pub fn new(
        vault: Arc<V>,
        recurring: Arc<RecurringOperations>,
        on_demand: Arc<OnDemandOperations>,
        validation_results: Arc<ValidationResultMap>,
    ) -> Self {
        Self {
            vault,
            recurring,
            on_demand,
            validation_results,
        }
    }

    /// The shared vault handle.
    pub fn vault(&self) -> &Arc<V> {
        &self.vault
    }

    /// Recurring operation registry.
    pub fn recurring(&self) -> &Arc<RecurringOperations> {
        &self.recurring
    }

    /// On-demand operation registry.
    pub fn on_demand(&self) -> &Arc<OnDemandOperations> {
        &self.on_demand
    }

    /// Validation results from earlier passes.
    pub fn validation_results(&self) -> &Arc<ValidationResultMap> {
        &self.validation_results
    }

    fn context<C: 'static>(&self, config: Option<C>) -> TaskContext<C, V> {
        let validation_results = self.validation_results.get(TypeId::of::<C>());
        TaskContext {
            config,
            vault: Arc::clone(&self.vault),
            recurring: Arc::clone(&self.recurring),
            on_demand: Arc::clone(&self.on_demand),
            validation_results,
        }
    }
}

impl<V> Clone for TaskServices<V> {
    fn clone(&self) -> Self {
        Self {
            vault: Arc::clone(&self.vault),
            recurring: Arc::clone(&self.recurring),
            on_demand: Arc::clone(&self.on_demand),
            validation_results: Arc::clone(&self.validation_results),
        }
    }
}

impl<V> fmt::Debug for TaskServices<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskServices")
            .field("vault", &type_name::<V>())
            .field("recurring", &self.recurring.len())
            .field("on_demand", &self.on_demand.len())
            .field("validation_results", &self.validation_results.len())
            .finish()
    }
}

/// A discoverable background task.
pub struct JobEntry<V> {
    descriptor: fn() -> HandlerDescriptor,
    probe: ProbeFn<V>,
    invoke: InvokeFn<V>,
}

impl<V: 'static> JobEntry<V> {
    /// The entry for task type `T`.
    pub const fn of<T>() -> Self
    where
        T: BackgroundTask<V> + BackgroundOperation,
    {
        Self {
            descriptor: HandlerDescriptor::job::<V, T>,
            probe: probe_task::<V, T>,
            invoke: invoke_task::<V, T>,
        }
    }
}

impl<V> JobEntry<V> {
    /// Describe the task.
    pub fn descriptor(&self) -> HandlerDescriptor {
        (self.descriptor)()
    }

    /// Construct an instance and drop it, reporting construction failures.
    pub fn probe(
        &self,
        config: Option<&dyn ConfigNode>,
        services: &TaskServices<V>,
    ) -> Result<(), BoxError> {
        (self.probe)(config, services)
    }

    /// Construct a fresh instance and run it once.
    ///
    /// The task's own error is returned unchanged.
    pub fn invoke(
        &self,
        config: Option<&dyn ConfigNode>,
        services: &TaskServices<V>,
        job: &Job,
        directive: &dyn Directive,
    ) -> Result<(), BoxError> {
        (self.invoke)(config, services, job, directive)
    }
}

impl<V> Clone for JobEntry<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for JobEntry<V> {}

impl<V> fmt::Debug for JobEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JobEntry")
            .field(&self.descriptor().type_name())
            .finish()
    }
}

/// A discoverable validator.
pub struct ValidatorEntry<V> {
    descriptor: fn() -> HandlerDescriptor,
    run: RunFn<V>,
}

impl<V: 'static> ValidatorEntry<V> {
    /// The entry for validator type `T`.
    pub const fn of<T>() -> Self
    where
        T: Validator<V>,
    {
        Self {
            descriptor: HandlerDescriptor::validator::<V, T>,
            run: run_validator::<V, T>,
        }
    }
}

impl<V> ValidatorEntry<V> {
    /// Describe the validator.
    pub fn descriptor(&self) -> HandlerDescriptor {
        (self.descriptor)()
    }

    /// Construct the validator and start validating `config`.
    pub fn run<'a>(
        &self,
        vault: &'a V,
        config: &'a dyn ConfigNode,
    ) -> Result<FindingStream<'a>, DispatchError> {
        (self.run)(vault, config)
    }
}

impl<V> Clone for ValidatorEntry<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for ValidatorEntry<V> {}

impl<V> fmt::Debug for ValidatorEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValidatorEntry")
            .field(&self.descriptor().type_name())
            .finish()
    }
}

/// Any handler entry a module can hold.
pub enum HandlerEntry<V> {
    /// A background task.
    Job(JobEntry<V>),
    /// A validator.
    Validator(ValidatorEntry<V>),
}

impl<V> HandlerEntry<V> {
    /// Describe the handler.
    pub fn descriptor(&self) -> HandlerDescriptor {
        match self {
            HandlerEntry::Job(entry) => entry.descriptor(),
            HandlerEntry::Validator(entry) => entry.descriptor(),
        }
    }
}

impl<V> Clone for HandlerEntry<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for HandlerEntry<V> {}

impl<V> fmt::Debug for HandlerEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerEntry::Job(entry) => entry.fmt(f),
            HandlerEntry::Validator(entry) => entry.fmt(f),
        }
    }
}

/// The slice `node` as handler `H`'s configuration type `C`.
fn typed_slice<H, C: ConfigNode>(node: &dyn ConfigNode) -> Result<&C, DispatchError> {
    node.downcast_ref::<C>()
        .ok_or(DispatchError::ConfigMismatch {
            handler: type_name::<H>(),
            expected: type_name::<C>(),
        })
}

fn construct_task<V, T>(
    config: Option<&dyn ConfigNode>,
    services: &TaskServices<V>,
) -> Result<T, BoxError>
where
    T: BackgroundTask<V>,
{
    let config = match config {
        Some(node) => Some(typed_slice::<T, T::Config>(node)?.clone()),
        None => None,
    };

    T::create(services.context(config))
}

fn probe_task<V, T>(
    config: Option<&dyn ConfigNode>,
    services: &TaskServices<V>,
) -> Result<(), BoxError>
where
    T: BackgroundTask<V>,
{
    construct_task::<V, T>(config, services).map(drop)
}

fn invoke_task<V, T>(
    config: Option<&dyn ConfigNode>,
    services: &TaskServices<V>,
    job: &Job,
    directive: &dyn Directive,
) -> Result<(), BoxError>
where
    T: BackgroundTask<V> + BackgroundOperation,
{
    let Some(typed) = directive.as_any().downcast_ref::<T::Directive>() else {
        let mismatch = DispatchError::DirectiveMismatch {
            operation: T::NAME,
            expected: type_name::<T::Directive>(),
            found: directive.type_name(),
        };
        return Err(mismatch.into());
    };

    let task = construct_task::<V, T>(config, services);
    let mut task = task.map_err(|source| DispatchError::Construction {
        handler: type_name::<T>(),
        source,
    })?;

    task.task(job, typed)
}

fn run_validator<'a, V, T>(
    vault: &'a V,
    config: &'a dyn ConfigNode,
) -> Result<FindingStream<'a>, DispatchError>
where
    T: Validator<V>,
{
    let config = typed_slice::<T, T::Config>(config)?;

    let validator = T::create().map_err(|source| DispatchError::Construction {
        handler: type_name::<T>(),
        source,
    })?;

    Ok(Box::new(validator.validate(vault, config)))
}
