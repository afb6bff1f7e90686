//! # corral - Handler Discovery and Configuration-Driven Dispatch
//!
//! `corral` discovers handlers from a host-chosen set of modules, resolves
//! each handler's slice of a typed configuration tree, and dispatches it:
//! background tasks are registered with the host's scheduler, validators are
//! run and their findings streamed back lazily.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use corral::prelude::*;
//!
//! #[derive(Clone, ConfigNode)]
//! struct Root {
//!     #[config(node)]
//!     cleanup: CleanupConfig,
//! }
//!
//! #[background_operation(name = "Cleanup", interval_minutes = 10)]
//! struct Cleanup { config: Option<CleanupConfig> }
//!
//! impl BackgroundTask<Vault> for Cleanup {
//!     type Config = CleanupConfig;
//!     type Directive = EmptyDirective;
//!
//!     fn create(ctx: TaskContext<CleanupConfig, Vault>) -> Result<Self, BoxError> {
//!         Ok(Self { config: ctx.config })
//!     }
//!
//!     fn task(&mut self, job: &Job, _: &EmptyDirective) -> Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! corral::register_job!(Vault, Cleanup);
//!
//! // Scans the handlers registered in this crate.
//! let catalog: HandlerCatalog<Vault> = corral::catalog!();
//! let host = JobHost::builder("Billing", config, vault, scheduler).build();
//! let registered = JobDispatcher::new(host, catalog).dispatch()?;
//! ```
//!
//! Without the `inventory` feature, list handlers explicitly:
//!
//! ```rust,ignore
//! let module = HandlerModule::new("maintenance").job::<Cleanup>();
//! let catalog = HandlerCatalog::with_module(module);
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use corral_core::{
    // Handlers
    BackgroundOperation,
    BackgroundTask,
    // Error types
    BoxError,
    // Configuration tree
    ConfigChild,
    ConfigNode,
    ConfigTreeResolver,
    DEFAULT_MAX_DEPTH,
    // External interfaces
    Directive,
    DispatchError,
    // Dispatcher
    Dispatcher,
    EmptyDirective,
    EventLog,
    HandlerDescriptor,
    Job,
    OnDemandOperations,
    OperationCallback,
    OperationHandle,
    OperationRegistry,
    RecurringOperation,
    RecurringOperations,
    Schedule,
    Scheduler,
    // Findings
    Severity,
    TaskContext,
    TracingEventLog,
    ValidationFinding,
    ValidationResultMap,
    ValidationResults,
    Validator,
};

// Discovery
pub use corral_std::catalog::{
    Discovered, DiscoveredValidators, FindingStream, HandlerCatalog, HandlerEntry, HandlerModule,
    JobEntry, TaskServices, TypeCache, ValidatorEntry,
};

#[cfg(feature = "inventory")]
pub use corral_std::catalog::Registration;

// Dispatch
pub use corral_std::dispatch::{
    Findings, JobDispatcher, JobPhase, Registrations, ValidationDispatcher,
};

// Host services
pub use corral_std::host::{ConfigSource, JobHost, JobHostBuilder};

mod registration;

/// Testing utilities.
pub mod testing {
    pub use corral_std::testing::{MemoryEventLog, RecordedOperation, RecordingScheduler};
}

/// Prelude module - common imports for Corral.
///
/// # Usage
///
/// ```rust,ignore
/// use corral::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Handlers
        BackgroundOperation,
        BackgroundTask,
        // Errors
        BoxError,
        // Configuration
        ConfigChild,
        ConfigNode,
        // Dispatch
        Dispatcher,
        EmptyDirective,
        HandlerCatalog,
        HandlerModule,
        Job,
        JobDispatcher,
        JobHost,
        Schedule,
        TaskContext,
        TypeCache,
        ValidationDispatcher,
        ValidationFinding,
        Validator,
    };

    #[cfg(feature = "macros")]
    pub use crate::background_operation;
}

#[cfg(feature = "macros")]
pub use corral_macros::{ConfigNode, background_operation};

#[cfg(feature = "inventory")]
pub use inventory;
