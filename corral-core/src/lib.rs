//! # corral-core
//!
//! Core traits for the Corral handler discovery and dispatch framework.
//!
//! This crate has minimal dependencies and is what handler authors need:
//! the handler traits, the configuration tree abstraction, the finding types
//! and the interfaces of the host services Corral talks to.
//!
//! # Building Blocks
//!
//! ## Configuration ([`ConfigNode`], [`ConfigTreeResolver`])
//!
//! The host's configuration is an object graph of [`ConfigNode`]s. Every
//! handler declares one configuration type, and [`ConfigTreeResolver`] finds
//! the shallowest node of that type.
//!
//! ## Handlers ([`BackgroundTask`], [`Validator`])
//!
//! Background tasks are tagged with [`BackgroundOperation`] and registered
//! with the host's [`Scheduler`]. Validators check their configuration slice
//! and yield [`ValidationFinding`]s.
//!
//! ## Dispatch ([`Dispatcher`])
//!
//! A dispatcher discovers the handlers of one extension point and wires them
//! in. Standard dispatchers live in `corral-std`.
//!
//! # Error Types
//!
//! - [`DispatchError`] - Construction, execution and registration failures
//! - [`BoxError`] - The error type handler entry points return

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod config;
mod dispatcher;
mod error;
mod event_log;
mod finding;
mod handler;
mod operation;
mod resolver;

// Re-exports
pub use config::{ConfigChild, ConfigNode};
pub use dispatcher::Dispatcher;
pub use error::{BoxError, DispatchError};
pub use event_log::{EventLog, TracingEventLog};
pub use finding::{Severity, ValidationFinding, ValidationResultMap, ValidationResults};
pub use handler::{
    BackgroundOperation, BackgroundTask, HandlerDescriptor, Schedule, TaskContext, Validator,
};
pub use operation::{
    Directive, EmptyDirective, Job, OnDemandOperations, OperationCallback, OperationHandle,
    OperationRegistry, RecurringOperation, RecurringOperations, Scheduler,
};
pub use resolver::{ConfigTreeResolver, DEFAULT_MAX_DEPTH};
