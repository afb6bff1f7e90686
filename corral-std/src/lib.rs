//! # corral-std
//!
//! Standard implementations for the Corral handler discovery framework.
//!
//! This crate provides:
//! - **Discovery**: [`HandlerModule`], [`HandlerCatalog`], [`TypeCache`]
//! - **Dispatch**: [`JobDispatcher`], [`ValidationDispatcher`]
//! - **Host services**: [`JobHost`], [`ConfigSource`]
//! - **Self-registration**: [`Registration`] (with the `inventory` feature)
//! - **Testing**: [`testing`] utilities

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use corral_core;

// Modules
pub mod catalog;
pub mod dispatch;
pub mod host;
pub mod testing;

pub use catalog::{
    Discovered, DiscoveredValidators, FindingStream, HandlerCatalog, HandlerEntry, HandlerModule,
    JobEntry, TaskServices, TypeCache, ValidatorEntry,
};
#[cfg(feature = "inventory")]
pub use catalog::Registration;
pub use dispatch::{Findings, JobDispatcher, JobPhase, Registrations, ValidationDispatcher};
pub use host::{ConfigSource, JobHost, JobHostBuilder};

#[cfg(feature = "inventory")]
pub use inventory;
