//! Dispatchers for the two extension points.
//!
//! - [`JobDispatcher`] registers background tasks with a scheduler.
//! - [`ValidationDispatcher`] runs validators and streams their findings.

mod job;
mod validation;

pub use job::{JobDispatcher, JobPhase, Registrations};
pub use validation::{Findings, ValidationDispatcher};
