//! Error types for Corral.
//!
//! Two outcomes that look like failures are deliberately not errors here:
//! an empty discovery (dispatch is a no-op) and a configuration slice that
//! cannot be resolved (jobs bind no configuration, validators are skipped).
//!
//! - [`DispatchError`] - Errors surfaced by dispatchers and their callbacks

use thiserror::Error;

/// A boxed error type for dynamic error handling.
///
/// Handler entry points return this so that their own error values reach the
/// caller (or the external scheduler) untouched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while dispatching handlers.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A handler could not be constructed.
    #[error("failed to construct handler `{handler}`")]
    Construction {
        /// Fully-qualified handler type name.
        handler: &'static str,
        /// The error returned by the handler's constructor.
        #[source]
        source: BoxError,
    },

    /// A handler's entry point failed.
    #[error("handler `{handler}` failed")]
    Execution {
        /// Fully-qualified handler type name.
        handler: &'static str,
        /// The handler's own error.
        #[source]
        source: BoxError,
    },

    /// The external scheduler refused to register an operation.
    #[error("scheduler rejected operation `{operation}`")]
    Scheduler {
        /// The operation name.
        operation: &'static str,
        /// The scheduler's error.
        #[source]
        source: BoxError,
    },

    /// The scheduler passed a directive the handler does not accept.
    #[error("operation `{operation}` expects `{expected}`, got `{found}`")]
    DirectiveMismatch {
        /// The operation name.
        operation: &'static str,
        /// The directive type the handler declares.
        expected: &'static str,
        /// The directive type that was received.
        found: &'static str,
    },

    /// A resolved configuration slice was not of the handler's declared type.
    #[error("handler `{handler}` expects configuration `{expected}`")]
    ConfigMismatch {
        /// Fully-qualified handler type name.
        handler: &'static str,
        /// The configuration type the handler declares.
        expected: &'static str,
    },
}

impl DispatchError {
    /// The name of the handler or operation the error concerns.
    pub fn subject(&self) -> &'static str {
        match self {
            DispatchError::Construction { handler, .. }
            | DispatchError::Execution { handler, .. }
            | DispatchError::ConfigMismatch { handler, .. } => handler,
            DispatchError::Scheduler { operation, .. }
            | DispatchError::DirectiveMismatch { operation, .. } => operation,
        }
    }
}
