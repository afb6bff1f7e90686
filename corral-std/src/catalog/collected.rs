//! Self-registered handlers gathered with `inventory`.
//!
//! Handler types register themselves at the item level with the
//! `register_job!` / `register_validator!` macros of the `corral` crate. A
//! [`HandlerModule`] is then assembled from every registration that belongs
//! to one crate.

use super::entry::{HandlerEntry, JobEntry, ValidatorEntry};
use super::module::HandlerModule;
use corral_core::{BackgroundOperation, BackgroundTask, Validator};
use std::any::Any;

/// A handler registration submitted to the distributed collection.
///
/// The entry is stored behind a constructor so the registration stays a
/// constant expression; it is downcast back to `HandlerEntry<V>` when a
/// module for vault `V` is collected.
pub struct Registration {
    module: &'static str,
    file: &'static str,
    line: u32,
    entry: fn() -> Box<dyn Any + Send + Sync>,
}

inventory::collect!(Registration);

impl Registration {
    /// Register background task `T` for vault `V`.
    pub const fn job<V, T>(module: &'static str, file: &'static str, line: u32) -> Self
    where
        V: Send + Sync + 'static,
        T: BackgroundTask<V> + BackgroundOperation,
    {
        Self {
            module,
            file,
            line,
            entry: boxed_job::<V, T>,
        }
    }

    /// Register validator `T` for vault `V`.
    pub const fn validator<V, T>(module: &'static str, file: &'static str, line: u32) -> Self
    where
        V: Send + Sync + 'static,
        T: Validator<V>,
    {
        Self {
            module,
            file,
            line,
            entry: boxed_validator::<V, T>,
        }
    }

    /// Module path the registration was made from.
    pub fn module(&self) -> &'static str {
        self.module
    }

    fn belongs_to(&self, krate: &str) -> bool {
        self.module
            .strip_prefix(krate)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    }
}

fn boxed_job<V, T>() -> Box<dyn Any + Send + Sync>
where
    V: Send + Sync + 'static,
    T: BackgroundTask<V> + BackgroundOperation,
{
    Box::new(HandlerEntry::Job(JobEntry::<V>::of::<T>()))
}

fn boxed_validator<V, T>() -> Box<dyn Any + Send + Sync>
where
    V: Send + Sync + 'static,
    T: Validator<V>,
{
    Box::new(HandlerEntry::Validator(ValidatorEntry::<V>::of::<T>()))
}

impl<V: Send + Sync + 'static> HandlerModule<V> {
    /// Collect the handlers registered for vault `V` within crate `krate`.
    ///
    /// Registrations are ordered by module path, then source position, so
    /// the result is the same on every run.
    pub fn collected(krate: &'static str) -> Self {
        let mut registrations: Vec<&Registration> = inventory::iter::<Registration>
            .into_iter()
            .filter(|registration| registration.belongs_to(krate))
            .collect();

        registrations.sort_by_key(|r| (r.module, r.file, r.line));

        let mut module = HandlerModule::new(krate);
        for registration in registrations {
            if let Ok(entry) = (registration.entry)().downcast::<HandlerEntry<V>>() {
                module.push(*entry);
            }
        }

        tracing::debug!(
            module = krate,
            handlers = module.len(),
            "collected self-registered handlers"
        );

        module
    }

    /// Collect the handlers of the crate that `module_path` belongs to.
    ///
    /// Pass `module_path!()` to get the caller's own crate.
    pub fn of_crate(module_path: &'static str) -> Self {
        let krate = module_path.split("::").next().unwrap_or(module_path);
        Self::collected(krate)
    }
}
