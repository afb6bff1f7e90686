//! Handler discovery.
//!
//! A [`HandlerCatalog`] scans an ordered list of [`HandlerModule`]s for the
//! handlers of one extension point. Order is stable: modules in inclusion
//! order, entries in declaration order within each module. A handler type
//! declared in more than one module is discovered once, at its first
//! position.

mod cache;
#[cfg(feature = "inventory")]
mod collected;
mod entry;
mod module;

pub use cache::{DiscoveredValidators, TypeCache};
#[cfg(feature = "inventory")]
pub use collected::Registration;
pub use entry::{FindingStream, HandlerEntry, JobEntry, TaskServices, ValidatorEntry};
pub use module::HandlerModule;

use corral_core::HandlerDescriptor;
use std::any::TypeId;
use std::collections::HashSet;
use std::fmt;

/// A handler found by discovery, with its descriptor derived once.
#[derive(Debug, Clone, Copy)]
pub struct Discovered<E> {
    descriptor: HandlerDescriptor,
    entry: E,
}

impl<E> Discovered<E> {
    /// The handler's descriptor.
    pub fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    /// The handler's entry.
    pub fn entry(&self) -> &E {
        &self.entry
    }
}

/// Scans included modules for handlers.
pub struct HandlerCatalog<V> {
    modules: Vec<HandlerModule<V>>,
}

impl<V> HandlerCatalog<V> {
    /// Create a catalog with no modules.
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Create a catalog scanning one module.
    pub fn with_module(module: HandlerModule<V>) -> Self {
        let mut catalog = Self::new();
        catalog.include_module(module);
        catalog
    }

    /// Include another module after the ones already included.
    pub fn include_module(&mut self, module: HandlerModule<V>) -> &mut Self {
        self.modules.push(module);
        self
    }

    /// Builder-style [`include_module`](Self::include_module).
    pub fn including(mut self, module: HandlerModule<V>) -> Self {
        self.include_module(module);
        self
    }

    /// Included modules, in inclusion order.
    pub fn modules(&self) -> &[HandlerModule<V>] {
        &self.modules
    }

    /// Discover every background task.
    pub fn jobs(&self) -> Vec<Discovered<JobEntry<V>>> {
        let entries = self.modules.iter().flat_map(|module| module.jobs());
        let jobs = first_of_each(entries, JobEntry::descriptor);

        tracing::debug!(
            modules = self.modules.len(),
            found = jobs.len(),
            "discovered background tasks"
        );
        jobs
    }

    /// Discover every validator.
    pub fn validators(&self) -> Vec<Discovered<ValidatorEntry<V>>> {
        let entries = self.modules.iter().flat_map(|module| module.validators());
        let validators = first_of_each(entries, ValidatorEntry::descriptor);

        tracing::debug!(
            modules = self.modules.len(),
            found = validators.len(),
            "discovered validators"
        );
        validators
    }

    /// Discover validators through `cache`, keyed by the configuration
    /// root's type.
    pub fn cached_validators(&self, cache: &TypeCache<V>, key: TypeId) -> DiscoveredValidators<V> {
        cache.get_or_discover(key, || self.validators())
    }
}

#[cfg(feature = "inventory")]
impl<V: Send + Sync + 'static> HandlerCatalog<V> {
    /// Create a catalog scanning the handlers registered in the crate that
    /// `module_path` belongs to.
    ///
    /// Pass `module_path!()` to start from the caller's own crate.
    pub fn for_crate(module_path: &'static str) -> Self {
        Self::with_module(HandlerModule::of_crate(module_path))
    }
}

fn first_of_each<'a, E: Copy + 'a>(
    entries: impl Iterator<Item = &'a E>,
    describe: impl Fn(&E) -> HandlerDescriptor,
) -> Vec<Discovered<E>> {
    let mut seen = HashSet::new();
    entries
        .map(|entry| Discovered {
            descriptor: describe(entry),
            entry: *entry,
        })
        .filter(|found| {
            let first = seen.insert(found.descriptor.type_id());
            if !first {
                let handler = found.descriptor.type_name();
                tracing::debug!(handler, "handler already discovered");
            }
            first
        })
        .collect()
}

impl<V> Default for HandlerCatalog<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for HandlerCatalog<V> {
    fn clone(&self) -> Self {
        Self {
            modules: self.modules.clone(),
        }
    }
}

impl<V> fmt::Debug for HandlerCatalog<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerCatalog")
            .field("modules", &self.modules)
            .finish()
    }
}
