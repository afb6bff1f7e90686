//! Memoized validator discovery.

use super::Discovered;
use super::entry::ValidatorEntry;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Validators discovered for one configuration root type, in discovery order.
pub type DiscoveredValidators<V> = Arc<[Discovered<ValidatorEntry<V>>]>;

/// Discovered validators keyed by the runtime type of the configuration root.
///
/// The host decides the cache's lifetime by constructing it and handing it
/// to every dispatcher that should share it. Entries are never invalidated:
/// module sets and configuration shapes are fixed for the process lifetime.
pub struct TypeCache<V> {
    entries: RwLock<HashMap<TypeId, DiscoveredValidators<V>>>,
}

impl<V> TypeCache<V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached validators for `key`.
    pub fn get(&self, key: TypeId) -> Option<DiscoveredValidators<V>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Return the cached validators for `key`, discovering them on a miss.
    ///
    /// Concurrent misses may both run `discover`; the first stored result
    /// wins and is returned to both callers.
    pub fn get_or_discover(
        &self,
        key: TypeId,
        discover: impl FnOnce() -> Vec<Discovered<ValidatorEntry<V>>>,
    ) -> DiscoveredValidators<V> {
        if let Some(hit) = self.get(key) {
            tracing::trace!(?key, "validator discovery cache hit");
            return hit;
        }

        let discovered: Arc<[_]> = discover().into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key).or_insert(discovered))
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` if nothing was cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for TypeCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for TypeCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCache")
            .field("keys", &self.len())
            .finish()
    }
}
