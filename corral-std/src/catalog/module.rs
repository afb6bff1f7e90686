//! Handler modules: the unit a catalog scans.

use super::entry::{HandlerEntry, JobEntry, ValidatorEntry};
use corral_core::{BackgroundOperation, BackgroundTask, Validator};
use std::borrow::Cow;
use std::fmt;

/// A named, ordered set of handler entries.
///
/// Entries keep their declaration order, which decides configuration
/// tie-breaks and scheduler registration order downstream.
///
/// # Example
/// ```ignore
/// let module = HandlerModule::<Vault>::new("maintenance")
///     .job::<Cleanup>()
///     .job::<Reindex>()
///     .validator::<MailValidator>();
/// ```
pub struct HandlerModule<V> {
    name: Cow<'static, str>,
    entries: Vec<HandlerEntry<V>>,
}

impl<V: Send + Sync + 'static> HandlerModule<V> {
    /// Create an empty module.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Declare a background task.
    pub fn job<T>(mut self) -> Self
    where
        T: BackgroundTask<V> + BackgroundOperation,
    {
        self.push(HandlerEntry::Job(JobEntry::of::<T>()));
        self
    }

    /// Declare a validator.
    pub fn validator<T>(mut self) -> Self
    where
        T: Validator<V>,
    {
        self.push(HandlerEntry::Validator(ValidatorEntry::of::<T>()));
        self
    }

    /// Append an entry (mutable version).
    pub fn push(&mut self, entry: HandlerEntry<V>) {
        self.entries.push(entry);
    }
}

impl<V> HandlerModule<V> {
    /// The module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[HandlerEntry<V>] {
        &self.entries
    }

    /// Background task entries in declaration order.
    pub fn jobs(&self) -> impl Iterator<Item = &JobEntry<V>> {
        self.entries.iter().filter_map(|entry| match entry {
            HandlerEntry::Job(job) => Some(job),
            HandlerEntry::Validator(_) => None,
        })
    }

    /// Validator entries in declaration order.
    pub fn validators(&self) -> impl Iterator<Item = &ValidatorEntry<V>> {
        self.entries.iter().filter_map(|entry| match entry {
            HandlerEntry::Validator(validator) => Some(validator),
            HandlerEntry::Job(_) => None,
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the module declares nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Clone for HandlerModule<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<V> fmt::Debug for HandlerModule<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerModule")
            .field("name", &self.name)
            .field("entries", &self.entries)
            .finish()
    }
}
