//! Configuration validation dispatch.

use crate::catalog::{DiscoveredValidators, FindingStream, HandlerCatalog, TypeCache};
use corral_core::{
    ConfigNode, ConfigTreeResolver, DispatchError, Dispatcher, ValidationFinding,
    ValidationResultMap,
};
use std::any::TypeId;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

/// Runs discovered validators against a configuration root.
///
/// Validator discovery is memoized in a host-owned [`TypeCache`] keyed by
/// the root's type, so dispatchers sharing a cache scan modules once.
pub struct ValidationDispatcher<C, V> {
    vault: Arc<V>,
    config: Arc<C>,
    catalog: HandlerCatalog<V>,
    cache: Arc<TypeCache<V>>,
    resolver: ConfigTreeResolver,
}

impl<C, V> ValidationDispatcher<C, V>
where
    C: ConfigNode,
    V: 'static,
{
    /// Create a dispatcher validating `config`.
    pub fn new(
        vault: Arc<V>,
        config: Arc<C>,
        catalog: HandlerCatalog<V>,
        cache: Arc<TypeCache<V>>,
    ) -> Self {
        Self {
            vault,
            config,
            catalog,
            cache,
            resolver: ConfigTreeResolver::new(),
        }
    }

    /// Use a custom configuration resolver.
    pub fn with_resolver(mut self, resolver: ConfigTreeResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// The configuration root being validated.
    pub fn config(&self) -> &Arc<C> {
        &self.config
    }

    /// The discovery cache.
    pub fn cache(&self) -> &Arc<TypeCache<V>> {
        &self.cache
    }

    /// Run every validator to completion and group the findings by the
    /// configuration type each validator checked.
    ///
    /// A validator that ran but found nothing still gets an (empty) entry.
    pub fn results(&self) -> Result<ValidationResultMap, DispatchError> {
        let map = ValidationResultMap::new();
        let mut findings = self.dispatch();

        while let Some(step) = findings.step() {
            match step? {
                Step::Started(config_type) => map.open(config_type),
                Step::Finding(config_type, finding) => map.record(config_type, finding),
            }
        }

        Ok(map)
    }
}

impl<C, V> Dispatcher for ValidationDispatcher<C, V>
where
    C: ConfigNode,
    V: 'static,
{
    type Output<'a>
        = Findings<'a, V>
    where
        Self: 'a;

    /// Start a validation pass.
    ///
    /// Nothing runs until the returned iterator is pulled. Each call starts
    /// a new pass over the (cached) validators.
    fn dispatch(&self) -> Self::Output<'_> {
        let validators = self
            .catalog
            .cached_validators(&self.cache, TypeId::of::<C>());

        Findings {
            validators,
            next: 0,
            vault: &*self.vault,
            root: &*self.config,
            resolver: self.resolver,
            current: None,
            finished: false,
        }
    }
}

impl<C, V> fmt::Debug for ValidationDispatcher<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationDispatcher")
            .field("catalog", &self.catalog)
            .field("cache", &self.cache)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

enum Step {
    Started(TypeId),
    Finding(TypeId, ValidationFinding),
}

struct Running<'a> {
    handler: &'static str,
    config_type: TypeId,
    findings: FindingStream<'a>,
}

/// The findings of one validation pass.
///
/// Validators run one after another in discovery order, each only once the
/// previous one is exhausted. Validators whose configuration slice is not in
/// the tree are skipped. The first error is yielded and ends the pass.
pub struct Findings<'a, V> {
    validators: DiscoveredValidators<V>,
    next: usize,
    vault: &'a V,
    root: &'a dyn ConfigNode,
    resolver: ConfigTreeResolver,
    current: Option<Running<'a>>,
    finished: bool,
}

impl<'a, V> Findings<'a, V> {
    fn step(&mut self) -> Option<Result<Step, DispatchError>> {
        if self.finished {
            return None;
        }

        if let Some(running) = &mut self.current {
            match running.findings.next() {
                Some(Ok(finding)) => return Some(Ok(Step::Finding(running.config_type, finding))),
                Some(Err(source)) => {
                    let handler = running.handler;
                    return self.fail(DispatchError::Execution { handler, source });
                }
                None => self.current = None,
            }
        }

        loop {
            let Some(validator) = self.validators.get(self.next).copied() else {
                self.finish();
                return None;
            };
            self.next += 1;

            let descriptor = *validator.descriptor();
            let config_type = descriptor.config_type();
            let Some(slice) = self.resolver.resolve(self.root, config_type) else {
                tracing::debug!(
                    handler = descriptor.type_name(),
                    config = descriptor.config_type_name(),
                    "configuration slice not present, skipping validator"
                );
                continue;
            };

            match validator.entry().run(self.vault, slice) {
                Ok(findings) => {
                    tracing::debug!(handler = descriptor.type_name(), "running validator");
                    self.current = Some(Running {
                        handler: descriptor.type_name(),
                        config_type: descriptor.config_type(),
                        findings,
                    });
                    return Some(Ok(Step::Started(descriptor.config_type())));
                }
                Err(err) => return self.fail(err),
            }
        }
    }

    fn fail(&mut self, err: DispatchError) -> Option<Result<Step, DispatchError>> {
        tracing::debug!(handler = err.subject(), error = %err, "validation aborted");
        self.finish();
        Some(Err(err))
    }

    fn finish(&mut self) {
        self.current = None;
        self.finished = true;
    }
}

impl<V> Iterator for Findings<'_, V> {
    type Item = Result<ValidationFinding, DispatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.step()? {
                Ok(Step::Started(_)) => continue,
                Ok(Step::Finding(_, finding)) => return Some(Ok(finding)),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl<V> FusedIterator for Findings<'_, V> {}

impl<V> fmt::Debug for Findings<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Findings")
            .field("validators", &self.validators.len())
            .field("next", &self.next)
            .field("running", &self.current.as_ref().map(|r| r.handler))
            .field("finished", &self.finished)
            .finish()
    }
}
