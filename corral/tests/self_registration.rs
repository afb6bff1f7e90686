//! Handlers registered at the item level and collected per crate.

#![cfg(feature = "inventory")]

use corral::testing::RecordingScheduler;
use corral::{
    BackgroundOperation, BoxError, ConfigSource, Dispatcher, HandlerCatalog, HandlerModule,
    JobDispatcher, JobHost, TypeCache, ValidationDispatcher, ValidationFinding, Validator,
};
use std::any::type_name;
use std::sync::Arc;

mod common;
use common::{AppConfig, Cleanup, Exploding, MailConfig, MailValidator, Reindex, Vault};

corral::register_job!(Vault, Cleanup);
corral::register_job!(Vault, Reindex);
corral::register_validator!(Vault, MailValidator);

/// Registered for a different vault type; must not show up for [`Vault`].
struct OtherVault;

struct OtherValidator;

impl Validator<OtherVault> for OtherValidator {
    type Config = MailConfig;

    fn create() -> Result<Self, BoxError> {
        Ok(OtherValidator)
    }

    fn validate<'a>(
        self,
        _vault: &'a OtherVault,
        _config: &'a MailConfig,
    ) -> impl Iterator<Item = Result<ValidationFinding, BoxError>> + 'a {
        std::iter::empty::<Result<ValidationFinding, BoxError>>()
    }
}

corral::register_validator!(OtherVault, OtherValidator);

#[test]
fn crate_module_collects_this_crates_registrations() {
    let module: HandlerModule<Vault> = corral::crate_module!();

    assert_eq!(module.name(), "self_registration");
    let operations: Vec<_> = module
        .jobs()
        .map(|job| job.descriptor().operation())
        .collect();
    assert_eq!(operations, [Cleanup::NAME, Reindex::NAME]);

    let validators: Vec<_> = module
        .validators()
        .map(|v| v.descriptor().type_name())
        .collect();
    assert_eq!(validators, [type_name::<MailValidator>()]);
}

#[test]
fn registrations_are_filtered_by_vault_type() {
    let module = corral::crate_module!(OtherVault);

    assert_eq!(module.jobs().count(), 0);
    assert_eq!(module.validators().count(), 1);
}

#[test]
fn collected_module_drives_both_dispatchers() {
    let vault = Arc::new(Vault::default());
    let config = Arc::new(AppConfig::sample());
    let catalog = HandlerCatalog::with_module(corral::crate_module!(Vault));

    let findings: Vec<_> = ValidationDispatcher::new(
        vault.clone(),
        config.clone(),
        catalog.clone(),
        Arc::new(TypeCache::new()),
    )
    .dispatch()
    .collect::<Result<_, _>>()
    .expect("no errors");
    assert_eq!(findings.len(), 1);

    let scheduler = Arc::new(RecordingScheduler::new());
    let source: Arc<dyn ConfigSource<AppConfig>> = Arc::new(config);
    let host = JobHost::builder("Billing", source, vault, scheduler.clone()).build();
    let registered = JobDispatcher::new(host, catalog)
        .dispatch()
        .expect("dispatch");

    assert_eq!(registered.recurring.len(), 1);
    assert_eq!(registered.on_demand.len(), 1);
    assert_eq!(scheduler.names(), ["Cleanup", "Reindex"]);
}

#[test]
fn foreign_crates_are_not_collected() {
    let module = HandlerModule::<Vault>::collected("some_other_crate");
    assert!(module.is_empty());
}

#[test]
fn catalog_defaults_to_this_crate() {
    let catalog: HandlerCatalog<Vault> = corral::catalog!();
    let scheduler = Arc::new(RecordingScheduler::new());
    let config: Arc<dyn ConfigSource<AppConfig>> = Arc::new(Arc::new(AppConfig::sample()));
    let vault = Arc::new(Vault::default());
    let host = JobHost::builder("Billing", config, vault, scheduler.clone()).build();

    JobDispatcher::new(host, catalog)
        .dispatch()
        .expect("dispatch");

    assert_eq!(scheduler.names(), ["Cleanup", "Reindex"]);
}

#[test]
fn catalog_scans_extra_modules_after_this_crate() {
    let extra = HandlerModule::new("extra")
        .job::<Exploding>()
        .job::<Cleanup>();
    let catalog = corral::catalog!(Vault; extra);

    assert_eq!(catalog.modules().len(), 2);
    let operations: Vec<_> = catalog
        .jobs()
        .iter()
        .map(|job| job.descriptor().operation())
        .collect();
    assert_eq!(operations, [Cleanup::NAME, Reindex::NAME, Exploding::NAME]);
}
