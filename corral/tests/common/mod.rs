#![allow(dead_code)]

use corral::{
    BackgroundOperation, BackgroundTask, BoxError, ConfigChild, ConfigNode, EmptyDirective, Job,
    Schedule, TaskContext, ValidationFinding, Validator,
};
use std::any::Any;
use std::fmt;
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Test Vault
// ============================================================================

/// Records what handlers did so tests can inspect it.
#[derive(Default)]
pub struct Vault {
    pub events: Mutex<Vec<String>>,
    pub constructed: AtomicUsize,
    pub validated: AtomicUsize,
}

impl Vault {
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    pub fn validated(&self) -> usize {
        self.validated.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Test Configuration Tree
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct CleanupConfig {
    pub retention_days: u32,
}

impl ConfigNode for CleanupConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReindexConfig {
    pub batch_size: usize,
}

impl ConfigNode for ReindexConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MailConfig {
    pub host: String,
}

impl ConfigNode for MailConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A configuration type that never appears in [`AppConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct LdapConfig;

impl ConfigNode for LdapConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Storage {
    pub path: String,
    pub mail: MailConfig,
}

impl ConfigNode for Storage {
    fn children(&self) -> Vec<ConfigChild<'_>> {
        vec![ConfigChild::required("mail", &self.mail)]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub name: String,
    pub cleanup: CleanupConfig,
    pub reindex: Option<ReindexConfig>,
    pub storage: Storage,
}

impl AppConfig {
    pub fn sample() -> Self {
        Self {
            name: "Billing".to_owned(),
            cleanup: CleanupConfig { retention_days: 30 },
            reindex: Some(ReindexConfig { batch_size: 500 }),
            storage: Storage {
                path: "/var/lib/billing".to_owned(),
                mail: MailConfig {
                    host: "smtp.example.org".to_owned(),
                },
            },
        }
    }
}

impl ConfigNode for AppConfig {
    fn children(&self) -> Vec<ConfigChild<'_>> {
        vec![
            ConfigChild::required("cleanup", &self.cleanup),
            ConfigChild::optional("reindex", self.reindex.as_ref()),
            ConfigChild::required("storage", &self.storage),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Test Background Tasks
// ============================================================================

/// Recurring every 10 minutes. Records its retention and how many times this
/// instance has run.
pub struct Cleanup {
    config: Option<CleanupConfig>,
    vault: std::sync::Arc<Vault>,
    runs: usize,
}

impl BackgroundOperation for Cleanup {
    const NAME: &'static str = "Cleanup";
    const SCHEDULE: Schedule = Schedule::every_minutes(10);
}

impl BackgroundTask<Vault> for Cleanup {
    type Config = CleanupConfig;
    type Directive = EmptyDirective;

    fn create(ctx: TaskContext<CleanupConfig, Vault>) -> Result<Self, BoxError> {
        ctx.vault.constructed.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            config: ctx.config,
            vault: ctx.vault,
            runs: 0,
        })
    }

    fn task(&mut self, job: &Job, _directive: &EmptyDirective) -> Result<(), BoxError> {
        self.runs += 1;
        let retention = self.config.as_ref().map(|c| c.retention_days);
        self.vault.record(format!(
            "cleanup run={} retention={:?} instance_runs={}",
            job.run_id(),
            retention,
            self.runs
        ));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReindexDirective {
    pub full: bool,
}

/// On demand, takes a [`ReindexDirective`].
pub struct Reindex {
    config: Option<ReindexConfig>,
    vault: std::sync::Arc<Vault>,
}

impl BackgroundOperation for Reindex {
    const NAME: &'static str = "Reindex";
}

impl BackgroundTask<Vault> for Reindex {
    type Config = ReindexConfig;
    type Directive = ReindexDirective;

    fn create(ctx: TaskContext<ReindexConfig, Vault>) -> Result<Self, BoxError> {
        ctx.vault.constructed.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            config: ctx.config,
            vault: ctx.vault,
        })
    }

    fn task(&mut self, _job: &Job, directive: &ReindexDirective) -> Result<(), BoxError> {
        let batch = self.config.as_ref().map(|c| c.batch_size);
        self.vault
            .record(format!("reindex full={} batch={:?}", directive.full, batch));
        Ok(())
    }
}

/// The error [`Exploding`] fails with.
#[derive(Debug, PartialEq)]
pub struct Boom;

impl fmt::Display for Boom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("boom")
    }
}

impl std::error::Error for Boom {}

/// On demand; every run fails with [`Boom`].
pub struct Exploding;

impl BackgroundOperation for Exploding {
    const NAME: &'static str = "Exploding";
}

impl BackgroundTask<Vault> for Exploding {
    type Config = CleanupConfig;
    type Directive = EmptyDirective;

    fn create(_ctx: TaskContext<CleanupConfig, Vault>) -> Result<Self, BoxError> {
        Ok(Exploding)
    }

    fn task(&mut self, _job: &Job, _directive: &EmptyDirective) -> Result<(), BoxError> {
        Err(Boom.into())
    }
}

/// Cannot be constructed.
pub struct Unbuildable;

impl BackgroundOperation for Unbuildable {
    const NAME: &'static str = "Unbuildable";
}

impl BackgroundTask<Vault> for Unbuildable {
    type Config = CleanupConfig;
    type Directive = EmptyDirective;

    fn create(_ctx: TaskContext<CleanupConfig, Vault>) -> Result<Self, BoxError> {
        Err("missing credentials".into())
    }

    fn task(&mut self, _job: &Job, _directive: &EmptyDirective) -> Result<(), BoxError> {
        Ok(())
    }
}

// ============================================================================
// Test Validators
// ============================================================================

/// Validates the root.
pub struct AppValidator;

impl Validator<Vault> for AppValidator {
    type Config = AppConfig;

    fn create() -> Result<Self, BoxError> {
        Ok(AppValidator)
    }

    fn validate<'a>(
        self,
        vault: &'a Vault,
        config: &'a AppConfig,
    ) -> impl Iterator<Item = Result<ValidationFinding, BoxError>> + 'a {
        vault.validated.fetch_add(1, Ordering::SeqCst);
        let name = ValidationFinding::info("name", config.name.clone());
        let mut findings: Vec<Result<ValidationFinding, BoxError>> = vec![Ok(name)];
        if config.reindex.is_none() {
            let disabled = ValidationFinding::warning("reindex", "reindexing disabled");
            findings.push(Ok(disabled));
        }
        findings.into_iter()
    }
}

/// Validates the nested mail settings.
pub struct MailValidator;

impl Validator<Vault> for MailValidator {
    type Config = MailConfig;

    fn create() -> Result<Self, BoxError> {
        Ok(MailValidator)
    }

    fn validate<'a>(
        self,
        vault: &'a Vault,
        config: &'a MailConfig,
    ) -> impl Iterator<Item = Result<ValidationFinding, BoxError>> + 'a {
        vault.validated.fetch_add(1, Ordering::SeqCst);
        let mut findings: Vec<Result<ValidationFinding, BoxError>> = Vec::new();
        if !config.host.contains('.') {
            let unqualified = ValidationFinding::error("mail.host", "host is not qualified");
            findings.push(Ok(unqualified));
        }
        let host = ValidationFinding::info("mail.host", config.host.clone());
        findings.push(Ok(host));
        findings.into_iter()
    }
}

/// Validates a slice the tree does not have.
pub struct LdapValidator;

impl Validator<Vault> for LdapValidator {
    type Config = LdapConfig;

    fn create() -> Result<Self, BoxError> {
        Ok(LdapValidator)
    }

    fn validate<'a>(
        self,
        vault: &'a Vault,
        _config: &'a LdapConfig,
    ) -> impl Iterator<Item = Result<ValidationFinding, BoxError>> + 'a {
        vault.validated.fetch_add(1, Ordering::SeqCst);
        let finding = ValidationFinding::error("ldap", "should never run");
        std::iter::once(Ok::<_, BoxError>(finding))
    }
}

/// Yields one finding, then fails.
pub struct FlakyValidator;

impl Validator<Vault> for FlakyValidator {
    type Config = CleanupConfig;

    fn create() -> Result<Self, BoxError> {
        Ok(FlakyValidator)
    }

    fn validate<'a>(
        self,
        vault: &'a Vault,
        _config: &'a CleanupConfig,
    ) -> impl Iterator<Item = Result<ValidationFinding, BoxError>> + 'a {
        vault.validated.fetch_add(1, Ordering::SeqCst);
        vec![
            Ok(ValidationFinding::info("cleanup", "checked")),
            Err(Box::new(Boom) as BoxError),
        ]
        .into_iter()
    }
}

/// Cannot be constructed.
pub struct BrokenValidator;

impl Validator<Vault> for BrokenValidator {
    type Config = CleanupConfig;

    fn create() -> Result<Self, BoxError> {
        Err("validator unavailable".into())
    }

    fn validate<'a>(
        self,
        _vault: &'a Vault,
        _config: &'a CleanupConfig,
    ) -> impl Iterator<Item = Result<ValidationFinding, BoxError>> + 'a {
        std::iter::empty::<Result<ValidationFinding, BoxError>>()
    }
}
