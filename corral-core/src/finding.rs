//! Validation findings and the results hosts keep between passes.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational remark.
    Info,
    /// Suspicious but usable configuration.
    Warning,
    /// Invalid configuration.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A single issue a validator reports against its configuration slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFinding {
    severity: Severity,
    message: String,
    target: String,
}

impl ValidationFinding {
    /// Create a finding.
    pub fn new(severity: Severity, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            target: target.into(),
        }
    }

    /// An [`Severity::Info`] finding.
    pub fn info(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, target, message)
    }

    /// A [`Severity::Warning`] finding.
    pub fn warning(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, target, message)
    }

    /// A [`Severity::Error`] finding.
    pub fn error(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, target, message)
    }

    /// The finding's severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Reference to the configuration element the finding is about.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.target, self.message)
    }
}

/// Findings collected for one configuration sub-type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResults {
    findings: Vec<ValidationFinding>,
}

impl ValidationResults {
    /// Wrap a list of findings.
    pub fn new(findings: Vec<ValidationFinding>) -> Self {
        Self { findings }
    }

    /// All findings, in the order validators produced them.
    pub fn findings(&self) -> &[ValidationFinding] {
        &self.findings
    }

    /// Findings of [`Severity::Error`].
    pub fn errors(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }

    /// `true` when no finding is an error.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Number of findings.
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// `true` when there are no findings at all.
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub(crate) fn push(&mut self, finding: ValidationFinding) {
        self.findings.push(finding);
    }
}

impl FromIterator<ValidationFinding> for ValidationResults {
    fn from_iter<I: IntoIterator<Item = ValidationFinding>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Validation results keyed by configuration sub-type.
///
/// Owned by the host and shared with background tasks, which look up the
/// results for their own configuration type when they are constructed.
#[derive(Debug, Default)]
pub struct ValidationResultMap {
    inner: RwLock<HashMap<TypeId, Arc<ValidationResults>>>,
}

impl ValidationResultMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store results for configuration type `C`, replacing earlier ones.
    pub fn insert<C: 'static>(&self, results: ValidationResults) {
        self.insert_for(TypeId::of::<C>(), results);
    }

    /// Store results under an explicit configuration type id.
    pub fn insert_for(&self, config_type: TypeId, results: ValidationResults) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(config_type, Arc::new(results));
    }

    /// Create empty results for `config_type` unless some already exist.
    pub fn open(&self, config_type: TypeId) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(config_type)
            .or_default();
    }

    /// Append one finding to the results for `config_type`.
    pub fn record(&self, config_type: TypeId, finding: ValidationFinding) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let entry = inner.entry(config_type).or_default();
        Arc::make_mut(entry).push(finding);
    }

    /// Results for an explicit configuration type id.
    pub fn get(&self, config_type: TypeId) -> Option<Arc<ValidationResults>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&config_type)
            .cloned()
    }

    /// Results for configuration type `C`.
    pub fn get_for<C: 'static>(&self) -> Option<Arc<ValidationResults>> {
        self.get(TypeId::of::<C>())
    }

    /// Number of configuration types with results.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when no results are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
