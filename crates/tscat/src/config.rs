//! Catalog policy configuration.
//!
//! Every behavior that is a genuine design choice (unknown status tokens,
//! duplicate keys, missing placeholder arguments, disambiguator matching,
//! unfinished translations) is a field here rather than a hard-coded rule.
//!
//! # Environment Variables
//! - `TSCAT_STATUS_POLICY` = strict|lenient
//! - `TSCAT_DUPLICATE_POLICY` = last-wins|reject
//! - `TSCAT_SUBSTITUTION` = lenient|strict
//! - `TSCAT_DISAMBIGUATOR` = exact|fallback-to-empty
//! - `TSCAT_USE_UNFINISHED` (bool)

use std::env;
use std::fmt;

use crate::index::DuplicatePolicy;
use crate::parser::StatusPolicy;
use crate::placeholder::SubstitutionMode;
use crate::translator::DisambiguatorPolicy;

const ENV_STATUS_POLICY: &str = "TSCAT_STATUS_POLICY";
const ENV_DUPLICATE_POLICY: &str = "TSCAT_DUPLICATE_POLICY";
const ENV_SUBSTITUTION: &str = "TSCAT_SUBSTITUTION";
const ENV_DISAMBIGUATOR: &str = "TSCAT_DISAMBIGUATOR";
const ENV_USE_UNFINISHED: &str = "TSCAT_USE_UNFINISHED";

/// Catalog loading and lookup policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogConfig {
    /// Unknown `type` attribute handling while parsing.
    pub status_policy: StatusPolicy,
    /// Duplicate key handling while indexing.
    pub duplicates: DuplicatePolicy,
    /// Missing placeholder argument handling at lookup.
    pub substitution: SubstitutionMode,
    /// Matching of disambiguated queries.
    pub disambiguator: DisambiguatorPolicy,
    /// Show unfinished translations that carry text instead of the source.
    pub use_unfinished: bool,
}

/// Configuration parse diagnostics.
#[derive(Debug, Clone)]
pub struct CatalogConfigParse {
    pub config: CatalogConfig,
    pub errors: Vec<CatalogConfigError>,
}

/// A rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: &'static str,
}

impl CatalogConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: &'static str) -> Self {
        Self {
            field,
            value: value.into(),
            message,
        }
    }
}

impl fmt::Display for CatalogConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for CatalogConfigError {}

impl CatalogConfig {
    /// Lenient everywhere: unknown statuses become `Final`, duplicates
    /// replace, missing arguments stay literal.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            status_policy: StatusPolicy::Lenient,
            ..Self::default()
        }
    }

    /// Strict everywhere, for validation runs.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            status_policy: StatusPolicy::Strict,
            duplicates: DuplicatePolicy::Reject,
            substitution: SubstitutionMode::Strict,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    #[must_use]
    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    #[must_use]
    pub fn with_substitution(mut self, mode: SubstitutionMode) -> Self {
        self.substitution = mode;
        self
    }

    #[must_use]
    pub fn with_disambiguator(mut self, policy: DisambiguatorPolicy) -> Self {
        self.disambiguator = policy;
        self
    }

    #[must_use]
    pub fn with_use_unfinished(mut self, enabled: bool) -> Self {
        self.use_unfinished = enabled;
        self
    }

    /// Parse config from environment variables. Invalid values keep their
    /// defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> CatalogConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// One-line summary for log output.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "status={} duplicates={} substitution={} disambiguator={} unfinished={}",
            self.status_policy,
            self.duplicates,
            self.substitution,
            self.disambiguator,
            if self.use_unfinished { "shown" } else { "hidden" },
        )
    }
}

/// Parse config through an arbitrary variable getter.
pub fn from_env_with<F>(mut get: F) -> CatalogConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = CatalogConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_STATUS_POLICY) {
        match StatusPolicy::parse(&value) {
            Some(parsed) => config.status_policy = parsed,
            None => errors.push(CatalogConfigError::new(
                "status_policy",
                value,
                "expected strict|lenient",
            )),
        }
    }

    if let Some(value) = get(ENV_DUPLICATE_POLICY) {
        match DuplicatePolicy::parse(&value) {
            Some(parsed) => config.duplicates = parsed,
            None => errors.push(CatalogConfigError::new(
                "duplicates",
                value,
                "expected last-wins|reject",
            )),
        }
    }

    if let Some(value) = get(ENV_SUBSTITUTION) {
        match SubstitutionMode::parse(&value) {
            Some(parsed) => config.substitution = parsed,
            None => errors.push(CatalogConfigError::new(
                "substitution",
                value,
                "expected lenient|strict",
            )),
        }
    }

    if let Some(value) = get(ENV_DISAMBIGUATOR) {
        match DisambiguatorPolicy::parse(&value) {
            Some(parsed) => config.disambiguator = parsed,
            None => errors.push(CatalogConfigError::new(
                "disambiguator",
                value,
                "expected exact|fallback-to-empty",
            )),
        }
    }

    if let Some(value) = get(ENV_USE_UNFINISHED) {
        match parse_bool(&value) {
            Some(parsed) => config.use_unfinished = parsed,
            None => errors.push(CatalogConfigError::new(
                "use_unfinished",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    CatalogConfigParse { config, errors }
}

#[inline]
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
