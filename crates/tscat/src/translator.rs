//! Runtime lookup engine.
//!
//! # Invariants
//!
//! 1. **Never blank**: `translate` returns either a usable translation or the
//!    source text, both with placeholders substituted. Not-found is a normal
//!    outcome, not an error.
//!
//! 2. **Read-only**: a `Translator` is immutable after construction, so any
//!    number of threads may query it without synchronization.
//!
//! 3. **Two states**: a translator is either loaded (backed by an index) or
//!    empty; an empty translator falls back for every query.
//!
//! # Resolution order
//!
//! | Index result | Outcome |
//! |--------------|---------|
//! | No entry | source |
//! | `Obsolete` | source |
//! | `Unfinished` | source (translation when `use_unfinished` is set and non-empty) |
//! | Empty translation | source |
//! | `Final` / `MachineGuess` / `Confirmed` | translation |

use std::fmt;

use crate::config::CatalogConfig;
use crate::entry::{Entry, Status};
use crate::index::CatalogIndex;
use crate::placeholder::{SubstitutionError, substitute, substitute_lenient};
use crate::plural::PluralRule;

/// How a query carrying a disambiguator is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisambiguatorPolicy {
    /// Only the exact key matches; the empty disambiguator is its own key.
    #[default]
    Exact,
    /// When the exact key is absent, retry with the empty disambiguator.
    FallbackToEmpty,
}

impl DisambiguatorPolicy {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(Self::Exact),
            "fallback-to-empty" | "fallback_to_empty" | "fallback" => Some(Self::FallbackToEmpty),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::FallbackToEmpty => "fallback-to-empty",
        }
    }
}

impl fmt::Display for DisambiguatorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a lookup fell back to the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NotLoaded,
    NotFound,
    Obsolete,
    Unfinished,
    Untranslated,
}

impl FallbackReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotLoaded => "not-loaded",
            Self::NotFound => "not-found",
            Self::Obsolete => "obsolete",
            Self::Unfinished => "unfinished",
            Self::Untranslated => "untranslated",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving a key, before substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Translated(&'a Entry),
    Fallback(FallbackReason),
}

impl<'a> Lookup<'a> {
    #[must_use]
    pub fn entry(self) -> Option<&'a Entry> {
        match self {
            Self::Translated(entry) => Some(entry),
            Self::Fallback(_) => None,
        }
    }

    #[must_use]
    pub fn is_translated(self) -> bool {
        matches!(self, Self::Translated(_))
    }
}

/// Lookup engine over one immutable index.
#[derive(Debug, Clone)]
pub struct Translator {
    index: CatalogIndex,
    config: CatalogConfig,
    plural_rule: PluralRule,
    loaded: bool,
}

impl Default for Translator {
    fn default() -> Self {
        Self::empty(CatalogConfig::default())
    }
}

impl Translator {
    /// A loaded translator. The plural rule comes from the index header's
    /// language.
    #[must_use]
    pub fn new(index: CatalogIndex, config: CatalogConfig) -> Self {
        let plural_rule = index
            .header()
            .language
            .as_deref()
            .map(PluralRule::for_language)
            .unwrap_or_default();
        Self {
            index,
            config,
            plural_rule,
            loaded: true,
        }
    }

    /// The "no catalog loaded" state.
    #[must_use]
    pub fn empty(config: CatalogConfig) -> Self {
        Self {
            index: CatalogIndex::new(),
            config,
            plural_rule: PluralRule::default(),
            loaded: false,
        }
    }

    /// Override the plural rule derived from the catalog language.
    #[must_use]
    pub fn with_plural_rule(mut self, rule: PluralRule) -> Self {
        self.plural_rule = rule;
        self
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    #[must_use]
    pub fn plural_rule(&self) -> PluralRule {
        self.plural_rule
    }

    fn find(&self, context: &str, source: &str, disambiguator: Option<&str>) -> Option<&Entry> {
        let exact = self.index.get_any(context, source, disambiguator);
        if exact.is_some_and(|e| !e.is_obsolete())
            || self.config.disambiguator != DisambiguatorPolicy::FallbackToEmpty
        {
            return exact;
        }
        // An obsolete exact hit counts as a miss; it is only reported when the
        // plain entry is absent too.
        let plain = match disambiguator {
            Some(d) if !d.is_empty() => self.index.get(context, source, None),
            _ => None,
        };
        plain.or(exact)
    }

    /// Resolve a key to a usable entry or a fallback reason.
    #[must_use]
    pub fn lookup(&self, context: &str, source: &str, disambiguator: Option<&str>) -> Lookup<'_> {
        if !self.loaded {
            return Lookup::Fallback(FallbackReason::NotLoaded);
        }
        let Some(entry) = self.find(context, source, disambiguator) else {
            return Lookup::Fallback(FallbackReason::NotFound);
        };
        match entry.status {
            Status::Obsolete => Lookup::Fallback(FallbackReason::Obsolete),
            Status::Unfinished if !self.config.use_unfinished => {
                Lookup::Fallback(FallbackReason::Unfinished)
            }
            _ if !entry.has_translation() => Lookup::Fallback(FallbackReason::Untranslated),
            _ => Lookup::Translated(entry),
        }
    }

    /// Translate and substitute. Never fails: in strict substitution mode a
    /// missing argument is logged and the token is left in place.
    #[must_use]
    pub fn translate(
        &self,
        context: &str,
        source: &str,
        args: &[&str],
        disambiguator: Option<&str>,
    ) -> String {
        let template = self.template(context, source, disambiguator, None);
        self.render_or_warn(context, template, args, None)
    }

    /// Translate and substitute, surfacing [`SubstitutionError`] when the
    /// substitution mode is strict.
    pub fn try_translate(
        &self,
        context: &str,
        source: &str,
        args: &[&str],
        disambiguator: Option<&str>,
    ) -> Result<String, SubstitutionError> {
        let template = self.template(context, source, disambiguator, None);
        substitute(template, args, None, self.config.substitution)
    }

    /// Translate a numerus message. The form is picked by the plural rule,
    /// `%n` becomes `n`, then `%N` arguments are substituted.
    #[must_use]
    pub fn translate_plural(
        &self,
        context: &str,
        source: &str,
        n: i64,
        args: &[&str],
        disambiguator: Option<&str>,
    ) -> String {
        let template = self.template(context, source, disambiguator, Some(n));
        self.render_or_warn(context, template, args, Some(n))
    }

    /// Strict-capable variant of [`Translator::translate_plural`].
    pub fn try_translate_plural(
        &self,
        context: &str,
        source: &str,
        n: i64,
        args: &[&str],
        disambiguator: Option<&str>,
    ) -> Result<String, SubstitutionError> {
        let template = self.template(context, source, disambiguator, Some(n));
        substitute(template, args, Some(n), self.config.substitution)
    }

    /// The unsubstituted text a query resolves to.
    fn template<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguator: Option<&str>,
        count: Option<i64>,
    ) -> &'a str {
        let Lookup::Translated(entry) = self.lookup(context, source, disambiguator) else {
            return source;
        };
        let text = match count {
            Some(n) if entry.is_plural() => self
                .plural_rule
                .select(&entry.plural_forms, n)
                .unwrap_or(""),
            _ => entry.translation.as_str(),
        };
        if text.is_empty() { source } else { text }
    }

    fn render_or_warn(
        &self,
        context: &str,
        template: &str,
        args: &[&str],
        count: Option<i64>,
    ) -> String {
        match substitute(template, args, count, self.config.substitution) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(context, template, error = %err, "unsatisfied placeholder");
                substitute_lenient(template, args, count)
            }
        }
    }
}
