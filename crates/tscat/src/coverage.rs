//! Catalog statistics and placeholder validation.
//!
//! Both passes are read-only over a built [`CatalogIndex`] and are meant
//! for tooling and CI checks rather than the lookup path.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::entry::{Entry, MessageKey, Status};
use crate::index::CatalogIndex;
use crate::placeholder::placeholder_indices;

// =========================================================================
// Coverage
// =========================================================================

/// Entry counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusCounts {
    pub finished: usize,
    pub unfinished: usize,
    pub obsolete: usize,
    pub machine_guess: usize,
    pub confirmed: usize,
}

impl StatusCounts {
    fn record(&mut self, status: Status) {
        match status {
            Status::Final => self.finished += 1,
            Status::Unfinished => self.unfinished += 1,
            Status::Obsolete => self.obsolete += 1,
            Status::MachineGuess => self.machine_guess += 1,
            Status::Confirmed => self.confirmed += 1,
        }
    }

    /// Entries in any usable status.
    #[must_use]
    pub const fn usable(&self) -> usize {
        self.finished + self.machine_guess + self.confirmed
    }

    /// Entries that are not obsolete.
    #[must_use]
    pub const fn live(&self) -> usize {
        self.usable() + self.unfinished
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.live() + self.obsolete
    }

    /// Usable entries as a percentage of live entries (0.0–100.0). An
    /// empty catalog counts as fully covered.
    #[must_use]
    pub fn percent_finished(&self) -> f32 {
        let live = self.live();
        if live == 0 {
            100.0
        } else {
            (self.usable() as f32 / live as f32) * 100.0
        }
    }
}

/// Counts for one context.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextCoverage {
    /// Context name.
    pub context: String,
    pub counts: StatusCounts,
    /// Live entries with no translation text.
    pub untranslated: Vec<String>,
}

/// Coverage report for one catalog.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageReport {
    /// Declared target language, if any.
    pub language: Option<String>,
    pub totals: StatusCounts,
    /// Per-context data, sorted by context name.
    pub contexts: Vec<ContextCoverage>,
}

impl CoverageReport {
    /// Tally every entry of `index`.
    #[must_use]
    pub fn from_index(index: &CatalogIndex) -> Self {
        let mut totals = StatusCounts::default();
        let mut by_context: BTreeMap<&str, ContextCoverage> = BTreeMap::new();

        for entry in index {
            totals.record(entry.status);
            let slot = by_context
                .entry(entry.context.as_str())
                .or_insert_with(|| ContextCoverage {
                    context: entry.context.clone(),
                    counts: StatusCounts::default(),
                    untranslated: Vec::new(),
                });
            slot.counts.record(entry.status);
            if !entry.is_obsolete() && !entry.has_translation() {
                slot.untranslated.push(entry.source.clone());
            }
        }

        Self {
            language: index.header().language.clone(),
            totals,
            contexts: by_context.into_values().collect(),
        }
    }

    #[must_use]
    pub fn percent_finished(&self) -> f32 {
        self.totals.percent_finished()
    }

    /// Coverage of one context, if present.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&ContextCoverage> {
        self.contexts.iter().find(|c| c.context == name)
    }
}

// =========================================================================
// Placeholder validation
// =========================================================================

/// A translation whose `%N` placeholders disagree with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceholderMismatch {
    pub context: String,
    pub source: String,
    pub disambiguator: Option<String>,
    /// Indices the source uses and the translation drops.
    pub missing: Vec<usize>,
    /// Indices the translation uses and the source does not.
    pub extra: Vec<usize>,
}

impl PlaceholderMismatch {
    #[must_use]
    pub fn key(&self) -> MessageKey<'_> {
        MessageKey::new(&self.context, &self.source, self.disambiguator.as_deref())
    }
}

impl fmt::Display for PlaceholderMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.key())?;
        if !self.missing.is_empty() {
            write!(f, " missing {}", join_indices(&self.missing))?;
        }
        if !self.extra.is_empty() {
            write!(f, " extra {}", join_indices(&self.extra))?;
        }
        Ok(())
    }
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| format!("%{i}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn translation_indices(entry: &Entry) -> BTreeSet<usize> {
    if entry.is_plural() {
        entry
            .plural_forms
            .iter()
            .flat_map(|form| placeholder_indices(form))
            .collect()
    } else {
        placeholder_indices(&entry.translation)
    }
}

/// Compare placeholder usage of every live, translated entry against its
/// source. Entries without translation text are skipped since they display
/// the source anyway.
#[must_use]
pub fn validate_placeholders(index: &CatalogIndex) -> Vec<PlaceholderMismatch> {
    let mut mismatches = Vec::new();
    for entry in index {
        if entry.is_obsolete() || !entry.has_translation() {
            continue;
        }
        let expected = placeholder_indices(&entry.source);
        let actual = translation_indices(entry);
        if expected == actual {
            continue;
        }
        mismatches.push(PlaceholderMismatch {
            context: entry.context.clone(),
            source: entry.source.clone(),
            disambiguator: entry.disambiguator.clone(),
            missing: expected.difference(&actual).copied().collect(),
            extra: actual.difference(&expected).copied().collect(),
        });
    }
    if !mismatches.is_empty() {
        tracing::debug!(count = mismatches.len(), "placeholder mismatches found");
    }
    mismatches
}
