//! Keyed index over one catalog's entries.
//!
//! # Invariants
//!
//! 1. **Deterministic build**: the same entry list always yields an index
//!    that answers every query identically.
//!
//! 2. **Last wins**: under [`DuplicatePolicy::LastWins`] a later entry with
//!    the same (context, source, disambiguator) key replaces the earlier one
//!    in place, so iteration order is the order in which keys first appeared.
//!
//! 3. **Obsolete entries stay inspectable**: they are stored and returned by
//!    [`CatalogIndex::get_any`] and the introspection methods, but never by
//!    [`CatalogIndex::get`].
//!
//! 4. **Thread safety**: the index is immutable after build and `Send + Sync`.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::entry::{Entry, MessageKey};
use crate::parser::{CatalogHeader, ParsedCatalog};

/// Behavior when two entries share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The later entry replaces the earlier one.
    #[default]
    LastWins,
    /// Building fails with [`IndexError::DuplicateKey`].
    Reject,
}

impl DuplicatePolicy {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "last-wins" | "last_wins" | "last" => Some(Self::LastWins),
            "reject" | "error" => Some(Self::Reject),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastWins => "last-wins",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from building an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Two entries share a key and the policy is [`DuplicatePolicy::Reject`].
    DuplicateKey {
        context: String,
        source: String,
        disambiguator: String,
    },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey {
                context,
                source,
                disambiguator,
            } => {
                let key = MessageKey {
                    context: context.as_str(),
                    source: source.as_str(),
                    disambiguator: disambiguator.as_str(),
                };
                write!(f, "duplicate message {key}")
            }
        }
    }
}

impl std::error::Error for IndexError {}

/// Disambiguator → slot. Almost always a single element, so a linear scan
/// beats another map.
type Slots = Vec<(String, usize)>;

/// Index over one catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    header: CatalogHeader,
    entries: Vec<Entry>,
    keys: FxHashMap<String, FxHashMap<String, Slots>>,
}

impl CatalogIndex {
    /// An index with no entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build with last-wins duplicate handling. Never fails.
    #[must_use]
    pub fn build(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut index = Self::new();
        for entry in entries {
            index.insert(entry, DuplicatePolicy::LastWins);
        }
        index.log_built();
        index
    }

    /// Build with an explicit duplicate policy.
    pub fn try_build(
        entries: impl IntoIterator<Item = Entry>,
        policy: DuplicatePolicy,
    ) -> Result<Self, IndexError> {
        let mut index = Self::new();
        for entry in entries {
            if let Some(rejected) = index.insert(entry, policy) {
                return Err(IndexError::DuplicateKey {
                    context: rejected.context,
                    source: rejected.source,
                    disambiguator: rejected.disambiguator.unwrap_or_default(),
                });
            }
        }
        index.log_built();
        Ok(index)
    }

    /// Build from a parsed catalog, keeping its header.
    pub fn from_parsed(parsed: ParsedCatalog, policy: DuplicatePolicy) -> Result<Self, IndexError> {
        let mut index = Self::try_build(parsed.entries, policy)?;
        index.header = parsed.header;
        Ok(index)
    }

    /// Replace the header.
    #[must_use]
    pub fn with_header(mut self, header: CatalogHeader) -> Self {
        self.header = header;
        self
    }

    /// Insert one entry. Returns the entry back when `policy` rejects it.
    fn insert(&mut self, entry: Entry, policy: DuplicatePolicy) -> Option<Entry> {
        let slots = self
            .keys
            .entry(entry.context.clone())
            .or_default()
            .entry(entry.source.clone())
            .or_default();

        let disambiguator = entry.disambiguator_key();
        if let Some(&(_, at)) = slots.iter().find(|(d, _)| d == disambiguator) {
            if policy == DuplicatePolicy::Reject {
                return Some(entry);
            }
            tracing::debug!(key = %entry.key(), "duplicate message replaced");
            self.entries[at] = entry;
            return None;
        }

        slots.push((disambiguator.to_owned(), self.entries.len()));
        self.entries.push(entry);
        None
    }

    fn log_built(&self) {
        tracing::debug!(
            entries = self.entries.len(),
            contexts = self.keys.len(),
            "built catalog index"
        );
    }

    fn slot(&self, context: &str, source: &str, disambiguator: &str) -> Option<usize> {
        self.keys
            .get(context)?
            .get(source)?
            .iter()
            .find(|(d, _)| d == disambiguator)
            .map(|&(_, at)| at)
    }

    /// Entry for the exact key, unless it is obsolete.
    #[must_use]
    pub fn get(&self, context: &str, source: &str, disambiguator: Option<&str>) -> Option<&Entry> {
        self.get_any(context, source, disambiguator)
            .filter(|entry| !entry.is_obsolete())
    }

    /// Entry for the exact key, obsolete or not.
    #[must_use]
    pub fn get_any(
        &self,
        context: &str,
        source: &str,
        disambiguator: Option<&str>,
    ) -> Option<&Entry> {
        self.slot(context, source, disambiguator.unwrap_or(""))
            .map(|at| &self.entries[at])
    }

    /// Whether any entry (including obsolete ones) has this key.
    #[must_use]
    pub fn contains_key(&self, key: MessageKey<'_>) -> bool {
        self.slot(key.context, key.source, key.disambiguator).is_some()
    }

    /// Every context name, sorted.
    #[must_use]
    pub fn all_contexts(&self) -> BTreeSet<&str> {
        self.keys.keys().map(String::as_str).collect()
    }

    /// Entries of one context in index order, obsolete ones included.
    #[must_use]
    pub fn entries_in(&self, context: &str) -> Vec<&Entry> {
        self.entries.iter().filter(|e| e.context == context).collect()
    }

    /// All entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn header(&self) -> &CatalogHeader {
        &self.header
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the index, yielding entries in index order.
    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a CatalogIndex {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
