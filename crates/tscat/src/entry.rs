//! In-memory model of a single translation unit.
//!
//! Entries are created wholesale when a catalog is parsed and never mutated
//! afterwards. The raw `type` vocabulary of the catalog format stops at
//! [`Status::from_marker`]; everything past the parser works with [`Status`].

use std::fmt;

/// Usability classification of a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Status {
    /// Translated, no status marker.
    Final,
    /// Not yet translated, or translated but awaiting review.
    Unfinished,
    /// The source string disappeared from the application ("vanished").
    Obsolete,
    /// Filled in by a tool and not reviewed by a translator.
    MachineGuess,
    /// Reviewed and explicitly marked correct.
    Confirmed,
}

impl Status {
    /// Map a `type` attribute value to a status.
    ///
    /// Returns `None` for tokens outside the known vocabulary; the parser
    /// decides what to do with those.
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.trim().to_ascii_lowercase().as_str() {
            "finished" => Some(Self::Final),
            "unfinished" | "new" => Some(Self::Unfinished),
            "vanished" | "obsolete" => Some(Self::Obsolete),
            "guess" => Some(Self::MachineGuess),
            "correct" => Some(Self::Confirmed),
            _ => None,
        }
    }

    /// Whether an entry in this status may be shown to end users when it
    /// carries text. Unfinished entries are governed by configuration.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        matches!(self, Self::Final | Self::MachineGuess | Self::Confirmed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Final => "final",
            Self::Unfinished => "unfinished",
            Self::Obsolete => "obsolete",
            Self::MachineGuess => "machine-guess",
            Self::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source reference recorded by the extraction tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub filename: Option<String>,
    /// Line number as written in the catalog. Relative forms (`+3`) are kept
    /// verbatim.
    pub line: Option<String>,
}

/// One translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    pub context: String,
    pub source: String,
    /// Disambiguating comment. `None` and `Some("")` address the same key.
    pub disambiguator: Option<String>,
    pub translation: String,
    pub status: Status,
    /// Translator-facing note; never part of the key, never displayed.
    pub translator_note: Option<String>,
    /// Developer comment for translators (`extracomment`).
    pub extracted_comment: Option<String>,
    /// Numerus forms, in the order the plural rule indexes them.
    pub plural_forms: Vec<String>,
    pub locations: Vec<Location>,
    pub id: Option<String>,
}

impl Entry {
    /// Create a finished entry with no disambiguator.
    #[must_use]
    pub fn new(
        context: impl Into<String>,
        source: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
            disambiguator: None,
            translation: translation.into(),
            status: Status::Final,
            translator_note: None,
            extracted_comment: None,
            plural_forms: Vec::new(),
            locations: Vec::new(),
            id: None,
        }
    }

    /// Set the disambiguating comment.
    #[must_use]
    pub fn with_disambiguator(mut self, disambiguator: impl Into<String>) -> Self {
        self.disambiguator = Some(disambiguator.into());
        self
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Set the numerus forms. The first form also becomes `translation`.
    #[must_use]
    pub fn with_plural_forms(mut self, forms: Vec<String>) -> Self {
        if let Some(first) = forms.first() {
            self.translation.clone_from(first);
        }
        self.plural_forms = forms;
        self
    }

    /// Set the translator note.
    #[must_use]
    pub fn with_translator_note(mut self, note: impl Into<String>) -> Self {
        self.translator_note = Some(note.into());
        self
    }

    /// The disambiguator as used for keying (`""` when absent).
    #[must_use]
    pub fn disambiguator_key(&self) -> &str {
        self.disambiguator.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn is_obsolete(&self) -> bool {
        self.status == Status::Obsolete
    }

    #[must_use]
    pub fn is_plural(&self) -> bool {
        !self.plural_forms.is_empty()
    }

    /// Whether any translated text is present (in the singular or any form).
    #[must_use]
    pub fn has_translation(&self) -> bool {
        !self.translation.is_empty() || self.plural_forms.iter().any(|f| !f.is_empty())
    }

    /// Borrowed natural key of this entry.
    #[must_use]
    pub fn key(&self) -> MessageKey<'_> {
        MessageKey {
            context: &self.context,
            source: &self.source,
            disambiguator: self.disambiguator_key(),
        }
    }
}

/// Natural key of an entry: (context, source, disambiguator-or-empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey<'a> {
    pub context: &'a str,
    pub source: &'a str,
    pub disambiguator: &'a str,
}

impl<'a> MessageKey<'a> {
    #[must_use]
    pub fn new(context: &'a str, source: &'a str, disambiguator: Option<&'a str>) -> Self {
        Self {
            context,
            source,
            disambiguator: disambiguator.unwrap_or(""),
        }
    }
}

impl fmt::Display for MessageKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disambiguator.is_empty() {
            write!(f, "{}::{:?}", self.context, self.source)
        } else {
            write!(f, "{}::{:?} ({})", self.context, self.source, self.disambiguator)
        }
    }
}
