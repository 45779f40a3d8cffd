#![forbid(unsafe_code)]

//! Translation catalog loading and runtime lookup.
//!
//! Reads Qt Linguist `.ts` catalogs, indexes their messages by
//! (context, source, disambiguator), and resolves lookups at runtime with
//! `%1`..`%99` placeholder substitution and numerus (plural) forms.
//! Lookups never fail: anything that cannot be translated falls back to the
//! source text.
//!
//! # Layers
//!
//! - [`parser`]: streaming XML reader producing [`Entry`] values.
//! - [`index`]: keyed, immutable index over one catalog.
//! - [`translator`]: lookup, fallback, substitution and plural selection.
//! - [`catalog`]: shareable handle with atomic reload.
//! - [`merge`], [`coverage`]: layering and tooling over built indexes.
//!
//! # Example
//!
//! ```
//! use tscat::{Catalog, CatalogConfig};
//!
//! let ts = br#"<?xml version="1.0" encoding="utf-8"?>
//! <TS version="2.1" language="de">
//! <context>
//!     <name>Files</name>
//!     <message numerus="yes">
//!         <source>%n file(s)</source>
//!         <translation>
//!             <numerusform>%n Datei</numerusform>
//!             <numerusform>%n Dateien</numerusform>
//!         </translation>
//!     </message>
//! </context>
//! </TS>"#;
//!
//! let catalog = Catalog::load(ts, CatalogConfig::default()).unwrap();
//! assert_eq!(catalog.translate_plural("Files", "%n file(s)", 1, &[], None), "1 Datei");
//! assert_eq!(catalog.translate_plural("Files", "%n file(s)", 7, &[], None), "7 Dateien");
//! ```

pub mod catalog;
pub mod config;
pub mod coverage;
pub mod entry;
pub mod index;
pub mod merge;
pub mod parser;
pub mod placeholder;
pub mod plural;
pub mod translator;

pub use catalog::{Catalog, CatalogError, build_translator};
pub use config::{CatalogConfig, CatalogConfigError, CatalogConfigParse};
pub use coverage::{
    ContextCoverage, CoverageReport, PlaceholderMismatch, StatusCounts, validate_placeholders,
};
pub use entry::{Entry, Location, MessageKey, Status};
pub use index::{CatalogIndex, DuplicatePolicy, IndexError};
pub use merge::merge;
pub use parser::{
    CatalogHeader, CatalogParser, ParseError, ParseErrorKind, ParsedCatalog, StatusPolicy,
    parse_catalog,
};
pub use placeholder::{SubstitutionError, SubstitutionMode, substitute};
pub use plural::PluralRule;
pub use translator::{DisambiguatorPolicy, FallbackReason, Lookup, Translator};
