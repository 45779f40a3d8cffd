//! Layering of override catalogs over a base catalog.
//!
//! A key defined by any override takes that override's entry (later
//! overrides beat earlier ones); keys only the base defines keep the base
//! entry. An obsolete override entry still defines its key, so it shadows
//! the base and lookups fall back to the source text.

use crate::index::CatalogIndex;

/// Merge `overrides` over `base` into a new index.
///
/// Header attributes are taken from the last layer that declares them, so
/// an override built in memory (with an empty header) keeps the base
/// language. Iteration order follows first appearance of each key: base
/// keys first, then keys new in each override.
#[must_use]
pub fn merge<'a>(
    base: &CatalogIndex,
    overrides: impl IntoIterator<Item = &'a CatalogIndex>,
) -> CatalogIndex {
    let mut header = base.header().clone();
    let mut entries: Vec<_> = base.iter().cloned().collect();
    let mut layers = 0usize;

    for layer in overrides {
        let top = layer.header();
        header.version = top.version.clone().or(header.version);
        header.language = top.language.clone().or(header.language);
        header.source_language = top.source_language.clone().or(header.source_language);
        entries.extend(layer.iter().cloned());
        layers += 1;
    }

    let merged = CatalogIndex::build(entries).with_header(header);
    tracing::debug!(
        base = base.len(),
        layers,
        merged = merged.len(),
        "merged catalogs"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, Status};
    use crate::parser::CatalogHeader;

    fn header(lang: &str) -> CatalogHeader {
        CatalogHeader {
            language: Some(lang.into()),
            ..CatalogHeader::default()
        }
    }

    fn text<'a>(index: &'a CatalogIndex, source: &str) -> Option<&'a str> {
        index.get("C", source, None).map(|e| e.translation.as_str())
    }

    #[test]
    fn override_beats_base() {
        let base = CatalogIndex::build(vec![Entry::new("C", "K", "base"), Entry::new("C", "B", "only base")]);
        let over = CatalogIndex::build(vec![Entry::new("C", "K", "override")]);
        let merged = merge(&base, [&over]);
        assert_eq!(text(&merged, "K"), Some("override"));
        assert_eq!(text(&merged, "B"), Some("only base"));
    }

    #[test]
    fn later_override_wins() {
        let base = CatalogIndex::build(vec![Entry::new("C", "K", "base")]);
        let first = CatalogIndex::build(vec![Entry::new("C", "K", "first"), Entry::new("C", "F", "f")]);
        let second = CatalogIndex::build(vec![Entry::new("C", "K", "second")]);
        let merged = merge(&base, [&first, &second]);
        assert_eq!(text(&merged, "K"), Some("second"));
        assert_eq!(text(&merged, "F"), Some("f"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn obsolete_override_shadows_base() {
        let base = CatalogIndex::build(vec![Entry::new("C", "K", "base")]);
        let over = CatalogIndex::build(vec![Entry::new("C", "K", "gone").with_status(Status::Obsolete)]);
        let merged = merge(&base, [&over]);
        assert_eq!(text(&merged, "K"), None);
        assert!(merged.get_any("C", "K", None).is_some());
    }

    #[test]
    fn header_from_last_declaring_layer() {
        let base = CatalogIndex::new().with_header(header("de"));
        let over = CatalogIndex::new().with_header(header("de_AT"));
        let bare = CatalogIndex::new();
        assert_eq!(merge(&base, [&over]).header().language.as_deref(), Some("de_AT"));
        assert_eq!(merge(&base, [&over, &bare]).header().language.as_deref(), Some("de_AT"));
        assert_eq!(merge(&base, [&bare]).header().language.as_deref(), Some("de"));
        assert_eq!(merge(&base, [] as [&CatalogIndex; 0]).header().language.as_deref(), Some("de"));
    }

    #[test]
    fn no_overrides_is_identity() {
        let base = CatalogIndex::build(vec![Entry::new("C", "a", "A"), Entry::new("C", "b", "B")]);
        let merged = merge(&base, [] as [&CatalogIndex; 0]);
        let left: Vec<&Entry> = base.iter().collect();
        let right: Vec<&Entry> = merged.iter().collect();
        assert_eq!(left, right);
    }
}
