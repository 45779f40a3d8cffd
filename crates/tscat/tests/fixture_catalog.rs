//! End-to-end checks against a realistic catalog file.

use std::path::PathBuf;

use tscat::{
    Catalog, CatalogConfig, CatalogIndex, CoverageReport, DisambiguatorPolicy, FallbackReason,
    Lookup, Status, SubstitutionMode, Translator, parse_catalog, validate_placeholders,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/app_fr.ts")
}

fn load(config: CatalogConfig) -> Catalog {
    Catalog::load_file(fixture_path(), config).expect("fixture loads")
}

#[test]
fn header_and_entry_count() {
    let bytes = std::fs::read(fixture_path()).unwrap();
    let parsed = parse_catalog(&bytes).unwrap();
    assert_eq!(parsed.header.version.as_deref(), Some("2.1"));
    assert_eq!(parsed.header.language.as_deref(), Some("fr_FR"));
    assert_eq!(parsed.header.source_language.as_deref(), Some("en_US"));
    assert_eq!(parsed.entries.len(), 11);

    let first = &parsed.entries[0];
    assert_eq!(first.context, "MainWindow");
    assert_eq!(first.source, "&File");
    assert_eq!(first.translation, "&Fichier");
    assert_eq!(first.locations[0].filename.as_deref(), Some("../src/mainwindow.cpp"));
    assert_eq!(first.locations[0].line.as_deref(), Some("42"));
}

#[test]
fn statuses_from_markers() {
    let bytes = std::fs::read(fixture_path()).unwrap();
    let parsed = parse_catalog(&bytes).unwrap();
    let status_of = |source: &str| {
        parsed
            .entries
            .iter()
            .find(|e| e.source == source)
            .map(|e| e.status)
    };
    assert_eq!(status_of("Open"), Some(Status::Final));
    assert_eq!(status_of("Export"), Some(Status::Unfinished));
    assert_eq!(status_of("Legacy mode"), Some(Status::Obsolete));
    assert_eq!(status_of("Version %1 (built %2)"), Some(Status::Obsolete));
}

#[test]
fn translate_basic_and_escaped() {
    let catalog = load(CatalogConfig::default());
    assert_eq!(catalog.translate("MainWindow", "&File", &[], None), "&Fichier");
    assert_eq!(
        catalog.translate("AboutDialog", "License: <b>MIT</b>", &[], None),
        "Licence : <b>MIT</b>"
    );
    assert_eq!(catalog.translate("AboutDialog", "Close", &[], None), "Fermer");
}

#[test]
fn placeholders_reordered_by_index() {
    let catalog = load(CatalogConfig::default());
    assert_eq!(
        catalog.translate("MainWindow", "Copied %1 to %2", &["a.txt", "/tmp"], None),
        "a.txt copié vers /tmp"
    );
}

#[test]
fn disambiguators_select_distinct_entries() {
    let catalog = load(CatalogConfig::default());
    assert_eq!(catalog.translate("MainWindow", "Open", &[], Some("MenuAction")), "Ouvrir");
    assert_eq!(
        catalog.translate("MainWindow", "Open", &[], Some("FileAction")),
        "Ouvrir le fichier"
    );
    // No entry has the empty disambiguator for this source.
    assert_eq!(catalog.translate("MainWindow", "Open", &[], None), "Open");
}

#[test]
fn fallback_to_empty_disambiguator_is_opt_in() {
    let config = CatalogConfig::default().with_disambiguator(DisambiguatorPolicy::FallbackToEmpty);
    let catalog = load(config);
    assert_eq!(catalog.translate("AboutDialog", "Close", &[], Some("Button")), "Fermer");
    let strict = load(CatalogConfig::default());
    assert_eq!(strict.translate("AboutDialog", "Close", &[], Some("Button")), "Close");
}

#[test]
fn unfinished_and_obsolete_fall_back() {
    let catalog = load(CatalogConfig::default());
    let snapshot = catalog.snapshot();
    assert_eq!(
        snapshot.lookup("MainWindow", "Export", None),
        Lookup::Fallback(FallbackReason::Unfinished)
    );
    assert_eq!(
        snapshot.lookup("MainWindow", "Legacy mode", None),
        Lookup::Fallback(FallbackReason::Obsolete)
    );
    assert_eq!(catalog.translate("MainWindow", "Export", &[], None), "Export");
    assert_eq!(
        catalog.translate("AboutDialog", "Version %1 (built %2)", &["2.0", "today"], None),
        "Version 2.0 (built today)"
    );

    let showing = load(CatalogConfig::default().with_use_unfinished(true));
    assert_eq!(showing.translate("MainWindow", "Export", &[], None), "Exporter");
    // Still no text to show.
    assert_eq!(showing.translate("MainWindow", "Print", &[], None), "Print");
}

#[test]
fn french_plural_forms() {
    let catalog = load(CatalogConfig::default());
    let key = "%n file(s) selected";
    assert_eq!(catalog.translate_plural("MainWindow", key, 0, &[], None), "0 fichier sélectionné");
    assert_eq!(catalog.translate_plural("MainWindow", key, 1, &[], None), "1 fichier sélectionné");
    assert_eq!(catalog.translate_plural("MainWindow", key, 12, &[], None), "12 fichiers sélectionnés");
}

#[test]
fn strict_substitution_reports_missing_argument() {
    let catalog = load(CatalogConfig::default().with_substitution(SubstitutionMode::Strict));
    let err = catalog
        .try_translate("MainWindow", "Copied %1 to %2", &["a.txt"], None)
        .unwrap_err();
    assert_eq!(err.index, 2);
    // The infallible path keeps the token.
    assert_eq!(
        catalog.translate("MainWindow", "Copied %1 to %2", &["a.txt"], None),
        "a.txt copié vers %2"
    );
}

#[test]
fn coverage_of_fixture() {
    let catalog = load(CatalogConfig::default());
    let snapshot = catalog.snapshot();
    let report = CoverageReport::from_index(snapshot.index());
    assert_eq!(report.language.as_deref(), Some("fr_FR"));
    assert_eq!(report.totals.obsolete, 2);
    assert_eq!(report.totals.unfinished, 2);
    assert_eq!(report.totals.usable(), 7);
    let main = report.context("MainWindow").unwrap();
    assert_eq!(main.untranslated, vec!["Print".to_string()]);
    assert!(validate_placeholders(snapshot.index()).is_empty());
}

#[test]
fn merge_override_layer() {
    let catalog = load(CatalogConfig::default());
    let base = catalog.snapshot();
    let patch = CatalogIndex::build(vec![tscat::Entry::new("AboutDialog", "Close", "Fermer la fenêtre")]);
    let merged = tscat::merge(base.index(), [&patch]);
    let translator = Translator::new(merged, *catalog.config());
    catalog.replace(translator);
    assert_eq!(catalog.translate("AboutDialog", "Close", &[], None), "Fermer la fenêtre");
    assert_eq!(catalog.translate("MainWindow", "&File", &[], None), "&Fichier");
    assert_eq!(catalog.generation(), 1);
}

#[cfg(feature = "serde")]
#[test]
fn coverage_serializes() {
    let catalog = load(CatalogConfig::default());
    let report = CoverageReport::from_index(catalog.snapshot().index());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["language"], "fr_FR");
    assert_eq!(json["totals"]["obsolete"], 2);
}
