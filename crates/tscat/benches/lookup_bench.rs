use std::fmt::Write as _;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tscat::{
    Catalog, CatalogConfig, CatalogIndex, SubstitutionMode, parse_catalog, substitute,
};

/// A synthetic catalog with `contexts * per_context` messages, a tenth of
/// them disambiguated and a tenth numerus.
fn synthetic_catalog(contexts: usize, per_context: usize) -> String {
    let mut doc = String::from(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS version=\"2.1\" language=\"ru_RU\">\n",
    );
    for c in 0..contexts {
        let _ = writeln!(doc, "<context>\n    <name>Context{c}</name>");
        for m in 0..per_context {
            let _ = writeln!(doc, "    <message>");
            let _ = writeln!(
                doc,
                "        <location filename=\"../src/file{c}.cpp\" line=\"{m}\"/>"
            );
            if m % 10 == 9 {
                let _ = writeln!(doc, "        <source>%n item(s) in message {m}</source>");
                let _ = writeln!(
                    doc,
                    "        <translation>\n            <numerusform>%n элемент {m}</numerusform>\n            <numerusform>%n элемента {m}</numerusform>\n            <numerusform>%n элементов {m}</numerusform>\n        </translation>"
                );
            } else {
                let _ = writeln!(doc, "        <source>Message {m} with %1 &amp; %2</source>");
                if m % 10 == 3 {
                    let _ = writeln!(doc, "        <comment>variant</comment>");
                }
                let _ = writeln!(
                    doc,
                    "        <translation>Сообщение {m}: %2 &amp; %1</translation>"
                );
            }
            let _ = writeln!(doc, "    </message>");
        }
        let _ = writeln!(doc, "</context>");
    }
    doc.push_str("</TS>\n");
    doc
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("tscat/parse");
    for &(contexts, per_context) in &[(10usize, 50usize), (50, 200)] {
        let doc = synthetic_catalog(contexts, per_context);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(contexts * per_context),
            doc.as_bytes(),
            |b, bytes| b.iter(|| parse_catalog(black_box(bytes)).map(|p| p.entries.len())),
        );
    }
    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let doc = synthetic_catalog(50, 200);
    let parsed = parse_catalog(doc.as_bytes()).expect("synthetic catalog parses");
    c.bench_function("tscat/index_build/10000", |b| {
        b.iter(|| CatalogIndex::build(black_box(parsed.entries.clone())).len())
    });
}

fn bench_lookup(c: &mut Criterion) {
    let doc = synthetic_catalog(50, 200);
    let catalog = Catalog::load(doc.as_bytes(), CatalogConfig::default()).expect("loads");
    let snapshot = catalog.snapshot();

    let mut group = c.benchmark_group("tscat/lookup");
    group.bench_function("hit", |b| {
        b.iter(|| {
            snapshot.translate(
                black_box("Context25"),
                black_box("Message 120 with %1 & %2"),
                &["a", "b"],
                None,
            )
        })
    });
    group.bench_function("hit_disambiguated", |b| {
        b.iter(|| {
            snapshot.translate(
                black_box("Context25"),
                black_box("Message 123 with %1 & %2"),
                &["a", "b"],
                Some("variant"),
            )
        })
    });
    group.bench_function("miss", |b| {
        b.iter(|| snapshot.translate(black_box("Context25"), black_box("Not there %1"), &["a"], None))
    });
    group.bench_function("plural", |b| {
        b.iter(|| {
            snapshot.translate_plural(
                black_box("Context7"),
                black_box("%n item(s) in message 49"),
                black_box(23),
                &[],
                None,
            )
        })
    });
    group.bench_function("through_handle", |b| {
        b.iter(|| {
            catalog.translate(
                black_box("Context25"),
                black_box("Message 120 with %1 & %2"),
                &["a", "b"],
                None,
            )
        })
    });
    group.finish();
}

fn bench_substitute(c: &mut Criterion) {
    let template = "Copied %1 of %2 files to %3 (%4%, %n remaining)";
    c.bench_function("tscat/substitute", |b| {
        b.iter(|| {
            substitute(
                black_box(template),
                &["12", "40", "/tmp/out", "30"],
                Some(28),
                SubstitutionMode::Strict,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_index_build,
    bench_lookup,
    bench_substitute
);
criterion_main!(benches);
