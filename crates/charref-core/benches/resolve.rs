//! Benchmarks for named character reference resolution and decoding.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use charref_core::{Context, ReferenceTable, Resolver, decode_text};

/// Generate text of approximately `target_bytes` with a mix of
/// terminated, legacy and bogus references.
fn generate_text(target_bytes: usize) -> String {
    let paragraph = "Fish &amp; chips &copy 2024 &mdash; caf&eacute; &lt;b&gt; \
        &notin; &notit; &foobar; R&D &#38; &CounterClockwiseContourIntegral; \
        plain words with no references at all to pad the line out.\n";

    let repeats = target_bytes / paragraph.len() + 1;
    let mut text = String::with_capacity(target_bytes + paragraph.len());
    for _ in 0..repeats {
        text.push_str(paragraph);
        if text.len() >= target_bytes {
            break;
        }
    }
    text
}

fn bench_table_build(c: &mut Criterion) {
    let json = include_str!("../../charref-table/data/entities.json");
    c.bench_function("table_from_json", |b| {
        b.iter(|| ReferenceTable::from_json(json));
    });
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let resolver = Resolver::html5();

    for name in ["amp;", "amp1", "notin;", "notit;", "CounterClockwiseContourIntegral;", "zzz"] {
        group.bench_with_input(BenchmarkId::new("text", name), name, |b, name| {
            b.iter(|| resolver.resolve(name.chars(), Context::Text));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_text");

    for size in [10_000, 50_000, 100_000] {
        let text = generate_text(size);
        let label = format!("{size}B");

        group.bench_with_input(BenchmarkId::new("decode", &label), &text, |b, text| {
            b.iter(|| decode_text(text));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_table_build, bench_resolve, bench_decode);
criterion_main!(benches);
