//! Criterion benchmarks for jgrab-core parsing and dataset construction
//!
//! Run with: cargo bench -p jgrab-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jgrab_core::{ChannelDataset, ParserOptions, SampleTiming, ScaleFactors, parse_str};

/// Render a capture with `samples` values per channel.
fn generate_capture(samples: usize) -> String {
    let mut doc = String::from(" <sp ok\nJGRAB\n");
    for channel in 0..5 {
        for i in 0..samples {
            let value = ((i * 37 + channel * 11) % 20_000) as i64 - 10_000;
            doc.push_str(&format!(" {value:06}  % note\n"));
        }
        doc.push_str(&format!("%% {channel}  -19993\n"));
    }
    doc
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parse");
    let options = ParserOptions::default();

    for samples in [128, 1024, 8192] {
        let doc = generate_capture(samples);
        group.bench_with_input(BenchmarkId::from_parameter(samples), &doc, |b, doc| {
            b.iter(|| parse_str(black_box(doc), &options));
        });
    }

    group.finish();
}

fn bench_dataset(c: &mut Criterion) {
    let raw = parse_str(&generate_capture(1024), &ParserOptions::default());
    let timing = SampleTiming::default();
    let scales = ScaleFactors::default();

    c.bench_function("Dataset_1024", |b| {
        b.iter(|| ChannelDataset::from_raw(black_box(&raw), &timing, &scales));
    });
}

criterion_group!(benches, bench_parse, bench_dataset);
criterion_main!(benches);
