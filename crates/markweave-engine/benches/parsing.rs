use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use markweave_engine::{ParseOptions, Parser, RegistryBuilder, extensions, render};
use std::hint::black_box;
mod common;

fn bench_core_vs_pulldown_cmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let registry = markweave_engine::Registry::commonmark();
    for (name, content) in [
        ("simple", common::generate_markdown_content(100)),
        ("large", common::generate_large_document()),
    ] {
        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("markweave", name), &content, |b, content| {
            let parser = Parser::new(&registry, ParseOptions::default());
            b.iter(|| black_box(parser.parse_str(black_box(content))));
        });

        group.bench_with_input(
            BenchmarkId::new("pulldown_cmark", name),
            &content,
            |b, content| {
                b.iter(|| {
                    let events: Vec<_> = pulldown_cmark::Parser::new(black_box(content)).collect();
                    black_box(events);
                });
            },
        );
    }

    group.finish();
}

fn bench_positions(c: &mut Criterion) {
    let mut group = c.benchmark_group("positions");
    group.sample_size(10);

    let registry = markweave_engine::Registry::commonmark();
    let content = common::generate_large_document();
    for track_positions in [false, true] {
        let options = ParseOptions {
            track_positions,
            ..ParseOptions::default()
        };
        group.bench_with_input(
            BenchmarkId::new("track_positions", track_positions),
            &content,
            |b, content| {
                let parser = Parser::new(&registry, options);
                b.iter(|| black_box(parser.parse_str(black_box(content))));
            },
        );
    }

    group.finish();
}

fn bench_extensions_to_html(c: &mut Criterion) {
    let mut group = c.benchmark_group("extensions");
    group.sample_size(10);

    let mut builder = RegistryBuilder::new();
    let mut options = ParseOptions::default();
    for extension in extensions::BUILTIN {
        builder.extension(*extension).unwrap();
        extension.configure(&mut options);
    }
    let registry = builder.build().unwrap();
    let content = common::generate_extension_content(100);

    group.bench_function("parse_and_render", |b| {
        let parser = Parser::new(&registry, options);
        b.iter(|| black_box(render(&parser.parse_str(black_box(&content)))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_core_vs_pulldown_cmark,
    bench_positions,
    bench_extensions_to_html
);
criterion_main!(benches);
