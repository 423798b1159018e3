//! Benchmarks for markdown rendering.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use markpad::document::{DEFAULT_MARKDOWN, render};

fn bench_render_simple(c: &mut Criterion) {
    let md = "# Hello\n\nWorld";
    c.bench_function("render_simple", |b| b.iter(|| render(black_box(md))));
}

fn bench_render_welcome(c: &mut Criterion) {
    c.bench_function("render_welcome", |b| {
        b.iter(|| render(black_box(DEFAULT_MARKDOWN)))
    });
}

fn bench_render_large(c: &mut Criterion) {
    let mut md = String::from("# Large Document\n\n");
    for i in 1..=500 {
        md.push_str(&format!("## Section {i}\n\nLine one\nline two with ~~strike~~\n\n"));
        md.push_str("| a | b |\n|---|---|\n| 1 | 2 |\n\n");
    }
    c.bench_function("render_large", |b| b.iter(|| render(black_box(&md))));
}

criterion_group!(
    benches,
    bench_render_simple,
    bench_render_welcome,
    bench_render_large
);
criterion_main!(benches);
