use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion};
use mdpad_core::EXAMPLES;
use mdpad_render::markdown::Transform;
use mdpad_render::{Highlighter, MarkdownRenderer, RenderConfig, RenderPipeline};

fn bench_render_examples(c: &mut Criterion) {
    let renderer = MarkdownRenderer::new();
    for example in EXAMPLES {
        c.bench_function(&format!("render_{}", example.name), |b| {
            b.iter(|| black_box(renderer.render(black_box(example.content)).unwrap()))
        });
    }
}

fn bench_render_large_document(c: &mut Criterion) {
    let renderer = MarkdownRenderer::new();
    let doc: String = EXAMPLES.iter().map(|e| e.content).collect::<Vec<_>>().join("\n").repeat(20);

    c.bench_function("render_large_document", |b| {
        b.iter(|| black_box(renderer.render(black_box(&doc)).unwrap()))
    });
}

fn bench_highlight_block(c: &mut Criterion) {
    let highlighter = Highlighter::new();
    let code = "fn fib(n: u64) -> u64 {\n    if n < 2 { n } else { fib(n - 1) + fib(n - 2) }\n}\n".repeat(10);

    c.bench_function("highlight_rust_30_lines", |b| {
        b.iter(|| black_box(highlighter.highlight("rust", black_box(&code))))
    });
}

fn bench_pipeline_keystrokes(c: &mut Criterion) {
    let config = RenderConfig::default();
    let text = EXAMPLES[0].content;

    // 200 keystrokes 10ms apart: the debouncer should render only at the
    // max-wait boundaries.
    c.bench_function("pipeline_200_keystrokes", |b| {
        b.iter(|| {
            let mut pipeline = RenderPipeline::new(&config);
            let t0 = Instant::now();
            for i in 0..200u64 {
                let now = t0 + Duration::from_millis(i * 10);
                pipeline.poll(now);
                pipeline.input(text.chars().take(i as usize * 4).collect::<String>(), now);
            }
            black_box(pipeline.flush())
        })
    });
}

criterion_group!(
    benches,
    bench_render_examples,
    bench_render_large_document,
    bench_highlight_block,
    bench_pipeline_keystrokes,
);
criterion_main!(benches);
