//! Benchmarks for the render path: markdown to HTML, then HTML to preview lines.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mdpane::preview::{PreviewPane, html_to_blocks, wrap_blocks};
use mdpane::render::{MarkdownFlavor, RenderPipeline};

fn large_document() -> String {
    include_str!("../tests/fixtures/sample.md").repeat(200)
}

fn bench_markdown_to_html(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/sample.md");
    let large = large_document();
    let gfm = RenderPipeline::new(MarkdownFlavor::Gfm);

    c.bench_function("render_sample", |b| b.iter(|| gfm.render(black_box(md))));
    c.bench_function("render_large", |b| {
        b.iter(|| gfm.render(black_box(&large)));
    });
}

fn bench_preview_layout(c: &mut Criterion) {
    let html = RenderPipeline::new(MarkdownFlavor::Gfm).render(&large_document());
    let blocks = html_to_blocks(&html);

    c.bench_function("html_to_blocks_large", |b| {
        b.iter(|| html_to_blocks(black_box(&html)));
    });
    c.bench_function("wrap_blocks_large", |b| {
        b.iter(|| wrap_blocks(black_box(&blocks), black_box(80)));
    });
    c.bench_function("preview_show_large", |b| {
        b.iter(|| {
            let mut pane = PreviewPane::new(80, 40);
            pane.show(1, html.clone());
            pane
        });
    });
}

criterion_group!(benches, bench_markdown_to_html, bench_preview_layout);
criterion_main!(benches);
