use std::sync::mpsc;
use std::time::Duration;

use mdpane::document::{DocumentState, PaneOrder};
use mdpane::render::{MarkdownFlavor, RenderPipeline, RenderRequest, RenderWorker};
use proptest::prelude::*;

#[test]
fn test_default_state() {
    let doc = DocumentState::new();
    assert_eq!(doc.text(), "# Hello Markdown");
    assert_eq!(doc.get_text(), "# Hello Markdown");
    assert_eq!(doc.pane_order(), PaneOrder::EditorFirst);
    assert_eq!(doc.render(), "<h1>Hello Markdown</h1>\n");
}

#[test]
fn test_rendering_is_total() {
    let pipeline = RenderPipeline::default();
    assert_eq!(pipeline.render(""), "");
    assert!(pipeline.render("# Hi").contains("<h1>Hi</h1>"));
    assert_eq!(pipeline.render("*foo"), "<p>*foo</p>\n");
    assert_eq!(pipeline.render("plain words"), "<p>plain words</p>\n");
    assert!(pipeline.render("```\nnever closed").contains("never closed"));
}

#[test]
fn test_latest_write_is_visible_through_cache() {
    let mut doc = DocumentState::new();
    doc.set_text("a");
    assert_eq!(doc.render(), "<p>a</p>\n");
    doc.set_text("b");
    assert_eq!(doc.render(), "<p>b</p>\n");
    assert_eq!(doc.html(), "<p>b</p>\n");
}

#[test]
fn test_latest_write_is_visible_through_worker() {
    let (tx, rx) = mpsc::channel();
    let mut worker = RenderWorker::spawn(RenderPipeline::default(), move |result| {
        let _ = tx.send(result);
    })
    .unwrap();
    let mut doc = DocumentState::new();
    for text in ["a", "b"] {
        doc.set_text(text);
        assert!(worker.request(RenderRequest {
            version: doc.version(),
            text: doc.get_text(),
        }));
    }

    let latest = loop {
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        if result.version == doc.version() {
            break result;
        }
    };
    assert_eq!(latest.html, "<p>b</p>\n");
}

#[test]
fn test_gfm_flavor_renders_tables() {
    let pipeline = RenderPipeline::new(MarkdownFlavor::Gfm);
    let html = pipeline.render("| a | b |\n|---|---|\n| 1 | 2 |\n");
    assert!(html.contains("<table>"));
    let plain = RenderPipeline::default().render("~~gone~~");
    assert!(!plain.contains("<del>"));
}

proptest! {
    #[test]
    fn prop_render_is_idempotent(text in "\\PC{0,200}") {
        let mut doc = DocumentState::new();
        doc.set_text(text.clone());
        let first = doc.render();
        prop_assert_eq!(&first, &doc.render());
        prop_assert_eq!(first, RenderPipeline::default().render(&text));
    }

    #[test]
    fn prop_render_never_panics(text in any::<String>()) {
        let _ = RenderPipeline::default().render(&text);
        let _ = RenderPipeline::new(MarkdownFlavor::Gfm).render(&text);
    }

    #[test]
    fn prop_toggle_twice_restores(flips in 0usize..8) {
        let mut doc = DocumentState::new();
        for _ in 0..flips {
            doc.toggle_column_order();
        }
        let before = doc.pane_order();
        doc.toggle_column_order();
        doc.toggle_column_order();
        prop_assert_eq!(doc.pane_order(), before);
        prop_assert_eq!(doc.version(), 0);
    }

    #[test]
    fn prop_last_set_text_wins(texts in prop::collection::vec("\\PC{0,40}", 1..10)) {
        let mut doc = DocumentState::new();
        for text in &texts {
            doc.set_text(text.clone());
        }
        let last = texts.last().unwrap();
        prop_assert_eq!(doc.text(), last.as_str());
        prop_assert_eq!(doc.version(), texts.len() as u64);
        prop_assert_eq!(doc.render(), RenderPipeline::default().render(last));
    }

    #[test]
    fn prop_serialize_is_utf8_of_text(text in any::<String>()) {
        let mut doc = DocumentState::new();
        doc.set_text(text.clone());
        prop_assert_eq!(doc.serialize(), text.into_bytes());
    }
}
