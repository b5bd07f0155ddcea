//! Markdown to HTML conversion.
//!
//! [`RenderPipeline`] is a pure function over the document text. comrak
//! does the actual conversion; this layer only picks the flavor and makes
//! sure a converter failure degrades to a literal rendering instead of
//! reaching the editing session.

mod worker;

pub use worker::{RenderRequest, RenderResult, RenderWorker};

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use comrak::{Options, markdown_to_html};

use crate::error::RenderError;

/// Which markdown dialect the pipeline accepts.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkdownFlavor {
    /// Plain `CommonMark`.
    #[default]
    CommonMark,
    /// `CommonMark` plus the GitHub extensions (tables, strikethrough,
    /// autolinks, task lists, footnotes, emoji shortcodes).
    Gfm,
}

/// Stateless markdown renderer.
///
/// Cheap to copy and safe to share between threads: every call builds its
/// own converter options, so there is no state to drift between calls.
///
/// ```
/// use mdpane::render::RenderPipeline;
///
/// let pipeline = RenderPipeline::default();
/// assert_eq!(pipeline.render("# Hi"), "<h1>Hi</h1>\n");
/// assert_eq!(pipeline.render(""), "");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderPipeline {
    flavor: MarkdownFlavor,
}

impl RenderPipeline {
    pub const fn new(flavor: MarkdownFlavor) -> Self {
        Self { flavor }
    }

    pub const fn flavor(&self) -> MarkdownFlavor {
        self.flavor
    }

    /// Render markdown to HTML. Never fails.
    pub fn render(&self, markdown: &str) -> String {
        self.render_with(markdown, |md| self.convert(md))
    }

    /// Render markdown, reporting converter failures instead of hiding them.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ConverterPanicked`] if comrak panics on the
    /// input.
    pub fn try_render(&self, markdown: &str) -> Result<String, RenderError> {
        convert_guarded(markdown, |md| self.convert(md))
    }

    fn render_with(&self, markdown: &str, convert: impl FnOnce(&str) -> String) -> String {
        match convert_guarded(markdown, convert) {
            Ok(html) => html,
            Err(err) => {
                tracing::warn!(%err, flavor = ?self.flavor, bytes = markdown.len(), "falling back to literal preview");
                literal_html(markdown)
            }
        }
    }

    fn convert(&self, markdown: &str) -> String {
        let mut options = Options::default();
        apply_flavor(&mut options, self.flavor);
        markdown_to_html(markdown, &options)
    }
}

thread_local! {
    static IN_CONVERTER: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside the converter until dropped.
struct ConverterGuard {
    was_inside: bool,
}

impl ConverterGuard {
    fn enter() -> Self {
        Self {
            was_inside: IN_CONVERTER.replace(true),
        }
    }
}

impl Drop for ConverterGuard {
    fn drop(&mut self) {
        IN_CONVERTER.set(self.was_inside);
    }
}

/// Whether this thread is currently running the markdown converter.
pub fn in_converter() -> bool {
    IN_CONVERTER.get()
}

fn convert_guarded(
    markdown: &str,
    convert: impl FnOnce(&str) -> String,
) -> Result<String, RenderError> {
    let _scope = crate::perf::scope("render.markdown_to_html");
    let _guard = ConverterGuard::enter();
    panic::catch_unwind(AssertUnwindSafe(|| convert(markdown)))
        .map_err(|payload| RenderError::ConverterPanicked(panic_message(payload.as_ref())))
}

/// Keep converter panics from reaching the process panic hook.
///
/// The hook installed by `ratatui::init` restores the terminal before
/// unwinding starts, which would break the screen even though the panic is
/// caught and the preview falls back. Call after the terminal is set up;
/// later calls are no-ops.
pub fn install_panic_guard() {
    static INSTALLED: Once = Once::new();
    INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if in_converter() {
                return;
            }
            previous(info);
        }));
    });
}

fn apply_flavor(options: &mut Options, flavor: MarkdownFlavor) {
    // Raw HTML stays escaped in both flavors; the preview is not a browser.
    options.render.unsafe_ = false;
    if flavor == MarkdownFlavor::Gfm {
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.shortcodes = true;
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Render text verbatim inside a preformatted block.
pub fn literal_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!("<pre><code>{}</code></pre>\n", escape_html(text))
}

/// Escape the characters that are significant in HTML text and attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_renders_h1() {
        let html = RenderPipeline::default().render("# Hi");
        assert!(html.contains("<h1>Hi</h1>"), "got: {html}");
    }

    #[test]
    fn test_empty_input_renders_empty() {
        assert_eq!(RenderPipeline::default().render(""), "");
    }

    #[test]
    fn test_unterminated_emphasis_is_literal_text() {
        let html = RenderPipeline::default().render("*foo");
        assert_eq!(html, "<p>*foo</p>\n");
    }

    #[test]
    fn test_plain_text_becomes_paragraph() {
        let html = RenderPipeline::default().render("just some words");
        assert_eq!(html, "<p>just some words</p>\n");
    }

    #[test]
    fn test_raw_html_is_not_passed_through() {
        let html = RenderPipeline::default().render("<script>alert(1)</script>");
        assert!(!html.contains("<script>"), "got: {html}");
    }

    #[test]
    fn test_commonmark_ignores_tables() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |";
        let html = RenderPipeline::new(MarkdownFlavor::CommonMark).render(md);
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_gfm_renders_tables_and_strikethrough() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~";
        let html = RenderPipeline::new(MarkdownFlavor::Gfm).render(md);
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_gfm_expands_shortcodes() {
        let html = RenderPipeline::new(MarkdownFlavor::Gfm).render("ship it :tada:");
        assert!(html.contains('\u{1f389}'), "got: {html}");
    }

    #[test]
    fn test_rendering_is_repeatable() {
        let pipeline = RenderPipeline::default();
        let md = "# Title\n\n- one\n- two\n\n```rust\nfn main() {}\n```\n";
        assert_eq!(pipeline.render(md), pipeline.render(md));
    }

    #[test]
    fn test_literal_html_escapes_markup() {
        assert_eq!(
            literal_html("<b>&</b>"),
            "<pre><code>&lt;b&gt;&amp;&lt;/b&gt;</code></pre>\n"
        );
        assert_eq!(literal_html(""), "");
    }

    #[test]
    fn test_converter_panic_falls_back_to_escaped_literal() {
        let html = RenderPipeline::default().render_with("<b>*bold", |_| panic!("converter bug"));
        assert_eq!(html, "<pre><code>&lt;b&gt;*bold</code></pre>\n");
        assert!(!in_converter());
    }

    #[test]
    fn test_converter_panic_is_reported_by_guarded_call() {
        let err = convert_guarded("x", |_| panic!("converter bug")).unwrap_err();
        assert_eq!(err, RenderError::ConverterPanicked("converter bug".to_string()));
    }

    #[test]
    fn test_converter_flag_is_scoped_to_the_call() {
        assert!(!in_converter());
        let html = RenderPipeline::default().render_with("text", |md| {
            assert!(in_converter());
            md.to_uppercase()
        });
        assert_eq!(html, "TEXT");
        assert!(!in_converter());
    }

    #[test]
    fn test_panic_message_reads_both_payload_kinds() {
        let static_payload: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(static_payload.as_ref()), "static");
        let owned_payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned_payload.as_ref()), "owned");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn render_is_total_and_deterministic(source in "\\PC*") {
                let pipeline = RenderPipeline::new(MarkdownFlavor::Gfm);
                let first = pipeline.render(&source);
                let second = pipeline.render(&source);
                prop_assert_eq!(first, second);
            }

            #[test]
            fn render_survives_markup_soup(source in "[*_`#>\\[\\]()!~|<>&\\-\\n ]{0,64}") {
                let html = RenderPipeline::default().try_render(&source);
                prop_assert!(html.is_ok());
            }
        }
    }
}
