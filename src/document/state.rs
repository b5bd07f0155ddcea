use std::cell::RefCell;

use crate::render::RenderPipeline;

/// Text every new document starts with.
pub const SEED_TEXT: &str = "# Hello Markdown";

/// Which pane comes first when editor and preview are shown side by side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaneOrder {
    #[default]
    EditorFirst,
    PreviewFirst,
}

impl PaneOrder {
    /// The other arrangement.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::EditorFirst => Self::PreviewFirst,
            Self::PreviewFirst => Self::EditorFirst,
        }
    }
}

/// What changed in a [`DocumentState`]. Delivered to observers after the
/// change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    TextChanged { version: u64 },
    PaneOrderChanged(PaneOrder),
}

/// Handle returned by [`DocumentState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&DocumentEvent) + Send>;

#[derive(Debug, Clone)]
struct CachedRender {
    source: String,
    html: String,
}

/// The single source of truth for the edited document.
///
/// Owns the markdown text and the pane order. Text is only ever replaced
/// wholesale through [`set_text`](Self::set_text); every replacement bumps
/// [`version`](Self::version) and notifies observers, so views can either
/// subscribe or poll the version.
///
/// ```
/// use mdpane::document::{DocumentState, PaneOrder};
///
/// let mut doc = DocumentState::new();
/// assert_eq!(doc.text(), "# Hello Markdown");
/// assert_eq!(doc.pane_order(), PaneOrder::EditorFirst);
///
/// doc.set_text("a");
/// doc.set_text("b");
/// assert_eq!(doc.render(), "<p>b</p>\n");
/// ```
pub struct DocumentState {
    text: String,
    pane_order: PaneOrder,
    version: u64,
    pipeline: RenderPipeline,
    cache: RefCell<Option<CachedRender>>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl DocumentState {
    /// A document holding the seed text, editor first.
    pub fn new() -> Self {
        Self::with_pipeline(RenderPipeline::default())
    }

    /// A seeded document that renders with `pipeline`.
    pub fn with_pipeline(pipeline: RenderPipeline) -> Self {
        Self {
            text: SEED_TEXT.to_string(),
            pane_order: PaneOrder::default(),
            version: 0,
            pipeline,
            cache: RefCell::new(None),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// The current markdown source.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// A snapshot copy of the current markdown source.
    pub fn get_text(&self) -> String {
        self.text.clone()
    }

    /// Replace the whole text. Any string is accepted, including empty.
    pub fn set_text(&mut self, new_text: impl Into<String>) {
        self.text = new_text.into();
        self.version += 1;
        self.notify(&DocumentEvent::TextChanged {
            version: self.version,
        });
    }

    /// Monotonic counter, bumped by every [`set_text`](Self::set_text).
    pub const fn version(&self) -> u64 {
        self.version
    }

    pub const fn pane_order(&self) -> PaneOrder {
        self.pane_order
    }

    /// Swap which pane comes first. Two calls restore the original order.
    pub fn toggle_column_order(&mut self) {
        self.pane_order = self.pane_order.flipped();
        self.notify(&DocumentEvent::PaneOrderChanged(self.pane_order));
    }

    pub const fn pipeline(&self) -> RenderPipeline {
        self.pipeline
    }

    /// HTML for the current text.
    ///
    /// The last result is memoized and reused only while the text is exactly
    /// equal to the text it was rendered from.
    pub fn render(&self) -> String {
        if let Some(cached) = self.cache.borrow().as_ref()
            && cached.source == self.text
        {
            return cached.html.clone();
        }
        let html = self.pipeline.render(&self.text);
        *self.cache.borrow_mut() = Some(CachedRender {
            source: self.text.clone(),
            html: html.clone(),
        });
        html
    }

    /// Same as [`render`](Self::render).
    pub fn html(&self) -> String {
        self.render()
    }

    /// The text as UTF-8 bytes, ready to hand to a storage collaborator.
    pub fn serialize(&self) -> Vec<u8> {
        self.text.as_bytes().to_vec()
    }

    /// Register a change callback. Callbacks run synchronously on the
    /// mutating thread, after the change is visible.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&DocumentEvent) + Send + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a callback. Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: &DocumentEvent) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }
}

impl Default for DocumentState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DocumentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentState")
            .field("bytes", &self.text.len())
            .field("pane_order", &self.pane_order)
            .field("version", &self.version)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_new_document_has_seed_and_editor_first() {
        let doc = DocumentState::new();
        assert_eq!(doc.text(), "# Hello Markdown");
        assert_eq!(doc.pane_order(), PaneOrder::EditorFirst);
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_set_text_replaces_and_bumps_version() {
        let mut doc = DocumentState::new();
        doc.set_text("new body");
        assert_eq!(doc.get_text(), "new body");
        assert_eq!(doc.version(), 1);

        doc.set_text("");
        assert_eq!(doc.text(), "");
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn test_set_text_same_value_still_counts_as_change() {
        let mut doc = DocumentState::new();
        doc.set_text(SEED_TEXT);
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_toggle_column_order_flips_and_restores() {
        let mut doc = DocumentState::new();
        doc.toggle_column_order();
        assert_eq!(doc.pane_order(), PaneOrder::PreviewFirst);
        doc.toggle_column_order();
        assert_eq!(doc.pane_order(), PaneOrder::EditorFirst);
    }

    #[test]
    fn test_render_reflects_latest_text() {
        let mut doc = DocumentState::new();
        assert!(doc.render().contains("<h1>Hello Markdown</h1>"));
        doc.set_text("a");
        doc.set_text("b");
        let html = doc.render();
        assert!(html.contains('b'));
        assert!(!html.contains('a'));
    }

    #[test]
    fn test_render_cache_is_invalidated_by_set_text() {
        let mut doc = DocumentState::new();
        let first = doc.render();
        assert_eq!(doc.render(), first);
        doc.set_text("# Other");
        assert_ne!(doc.render(), first);
        assert_eq!(doc.html(), "<h1>Other</h1>\n");
    }

    #[test]
    fn test_serialize_is_utf8_bytes() {
        let mut doc = DocumentState::new();
        doc.set_text("héllo ✓");
        assert_eq!(doc.serialize(), "héllo ✓".as_bytes());
    }

    #[test]
    fn test_observers_see_text_and_order_changes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut doc = DocumentState::new();
        let sink = Arc::clone(&seen);
        doc.subscribe(move |event| sink.lock().unwrap().push(*event));

        doc.set_text("x");
        doc.toggle_column_order();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                DocumentEvent::TextChanged { version: 1 },
                DocumentEvent::PaneOrderChanged(PaneOrder::PreviewFirst),
            ]
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let count = Arc::new(Mutex::new(0));
        let mut doc = DocumentState::new();
        let counter = Arc::clone(&count);
        let id = doc.subscribe(move |_| *counter.lock().unwrap() += 1);

        doc.set_text("one");
        assert!(doc.unsubscribe(id));
        doc.set_text("two");

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(!doc.unsubscribe(id), "second removal should report missing id");
    }
}
