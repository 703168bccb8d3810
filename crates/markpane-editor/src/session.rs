//! Editor session: the code editor widget wired to the preview pipeline
//!
//! The widget itself is external and only seen through [`CodeEditor`]. The
//! session keeps a snapshot of the widget content so that content written
//! back from the host is only pushed into the widget when it actually
//! differs; writing the same text again would reset cursor and scroll.

use std::fmt;
use std::sync::Arc;

use markpane_parser::{MarkdownIt, Preset};
use markpane_preview::Preview;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::config::{EditorConfig, RendererKind, WidgetOptions};
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::selection::{Selection, SelectionRange, TextBuffer};

/// The external text editing widget.
pub trait CodeEditor {
    /// Full text, with `\n` line breaks.
    fn value(&self) -> String;

    fn set_value(&mut self, value: &str);

    fn selection(&self) -> SelectionRange;

    /// Apply widget options. Widgets without such settings ignore them.
    fn configure(&mut self, _options: &WidgetOptions) {}
}

/// Anything that turns markdown into HTML.
pub trait MarkdownRender: Send + Sync {
    fn render(&self, source: &str) -> String;
}

impl MarkdownRender for MarkdownIt {
    fn render(&self, source: &str) -> String {
        self.parse(source).render()
    }
}

/// Renderer used for the preview.
#[derive(Clone, Default)]
pub enum RendererChoice {
    #[default]
    Rich,
    Guest,
    Custom(Arc<dyn MarkdownRender>),
}

impl RendererChoice {
    pub fn render(&self, source: &str) -> String {
        match self {
            RendererChoice::Rich => Preset::Rich.render(source),
            RendererChoice::Guest => Preset::Guest.render(source),
            RendererChoice::Custom(renderer) => renderer.render(source),
        }
    }
}

impl From<RendererKind> for RendererChoice {
    fn from(kind: RendererKind) -> Self {
        match kind {
            RendererKind::Rich => RendererChoice::Rich,
            RendererKind::Guest => RendererChoice::Guest,
        }
    }
}

impl fmt::Debug for RendererChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererChoice::Rich => write!(f, "Rich"),
            RendererChoice::Guest => write!(f, "Guest"),
            RendererChoice::Custom(_) => write!(f, "Custom(<renderer>)"),
        }
    }
}

pub struct EditorSession<E> {
    editor: E,
    config: EditorConfig,
    renderer: RendererChoice,
    snapshot: String,
    content: Debouncer<String>,
    debounced: watch::Receiver<String>,
}

impl<E: CodeEditor> EditorSession<E> {
    pub fn new(mut editor: E, config: EditorConfig) -> Result<Self> {
        config.validate()?;
        editor.configure(&config.widget);

        let snapshot = editor.value();
        let content = Debouncer::new(snapshot.clone(), config.debounce());
        let debounced = content.subscribe();
        Ok(Self {
            editor,
            renderer: config.renderer.into(),
            config,
            snapshot,
            content,
            debounced,
        })
    }

    /// Use `renderer` instead of the one named in the configuration.
    pub fn with_renderer(mut self, renderer: RendererChoice) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn renderer(&self) -> &RendererChoice {
        &self.renderer
    }

    pub fn scroll_synced(&self) -> bool {
        self.config.scroll_synced
    }

    /// Current content, updated on every edit.
    pub fn content(&self) -> &str {
        &self.snapshot
    }

    /// Receiver for the content once edits pause.
    pub fn debounced(&self) -> watch::Receiver<String> {
        self.debounced.clone()
    }

    /// Call when the widget reports a content change. Returns false if the
    /// text is unchanged.
    pub fn on_widget_change(&mut self) -> bool {
        let value = self.editor.value();
        if value == self.snapshot {
            return false;
        }
        trace!(chars = value.len(), "widget content changed");
        self.snapshot = value.clone();
        self.content.push(value);
        true
    }

    /// Content set by the host. The widget is only written when `value`
    /// differs from what it already shows.
    pub fn set_content(&mut self, value: &str) -> bool {
        if value == self.snapshot {
            return false;
        }
        debug!("writing host content into the widget");
        self.editor.set_value(value);
        self.snapshot = value.to_owned();
        self.content.push(value.to_owned());
        true
    }

    pub fn selection(&self) -> Selection {
        let buffer = TextBuffer::new(&self.snapshot);
        Selection::from_range(&buffer, self.editor.selection())
    }

    /// Render the debounced content.
    pub fn render(&self) -> String {
        let source = self.debounced.borrow().clone();
        self.renderer.render(&source)
    }

    /// Render the debounced content into a freshly activated preview.
    pub fn preview(&self) -> Result<Preview> {
        let mut preview = Preview::new(self.config.lazy_load.clone())?;
        preview.set_html(&self.render())?;
        Ok(preview)
    }

    /// Drop any pending debounced update.
    pub fn close(&mut self) {
        self.content.cancel();
    }
}

impl<E> fmt::Debug for EditorSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("renderer", &self.renderer)
            .field("chars", &self.snapshot.len())
            .field("content", &self.content)
            .finish()
    }
}
