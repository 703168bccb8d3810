//! Markpane Editor Adapter
//!
//! Connects an external code editor widget to the markdown preview: editor
//! configuration, debounced content propagation, selection offsets and the
//! choice of renderer.

pub mod config;
pub mod debounce;
pub mod error;
pub mod selection;
pub mod session;
pub mod state;

pub use config::{EditorConfig, RendererKind, WidgetOptions, WORD_SEPARATORS};
pub use debounce::Debouncer;
pub use error::{ConfigError, EditorError, Result};
pub use selection::{Position, Selection, SelectionRange, TextBuffer};
pub use session::{CodeEditor, EditorSession, MarkdownRender, RendererChoice};
pub use state::MergedState;
