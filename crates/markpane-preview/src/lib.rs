//! Markpane Preview Runtime
//!
//! The rendered side of the editor. HTML produced by `markpane-parser` is
//! loaded into a [`Container`]; [`activate`] then wires what the markup
//! defers to runtime:
//! - media carrying `data-src` is promoted to `src` once it nears the
//!   viewport, at most once per element
//! - copy buttons on code blocks copy the code to the clipboard
//!
//! [`SourceMap`] maps `data-line` blocks back to source lines for scroll
//! sync. Everything here is single-threaded: DOM nodes are `Rc` handles.

pub mod activate;
pub mod copy;
pub mod dom;
pub mod error;
pub mod lazy;
pub mod sync;

pub use activate::{activate, Activation, Preview};
pub use copy::{Clipboard, CopyButtons, MemoryClipboard};
pub use dom::{Container, Element};
pub use error::{PreviewError, Result};
pub use lazy::{Layout, LazyLoadOptions, ProximityObserver, Rect, RootMargin, Threshold};
pub use sync::SourceMap;
