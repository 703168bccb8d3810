//! Markpane Markdown Pipeline
//!
//! markdown-it plugins that turn editor source text into preview HTML.
//! This crate provides:
//! - `::: class` container blocks and `+++ summary` collapsible blocks
//! - `@name[label](target)` directives dispatched through a [`DirectiveMap`]
//! - lazy media markup (`data-src`) with layout size hints
//! - fenced code blocks carrying a copy button
//! - `data-line` source map attributes for editor/preview scroll sync
//!
//! Malformed custom syntax never errors: the rule declines and the text is
//! rendered as if the syntax had not been used.

pub mod attrs;
pub mod links;
pub mod plugins;
pub mod presets;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use markdown_it::{MarkdownIt, Node};
pub use plugins::directive::{Directive, DirectiveMap, DirectiveNode};
pub use plugins::source_line::LineIndex;
pub use presets::{guest, rich, Preset};
