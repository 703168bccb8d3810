//! Collapsible plugin for markdown-it
//!
//! ```text
//! +++ Summary text
//! Hidden content
//! +++
//! ```
//!
//! `+++* Summary` renders the block initially expanded. Nesting and the
//! decline rules are the same as for containers.

use markdown_it::parser::block::{BlockRule, BlockState};
use markdown_it::plugins::cmark::block::fence::FenceScanner;
use markdown_it::{MarkdownIt, Node, NodeValue, Renderer};
use tracing::trace;

use super::fenced;

pub const MARKER: &str = "+++";

#[derive(Debug, Clone)]
pub struct CollapsibleNode {
    pub summary: String,
    pub open: bool,
}

impl NodeValue for CollapsibleNode {
    fn render(&self, node: &Node, fmt: &mut dyn Renderer) {
        let mut attrs = node.attrs.clone();
        attrs.push(("class", "collapsible".to_owned()));
        if self.open {
            attrs.push(("open", String::new()));
        }

        fmt.cr();
        fmt.open("details", &attrs);
        fmt.open("summary", &[]);
        fmt.text(&self.summary);
        fmt.close("summary");
        fmt.cr();
        fmt.contents(&node.children);
        fmt.cr();
        fmt.close("details");
        fmt.cr();
    }
}

/// Split `[*] summary` into the trimmed summary and the open flag.
fn split_header(rest: &str) -> Option<(&str, bool)> {
    let (rest, open) = match rest.strip_prefix('*') {
        Some(rest) => (rest, true),
        None => (rest, false),
    };
    let summary = rest.strip_prefix(' ')?.trim();
    (!summary.is_empty()).then_some((summary, open))
}

pub struct CollapsibleScanner;

impl CollapsibleScanner {
    fn scan(state: &BlockState) -> Option<(CollapsibleNode, usize)> {
        if state.line_indent(state.line) >= 4 {
            return None;
        }
        let (summary, open) = split_header(state.get_line(state.line).strip_prefix(MARKER)?)?;

        let opens = |rest: &str| split_header(rest).is_some();
        let Some(close_line) = fenced::find_close(state, state.line, MARKER, opens) else {
            trace!(line = state.line, "collapsible block is not closed");
            return None;
        };

        let node = CollapsibleNode {
            summary: summary.to_owned(),
            open,
        };
        Some((node, close_line))
    }
}

impl BlockRule for CollapsibleScanner {
    fn check(state: &mut BlockState) -> Option<()> {
        Self::scan(state).map(|_| ())
    }

    fn run(state: &mut BlockState) -> Option<(Node, usize)> {
        let start_line = state.line;
        let (value, close_line) = Self::scan(state)?;

        let node = fenced::parse_children(state, value, start_line, close_line);
        Some((node, close_line + 1 - start_line))
    }
}

/// Add collapsible plugin to markdown-it parser
pub fn add_collapsible_plugin(md: &mut MarkdownIt) {
    md.block
        .add_rule::<CollapsibleScanner>()
        .before::<FenceScanner>();
}
