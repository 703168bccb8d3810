//! Source line plugin for markdown-it
//!
//! Stamps `data-line` on every top-level block with the zero-based line it
//! starts on, so the preview can map rendered blocks back to the source.
//! Nested blocks are left alone.

use markdown_it::parser::core::{CoreRule, Root};
use markdown_it::{MarkdownIt, Node};

use crate::attrs::DATA_LINE;

/// Byte offset to line number lookup for a source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// Zero-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset) - 1
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

pub struct SourceLineRule;

impl CoreRule for SourceLineRule {
    fn run(root: &mut Node, _: &MarkdownIt) {
        let Some(data) = root.cast::<Root>() else {
            return;
        };
        let index = LineIndex::new(&data.content);

        for child in root.children.iter_mut() {
            let Some(srcmap) = child.srcmap else {
                continue;
            };
            let (start, _) = srcmap.get_byte_offsets();
            child
                .attrs
                .push((DATA_LINE, index.line_of(start).to_string()));
        }
    }
}

/// Add source line plugin to markdown-it parser
///
/// Runs after every other core rule so replaced nodes are stamped too.
pub fn add_source_line_plugin(md: &mut MarkdownIt) {
    md.add_rule::<SourceLineRule>().after_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{add_container_plugin, add_fence_plugin};
    use crate::test_utils::cmark;

    fn parser() -> MarkdownIt {
        let mut md = cmark();
        add_container_plugin(&mut md);
        add_fence_plugin(&mut md);
        add_source_line_plugin(&mut md);
        md
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_of(0), 0);
        assert_eq!(index.line_of(2), 0);
        assert_eq!(index.line_of(3), 1);
        assert_eq!(index.line_of(6), 2);
        assert_eq!(index.line_of(7), 3);
        assert_eq!(index.line_of(100), 3);
    }

    #[test]
    fn test_top_level_blocks_get_lines() {
        let html = parser().parse("# Title\n\npara\n\n```\ncode\n```").render();
        assert!(html.contains("<h1 data-line=\"0\">Title</h1>"));
        assert!(html.contains("<p data-line=\"2\">para</p>"));
        assert!(html.contains("<div data-line=\"4\" class=\"md-code\">"));
    }

    #[test]
    fn test_nested_blocks_are_not_stamped() {
        let html = parser().parse("text\n\n::: tip\ninner\n:::").render();
        assert!(html.contains("<div data-line=\"2\" class=\"alert tip\">"));
        assert!(html.contains("<p>inner</p>"));
        assert_eq!(html.matches("data-line").count(), 2);
    }

    #[test]
    fn test_node_count_unchanged() {
        let source = "a\n\n- b\n- c\n\n> d";
        let mut plain = cmark();
        add_container_plugin(&mut plain);
        add_fence_plugin(&mut plain);

        let count = |node: &Node| {
            let mut n = 0;
            node.walk(|_, _| n += 1);
            n
        };
        assert_eq!(count(&plain.parse(source)), count(&parser().parse(source)));
    }
}
