//! Container plugin for markdown-it (Djot-style fenced divs)
//!
//! Implements block-level container syntax:
//! ```text
//! ::: tip
//! Content, parsed as regular markdown blocks
//! :::
//! ```
//!
//! One rule serves every class, unlike markdown-it-container which needs a
//! plugin instance per class. Containers nest; the class must be one of
//! [`CONTAINER_CLASSES`] since it ends up in a `class` attribute. Anything
//! else, including an unclosed container, is left to the other block rules.

use markdown_it::parser::block::{BlockRule, BlockState};
use markdown_it::plugins::cmark::block::fence::FenceScanner;
use markdown_it::{MarkdownIt, Node, NodeValue, Renderer};
use tracing::trace;

use super::fenced;

/// Opening and closing marker.
pub const MARKER: &str = ":::";

/// Class names accepted after the opening marker.
pub const CONTAINER_CLASSES: &[&str] = &["tip", "warning", "caution", "center"];

/// Custom AST node for containers
#[derive(Debug, Clone)]
pub struct ContainerNode {
    pub class: String,
}

impl NodeValue for ContainerNode {
    fn render(&self, node: &Node, fmt: &mut dyn Renderer) {
        let mut attrs = node.attrs.clone();
        attrs.push(("class", format!("alert {}", self.class)));

        fmt.cr();
        fmt.open("div", &attrs);
        fmt.cr();
        fmt.contents(&node.children);
        fmt.cr();
        fmt.close("div");
        fmt.cr();
    }
}

/// Container scanner - matches `::: class` ... `:::`
pub struct ContainerScanner;

impl ContainerScanner {
    fn scan(state: &BlockState) -> Option<(String, usize)> {
        let class = fenced::header(state, state.line, MARKER)?;

        if !CONTAINER_CLASSES.contains(&class) {
            trace!(line = state.line, class, "container class not allowed");
            return None;
        }

        let Some(close_line) = fenced::find_close(state, state.line, MARKER, fenced::has_header) else {
            trace!(line = state.line, "container is not closed");
            return None;
        };

        Some((class.to_owned(), close_line))
    }
}

impl BlockRule for ContainerScanner {
    fn check(state: &mut BlockState) -> Option<()> {
        Self::scan(state).map(|_| ())
    }

    fn run(state: &mut BlockState) -> Option<(Node, usize)> {
        let start_line = state.line;
        let (class, close_line) = Self::scan(state)?;

        let node = fenced::parse_children(state, ContainerNode { class }, start_line, close_line);
        Some((node, close_line + 1 - start_line))
    }
}

/// Add container plugin to markdown-it parser
///
/// Must run before the fence rule so `:::` lines are never taken for
/// something else.
pub fn add_container_plugin(md: &mut MarkdownIt) {
    md.block
        .add_rule::<ContainerScanner>()
        .before::<FenceScanner>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::cmark;

    fn render(input: &str) -> String {
        let mut md = cmark();
        add_container_plugin(&mut md);
        md.parse(input).render()
    }

    fn containers(input: &str) -> Vec<String> {
        let mut md = cmark();
        add_container_plugin(&mut md);
        let ast = md.parse(input);

        let mut classes = Vec::new();
        ast.walk(|node, _| {
            if let Some(container) = node.cast::<ContainerNode>() {
                classes.push(container.class.clone());
            }
        });
        classes
    }

    #[test]
    fn test_simple_container() {
        let html = render("::: tip\nhello\n:::");
        assert_eq!(html, "<div class=\"alert tip\">\n<p>hello</p>\n</div>\n");
    }

    #[test]
    fn test_all_whitelisted_classes() {
        for class in CONTAINER_CLASSES {
            let html = render(&format!("::: {class}\nbody\n:::"));
            assert!(html.contains(&format!("class=\"alert {class}\"")), "{html}");
        }
    }

    #[test]
    fn test_unknown_class_declines() {
        let html = render("::: bogus\nhello\n:::");
        assert!(!html.contains("<div"));
        assert!(html.contains("::: bogus"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn test_class_injection_declines() {
        let html = render("::: tip\" onclick=\"x\nhello\n:::");
        assert!(!html.contains("<div"));
        assert!(containers("::: tip danger\nx\n:::").is_empty());
    }

    #[test]
    fn test_missing_class_declines() {
        assert!(containers("::: \nhello\n:::").is_empty());
        assert!(containers(":::\nhello\n:::").is_empty());
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_declines_are_traced() {
        render("::: bogus\nhello\n:::");
        assert!(logs_contain("container class not allowed"));
    }

    #[test]
    fn test_unclosed_container_declines() {
        let html = render("::: warning\nhello");
        assert!(!html.contains("<div"));
        assert!(html.contains("::: warning"));
    }

    #[test]
    fn test_nested_containers() {
        let input = "::: warning\nouter\n\n::: tip\ninner\n:::\n\nafter\n:::";
        assert_eq!(containers(input), vec!["warning", "tip"]);

        let html = render(input);
        let outer = html.find("alert warning").unwrap();
        let inner = html.find("alert tip").unwrap();
        let after = html.find("after").unwrap();
        assert!(outer < inner && inner < after);
        assert_eq!(html.matches("</div>").count(), 2);
    }

    #[test]
    fn test_single_closer_belongs_to_innermost_opener() {
        // `::: tip` never balances and declines; `::: warning` then owns
        // the only closer.
        let input = "::: tip\n::: warning\ntext\n:::";
        assert_eq!(containers(input), vec!["warning"]);
        assert!(render(input).starts_with("<p>::: tip</p>"));
    }

    #[test]
    fn test_container_keeps_following_content() {
        let html = render("::: center\nmiddle\n:::\n\ntail");
        assert!(html.ends_with("<p>tail</p>\n"));
    }

    #[test]
    fn test_container_interrupts_paragraph() {
        let html = render("intro\n::: tip\nhello\n:::");
        assert!(html.starts_with("<p>intro</p>"));
        assert!(html.contains("alert tip"));
    }

    #[test]
    fn test_container_srcmap_covers_closing_line() {
        let mut md = cmark();
        add_container_plugin(&mut md);
        let source = "::: tip\nhello\n:::\n\nnext";
        let ast = md.parse(source);

        let container = ast
            .children
            .iter()
            .find(|node| node.is::<ContainerNode>())
            .unwrap();
        let (start, end) = container.srcmap.unwrap().get_byte_offsets();
        assert_eq!(start, 0);
        assert_eq!(&source[start..end], "::: tip\nhello\n:::");
    }
}
