//! Shared scanning for blocks delimited by a marker line (`::: x` / `:::`).

use markdown_it::parser::block::BlockState;
use markdown_it::{Node, NodeValue};

/// Text after `marker` and one space on `line`, or `None` if the line does
/// not open a block. The text may be empty.
pub(crate) fn header<'a>(state: &'a BlockState, line: usize, marker: &str) -> Option<&'a str> {
    if state.line_indent(line) >= 4 {
        return None;
    }
    state.get_line(line).strip_prefix(marker)?.strip_prefix(' ')
}

/// Whether the text following a marker opens a nested block: one space and
/// something after it.
pub(crate) fn has_header(rest: &str) -> bool {
    rest.strip_prefix(' ').is_some_and(|rest| !rest.is_empty())
}

/// Line index of the marker that closes the block opened on `start_line`.
///
/// Lines where `opens` accepts the text after the marker increment the
/// depth, a line that is exactly the marker decrements it. `None` when the
/// block is unbalanced before `state.line_max`.
pub(crate) fn find_close(
    state: &BlockState,
    start_line: usize,
    marker: &str,
    opens: impl Fn(&str) -> bool,
) -> Option<usize> {
    let mut depth = 1usize;
    for line in start_line + 1..state.line_max {
        let text = state.get_line(line);
        if text.trim() == marker {
            depth -= 1;
            if depth == 0 {
                return Some(line);
            }
        } else if text.strip_prefix(marker).is_some_and(&opens) {
            depth += 1;
        }
    }
    None
}

/// Parse the lines strictly between `start_line` and `close_line` as the
/// block children of a new node holding `value`.
pub(crate) fn parse_children<T: NodeValue>(
    state: &mut BlockState,
    value: T,
    start_line: usize,
    close_line: usize,
) -> Node {
    let old_node = std::mem::replace(&mut state.node, Node::new(value));
    let old_line = state.line;
    let old_line_max = state.line_max;

    state.line = start_line + 1;
    state.line_max = close_line;
    let md = state.md;
    md.block.tokenize(state);

    state.line = old_line;
    state.line_max = old_line_max;
    let mut node = std::mem::replace(&mut state.node, old_node);
    node.srcmap = state.get_map(start_line, close_line);
    node
}
