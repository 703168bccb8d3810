//! Editor selection with absolute offsets
//!
//! The widget reports selections as 1-based line/column pairs. The rest of
//! the pipeline wants absolute character offsets into the text, so they are
//! computed here against a line-indexed buffer. Offsets count Unicode scalar
//! values; a line break counts as one character.

use serde::{Deserialize, Serialize};

/// 1-based line and column, as reported by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Selection between two positions; `anchor` may come after `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub anchor: Position,
    pub active: Position,
}

impl SelectionRange {
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    pub fn caret(at: Position) -> Self {
        Self::new(at, at)
    }

    /// Start and end in document order.
    pub fn ordered(&self) -> (Position, Position) {
        if self.anchor <= self.active {
            (self.anchor, self.active)
        } else {
            (self.active, self.anchor)
        }
    }
}

/// Text indexed by line start.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    /// Character offset where each line starts.
    line_starts: Vec<usize>,
    /// Length of each line in characters, without the line break.
    line_lengths: Vec<usize>,
}

impl TextBuffer {
    pub fn new(text: &str) -> Self {
        let mut line_starts = Vec::new();
        let mut line_lengths = Vec::new();
        let mut start = 0;
        for line in text.split('\n') {
            let length = line.chars().count();
            line_starts.push(start);
            line_lengths.push(length);
            start += length + 1;
        }
        Self {
            line_starts,
            line_lengths,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Total length in characters.
    pub fn len(&self) -> usize {
        match (self.line_starts.last(), self.line_lengths.last()) {
            (Some(start), Some(length)) => start + length,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Character offset of `position`, clamped into the buffer.
    pub fn offset(&self, position: Position) -> usize {
        if self.line_starts.is_empty() {
            return 0;
        }
        let line = position.line.clamp(1, self.line_count()) - 1;
        let column = position.column.saturating_sub(1).min(self.line_lengths[line]);
        self.line_starts[line] + column
    }
}

/// A selection as the preview consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    /// Characters before the selection start.
    pub start: usize,
    /// Characters inside the selection.
    pub count: usize,
}

impl Selection {
    pub fn from_range(buffer: &TextBuffer, range: SelectionRange) -> Self {
        let (from, to) = range.ordered();
        let start = buffer.offset(from);
        let end = buffer.offset(to);
        Self {
            start_line: from.line,
            start_column: from.column,
            end_line: to.line,
            end_column: to.column,
            start,
            count: end.saturating_sub(start),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEXT: &str = "# Title\n\nSome 文字 here\nlast";

    fn select(a: (usize, usize), b: (usize, usize)) -> Selection {
        let buffer = TextBuffer::new(TEXT);
        Selection::from_range(
            &buffer,
            SelectionRange::new(Position::new(a.0, a.1), Position::new(b.0, b.1)),
        )
    }

    #[test]
    fn test_buffer_lines() {
        let buffer = TextBuffer::new(TEXT);
        assert_eq!(buffer.line_count(), 4);
        assert_eq!(buffer.len(), TEXT.chars().count());
        assert!(TextBuffer::new("").is_empty());
        assert_eq!(TextBuffer::new("").line_count(), 1);
    }

    #[test]
    fn test_caret_at_start() {
        let selection = select((1, 1), (1, 1));
        assert_eq!(selection.start, 0);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_selection_within_a_line() {
        // "文字" on line 3, columns 6..8.
        let selection = select((3, 6), (3, 8));
        assert_eq!(selection.start, 8 + 1 + 5);
        assert_eq!(selection.count, 2);
    }

    #[test]
    fn test_newlines_count_once() {
        // From the end of line 1 to the start of line 3.
        let selection = select((1, 8), (3, 1));
        assert_eq!(selection.start, 7);
        assert_eq!(selection.count, 2);
    }

    #[test]
    fn test_reversed_range_is_normalised() {
        let forward = select((1, 3), (4, 2));
        let backward = select((4, 2), (1, 3));
        assert_eq!(forward, backward);
        assert_eq!(backward.start_line, 1);
        assert_eq!(backward.end_column, 2);
    }

    #[test]
    fn test_positions_past_the_end_are_clamped() {
        let selection = select((4, 99), (9, 1));
        assert_eq!(selection.start, TEXT.chars().count());
        assert_eq!(selection.count, 0);
    }

    proptest! {
        #[test]
        fn offsets_match_char_indices(text in "[a-z文\n]{0,40}", index in 0usize..41) {
            let chars: Vec<char> = text.chars().collect();
            let index = index.min(chars.len());
            let line = chars[..index].iter().filter(|c| **c == '\n').count() + 1;
            let line_start = chars[..index].iter().rposition(|c| *c == '\n').map_or(0, |i| i + 1);
            let column = index - line_start + 1;

            let buffer = TextBuffer::new(&text);
            prop_assert_eq!(buffer.offset(Position::new(line, column)), index);
        }
    }
}
