//! Source line lookup for editor/preview scroll sync
//!
//! Built from the `data-line` attributes the parser stamps on top-level
//! blocks. Block `i` covers the source lines from its own start line up to
//! the start line of block `i + 1`.

use std::ops::Range;

use markpane_parser::attrs::DATA_LINE;

use crate::dom::{Container, Element};
use crate::lazy::{Layout, Rect};

#[derive(Debug, Clone)]
pub struct Block {
    pub line: usize,
    pub element: Element,
}

#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    blocks: Vec<Block>,
}

impl SourceMap {
    /// Collect the container's top-level blocks carrying a source line, in
    /// document order. Blocks whose line goes backwards are skipped.
    pub fn from_container(container: &Container) -> Self {
        let mut blocks: Vec<Block> = Vec::new();
        for element in container.children() {
            let Some(line) = element
                .attr(DATA_LINE)
                .and_then(|line| line.trim().parse::<usize>().ok())
            else {
                continue;
            };
            if blocks.last().is_some_and(|last| last.line > line) {
                continue;
            }
            blocks.push(Block { line, element });
        }
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Index of the block containing source `line`: the last block starting
    /// at or before it.
    pub fn block_for_line(&self, line: usize) -> Option<usize> {
        self.blocks
            .partition_point(|block| block.line <= line)
            .checked_sub(1)
    }

    pub fn line_for_block(&self, index: usize) -> Option<usize> {
        self.blocks.get(index).map(|block| block.line)
    }

    /// Source lines covered by blocks `first..=last`. The range of the final
    /// block is open ended.
    pub fn visible_lines(&self, first: usize, last: usize) -> Option<Range<usize>> {
        if first > last {
            return None;
        }
        let start = self.line_for_block(first)?;
        let end = self.line_for_block(last + 1).unwrap_or(usize::MAX);
        Some(start..end)
    }

    /// Blocks intersecting `viewport`, as the first and last index.
    pub fn visible_blocks(&self, viewport: Rect, layout: &dyn Layout) -> Option<(usize, usize)> {
        let mut visible = self.blocks.iter().enumerate().filter(|(_, block)| {
            layout
                .rect(&block.element)
                .is_some_and(|rect| rect.intersection(&viewport).is_some())
        });
        let (first, _) = visible.next()?;
        let last = visible.last().map_or(first, |(index, _)| index);
        Some((first, last))
    }

    /// Whether source `line` is on screen.
    pub fn is_line_visible(&self, line: usize, viewport: Rect, layout: &dyn Layout) -> bool {
        self.visible_blocks(viewport, layout)
            .and_then(|(first, last)| self.visible_lines(first, last))
            .is_some_and(|lines| lines.contains(&line))
    }
}
