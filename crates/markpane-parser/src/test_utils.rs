//! Parser setup shared by unit and integration tests

use markdown_it::plugins::cmark;
use markdown_it::MarkdownIt;

/// A bare CommonMark parser without any markpane plugin.
pub fn cmark() -> MarkdownIt {
    let mut md = MarkdownIt::new();
    cmark::add(&mut md);
    md
}

/// Parse and render `source` with a CommonMark parser extended by `setup`.
pub fn render_with(setup: impl FnOnce(&mut MarkdownIt), source: &str) -> String {
    let mut md = cmark();
    setup(&mut md);
    md.parse(source).render()
}
