//! Directive plugin for markdown-it
//!
//! Implements inline directive syntax:
//! - `@name[label](target)`
//! - `@name!(target)` where `!` marks a block-eligible directive
//! - `@name(target)` with an empty label
//!
//! A directive is only recognized when `name` has a renderer in the
//! [`DirectiveMap`] installed on the parser. Unknown names are not consumed,
//! so they stay in the output as literal text.

use markdown_it::common::utils::unescape_all;
use markdown_it::parser::core::CoreRule;
use markdown_it::parser::extset::MarkdownItExt;
use markdown_it::parser::inline::{InlineRule, InlineState};
use markdown_it::plugins::cmark::block::paragraph::Paragraph;
use markdown_it::{MarkdownIt, Node, NodeValue, Renderer};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Render function for one directive name.
pub type RenderFn = dyn Fn(&Directive) -> String + Send + Sync;

/// A parsed `@name[label](target)` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub label: String,
    pub target: String,
    /// The `!` marker was present.
    pub bang: bool,
    /// Attributes for the rendered element, starting with `src` = target.
    /// Renderers receive their own copy.
    pub attrs: Vec<(String, String)>,
}

impl Directive {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Renderer registered for a directive name.
#[derive(Clone)]
pub struct DirectiveEntry {
    render: Arc<RenderFn>,
    block: bool,
}

impl DirectiveEntry {
    /// Whether a paragraph holding only this directive is replaced by it.
    pub fn is_block(&self) -> bool {
        self.block
    }

    pub fn render(&self, directive: &Directive) -> String {
        (self.render)(directive)
    }
}

/// Directive name to renderer table.
///
/// Composed from a base map and call-site overrides; a later registration
/// shadows an earlier one for the same name.
#[derive(Clone, Default)]
pub struct DirectiveMap {
    entries: HashMap<String, DirectiveEntry>,
}

impl DirectiveMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an inline directive.
    pub fn inline<F>(mut self, name: &str, render: F) -> Self
    where
        F: Fn(&Directive) -> String + Send + Sync + 'static,
    {
        self.insert(name, render, false);
        self
    }

    /// Register a directive whose output is a block element.
    pub fn block<F>(mut self, name: &str, render: F) -> Self
    where
        F: Fn(&Directive) -> String + Send + Sync + 'static,
    {
        self.insert(name, render, true);
        self
    }

    pub fn insert<F>(&mut self, name: &str, render: F, block: bool)
    where
        F: Fn(&Directive) -> String + Send + Sync + 'static,
    {
        let entry = DirectiveEntry {
            render: Arc::new(render),
            block,
        };
        self.entries.insert(name.to_owned(), entry);
    }

    /// Merge `other` into this map, `other` winning on conflicts.
    pub fn extend(&mut self, other: DirectiveMap) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, name: &str) -> Option<&DirectiveEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for DirectiveMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveMap")
            .field("names", &self.names())
            .finish()
    }
}

impl MarkdownItExt for DirectiveMap {}

/// Custom AST node for a recognized directive
#[derive(Clone)]
pub struct DirectiveNode {
    pub directive: Directive,
    entry: DirectiveEntry,
    /// Lifted out of its paragraph by [`BlockDirectiveRule`].
    pub standalone: bool,
}

impl DirectiveNode {
    pub fn is_block(&self) -> bool {
        self.entry.is_block()
    }
}

impl fmt::Debug for DirectiveNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveNode")
            .field("directive", &self.directive)
            .field("block", &self.entry.block)
            .field("standalone", &self.standalone)
            .finish()
    }
}

impl NodeValue for DirectiveNode {
    fn render(&self, node: &Node, fmt: &mut dyn Renderer) {
        let mut directive = self.directive.clone();
        directive
            .attrs
            .extend(node.attrs.iter().map(|(name, value)| ((*name).to_owned(), value.clone())));

        let html = self.entry.render(&directive);
        if self.standalone {
            fmt.cr();
            fmt.text_raw(&html);
            fmt.cr();
        } else {
            fmt.text_raw(&html);
        }
    }
}

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Match: @name, optional !, optional [label], then (target)
        Regex::new(r"^@(\w+)(!)?(?:\[((?:[^\]\\]|\\.)*)\])?\(((?:[^)\\]|\\.)+)\)").unwrap()
    })
}

/// Directive scanner - matches `@name[label](target)`
pub struct DirectiveScanner;

impl InlineRule for DirectiveScanner {
    const MARKER: char = '@';

    fn run(state: &mut InlineState) -> Option<(Node, usize)> {
        let input = &state.src[state.pos..state.pos_max];
        let caps = directive_regex().captures(input)?;
        let name = caps.get(1)?.as_str();

        let Some(entry) = state.md.ext.get::<DirectiveMap>().and_then(|map| map.get(name)) else {
            trace!(name, "no renderer registered for directive");
            return None;
        };

        let label = caps
            .get(3)
            .map(|m| unescape_all(m.as_str()).into_owned())
            .unwrap_or_default();
        let target = unescape_all(caps.get(4)?.as_str()).into_owned();

        let directive = Directive {
            name: name.to_owned(),
            label,
            attrs: vec![("src".to_owned(), target.clone())],
            target,
            bang: caps.get(2).is_some(),
        };

        let node = Node::new(DirectiveNode {
            directive,
            entry: entry.clone(),
            standalone: false,
        });
        Some((node, caps.get(0)?.end()))
    }
}

/// Replaces a paragraph whose only content is a block directive with the
/// directive node itself, keeping the paragraph's source map and attributes.
pub struct BlockDirectiveRule;

impl CoreRule for BlockDirectiveRule {
    fn run(root: &mut Node, _: &MarkdownIt) {
        root.walk_mut(|node, _| {
            let lift = node.is::<Paragraph>()
                && node.children.len() == 1
                && node.children[0]
                    .cast::<DirectiveNode>()
                    .is_some_and(DirectiveNode::is_block);
            if !lift {
                return;
            }

            let Some(mut directive) = node.children.pop() else {
                return;
            };
            if let Some(value) = directive.cast_mut::<DirectiveNode>() {
                value.standalone = true;
            }
            directive.srcmap = node.srcmap;
            directive.attrs.append(&mut node.attrs);
            *node = directive;
        });
    }
}

/// Add directive plugin to markdown-it parser
///
/// Also registers `map` as the dispatch table: a directive without a
/// renderer is never recognized. Calling this again merges the new map over
/// the installed one.
pub fn add_directive_plugin(md: &mut MarkdownIt, map: DirectiveMap) {
    let installed = md.ext.get::<DirectiveMap>().is_some();
    md.ext.get_or_insert_default::<DirectiveMap>().extend(map);

    if !installed {
        md.inline.add_rule::<DirectiveScanner>();
        md.add_rule::<BlockDirectiveRule>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::cmark;

    fn kbd(directive: &Directive) -> String {
        format!("<kbd>{}</kbd>", directive.label)
    }

    fn setup_parser(map: DirectiveMap) -> MarkdownIt {
        let mut md = cmark();
        add_directive_plugin(&mut md, map);
        md
    }

    fn directives(md: &MarkdownIt, input: &str) -> Vec<Directive> {
        let ast = md.parse(input);
        let mut found = Vec::new();
        ast.walk(|node, _| {
            if let Some(node) = node.cast::<DirectiveNode>() {
                found.push(node.directive.clone());
            }
        });
        found
    }

    #[test]
    fn test_registered_directive() {
        let md = setup_parser(DirectiveMap::new().inline("kbd", kbd));
        let html = md.parse("Press @kbd[Ctrl](keys) now").render();
        assert_eq!(html, "<p>Press <kbd>Ctrl</kbd> now</p>\n");
    }

    #[test]
    fn test_directive_fields() {
        let md = setup_parser(DirectiveMap::new().inline("video", kbd));
        let found = directives(&md, "@video![poster.png](clip.mp4)");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "video");
        assert_eq!(found[0].label, "poster.png");
        assert_eq!(found[0].target, "clip.mp4");
        assert!(found[0].bang);
        assert_eq!(found[0].attr("src"), Some("clip.mp4"));
    }

    #[test]
    fn test_label_is_optional() {
        let md = setup_parser(DirectiveMap::new().inline("audio", kbd));
        let found = directives(&md, "@audio(a.mp3) and @audio[](b.mp3)");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|d| d.label.is_empty()));
        assert!(!found[0].bang);
    }

    #[test]
    fn test_escaped_brackets() {
        let md = setup_parser(DirectiveMap::new().inline("kbd", kbd));
        let found = directives(&md, r"@kbd[a\]b](x\)y)");
        assert_eq!(found[0].label, "a]b");
        assert_eq!(found[0].target, "x)y");
    }

    #[test]
    fn test_unknown_directive_is_literal() {
        let md = setup_parser(DirectiveMap::new().inline("kbd", kbd));
        let html = md.parse("@unknown[label](target)").render();
        assert!(html.contains("@unknown"));
        assert!(!html.contains("<kbd>"));
        assert!(directives(&md, "@unknown[label](target)").is_empty());
    }

    #[test]
    fn test_incomplete_syntax_is_literal() {
        let md = setup_parser(DirectiveMap::new().inline("kbd", kbd));
        assert_eq!(md.parse("mail me @kbd").render(), "<p>mail me @kbd</p>\n");
        assert_eq!(md.parse("@kbd[x]").render(), "<p>@kbd[x]</p>\n");
    }

    #[test]
    fn test_later_registration_shadows_earlier() {
        let mut md = cmark();
        add_directive_plugin(&mut md, DirectiveMap::new().inline("kbd", kbd));
        add_directive_plugin(
            &mut md,
            DirectiveMap::new().inline("kbd", |d: &Directive| format!("<b>{}</b>", d.target)),
        );

        let html = md.parse("@kbd[x](y)").render();
        assert_eq!(html, "<p><b>y</b></p>\n");
        assert_eq!(md.ext.get::<DirectiveMap>().unwrap().len(), 1);
    }

    #[test]
    fn test_block_directive_replaces_paragraph() {
        let map = DirectiveMap::new().block("frame", |d: &Directive| {
            format!("<iframe data-src=\"{}\"></iframe>", d.target)
        });
        let md = setup_parser(map);

        let html = md.parse("@frame(page.html)").render();
        assert_eq!(html, "<iframe data-src=\"page.html\"></iframe>\n");

        // Not alone in its paragraph: stays inline.
        let html = md.parse("see @frame(page.html)").render();
        assert!(html.starts_with("<p>see <iframe"));
    }

    #[test]
    fn test_renderer_receives_node_attributes() {
        let map = DirectiveMap::new().block("probe", |d: &Directive| {
            format!("{:?}", d.attrs.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>())
        });
        let mut md = setup_parser(map);
        crate::plugins::add_source_line_plugin(&mut md);

        let html = md.parse("@probe(x)").render();
        assert!(html.contains("\"src\""));
        assert!(html.contains("\"data-line\""));
    }
}
