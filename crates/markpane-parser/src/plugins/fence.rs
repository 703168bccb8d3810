//! Fenced code blocks with a copy button
//!
//! Replaces the CommonMark fence node after parsing. The button sits right
//! after the `<pre>` inside the same wrapper so the preview can find the
//! code it copies.

use markdown_it::common::utils::unescape_all;
use markdown_it::parser::core::CoreRule;
use markdown_it::plugins::cmark::block::fence::CodeFence;
use markdown_it::{MarkdownIt, Node, NodeValue, Renderer};

use crate::attrs::{CODE_BLOCK_CLASS, COPY_BUTTON_CLASS};

const LANG_PREFIX: &str = "language-";

#[derive(Debug, Clone)]
pub struct CopyableFence {
    pub lang: Option<String>,
    pub content: String,
}

impl CopyableFence {
    fn from_fence(fence: &CodeFence) -> Self {
        let info = unescape_all(&fence.info);
        let lang = info
            .split_whitespace()
            .next()
            .filter(|lang| !lang.is_empty())
            .map(str::to_owned);

        Self {
            lang,
            content: fence.content.clone(),
        }
    }
}

impl NodeValue for CopyableFence {
    fn render(&self, node: &Node, fmt: &mut dyn Renderer) {
        let mut attrs = node.attrs.clone();
        attrs.push(("class", CODE_BLOCK_CLASS.to_owned()));

        let code_attrs: Vec<(&str, String)> = self
            .lang
            .iter()
            .map(|lang| ("class", format!("{LANG_PREFIX}{lang}")))
            .collect();

        fmt.cr();
        fmt.open("div", &attrs);
        fmt.open("pre", &[]);
        fmt.open("code", &code_attrs);
        fmt.text(&self.content);
        fmt.close("code");
        fmt.close("pre");
        fmt.open(
            "button",
            &[
                ("class", COPY_BUTTON_CLASS.to_owned()),
                ("type", "button".to_owned()),
            ],
        );
        fmt.text("Copy");
        fmt.close("button");
        fmt.close("div");
        fmt.cr();
    }
}

pub struct CopyableFenceRule;

impl CoreRule for CopyableFenceRule {
    fn run(root: &mut Node, _: &MarkdownIt) {
        root.walk_mut(|node, _| {
            if let Some(fence) = node.cast::<CodeFence>() {
                let value = CopyableFence::from_fence(fence);
                node.replace(value);
            }
        });
    }
}

/// Add copy buttons to fenced code blocks
pub fn add_fence_plugin(md: &mut MarkdownIt) {
    md.add_rule::<CopyableFenceRule>();
}
