//! Media plugin for markdown-it (lazy images, gif, video and audio)
//!
//! Overrides the standard image rendering and installs the `gif`, `video`
//! and `audio` directives. Every element carries its URL in `data-src`
//! instead of `src`; the preview promotes it once the element gets close to
//! the viewport.
//!
//! Resource URLs may carry their pixel size as `?vw=640&vh=360`. The wrapper
//! then gets a fixed width and aspect ratio so the layout does not shift
//! when the resource arrives.
//!
//! Labels are escaped and, when non-empty, shown in a caption next to the
//! media in addition to `alt`.

use markdown_it::common::utils::escape_html;
use markdown_it::parser::core::CoreRule;
use markdown_it::plugins::cmark::inline::image::Image;
use markdown_it::{MarkdownIt, Node, NodeValue, Renderer};

use super::directive::{add_directive_plugin, Directive, DirectiveMap};
use crate::attrs::{CAPTION_CLASS, DATA_SRC};
use crate::links::{normalize_link, validate_link};

/// Inline style reserving the resource's box, from its `vw`/`vh` query
/// parameters. `None` unless both are positive numbers.
pub fn size_style(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();

    let mut width = None;
    let mut height = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "vw" if width.is_none() => width = Some(parse_dimension(&value)),
            "vh" if height.is_none() => height = Some(parse_dimension(&value)),
            _ => {}
        }
    }

    let (width, height) = (width.flatten()?, height.flatten()?);
    Some(format!("width:{width}px;aspect-ratio:{width}/{height}"))
}

fn parse_dimension(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n > 0.0)
}

fn style_attr(url: &str) -> String {
    size_style(url)
        .map(|style| format!(" style=\"{style}\""))
        .unwrap_or_default()
}

fn caption(label: &str) -> String {
    if label.is_empty() {
        return String::new();
    }
    format!("<span class=\"{CAPTION_CLASS}\">{}</span>", escape_html(label))
}

fn render_attrs(attrs: &[(String, String)]) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!(" {}=\"{}\"", escape_html(name), escape_html(value)))
        .collect()
}

/// Split the resource URL off a copy of `attrs` and render the rest, plus
/// the `center` class, for the wrapper element.
fn wrapper_attrs(attrs: &[(String, String)]) -> (String, String) {
    let mut attrs = attrs.to_vec();
    let src = attrs
        .iter()
        .position(|(name, _)| name == "src")
        .map(|index| attrs.remove(index).1)
        .unwrap_or_default();

    match attrs.iter_mut().find(|(name, _)| name == "class") {
        Some((_, class)) => {
            class.push_str(" center");
        }
        None => attrs.push(("class".to_owned(), "center".to_owned())),
    }

    (src, render_attrs(&attrs))
}

/// Muted looping video standing in for an animated GIF.
pub fn render_gif(directive: &Directive) -> String {
    let (src, attrs) = wrapper_attrs(&directive.attrs);
    format!(
        "<p{attrs}><video{style} class=\"gif\" crossorigin loop muted {DATA_SRC}=\"{src}\"></video>{caption}</p>",
        style = style_attr(&src),
        src = escape_html(&src),
        caption = caption(&directive.label),
    )
}

/// Video with controls; the label is the poster URL.
pub fn render_video(directive: &Directive) -> String {
    let mut poster = normalize_link(&directive.label);
    if !validate_link(&poster) {
        poster.clear();
    }

    let (src, attrs) = wrapper_attrs(&directive.attrs);
    format!(
        "<p{attrs}><video{style} class=\"md-video\" controls crossorigin poster=\"{poster}\" {DATA_SRC}=\"{src}\"></video></p>",
        style = style_attr(&src),
        poster = escape_html(&poster),
        src = escape_html(&src),
    )
}

pub fn render_audio(directive: &Directive) -> String {
    let (src, attrs) = wrapper_attrs(&directive.attrs);
    format!(
        "<p{attrs}><audio controls crossorigin {DATA_SRC}=\"{src}\"></audio>{caption}</p>",
        src = escape_html(&src),
        caption = caption(&directive.label),
    )
}

/// The media directives, keyed by name.
pub fn media_map() -> DirectiveMap {
    DirectiveMap::new()
        .block("gif", render_gif)
        .block("video", render_video)
        .block("audio", render_audio)
}

/// Replacement for the standard image node
#[derive(Debug, Clone)]
pub struct LazyImage {
    pub url: String,
    pub title: Option<String>,
    pub alt: String,
}

impl NodeValue for LazyImage {
    fn render(&self, node: &Node, fmt: &mut dyn Renderer) {
        let mut attrs: Vec<(String, String)> = node
            .attrs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect();
        attrs.push(("src".to_owned(), self.url.clone()));
        if let Some(title) = &self.title {
            attrs.push(("title".to_owned(), title.clone()));
        }

        let (src, wrapper) = wrapper_attrs(&attrs);
        let src = escape_html(&src);
        let label = escape_html(&self.alt);

        // Double quotes around alt: the CommonMark escaper leaves `'` alone.
        fmt.text_raw(&format!(
            "<span{wrapper}><a{style} class=\"md-inspect\" href=\"{src}\" target=\"_blank\" rel=\"noopener nofollow\">\
             <img {DATA_SRC}=\"{src}\" alt=\"{label}\" class=\"md-img\" crossorigin></a>{caption}</span>",
            style = style_attr(&self.url),
            caption = caption(&self.alt),
        ));
    }
}

/// Swaps every [`Image`] node for a [`LazyImage`].
pub struct LazyImageRule;

impl CoreRule for LazyImageRule {
    fn run(root: &mut Node, _: &MarkdownIt) {
        root.walk_mut(|node, _| {
            let Some(image) = node.cast::<Image>() else {
                return;
            };
            let lazy = LazyImage {
                url: image.url.clone(),
                title: image.title.clone(),
                alt: node.collect_text(),
            };
            node.children.clear();
            node.replace(lazy);
        });
    }
}

/// Add media plugin to markdown-it parser
///
/// Installs the directive plugin with [`media_map`] as well.
pub fn add_media_plugin(md: &mut MarkdownIt) {
    add_directive_plugin(md, media_map());
    md.add_rule::<LazyImageRule>();
}
