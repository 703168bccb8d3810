//! Ready-made parser configurations
//!
//! [`Preset::Rich`] is the full preview pipeline. [`Preset::Guest`] is the
//! same minus raw HTML, for content from untrusted authors.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use markdown_it::plugins::{cmark, extra, html};
use markdown_it::MarkdownIt;

use crate::plugins::directive::DirectiveMap;
use crate::plugins::{
    add_collapsible_plugin, add_container_plugin, add_directive_plugin, add_fence_plugin,
    add_media_plugin, add_source_line_plugin,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    #[default]
    Rich,
    Guest,
}

impl Preset {
    /// Build a new parser for this preset.
    pub fn build(self) -> MarkdownIt {
        self.build_with(DirectiveMap::new())
    }

    /// Build a new parser with extra directives. Entries in `overrides`
    /// shadow the built-in media directives of the same name.
    pub fn build_with(self, overrides: DirectiveMap) -> MarkdownIt {
        let mut md = MarkdownIt::new();
        cmark::add(&mut md);
        if self == Preset::Rich {
            html::add(&mut md);
        }
        extra::tables::add(&mut md);
        extra::strikethrough::add(&mut md);

        add_container_plugin(&mut md);
        add_collapsible_plugin(&mut md);
        add_fence_plugin(&mut md);
        add_media_plugin(&mut md);
        if !overrides.is_empty() {
            add_directive_plugin(&mut md, overrides);
        }
        add_source_line_plugin(&mut md);
        md
    }

    /// Shared parser for this preset.
    pub fn parser(self) -> &'static MarkdownIt {
        match self {
            Preset::Rich => rich(),
            Preset::Guest => guest(),
        }
    }

    pub fn render(self, source: &str) -> String {
        self.parser().parse(source).render()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Rich => "rich",
            Preset::Guest => "guest",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rich" => Ok(Preset::Rich),
            "guest" => Ok(Preset::Guest),
            other => Err(format!("unknown preset '{other}', expected 'rich' or 'guest'")),
        }
    }
}

/// The shared rich parser.
pub fn rich() -> &'static MarkdownIt {
    static RICH: OnceLock<MarkdownIt> = OnceLock::new();
    RICH.get_or_init(|| Preset::Rich.build())
}

/// The shared guest parser.
pub fn guest() -> &'static MarkdownIt {
    static GUEST: OnceLock<MarkdownIt> = OnceLock::new();
    GUEST.get_or_init(|| Preset::Guest.build())
}
