//! Editor configuration
//!
//! Loaded from TOML; every field has a default, so an empty file is a valid
//! configuration. Unknown keys are ignored.
//!
//! ```toml
//! renderer = "guest"
//! debounce_ms = 300
//!
//! [lazy_load]
//! root_margin = "0px 0px 400px 0px"
//!
//! [widget]
//! font_size = 16
//! ```

use std::path::Path;
use std::time::Duration;

use markpane_parser::Preset;
use markpane_preview::LazyLoadOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Usual word separators plus CJK punctuation, so word navigation stops at
/// full-width symbols too.
pub const WORD_SEPARATORS: &str = concat!(
    "`~!@#$%^&*()-=+[{]}\\|;:'\",.<>/?",
    "·！￥…*（）—【】：；‘’“”、《》，。？",
    "「」｛｝＜＞・～＠＃＄％＾＆＊＝『』",
);

/// Built-in renderer selected in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Rich,
    Guest,
}

impl From<RendererKind> for Preset {
    fn from(kind: RendererKind) -> Self {
        match kind {
            RendererKind::Rich => Preset::Rich,
            RendererKind::Guest => Preset::Guest,
        }
    }
}

/// Options handed to the code editor widget as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetOptions {
    pub line_height: u32,
    pub font_size: u32,
    pub word_wrap: bool,
    pub minimap: bool,
    pub word_separators: String,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        // CJK text needs the larger sizes.
        Self {
            line_height: 22,
            font_size: 18,
            word_wrap: true,
            minimap: false,
            word_separators: WORD_SEPARATORS.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub renderer: RendererKind,
    /// Delay between the last edit and the preview update; 0 disables it.
    pub debounce_ms: u64,
    pub scroll_synced: bool,
    pub lazy_load: LazyLoadOptions,
    pub widget: WidgetOptions,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            renderer: RendererKind::default(),
            debounce_ms: 500,
            scroll_synced: true,
            lazy_load: LazyLoadOptions::default(),
            widget: WidgetOptions::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        debug!(path = %path.display(), renderer = ?config.renderer, "loaded editor config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lazy_load
            .validate()
            .map_err(|err| ConfigError::Invalid(format!("lazy_load: {err}")))?;
        if self.widget.line_height == 0 || self.widget.font_size == 0 {
            return Err(ConfigError::Invalid(
                "widget: line_height and font_size must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn preset(&self) -> Preset {
        self.renderer.into()
    }
}
