//! `mdp` subcommands

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use markpane_editor::EditorConfig;
use markpane_parser::Preset;
use markpane_preview::{Container, SourceMap};
use tracing::{debug, info};

/// Read the markdown source from `path`, or stdin for `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read markdown from stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read markdown file {}", path.display()))
}

/// Pick the preset: command line first, then the config file, then rich.
pub fn resolve_preset(preset: Option<Preset>, config: Option<&PathBuf>) -> Result<Preset> {
    if let Some(preset) = preset {
        return Ok(preset);
    }
    match config {
        Some(path) => {
            let config = EditorConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            Ok(config.preset())
        }
        None => Ok(Preset::default()),
    }
}

pub fn render(source: &str, preset: Preset) -> String {
    info!(%preset, chars = source.len(), "rendering markdown");
    preset.render(source)
}

/// `line<TAB>tag` for each top-level block of the rendered source.
pub fn lines(source: &str) -> Vec<String> {
    let container = Container::parse(&Preset::Rich.render(source));
    let map = SourceMap::from_container(&container);
    debug!(blocks = map.len(), "collected source lines");

    map.blocks()
        .iter()
        .map(|block| format!("{}\t{}", block.line, block.element.tag()))
        .collect()
}
