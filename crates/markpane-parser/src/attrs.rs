//! Attribute and class names shared by the renderer and the preview.

/// Start line (zero-based) of a top-level block.
pub const DATA_LINE: &str = "data-line";

/// Deferred resource URL, promoted to `src` on activation.
pub const DATA_SRC: &str = "data-src";

/// Button that copies the code of the surrounding code block.
pub const COPY_BUTTON_CLASS: &str = "copy-button";

/// Wrapper around a fenced code block and its copy button.
pub const CODE_BLOCK_CLASS: &str = "md-code";

/// Visible caption next to media.
pub const CAPTION_CLASS: &str = "md-alt";
