//! markdown-it plugins for the markpane preview syntax

pub mod collapsible;
pub mod container;
pub mod directive;
pub mod fence;
mod fenced;
pub mod media;
pub mod source_line;

pub use collapsible::add_collapsible_plugin;
pub use container::add_container_plugin;
pub use directive::add_directive_plugin;
pub use fence::add_fence_plugin;
pub use media::add_media_plugin;
pub use source_line::add_source_line_plugin;
