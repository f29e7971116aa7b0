pub mod extensions;
pub mod parsing;
pub mod render;

// Re-export key types for easier usage
pub use extensions::Extension;
pub use parsing::{
    ParseOptions, Parser, parse,
    registry::{Registry, RegistryBuilder, SetupError},
    tree::{Block, BlockId, BlockKind, BlockTag, Document, Inline, InlineId, InlineTag},
};
pub use render::render;

/// Parses CommonMark with the core registry and renders it as HTML.
pub fn to_html(text: &str) -> String {
    render(&parse(text))
}
