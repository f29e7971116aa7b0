//! # Inline Parsing
//!
//! The second parsing phase. After the block tree is complete, every block
//! whose tag carries inline content (paragraphs, headings, table cells) has
//! its buffered text parsed into a chain of inline nodes.
//!
//! ## Modules
//!
//! - **`cursor`**: `Cursor` over the trimmed subject, with content offsets
//! - **`parser`**: `InlineParser`, byte dispatch and the literal constructs
//! - **`delimiters`**: the delimiter stack and emphasis resolution
//! - **`links`**: brackets, inline and reference links, images
//! - **`kinds`**: code spans and the core emphasis delimiters
//!
//! ## Precedence
//!
//! Code spans, autolinks and raw HTML are consumed as they are met, so
//! nothing inside them can open or close emphasis or links. Brackets bind
//! tighter than emphasis: a link closing resolves the emphasis inside it
//! before anything outside is considered.

pub mod cursor;
pub mod delimiters;
pub mod kinds;
pub mod links;
pub mod parser;

pub use parser::InlineParser;

use crate::parsing::{
    registry::Registry,
    tree::{BlockContent, BlockId, Document},
};

/// Replaces the raw content of every inline-bearing block with its parsed
/// inline root.
pub fn process_document(doc: &mut Document, registry: &Registry) {
    let targets: Vec<BlockId> = doc
        .descendants()
        .filter(|&id| doc.block(id).tag.has_inlines())
        .collect();
    for id in targets {
        let block = &mut doc.blocks[id];
        let content = match std::mem::take(&mut block.content) {
            BlockContent::Raw(content) => content,
            _ => String::new(),
        };
        let ledger = block.ledger.take();
        let root = InlineParser::new(
            registry,
            &doc.references,
            &mut doc.inlines,
            ledger.as_ref(),
            &content,
        )
        .run();
        doc.blocks[id].content = BlockContent::Inlines(root);
    }
}
