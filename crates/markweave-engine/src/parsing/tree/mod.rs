//! # Document Tree
//!
//! Blocks and inlines live in two index arenas owned by a [`Document`].
//! Relations are `Id`s, never references, so the block engine and the inline
//! engine can re-link nodes freely while building.

pub mod arena;
pub mod block;
pub mod inline;

pub use arena::{Arena, Id};
pub use block::{
    Alignment, Block, BlockContent, BlockKind, BlockTag, FenceData, HeadingData, HtmlBlockKind,
    ListData, ListKind, Numbering, TableData,
};
pub use inline::{Inline, InlineTag, LinkData};

use crate::parsing::refs::ReferenceMap;

pub type BlockId = Id<Block>;
pub type InlineId = Id<Inline>;

/// The result of a parse: both arenas, the root block and the reference map.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) blocks: Arena<Block>,
    pub(crate) inlines: Arena<Inline>,
    pub(crate) root: BlockId,
    pub(crate) references: ReferenceMap,
    pub(crate) source_len: usize,
}

impl Document {
    pub(crate) fn new(source_len: usize) -> Self {
        let mut blocks = Arena::new();
        let root = blocks.alloc(Block::new(BlockTag::Document, 1));
        Self {
            blocks,
            inlines: Arena::new(),
            root,
            references: ReferenceMap::default(),
            source_len,
        }
    }

    #[must_use]
    pub fn root(&self) -> BlockId {
        self.root
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id]
    }

    #[must_use]
    pub fn inline(&self, id: InlineId) -> &Inline {
        &self.inlines[id]
    }

    pub fn children(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.children(id)
    }

    pub fn inline_children(&self, id: InlineId) -> impl Iterator<Item = InlineId> + '_ {
        self.inlines.children(id)
    }

    /// Pre-order walk of every attached block, starting at the root.
    pub fn descendants(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.descendants(self.root)
    }

    #[must_use]
    pub fn blocks(&self) -> &Arena<Block> {
        &self.blocks
    }

    #[must_use]
    pub fn inlines(&self) -> &Arena<Inline> {
        &self.inlines
    }

    #[must_use]
    pub fn references(&self) -> &ReferenceMap {
        &self.references
    }

    /// Byte length of the parsed source.
    #[must_use]
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Concatenated literal text under an inline node, used for image `alt`
    /// text and outlines.
    #[must_use]
    pub fn plain_text(&self, id: InlineId) -> String {
        let mut out = String::new();
        for node in self.inlines.descendants(id) {
            match &self.inlines[node].tag {
                InlineTag::Text(s) | InlineTag::Code(s) | InlineTag::Math(s) => out.push_str(s),
                InlineTag::SoftBreak | InlineTag::HardBreak => out.push(' '),
                _ => {}
            }
        }
        out
    }
}
