use crate::parsing::{
    blocks::builder::BlockBuilder,
    registry::BlockStart,
    scanners,
    tree::{BlockContent, BlockId, BlockTag, HeadingData},
};

use super::Paragraph;

/// ATX (`# title`) and setext (`title` over `===`/`---`) headings.
pub struct Heading;

impl Heading {
    pub const ATX_MARKER: char = '#';
    pub const SETEXT_LEVEL1: char = '=';
    pub const SETEXT_LEVEL2: char = '-';

    pub fn open_atx(b: &mut BlockBuilder<'_>, _container: BlockId) -> BlockStart {
        if b.indented() {
            return BlockStart::NoMatch;
        }
        let Some((level, marker_len)) = scanners::atx_heading(b.rest()) else {
            return BlockStart::NoMatch;
        };
        b.advance_next_nonspace();
        b.advance_offset(marker_len, false);
        b.close_unmatched_blocks();

        let at = b.next_nonspace();
        let id = b.add_child(
            BlockTag::Heading(HeadingData {
                level,
                setext: false,
            }),
            at,
        );
        let from = b.offset();
        let content = scanners::strip_atx_closing(&b.line()[from..]).to_string();
        b.set_content(id, from, content);
        b.consume_rest();
        BlockStart::Leaf
    }

    /// Turns the paragraph being continued into a heading when this line is
    /// an underline. The paragraph keeps its identity and content.
    pub fn open_setext(b: &mut BlockBuilder<'_>, container: BlockId) -> BlockStart {
        if b.indented() || !matches!(b.block(container).tag, BlockTag::Paragraph) {
            return BlockStart::NoMatch;
        }
        let Some(level) = scanners::setext_underline(b.rest()) else {
            return BlockStart::NoMatch;
        };
        b.close_unmatched_blocks();
        if !Paragraph::extract_definitions(b, container) {
            // Nothing but definitions: they close as their own block and the
            // underline is left for the next opener or a new paragraph.
            let previous_line = b.line_number() - 1;
            b.finalize(container, previous_line);
            return BlockStart::NoMatch;
        }

        let block = b.block_mut(container);
        block.tag = BlockTag::Heading(HeadingData {
            level,
            setext: true,
        });
        if let BlockContent::Raw(content) = &mut block.content {
            let trimmed = content.trim_end().len();
            content.truncate(trimmed);
        }
        b.set_tip(container);
        b.consume_rest();
        BlockStart::Leaf
    }
}
