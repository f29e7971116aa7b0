//! Core block opener table.

use crate::parsing::{
    registry::{BlockOpener, Layer, RegistryBuilder},
    tree::BlockKind,
};

use super::kinds::{
    BlockQuote, CodeFence, Heading, HtmlBlock, IndentedCode, List, ThematicBreak,
};

const BLOCK_QUOTE: BlockOpener = BlockOpener {
    name: "block_quote",
    creates: BlockKind::BlockQuote,
    open: BlockQuote::open,
};

const ATX_HEADING: BlockOpener = BlockOpener {
    name: "atx_heading",
    creates: BlockKind::Heading,
    open: Heading::open_atx,
};

const CODE_FENCE: BlockOpener = BlockOpener {
    name: "code_fence",
    creates: BlockKind::FencedCode,
    open: CodeFence::open,
};

const HTML_BLOCK: BlockOpener = BlockOpener {
    name: "html_block",
    creates: BlockKind::HtmlBlock,
    open: HtmlBlock::open,
};

const SETEXT_HEADING: BlockOpener = BlockOpener {
    name: "setext_heading",
    creates: BlockKind::Heading,
    open: Heading::open_setext,
};

const THEMATIC_BREAK: BlockOpener = BlockOpener {
    name: "thematic_break",
    creates: BlockKind::ThematicBreak,
    open: ThematicBreak::open,
};

const BULLET_ITEM: BlockOpener = BlockOpener {
    name: "bullet_item",
    creates: BlockKind::ListItem,
    open: List::open_bullet,
};

const ORDERED_ITEM: BlockOpener = BlockOpener {
    name: "ordered_item",
    creates: BlockKind::ListItem,
    open: List::open_ordered,
};

const INDENTED_CODE: BlockOpener = BlockOpener {
    name: "indented_code",
    creates: BlockKind::IndentedCode,
    open: IndentedCode::open,
};

/// Trigger character and opener, in the order they are tried.
const CORE_OPENERS: &[(char, BlockOpener)] = &[
    ('>', BLOCK_QUOTE),
    ('#', ATX_HEADING),
    (CodeFence::BACKTICK, CODE_FENCE),
    (CodeFence::TILDE, CODE_FENCE),
    (HtmlBlock::OPEN, HTML_BLOCK),
    ('=', SETEXT_HEADING),
    ('-', SETEXT_HEADING),
    ('-', THEMATIC_BREAK),
    ('*', THEMATIC_BREAK),
    ('_', THEMATIC_BREAK),
    ('-', BULLET_ITEM),
    ('*', BULLET_ITEM),
    ('+', BULLET_ITEM),
];

pub fn register_core(builder: &mut RegistryBuilder) {
    let digits = ('0'..='9').map(|d| (d, ORDERED_ITEM));
    for (trigger, opener) in CORE_OPENERS.iter().copied().chain(digits) {
        let registered = builder.block_opener(trigger, Layer::Core, opener).is_ok();
        debug_assert!(registered, "core opener {} rejected", opener.name);
    }
    builder.indented_opener(Layer::Core, INDENTED_CODE);
}
