use crate::parsing::{
    blocks::builder::BlockBuilder,
    registry::BlockStart,
    scanners,
    tree::{BlockId, BlockTag},
};

pub struct ThematicBreak;

impl ThematicBreak {
    pub const MARKERS: [char; 3] = ['*', '-', '_'];

    pub fn open(b: &mut BlockBuilder<'_>, _container: BlockId) -> BlockStart {
        if b.indented() || scanners::thematic_break(b.rest()).is_none() {
            return BlockStart::NoMatch;
        }
        b.close_unmatched_blocks();
        let at = b.next_nonspace();
        b.add_child(BlockTag::ThematicBreak, at);
        b.consume_rest();
        BlockStart::Leaf
    }
}
