use crate::extensions::tables;
use crate::parsing::{
    ParseOptions,
    chars::is_space_or_tab,
    registry::{BlockOpener, BlockStart, Registry},
    rope::{LineRef, Span, lines::source_offset},
    tree::{Block, BlockContent, BlockId, BlockKind, BlockTag, Document},
};

use super::{
    kinds::{BlockQuote, CodeFence, HtmlBlock, IndentedCode, List, Paragraph},
    ledger::PositionLedger,
};

/// Columns of indentation that make a line indented code.
pub const CODE_INDENT: usize = 4;

/// Result of testing one open block against the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Matched,
    Failed,
    /// The block consumed the whole line (a closing fence).
    LineDone,
}

/// The line-by-line block state machine.
///
/// Each pushed line first walks down the open blocks, letting each one
/// consume its continuation marker; then tries to open new blocks at the
/// first non-space character; then adds what is left to the deepest leaf
/// (or lazily to an open paragraph).
pub struct BlockBuilder<'r> {
    registry: &'r Registry,
    options: ParseOptions,
    doc: Document,
    tip: BlockId,
    old_tip: BlockId,
    last_matched_container: BlockId,
    all_closed: bool,

    line: String,
    line_start: usize,
    /// Where NULs in `line` were widened to U+FFFD.
    line_replaced: Vec<usize>,
    line_number: usize,
    /// Source offset where each line's content ends, by line number.
    line_ends: Vec<usize>,

    offset: usize,
    column: usize,
    next_nonspace: usize,
    next_nonspace_column: usize,
    indent: usize,
    indented: bool,
    blank: bool,
    partially_consumed_tab: bool,
}

impl<'r> BlockBuilder<'r> {
    pub fn new(registry: &'r Registry, options: ParseOptions, source_len: usize) -> Self {
        let doc = Document::new(source_len);
        let root = doc.root();
        Self {
            registry,
            options,
            doc,
            tip: root,
            old_tip: root,
            last_matched_container: root,
            all_closed: true,
            line: String::new(),
            line_start: 0,
            line_replaced: Vec::new(),
            line_number: 0,
            line_ends: vec![0],
            offset: 0,
            column: 0,
            next_nonspace: 0,
            next_nonspace_column: 0,
            indent: 0,
            indented: false,
            blank: false,
            partially_consumed_tab: false,
        }
    }

    pub fn push(&mut self, line: &LineRef<'_>) {
        self.line.clear();
        self.line.push_str(&line.text);
        self.line_start = line.span.start;
        self.line_replaced.clone_from(&line.replaced);
        self.line_number += 1;
        self.line_ends.push(line.span.end);
        self.offset = 0;
        self.column = 0;
        self.blank = false;
        self.partially_consumed_tab = false;
        self.old_tip = self.tip;

        let mut container = self.doc.root();
        while let Some(last) = self.doc.blocks.last_child(container)
            && self.doc.blocks[last].open
        {
            container = last;
            self.find_next_nonspace();
            match self.continue_block(container) {
                Continuation::Matched => {}
                Continuation::Failed => {
                    container = self.parent_of(container);
                    break;
                }
                Continuation::LineDone => return,
            }
        }

        self.all_closed = container == self.old_tip;
        self.last_matched_container = container;

        // A second blank line in a row ends every enclosing list.
        self.find_next_nonspace();
        if self.blank && self.doc.blocks[container].last_line_blank {
            self.break_out_of_lists(container);
            container = self.tip;
            self.last_matched_container = container;
            self.old_tip = container;
            self.all_closed = true;
        }

        let registry = self.registry;
        let mut matched_leaf = {
            let tag = &self.doc.blocks[container].tag;
            tag.accepts_lines() && !matches!(tag, BlockTag::Paragraph | BlockTag::Table(_))
        };
        while !matched_leaf {
            self.find_next_nonspace();
            let chain: &[BlockOpener] = if self.indented {
                registry.indented_openers()
            } else {
                match self.line[self.next_nonspace..].chars().next() {
                    Some(c) => registry.openers(c),
                    None => &[],
                }
            };

            let mut started = BlockStart::NoMatch;
            for opener in chain {
                started = (opener.open)(self, container);
                if started != BlockStart::NoMatch {
                    break;
                }
            }
            match started {
                BlockStart::NoMatch => {
                    self.advance_next_nonspace();
                    break;
                }
                BlockStart::Container => container = self.tip,
                BlockStart::Leaf => {
                    container = self.tip;
                    matched_leaf = true;
                }
            }
        }

        self.add_text_to_container(container);
    }

    fn add_text_to_container(&mut self, container: BlockId) {
        self.find_next_nonspace();

        if self.blank
            && let Some(last) = self.doc.blocks.last_child(container)
        {
            self.doc.blocks[last].last_line_blank = true;
        }

        let block = &self.doc.blocks[container];
        let last_line_blank = self.blank
            && !match &block.tag {
                BlockTag::BlockQuote
                | BlockTag::Heading(_)
                | BlockTag::ThematicBreak
                | BlockTag::FencedCode(_)
                | BlockTag::Table(_) => true,
                BlockTag::ListItem(_) => {
                    self.doc.blocks.first_child(container).is_none()
                        && block.start_line == self.line_number
                }
                _ => false,
            };
        self.doc.blocks[container].last_line_blank = last_line_blank;
        let ancestors: Vec<_> = self.doc.blocks.ancestors(container).collect();
        for id in ancestors {
            self.doc.blocks[id].last_line_blank = false;
        }

        if self.maybe_lazy() {
            self.add_line();
            return;
        }

        self.close_unmatched_blocks();
        let tag = &self.doc.blocks[container].tag;
        if tag.accepts_lines() {
            let html_kind = match tag {
                BlockTag::HtmlBlock(kind) => Some(*kind),
                _ => None,
            };
            self.add_line();
            if let Some(kind) = html_kind
                && HtmlBlock::ends_on(kind, &self.line[self.offset..])
            {
                self.finalize(container, self.line_number);
            }
        } else if self.offset < self.line.len() && !self.blank {
            let offset = self.next_nonspace;
            self.add_child(BlockTag::Paragraph, offset);
            self.advance_next_nonspace();
            self.add_line();
        }
    }

    /// Closes every open block and returns the finished block tree. Inline
    /// content is still raw.
    pub fn finish(mut self) -> Document {
        let last_line = self.line_number;
        let root = self.doc.root();
        loop {
            let tip = self.tip;
            self.finalize(tip, last_line);
            if tip == root {
                break;
            }
        }
        log::debug!(
            "block phase done: {} lines, {} blocks",
            self.line_number,
            self.doc.blocks.len()
        );
        self.doc
    }

    fn continue_block(&mut self, id: BlockId) -> Continuation {
        match self.doc.blocks[id].tag.kind() {
            BlockKind::Document | BlockKind::List => Continuation::Matched,
            BlockKind::BlockQuote => BlockQuote::continues(self),
            BlockKind::ListItem => List::item_continues(self, id),
            BlockKind::FencedCode => CodeFence::continues(self, id),
            BlockKind::IndentedCode => IndentedCode::continues(self),
            BlockKind::HtmlBlock => HtmlBlock::continues(self, id),
            BlockKind::Paragraph | BlockKind::Table => {
                if self.blank {
                    Continuation::Failed
                } else {
                    Continuation::Matched
                }
            }
            BlockKind::Heading
            | BlockKind::ThematicBreak
            | BlockKind::ReferenceDefinition
            | BlockKind::TableRow
            | BlockKind::TableCell => Continuation::Failed,
        }
    }

    fn break_out_of_lists(&mut self, block: BlockId) {
        let outermost = std::iter::once(block)
            .chain(self.doc.blocks.ancestors(block))
            .filter(|&id| matches!(self.doc.blocks[id].tag, BlockTag::List(_)))
            .last();
        let Some(list) = outermost else {
            return;
        };
        let mut current = block;
        while current != list {
            let parent = self.parent_of(current);
            self.finalize(current, self.line_number);
            current = parent;
        }
        self.finalize(list, self.line_number);
    }

    fn parent_of(&self, id: BlockId) -> BlockId {
        match self.doc.blocks.parent(id) {
            Some(parent) => parent,
            None => panic!("block {id:?} has no parent"),
        }
    }

    // ---- state shared with block openers ----

    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// The line from the first non-space character on.
    #[must_use]
    pub fn rest(&self) -> &str {
        &self.line[self.next_nonspace..]
    }

    #[must_use]
    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        self.line.as_bytes().get(pos).copied()
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    #[must_use]
    pub fn next_nonspace(&self) -> usize {
        self.next_nonspace
    }

    #[must_use]
    pub fn indent(&self) -> usize {
        self.indent
    }

    #[must_use]
    pub fn indented(&self) -> bool {
        self.indented
    }

    #[must_use]
    pub fn blank(&self) -> bool {
        self.blank
    }

    #[must_use]
    pub fn all_closed(&self) -> bool {
        self.all_closed
    }

    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    #[must_use]
    pub fn tip(&self) -> BlockId {
        self.tip
    }

    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.doc.blocks[id]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.doc.blocks[id]
    }

    /// Whether the current line would lazily continue an open paragraph.
    #[must_use]
    pub fn maybe_lazy(&self) -> bool {
        !self.all_closed
            && !self.blank
            && matches!(self.doc.blocks[self.tip].tag, BlockTag::Paragraph)
    }

    pub fn find_next_nonspace(&mut self) {
        let bytes = self.line.as_bytes();
        let mut i = self.offset;
        let mut cols = self.column;
        while let Some(&b) = bytes.get(i) {
            match b {
                b' ' => {
                    i += 1;
                    cols += 1;
                }
                b'\t' => {
                    i += 1;
                    cols += 4 - (cols % 4);
                }
                _ => break,
            }
        }
        self.blank = i >= bytes.len();
        self.next_nonspace = i;
        self.next_nonspace_column = cols;
        self.indent = cols - self.column;
        self.indented = self.indent >= CODE_INDENT;
    }

    pub fn advance_next_nonspace(&mut self) {
        self.offset = self.next_nonspace;
        self.column = self.next_nonspace_column;
        self.partially_consumed_tab = false;
    }

    /// Advances by `count` bytes, or by `count` columns when `columns` is
    /// set, in which case a tab may be only partially consumed.
    pub fn advance_offset(&mut self, mut count: usize, columns: bool) {
        while count > 0 {
            let Some(b) = self.byte_at(self.offset) else {
                break;
            };
            if b == b'\t' {
                let to_tab = 4 - (self.column % 4);
                if columns {
                    self.partially_consumed_tab = to_tab > count;
                    let advance = to_tab.min(count);
                    self.column += advance;
                    if !self.partially_consumed_tab {
                        self.offset += 1;
                    }
                    count -= advance;
                } else {
                    self.partially_consumed_tab = false;
                    self.column += to_tab;
                    self.offset += 1;
                    count -= 1;
                }
            } else {
                self.partially_consumed_tab = false;
                self.offset += 1;
                self.column += 1;
                count -= 1;
            }
        }
    }

    /// Rewinds to a position recorded earlier on this line.
    pub fn set_position(&mut self, offset: usize, column: usize) {
        self.offset = offset;
        self.column = column;
        self.partially_consumed_tab = false;
    }

    /// Skips one optional space or tab column after a marker.
    pub fn skip_optional_space(&mut self) {
        if self.byte_at(self.offset).is_some_and(is_space_or_tab) {
            self.advance_offset(1, true);
        }
    }

    /// Consumes the rest of the line without adding it anywhere.
    pub fn consume_rest(&mut self) {
        self.advance_offset(self.line.len() - self.offset, false);
    }

    /// Appends the remainder of the line to the tip's buffered content.
    pub fn add_line(&mut self) {
        let tip = self.tip;
        assert!(
            self.doc.blocks[tip].open,
            "attempted to add line {} to closed block {tip:?}",
            self.line_number
        );
        let block = &mut self.doc.blocks[tip];
        let mut content = match std::mem::take(&mut block.content) {
            BlockContent::Raw(s) => s,
            _ => String::new(),
        };
        if self.options.track_positions {
            block.ledger.get_or_insert_with(PositionLedger::new);
        }

        let source_at = |at| source_offset(self.line_start, &self.line_replaced, at);
        if self.partially_consumed_tab {
            if let Some(ledger) = block.ledger.as_mut() {
                ledger.record(content.len(), source_at(self.offset));
            }
            self.offset += 1;
            let to_tab = 4 - (self.column % 4);
            content.extend(std::iter::repeat_n(' ', to_tab));
        }
        if let Some(ledger) = block.ledger.as_mut() {
            record_line(ledger, content.len(), self.offset, &self.line_replaced, source_at);
        }
        content.push_str(&self.line[self.offset..]);
        content.push('\n');
        block.content = BlockContent::Raw(content);
    }

    /// Sets a leaf's content directly from `line[from..]`, for leaves that
    /// take exactly one line (ATX headings).
    pub fn set_content(&mut self, id: BlockId, from: usize, content: String) {
        if self.options.track_positions {
            let source_at = |at| source_offset(self.line_start, &self.line_replaced, at);
            let mut ledger = PositionLedger::new();
            record_line(&mut ledger, 0, from, &self.line_replaced, source_at);
            self.doc.blocks[id].ledger = Some(ledger);
        }
        let block = &mut self.doc.blocks[id];
        block.content = BlockContent::Raw(content);
    }

    /// Finalizes blocks left unmatched by this line.
    pub fn close_unmatched_blocks(&mut self) {
        if self.all_closed {
            return;
        }
        while self.old_tip != self.last_matched_container {
            let parent = self.parent_of(self.old_tip);
            self.finalize(self.old_tip, self.line_number - 1);
            self.old_tip = parent;
        }
        self.all_closed = true;
    }

    /// Opens a new block at byte `offset` of the line as the last child of
    /// the nearest open block that can hold it.
    pub fn add_child(&mut self, tag: BlockTag, offset: usize) -> BlockId {
        let kind = tag.kind();
        while !self.doc.blocks[self.tip].tag.can_contain(kind) {
            self.finalize(self.tip, self.line_number.saturating_sub(1));
        }
        log::trace!("open {kind:?} at line {}", self.line_number);

        let mut block = Block::new(tag, self.line_number);
        if self.options.track_positions {
            let start = source_offset(self.line_start, &self.line_replaced, offset);
            block.span = Some(Span::new(start, start));
        }
        let id = self.doc.blocks.alloc(block);
        self.doc.blocks.append_child(self.tip, id);
        self.tip = id;
        id
    }

    /// Makes `id` the tip again after it was retagged in place.
    pub fn set_tip(&mut self, id: BlockId) {
        self.tip = id;
    }

    /// Closes `id` as of the end of `line_number` and runs its finalize hook.
    pub fn finalize(&mut self, id: BlockId, line_number: usize) {
        let parent = self.doc.blocks.parent(id);
        if !self.doc.blocks[id].open {
            if let Some(parent) = parent {
                self.tip = parent;
            }
            return;
        }
        log::trace!(
            "finalize {:?} at line {line_number}",
            self.doc.blocks[id].tag.kind()
        );

        let block = &mut self.doc.blocks[id];
        block.open = false;
        if self.options.track_positions {
            let end = if id == self.doc.root {
                self.doc.source_len
            } else {
                self.line_ends.get(line_number).copied().unwrap_or(0)
            };
            let start = block.span.map_or(0, |s| s.start);
            block.span = Some(Span::new(start, end.max(start)));
        }

        match block.tag.kind() {
            BlockKind::Paragraph => Paragraph::finalize(self, id),
            BlockKind::FencedCode => CodeFence::finalize(self, id),
            BlockKind::IndentedCode => IndentedCode::finalize(self, id),
            BlockKind::HtmlBlock => HtmlBlock::finalize(self, id),
            BlockKind::List => List::finalize(self, id),
            BlockKind::Table => tables::materialize(self, id),
            _ => {}
        }

        match parent {
            Some(parent) => self.tip = parent,
            None => {
                assert!(
                    id == self.doc.root,
                    "finalized detached block {id:?} that is not the document"
                );
            }
        }
    }
}

/// Records the ledger segments for `line[from..]` copied to content offset
/// `content_at`: one at the start and a collapsed one per replaced NUL.
fn record_line(
    ledger: &mut PositionLedger,
    content_at: usize,
    from: usize,
    replaced: &[usize],
    source_at: impl Fn(usize) -> usize,
) {
    ledger.record(content_at, source_at(from));
    for &r in replaced.iter().filter(|&&r| r >= from) {
        let at = content_at + (r - from);
        ledger.record(at, source_at(r));
        ledger.record(at + '\u{fffd}'.len_utf8(), source_at(r) + 1);
    }
}
