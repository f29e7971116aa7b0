//! GFM pipe tables.
//!
//! A one-line paragraph followed by a delimiter row (`| --- | :-: |`) with
//! the same number of cells becomes a table. Body rows are buffered like
//! paragraph lines until a blank line or another block start, and are split
//! into row and cell blocks when the table closes.

use crate::parsing::{
    blocks::BlockBuilder,
    chars::is_space_or_tab,
    registry::{BlockOpener, BlockStart, Layer, RegistryBuilder, SetupError},
    rope::Span,
    tree::{Alignment, Block, BlockContent, BlockId, BlockKind, BlockTag, TableData},
};

use super::Extension;

pub struct Tables;

impl Tables {
    const TRIGGERS: [char; 3] = ['|', '-', ':'];

    const OPENER: BlockOpener = BlockOpener {
        name: "table",
        creates: BlockKind::Table,
        open: Self::open,
    };

    /// Retags the paragraph above a delimiter row as a table.
    fn open(b: &mut BlockBuilder<'_>, container: BlockId) -> BlockStart {
        if b.indented() || !matches!(b.block(container).tag, BlockTag::Paragraph) {
            return BlockStart::NoMatch;
        }
        let Some(alignments) = delimiter_row(b.rest()) else {
            return BlockStart::NoMatch;
        };
        let Some(header) = b.block(container).raw() else {
            return BlockStart::NoMatch;
        };
        let header = header.strip_suffix('\n').unwrap_or(header);
        if header.contains('\n') || split_cells(header).len() != alignments.len() {
            return BlockStart::NoMatch;
        }

        b.close_unmatched_blocks();
        b.block_mut(container).tag = BlockTag::Table(TableData { alignments });
        b.set_tip(container);
        b.consume_rest();
        BlockStart::Leaf
    }
}

impl Extension for Tables {
    fn name(&self) -> &'static str {
        "tables"
    }

    fn register(&self, builder: &mut RegistryBuilder) -> Result<(), SetupError> {
        for trigger in Self::TRIGGERS {
            builder.block_opener(trigger, Layer::Extension, Self::OPENER)?;
        }
        Ok(())
    }
}

/// Alignments of a delimiter row, one per cell. The row must contain a
/// pipe, and every cell must be dashes with optional colons at either end.
fn delimiter_row(line: &str) -> Option<Vec<Alignment>> {
    if !line.contains('|') {
        return None;
    }
    let mut alignments = Vec::new();
    for (start, end) in split_cells(line) {
        let cell = &line[start..end];
        let left = cell.starts_with(':');
        let right = cell.ends_with(':');
        let dashes = cell.trim_start_matches(':').trim_end_matches(':');
        if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
            return None;
        }
        alignments.push(match (left, right) {
            (true, true) => Alignment::Center,
            (true, false) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::None,
        });
    }
    Some(alignments)
}

/// Byte ranges of the trimmed cells of one row. Leading and trailing pipes
/// are optional; `\|` does not split.
fn split_cells(line: &str) -> Vec<(usize, usize)> {
    let bytes = line.as_bytes();
    let (mut start, mut end) = trim(bytes, 0, bytes.len());
    if bytes.get(start) == Some(&b'|') {
        start += 1;
    }
    if end > start && bytes[end - 1] == b'|' && !(end >= 2 && bytes[end - 2] == b'\\') {
        end -= 1;
    }

    let mut cells = Vec::new();
    let mut cell_start = start;
    let mut i = start;
    while i < end {
        match bytes[i] {
            b'\\' => i += 2,
            b'|' => {
                cells.push(trim(bytes, cell_start, i));
                cell_start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    cells.push(trim(bytes, cell_start, end));
    cells
}

fn trim(bytes: &[u8], mut start: usize, mut end: usize) -> (usize, usize) {
    while start < end && is_space_or_tab(bytes[start]) {
        start += 1;
    }
    while end > start && is_space_or_tab(bytes[end - 1]) {
        end -= 1;
    }
    (start, end)
}

/// Splits a closed table's buffered lines into row and cell blocks. Body
/// rows are padded or cut to the header's column count.
pub(crate) fn materialize(b: &mut BlockBuilder<'_>, id: BlockId) {
    let columns = match &b.block(id).tag {
        BlockTag::Table(table) => table.alignments.len(),
        _ => return,
    };
    let block = b.block_mut(id);
    let start_line = block.start_line;
    let content = match std::mem::take(&mut block.content) {
        BlockContent::Raw(content) => content,
        _ => String::new(),
    };
    let ledger = block.ledger.take();
    let source_span = |from: usize, to: usize| {
        ledger.as_ref().map(|l| {
            let start = l.map(from);
            let end = if to > from { l.map_end(to) } else { start };
            Span::new(start, end)
        })
    };

    let doc = b.document_mut();
    let mut offset = 0;
    let mut row_index = 0;
    for line in content.split_inclusive('\n') {
        let line_offset = offset;
        offset += line.len();
        let text = line.strip_suffix('\n').unwrap_or(line);
        let (lead, tail) = trim(text.as_bytes(), 0, text.len());
        if lead == tail {
            continue;
        }

        let mut row = Block::new(
            BlockTag::TableRow {
                header: row_index == 0,
            },
            start_line + row_index,
        );
        row.open = false;
        row.span = source_span(line_offset + lead, line_offset + tail);
        let row_id = doc.blocks.alloc(row);
        doc.blocks.append_child(id, row_id);

        let cells = split_cells(text);
        for column in 0..columns {
            let (start, end) = cells.get(column).copied().unwrap_or((tail, tail));
            let mut cell = Block::new(BlockTag::TableCell, start_line + row_index);
            cell.open = false;
            cell.content = BlockContent::Raw(text[start..end].to_string());
            cell.span = source_span(line_offset + start, line_offset + end);
            cell.ledger = ledger.as_ref().map(|l| l.slice(line_offset + start));
            let cell_id = doc.blocks.alloc(cell);
            doc.blocks.append_child(row_id, cell_id);
        }
        row_index += 1;
    }
    log::trace!("table {id:?}: {row_index} rows, {columns} columns");
}
