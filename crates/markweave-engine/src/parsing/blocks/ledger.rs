/// Maps offsets in a leaf block's buffered content back to source offsets.
///
/// Content is assembled from line remainders (plus synthetic spaces for
/// partially consumed tabs, U+FFFD for NUL and a `\n` per line), so one
/// segment is recorded wherever the content stops being a contiguous copy of
/// the source. A segment never maps past the source start of the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionLedger {
    /// `(content_offset, source_offset)`, sorted by content offset.
    segments: Vec<(usize, usize)>,
}

impl PositionLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that content from `content_offset` on copies the source from
    /// `source_offset` on.
    pub fn record(&mut self, content_offset: usize, source_offset: usize) {
        match self.segments.last_mut() {
            Some(last) if last.0 == content_offset => last.1 = source_offset,
            _ => self.segments.push((content_offset, source_offset)),
        }
    }

    /// Source offset of `content_offset`. Offsets before the first segment
    /// map to its source start.
    #[must_use]
    pub fn map(&self, content_offset: usize) -> usize {
        match self.segment_of(content_offset) {
            Some(i) => self.within(i, content_offset - self.segments[i].0),
            None => self.segments.first().map_or(0, |&(_, source)| source),
        }
    }

    /// Source offset just past the content byte before `content_offset`, for
    /// mapping exclusive range ends.
    #[must_use]
    pub fn map_end(&self, content_offset: usize) -> usize {
        let last = content_offset.checked_sub(1);
        match last.and_then(|last| self.segment_of(last)) {
            Some(i) => self.within(i, content_offset - self.segments[i].0),
            None => self.map(0),
        }
    }

    fn segment_of(&self, content_offset: usize) -> Option<usize> {
        self.segments
            .partition_point(|&(content, _)| content <= content_offset)
            .checked_sub(1)
    }

    fn within(&self, segment: usize, delta: usize) -> usize {
        let source = self.segments[segment].1 + delta;
        match self.segments.get(segment + 1) {
            Some(&(_, next)) => source.min(next),
            None => source,
        }
    }

    /// Drops the first `consumed` bytes of content from the mapping.
    pub fn rebase(&mut self, consumed: usize) {
        let start = self.map(consumed);
        let mut rebased = vec![(0, start)];
        rebased.extend(
            self.segments
                .iter()
                .filter(|&&(content, _)| content > consumed)
                .map(|&(content, source)| (content - consumed, source)),
        );
        self.segments = rebased;
    }

    /// A ledger for a sub-slice of this content starting at `content_offset`.
    #[must_use]
    pub fn slice(&self, content_offset: usize) -> PositionLedger {
        let mut sliced = self.clone();
        sliced.rebase(content_offset);
        sliced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_lines() -> PositionLedger {
        // "> abc\n> def" buffered as "abc\ndef\n"
        let mut ledger = PositionLedger::new();
        ledger.record(0, 2);
        ledger.record(4, 8);
        ledger
    }

    #[test]
    fn maps_within_segments() {
        let ledger = two_lines();
        assert_eq!(ledger.map(0), 2);
        assert_eq!(ledger.map(2), 4);
        assert_eq!(ledger.map(3), 5);
        assert_eq!(ledger.map(4), 8);
        assert_eq!(ledger.map(6), 10);
    }

    #[test]
    fn rebase_shifts_content_offsets() {
        let mut ledger = two_lines();
        ledger.rebase(4);
        assert_eq!(ledger.map(0), 8);
        assert_eq!(ledger.map(2), 10);
    }

    #[test]
    fn rebase_inside_a_segment() {
        let mut ledger = two_lines();
        ledger.rebase(1);
        assert_eq!(ledger.map(0), 3);
        assert_eq!(ledger.map(3), 8);
    }

    #[test]
    fn widened_bytes_map_onto_their_source_byte() {
        // "\0x" buffered as "\u{fffd}x\n"
        let mut ledger = PositionLedger::new();
        ledger.record(0, 0);
        ledger.record(3, 1);
        assert_eq!(ledger.map(0), 0);
        assert_eq!(ledger.map(2), 1);
        assert_eq!(ledger.map_end(3), 1);
        assert_eq!(ledger.map(3), 1);
        assert_eq!(ledger.map_end(4), 2);
    }

    #[test]
    fn empty_ledger_maps_to_zero() {
        assert_eq!(PositionLedger::new().map(5), 0);
    }

    #[test]
    fn re_recording_same_offset_overwrites() {
        let mut ledger = PositionLedger::new();
        ledger.record(0, 3);
        ledger.record(0, 7);
        assert_eq!(ledger.map(1), 8);
    }
}
