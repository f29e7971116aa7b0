/// A cursor over a leaf block's inline subject.
///
/// `i` indexes the subject; `base` is where the subject starts inside the
/// block's buffered content, so `pos()` is a content offset that the block's
/// position ledger can map back to the source.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    pub s: &'a str,
    pub base: usize,
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str, base: usize) -> Self {
        Self { s, base, i: 0 }
    }

    /// Content offset of the current position.
    pub fn pos(&self) -> usize {
        self.base + self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// The byte `n` positions ahead of the current one.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    pub fn rest(&self) -> &'a str {
        &self.s[self.i.min(self.s.len())..]
    }

    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.rest().as_bytes().starts_with(pat)
    }

    /// The character just before subject index `at`.
    pub fn char_before(&self, at: usize) -> Option<char> {
        self.s[..at].chars().next_back()
    }

    /// The character starting at subject index `at`.
    pub fn char_at(&self, at: usize) -> Option<char> {
        self.s.get(at..)?.chars().next()
    }

    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Advances past every byte matching `pred`; returns how many.
    pub fn skip_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let n = self.rest().bytes().take_while(|&b| pred(b)).count();
        self.i += n;
        n
    }

    /// Skips spaces and tabs with at most one line ending among them.
    pub fn skip_spnl(&mut self) {
        self.skip_while(|b| b == b' ' || b == b'\t');
        if self.peek() == Some(b'\n') {
            self.i += 1;
            self.skip_while(|b| b == b' ' || b == b'\t');
        }
    }
}
