//! The delimiter stack and emphasis resolution.

use std::{collections::HashMap, ops};

use crate::parsing::{
    registry::DelimKind,
    tree::{Inline, InlineId, InlineTag},
};

use super::parser::InlineParser;

/// Stack tier. Brackets are looked up by `]`; emphasis entries by closers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Emphasis,
    Bracket,
}

/// One delimiter run or bracket waiting for a partner.
#[derive(Debug, Clone)]
pub struct Delimiter {
    /// Placeholder text node holding the unconsumed delimiters.
    pub node: InlineId,
    pub ch: char,
    pub remaining: usize,
    pub original: usize,
    pub can_open: bool,
    pub can_close: bool,
    pub priority: Priority,
    pub image: bool,
    /// Cleared on `[` entries once a link closes after them.
    pub active: bool,
    /// Subject index where the run or bracket starts.
    pub at: usize,
    /// Subject index just after a bracket.
    pub inner: usize,
    /// Another bracket was opened after this one.
    pub bracket_after: bool,
    prev: Option<usize>,
    next: Option<usize>,
}

impl Delimiter {
    pub fn run(node: InlineId, ch: char, at: usize, len: usize, flags: (bool, bool)) -> Self {
        Self {
            node,
            ch,
            remaining: len,
            original: len,
            can_open: flags.0,
            can_close: flags.1,
            priority: Priority::Emphasis,
            image: false,
            active: true,
            at,
            inner: at + len,
            bracket_after: false,
            prev: None,
            next: None,
        }
    }

    pub fn bracket(node: InlineId, at: usize, inner: usize, image: bool) -> Self {
        Self {
            node,
            ch: '[',
            remaining: 1,
            original: 1,
            can_open: false,
            can_close: false,
            priority: Priority::Bracket,
            image,
            active: true,
            at,
            inner,
            bracket_after: false,
            prev: None,
            next: None,
        }
    }
}

/// Doubly linked stack stored in a slab; removed entries are unlinked and
/// their slots are never reused within one block.
#[derive(Debug, Default)]
pub struct DelimiterStack {
    entries: Vec<Delimiter>,
    top: Option<usize>,
}

impl DelimiterStack {
    pub fn push(&mut self, mut entry: Delimiter) -> usize {
        let idx = self.entries.len();
        entry.prev = self.top;
        entry.next = None;
        if let Some(top) = self.top {
            self.entries[top].next = Some(idx);
        }
        self.entries.push(entry);
        self.top = Some(idx);
        idx
    }

    pub fn remove(&mut self, idx: usize) {
        let (prev, next) = (self.entries[idx].prev, self.entries[idx].next);
        if let Some(p) = prev {
            self.entries[p].next = next;
        }
        match next {
            Some(n) => self.entries[n].prev = prev,
            None => self.top = prev,
        }
    }

    pub fn top(&self) -> Option<usize> {
        self.top
    }

    pub fn prev(&self, idx: usize) -> Option<usize> {
        self.entries[idx].prev
    }

    pub fn next(&self, idx: usize) -> Option<usize> {
        self.entries[idx].next
    }

    /// The entry directly above `bottom` (the bottom of the stack for `None`).
    pub fn first_above(&self, bottom: Option<usize>) -> Option<usize> {
        if self.top == bottom {
            return None;
        }
        let mut current = self.top?;
        while let Some(prev) = self.entries[current].prev
            && Some(prev) != bottom
        {
            current = prev;
        }
        Some(current)
    }

    /// Nearest `[` or `![` entry.
    pub fn last_bracket(&self) -> Option<usize> {
        let mut current = self.top;
        while let Some(idx) = current {
            if self.entries[idx].priority == Priority::Bracket {
                return Some(idx);
            }
            current = self.entries[idx].prev;
        }
        None
    }

    /// Links cannot contain links: once one closes, every `[` below it
    /// stays literal.
    pub fn deactivate_links(&mut self) {
        let mut current = self.top;
        while let Some(idx) = current {
            let entry = &mut self.entries[idx];
            if entry.priority == Priority::Bracket && !entry.image {
                entry.active = false;
            }
            current = entry.prev;
        }
    }

    pub fn remove_brackets(&mut self) {
        let mut current = self.top;
        while let Some(idx) = current {
            current = self.entries[idx].prev;
            if self.entries[idx].priority == Priority::Bracket {
                self.remove(idx);
            }
        }
    }

    /// Removes every entry strictly above `bottom`.
    pub fn remove_above(&mut self, bottom: Option<usize>) {
        while let Some(top) = self.top
            && Some(top) != bottom
        {
            self.remove(top);
        }
    }

    /// Removes the entries strictly between `lower` and `upper`.
    fn remove_between(&mut self, lower: usize, upper: usize) {
        let mut current = self.prev(upper);
        while let Some(idx) = current
            && idx != lower
        {
            current = self.prev(idx);
            self.remove(idx);
        }
    }
}

impl ops::Index<usize> for DelimiterStack {
    type Output = Delimiter;

    fn index(&self, idx: usize) -> &Delimiter {
        &self.entries[idx]
    }
}

impl ops::IndexMut<usize> for DelimiterStack {
    fn index_mut(&mut self, idx: usize) -> &mut Delimiter {
        &mut self.entries[idx]
    }
}

impl InlineParser<'_> {
    /// Pairs closers with openers above `bottom`, innermost first, and
    /// clears every entry above `bottom` afterwards.
    pub(super) fn process_emphasis(&mut self, bottom: Option<usize>) {
        // Lowest opener worth scanning to per closer class; keeps runs of
        // unmatched closers linear.
        let mut openers_bottom: HashMap<(char, bool, usize), Option<usize>> = HashMap::new();

        let mut closer = self.stack.first_above(bottom);
        while let Some(c) = closer {
            let entry = &self.stack[c];
            if !entry.can_close || entry.priority != Priority::Emphasis {
                closer = self.stack.next(c);
                continue;
            }
            let (ch, closer_opens, closer_len) = (entry.ch, entry.can_open, entry.original);
            let class = (ch, closer_opens, closer_len % 3);
            let floor = openers_bottom.get(&class).copied().unwrap_or(bottom);

            let mut candidate = self.stack.prev(c);
            let mut opener = None;
            while let Some(o) = candidate
                && Some(o) != bottom
                && Some(o) != floor
            {
                let entry = &self.stack[o];
                // Rule of three: a run that can both open and close only
                // pairs when the lengths do not sum to a multiple of three.
                let odd_match = (closer_opens || entry.can_close)
                    && closer_len % 3 != 0
                    && (entry.original + closer_len) % 3 == 0;
                if entry.priority == Priority::Emphasis
                    && entry.ch == ch
                    && entry.can_open
                    && !odd_match
                {
                    opener = Some(o);
                    break;
                }
                candidate = self.stack.prev(o);
            }

            let resolved = opener.and_then(|o| {
                let chain = self.registry.delimiter(ch)?;
                let (used, kind) =
                    chain.resolve(self.stack[o].remaining, self.stack[c].remaining)?;
                Some((o, used, kind))
            });
            match resolved {
                Some((o, used, kind)) => closer = self.pair(o, c, used, kind),
                None => {
                    openers_bottom.insert(class, self.stack.prev(c));
                    let next = self.stack.next(c);
                    if !closer_opens {
                        self.stack.remove(c);
                    }
                    closer = next;
                }
            }
        }

        self.stack.remove_above(bottom);
    }

    /// Consumes `used` delimiters from the end of the opener and the start
    /// of the closer and wraps what lies between. Returns the closer to
    /// continue from.
    fn pair(&mut self, o: usize, c: usize, used: usize, kind: DelimKind) -> Option<usize> {
        let (ch, o_node, o_at, o_rem) = {
            let e = &self.stack[o];
            (e.ch, e.node, e.at, e.remaining)
        };
        let (c_node, c_at, c_len, c_rem) = {
            let e = &self.stack[c];
            (e.node, e.at, e.original, e.remaining)
        };
        let inner_start = o_at + o_rem;
        let inner_end = c_at + (c_len - c_rem);
        let (o_left, c_left) = (o_rem - used, c_rem - used);
        self.stack[o].remaining = o_left;
        self.stack[c].remaining = c_left;

        let run = |n: usize| ch.to_string().repeat(n);
        self.set_text(o_node, run(o_left), o_at, o_at + o_left);
        self.set_text(c_node, run(c_left), inner_end + used, c_at + c_len);

        let span = self.span(inner_start - used, inner_end + used);
        let node = if kind.collapses() {
            let raw = self.cur.s[inner_start..inner_end].to_string();
            let node = self.arena.alloc(Inline::new(InlineTag::Math(raw), span));
            self.take_between(o_node, c_node, None);
            node
        } else {
            let node = self.arena.alloc(Inline::new(kind.container_tag(), span));
            self.take_between(o_node, c_node, Some(node));
            node
        };
        self.arena.insert_after(o_node, node);
        self.stack.remove_between(o, c);

        if o_left == 0 {
            self.arena.detach(o_node);
            self.stack.remove(o);
        }
        if c_left == 0 {
            let next = self.stack.next(c);
            self.arena.detach(c_node);
            self.stack.remove(c);
            next
        } else {
            Some(c)
        }
    }

    /// Detaches the siblings strictly between `first` and `last`, appending
    /// them to `into` when given.
    fn take_between(&mut self, first: InlineId, last: InlineId, into: Option<InlineId>) {
        let mut current = self.arena.next(first);
        while let Some(id) = current
            && id != last
        {
            current = self.arena.next(id);
            match into {
                Some(parent) => self.arena.append_child(parent, id),
                None => self.arena.detach(id),
            }
        }
    }
}
