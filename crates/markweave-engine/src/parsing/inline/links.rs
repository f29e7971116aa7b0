//! Links and images: bracket entries on the delimiter stack and the
//! destination, title and reference forms that may follow `]`.

use crate::parsing::{
    scanners,
    tree::{Inline, InlineTag, LinkData},
};

use super::{delimiters::Delimiter, parser::InlineParser};

impl InlineParser<'_> {
    pub(super) fn open_bracket(&mut self, image: bool) {
        let start = self.cur.i;
        let (marker, len) = if image { ("![", 2) } else { ("[", 1) };
        self.cur.bump_n(len);
        let node = self.text(marker, start, self.cur.i);
        if let Some(previous) = self.stack.last_bracket() {
            self.stack[previous].bracket_after = true;
        }
        self.stack
            .push(Delimiter::bracket(node, start, self.cur.i, image));
    }

    pub(super) fn bang(&mut self) -> bool {
        if self.cur.peek_at(1) != Some(b'[') {
            return false;
        }
        self.open_bracket(true);
        true
    }

    pub(super) fn close_bracket(&mut self) {
        let start = self.cur.i;
        self.cur.bump();
        let after_close = self.cur.i;

        let Some(opener) = self.stack.last_bracket() else {
            self.text("]", start, after_close);
            return;
        };
        if !self.stack[opener].active {
            self.stack.remove(opener);
            self.text("]", start, after_close);
            return;
        }

        let (image, open_node, open_at, inner, bracket_after) = {
            let e = &self.stack[opener];
            (e.image, e.node, e.at, e.inner, e.bracket_after)
        };
        let target = self
            .inline_target()
            .or_else(|| self.reference_target(inner, start, bracket_after));
        let Some(data) = target else {
            self.stack.remove(opener);
            self.cur.i = after_close;
            self.text("]", start, after_close);
            return;
        };

        let tag = if image {
            InlineTag::Image(data)
        } else {
            InlineTag::Link(data)
        };
        let span = self.span(open_at, self.cur.i);
        let node = self.arena.alloc(Inline::new(tag, span));
        let mut current = self.arena.next(open_node);
        while let Some(id) = current {
            current = self.arena.next(id);
            self.arena.append_child(node, id);
        }
        self.arena.append_child(self.root, node);

        self.process_emphasis(Some(opener));
        self.stack.remove(opener);
        self.arena.detach(open_node);
        if !image {
            self.stack.deactivate_links();
        }
    }

    /// `(destination "title")` directly after the `]`.
    fn inline_target(&mut self) -> Option<LinkData> {
        let saved = self.cur.i;
        if self.cur.peek() != Some(b'(') {
            return None;
        }
        self.cur.bump();
        self.cur.skip_spnl();
        let Some((len, url)) = scanners::link_destination(self.cur.rest()) else {
            self.cur.i = saved;
            return None;
        };
        self.cur.bump_n(len);

        let before_title = self.cur.i;
        self.cur.skip_spnl();
        let mut title = String::new();
        if self.cur.i != before_title
            && let Some((len, parsed)) = scanners::link_title(self.cur.rest())
        {
            self.cur.bump_n(len);
            title = parsed;
        }
        self.cur.skip_spnl();
        if self.cur.peek() != Some(b')') {
            self.cur.i = saved;
            return None;
        }
        self.cur.bump();
        Some(LinkData { url, title })
    }

    /// Full `[label]`, collapsed `[]` or shortcut reference. The bracketed
    /// text itself is the label unless a full label follows.
    fn reference_target(
        &mut self,
        inner: usize,
        close: usize,
        bracket_after: bool,
    ) -> Option<LinkData> {
        let label_len = scanners::link_label(self.cur.rest()).unwrap_or(0);
        let label = if label_len > 2 {
            self.cur.rest()[..label_len].to_string()
        } else if !bracket_after {
            self.cur.s[inner..close].to_string()
        } else {
            return None;
        };
        self.cur.bump_n(label_len);
        let reference = self.refs.get(&label)?;
        Some(LinkData {
            url: reference.url.clone(),
            title: reference.title.clone(),
        })
    }
}
