use crate::parsing::{
    chars::{CharClass, Flanking},
    registry::{DelimKind, InlineDelimiter, Layer, RegistryBuilder},
};

/// `*` and `_` emphasis. One delimiter gives emphasis, two give strong.
pub struct Emphasis;

impl Emphasis {
    pub const STAR: char = '*';
    pub const UNDERSCORE: char = '_';

    pub fn kinds(run: usize) -> Option<DelimKind> {
        match run {
            1 => Some(DelimKind::Emphasis),
            2 => Some(DelimKind::Strong),
            _ => None,
        }
    }

    fn star_opens(f: &Flanking) -> bool {
        f.left
    }

    fn star_closes(f: &Flanking) -> bool {
        f.right
    }

    /// `_` may not open or close inside a word.
    fn underscore_opens(f: &Flanking) -> bool {
        f.left && (!f.right || f.before == CharClass::Punctuation)
    }

    fn underscore_closes(f: &Flanking) -> bool {
        f.right && (!f.left || f.after == CharClass::Punctuation)
    }
}

pub fn register_core(builder: &mut RegistryBuilder) {
    let handlers = [
        InlineDelimiter {
            ch: Emphasis::STAR,
            kinds: Emphasis::kinds,
            can_open: Emphasis::star_opens,
            can_close: Emphasis::star_closes,
        },
        InlineDelimiter {
            ch: Emphasis::UNDERSCORE,
            kinds: Emphasis::kinds,
            can_open: Emphasis::underscore_opens,
            can_close: Emphasis::underscore_closes,
        },
    ];
    for handler in handlers {
        let registered = builder.inline_delimiter(Layer::Core, handler).is_ok();
        debug_assert!(registered, "core delimiter {:?} rejected", handler.ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some('a'), Some('b'), false, false)]
    #[case(Some(' '), Some('b'), true, false)]
    #[case(Some('a'), Some(' '), false, true)]
    #[case(Some('('), Some('b'), true, false)]
    #[case(Some('a'), Some('.'), false, true)]
    fn underscore_is_word_bound(
        #[case] before: Option<char>,
        #[case] after: Option<char>,
        #[case] opens: bool,
        #[case] closes: bool,
    ) {
        let f = Flanking::new(before, after);
        assert_eq!(
            (Emphasis::underscore_opens(&f), Emphasis::underscore_closes(&f)),
            (opens, closes)
        );
    }

    #[test]
    fn star_may_split_words() {
        let f = Flanking::new(Some('a'), Some('b'));
        assert!(Emphasis::star_opens(&f) && Emphasis::star_closes(&f));
    }
}
