//! Character classes used by the flanking rules and the scanners.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Punctuation,
    Alphanumeric,
    Other,
}

/// Unicode whitespace for the purposes of delimiter flanking.
#[must_use]
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace()
}

/// ASCII punctuation, or any non-alphanumeric, non-whitespace, non-control
/// character (symbols count as punctuation here).
#[must_use]
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || (!c.is_ascii() && !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control())
}

#[must_use]
pub fn classify(c: char) -> CharClass {
    if is_whitespace(c) {
        CharClass::Whitespace
    } else if is_punctuation(c) {
        CharClass::Punctuation
    } else if c.is_alphanumeric() {
        CharClass::Alphanumeric
    } else {
        CharClass::Other
    }
}

/// Space or tab: the only characters that count toward indentation.
#[must_use]
pub fn is_space_or_tab(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Flanking classification of one delimiter run.
///
/// `before`/`after` are the characters adjacent to the run; the start and
/// end of the block count as whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flanking {
    pub before: CharClass,
    pub after: CharClass,
    pub before_char: Option<char>,
    pub after_char: Option<char>,
    pub left: bool,
    pub right: bool,
}

impl Flanking {
    #[must_use]
    pub fn new(before_char: Option<char>, after_char: Option<char>) -> Self {
        let before = before_char.map_or(CharClass::Whitespace, classify);
        let after = after_char.map_or(CharClass::Whitespace, classify);

        let left = after != CharClass::Whitespace
            && (after != CharClass::Punctuation
                || before == CharClass::Whitespace
                || before == CharClass::Punctuation);
        let right = before != CharClass::Whitespace
            && (before != CharClass::Punctuation
                || after == CharClass::Whitespace
                || after == CharClass::Punctuation);

        Self {
            before,
            after,
            before_char,
            after_char,
            left,
            right,
        }
    }
}
