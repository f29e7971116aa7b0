/// Code span inline type with owned delimiter constant.
///
/// Code spans are raw zones: nothing else is parsed inside them, and they
/// bind tighter than emphasis and links.
pub struct CodeSpan;

impl CodeSpan {
    /// The backtick character that delimits code spans.
    pub const TICK: u8 = b'`';

    /// Finds a closing backtick run of exactly `ticks` in `s`. Returns the
    /// byte offset where it starts.
    #[must_use]
    pub fn find_closer(s: &str, ticks: usize) -> Option<usize> {
        let bytes = s.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != Self::TICK {
                i += 1;
                continue;
            }
            let run = bytes[i..].iter().take_while(|&&b| b == Self::TICK).count();
            if run == ticks {
                return Some(i);
            }
            i += run;
        }
        None
    }

    /// Line endings become spaces; one space is stripped from each side
    /// when both are present and the content is not only spaces.
    #[must_use]
    pub fn normalize(raw: &str) -> String {
        let content = raw.replace('\n', " ");
        let strip = content.len() >= 2
            && content.starts_with(' ')
            && content.ends_with(' ')
            && !content.bytes().all(|b| b == b' ');
        if strip {
            content[1..content.len() - 1].to_string()
        } else {
            content
        }
    }
}
