use crate::parsing::{
    blocks::{
        BlockBuilder,
        kinds::{List, ListMarker},
    },
    registry::{BlockOpener, BlockStart, Layer, RegistryBuilder, SetupError},
    tree::{BlockId, BlockKind, ListKind, Numbering},
};

use super::Extension;

/// Ordered lists numbered with roman numerals: `i.`, `ii.`, `IV)`.
///
/// A list is either all lowercase or all uppercase; the two never continue
/// each other, nor a decimal list.
pub struct RomanLists;

impl RomanLists {
    /// Longest numeral accepted as a marker.
    pub const MAX_LETTERS: usize = 8;
    const TRIGGERS: [char; 14] = [
        'i', 'v', 'x', 'l', 'c', 'd', 'm', 'I', 'V', 'X', 'L', 'C', 'D', 'M',
    ];

    const OPENER: BlockOpener = BlockOpener {
        name: "roman_item",
        creates: BlockKind::ListItem,
        open: Self::open,
    };

    fn open(b: &mut BlockBuilder<'_>, container: BlockId) -> BlockStart {
        List::open_item_with(b, container, roman_marker)
    }
}

fn digit_value(c: char) -> Option<i64> {
    Some(match c.to_ascii_lowercase() {
        'i' => 1,
        'v' => 5,
        'x' => 10,
        'l' => 50,
        'c' => 100,
        'd' => 500,
        'm' => 1000,
        _ => return None,
    })
}

/// Value of a numeral, reading left to right: a letter counts negative when
/// the next one is worth more. Lenient about non-canonical forms.
#[must_use]
pub fn roman_value(numeral: &str) -> Option<u64> {
    let values: Vec<i64> = numeral.chars().map(digit_value).collect::<Option<_>>()?;
    let mut total: i64 = 0;
    for (i, &value) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(&next) if next > value => total -= value,
            _ => total += value,
        }
    }
    u64::try_from(total).ok().filter(|&t| t > 0)
}

/// A roman numeral of one case followed by `.` or `)`.
#[must_use]
pub fn roman_marker(s: &str) -> Option<ListMarker> {
    let letters = s.chars().take_while(|c| digit_value(*c).is_some()).count();
    if letters == 0 || letters > RomanLists::MAX_LETTERS {
        return None;
    }
    let numeral = &s[..letters];
    let numbering = if numeral.chars().all(|c| c.is_ascii_lowercase()) {
        Numbering::LowerRoman
    } else if numeral.chars().all(|c| c.is_ascii_uppercase()) {
        Numbering::UpperRoman
    } else {
        return None;
    };
    let delimiter = match s.as_bytes().get(letters) {
        Some(b'.') => '.',
        Some(b')') => ')',
        _ => return None,
    };
    Some(ListMarker {
        kind: ListKind::Ordered {
            delimiter,
            numbering,
        },
        start: roman_value(numeral)?,
        len: letters + 1,
    })
}

impl Extension for RomanLists {
    fn name(&self) -> &'static str {
        "roman_lists"
    }

    fn register(&self, builder: &mut RegistryBuilder) -> Result<(), SetupError> {
        for trigger in Self::TRIGGERS {
            builder.block_opener(trigger, Layer::Extension, Self::OPENER)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parsing::ParseOptions, parsing::Parser, render::render};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("i", 1)]
    #[case("iv", 4)]
    #[case("ix", 9)]
    #[case("xiv", 14)]
    #[case("iix", 10)]
    #[case("MCMXCIV", 1994)]
    fn numeral_values(#[case] numeral: &str, #[case] expected: u64) {
        assert_eq!(roman_value(numeral), Some(expected));
    }

    #[rstest]
    #[case("iv. x", Some((Numbering::LowerRoman, 4, 3)))]
    #[case("XII) x", Some((Numbering::UpperRoman, 12, 4)))]
    #[case("Iv. x", None)]
    #[case("iv x", None)]
    #[case("ivxlcdmi. x", Some((Numbering::LowerRoman, 335, 9)))]
    #[case("ivxlcdmii. x", None)]
    fn markers(#[case] input: &str, #[case] expected: Option<(Numbering, u64, usize)>) {
        let found = roman_marker(input).map(|m| {
            let ListKind::Ordered { numbering, .. } = m.kind else {
                panic!("roman marker is not ordered");
            };
            (numbering, m.start, m.len)
        });
        assert_eq!(found, expected);
    }

    fn html(text: &str) -> String {
        let mut builder = RegistryBuilder::new();
        builder.extension(&RomanLists).unwrap();
        let registry = builder.build().unwrap();
        render(&Parser::new(&registry, ParseOptions::default()).parse_str(text))
    }

    #[test]
    fn roman_list_renders_with_type_and_start() {
        assert_eq!(
            html("iv. four\nv. five"),
            "<ol type=\"i\" start=\"4\">\n<li>four</li>\n<li>five</li>\n</ol>\n"
        );
    }

    #[test]
    fn case_change_starts_a_new_list() {
        assert_eq!(
            html("i. a\nI. b"),
            "<ol type=\"i\">\n<li>a</li>\n</ol>\n<ol type=\"I\">\n<li>b</li>\n</ol>\n"
        );
    }

    #[test]
    fn plain_words_are_not_markers() {
        assert_eq!(html("milk. fresh"), "<p>milk. fresh</p>\n");
        assert_eq!(html("civic duty"), "<p>civic duty</p>\n");
    }
}
