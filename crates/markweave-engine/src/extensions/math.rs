use crate::parsing::{
    chars::Flanking,
    registry::{DelimKind, InlineDelimiter, Layer, RegistryBuilder, SetupError},
};

use super::Extension;

/// `$x$` and `$$x$$`: the text between the dollars is kept verbatim as one
/// math node.
///
/// A closing `$` directly followed by a digit does not close, so prices
/// like `$5 and $6` stay text.
pub struct Math;

impl Math {
    pub const DOLLAR: char = '$';

    fn kinds(run: usize) -> Option<DelimKind> {
        matches!(run, 1 | 2).then_some(DelimKind::Math)
    }

    fn opens(f: &Flanking) -> bool {
        f.left
    }

    fn closes(f: &Flanking) -> bool {
        f.right && !f.after_char.is_some_and(|c| c.is_ascii_digit())
    }
}

impl Extension for Math {
    fn name(&self) -> &'static str {
        "math"
    }

    fn register(&self, builder: &mut RegistryBuilder) -> Result<(), SetupError> {
        builder.inline_delimiter(
            Layer::Extension,
            InlineDelimiter {
                ch: Self::DOLLAR,
                kinds: Self::kinds,
                can_open: Self::opens,
                can_close: Self::closes,
            },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parsing::ParseOptions, parsing::Parser, parsing::tree::InlineTag, render::render};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parser_html(text: &str) -> String {
        let mut builder = RegistryBuilder::new();
        builder.extension(&Math).unwrap();
        let registry = builder.build().unwrap();
        render(&Parser::new(&registry, ParseOptions::default()).parse_str(text))
    }

    #[rstest]
    #[case("$x^2$", "<p><span class=\"math\">x^2</span></p>\n")]
    #[case("$$a+b$$", "<p><span class=\"math\">a+b</span></p>\n")]
    #[case("$*not em*$", "<p><span class=\"math\">*not em*</span></p>\n")]
    #[case("$5 and $6", "<p>$5 and $6</p>\n")]
    #[case("$a<b$", "<p><span class=\"math\">a&lt;b</span></p>\n")]
    fn dollars(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parser_html(input), expected);
    }

    #[test]
    fn math_node_has_no_children() {
        let mut builder = RegistryBuilder::new();
        builder.extension(&Math).unwrap();
        let registry = builder.build().unwrap();
        let doc = Parser::new(&registry, ParseOptions::default()).parse_str("$_a_$");
        let para = doc.children(doc.root()).next().unwrap();
        let root = doc.block(para).inline_root().unwrap();
        let math = doc.inline_children(root).next().unwrap();
        assert_eq!(doc.inline(math).tag, InlineTag::Math("_a_".into()));
        assert_eq!(doc.inline_children(math).count(), 0);
    }
}
