//! End-to-end checks of the CommonMark core: markdown in, HTML out.

use markweave_engine::{parsing::snapshot, to_html};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::time::{Duration, Instant};

fn html(input: &str) -> String {
    let doc = markweave_engine::parse(input);
    snapshot::invariants(&doc);
    to_html(input)
}

#[rstest]
#[case::atx_headings("# h1\n## h2", "<h1>h1</h1>\n<h2>h2</h2>\n")]
#[case::atx_closing("### h3 ###", "<h3>h3</h3>\n")]
#[case::setext("Foo\n===", "<h1>Foo</h1>\n")]
#[case::setext_two_lines("Foo\nbar\n---", "<h2>Foo\nbar</h2>\n")]
#[case::thematic_break("***", "<hr />\n")]
#[case::spaced_break(" - - -", "<hr />\n")]
#[case::fenced("```rust\nfn x() {}\n```", "<pre><code class=\"language-rust\">fn x() {}\n</code></pre>\n")]
#[case::unclosed_fence("~~~\ncode", "<pre><code>code\n</code></pre>\n")]
#[case::html_block("<div>\nhi\n</div>", "<div>\nhi\n</div>\n")]
#[case::blockquote("> # q\n> text", "<blockquote>\n<h1>q</h1>\n<p>text</p>\n</blockquote>\n")]
#[case::ordered("1. a\n2. b", "<ol>\n<li>a</li>\n<li>b</li>\n</ol>\n")]
#[case::ordered_start("3) x", "<ol start=\"3\">\n<li>x</li>\n</ol>\n")]
#[case::nested_list("- a\n  - b", "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n")]
fn block_constructs(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(html(input), expected);
}

#[rstest]
#[case::code_span("`a  b`", "<p><code>a  b</code></p>\n")]
#[case::hard_break_spaces("a  \nb", "<p>a<br />\nb</p>\n")]
#[case::hard_break_backslash("a\\\nb", "<p>a<br />\nb</p>\n")]
#[case::escapes("\\*not em\\*", "<p>*not em*</p>\n")]
#[case::entities("&amp; &#35;", "<p>&amp; #</p>\n")]
#[case::two_code_point_entities("&ngE; &fjlig;", "<p>\u{2267}\u{338} fj</p>\n")]
#[case::nested_emphasis("*a **b** c*", "<p><em>a <strong>b</strong> c</em></p>\n")]
#[case::inline_link("[a](/u \"T\")", "<p><a href=\"/u\" title=\"T\">a</a></p>\n")]
#[case::image("![alt *x*](/i.png)", "<p><img src=\"/i.png\" alt=\"alt x\" /></p>\n")]
#[case::autolink("<https://a.b>", "<p><a href=\"https://a.b\">https://a.b</a></p>\n")]
#[case::url_encoding("[a](/my%20u\u{e4})", "<p><a href=\"/my%20u%C3%A4\">a</a></p>\n")]
#[case::html_escaping("a < b & \"c\"", "<p>a &lt; b &amp; &quot;c&quot;</p>\n")]
fn inline_constructs(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(html(input), expected);
}

#[test]
fn thematic_break_re_renders_identically() {
    let once = html("***");
    assert_eq!(once, "<hr />\n");
    assert_eq!(html(&once), once);
}

#[test]
fn one_blank_line_makes_a_list_loose() {
    assert_eq!(html("- a\n- b"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    assert_eq!(
        html("- a\n\n- b"),
        "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
    );
}

#[test]
fn triple_delimiters_nest_strong_outside_em() {
    assert_eq!(html("***word***"), "<p><strong><em>word</em></strong></p>\n");
}

#[rstest]
#[case("foo_bar_baz", "<p>foo_bar_baz</p>\n")]
#[case("_foo_bar_", "<p><em>foo_bar</em></p>\n")]
fn intraword_underscores(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(html(input), expected);
}

#[rstest]
#[case("[foo", "<p>[foo</p>\n")]
#[case("[foo](", "<p>[foo](</p>\n")]
#[case("[undefined]", "<p>[undefined]</p>\n")]
#[case("]x[", "<p>]x[</p>\n")]
fn unmatched_brackets_stay_literal(#[case] input: &str, #[case] expected: &str) {
    let out = html(input);
    assert!(!out.contains("<a"), "{out}");
    assert_eq!(out, expected);
}

#[test]
fn first_reference_definition_wins() {
    assert_eq!(
        html("[a]\n\n[a]: /first\n[a]: /second"),
        "<p><a href=\"/first\">a</a></p>\n"
    );
}

#[test]
fn reference_labels_are_case_and_space_insensitive() {
    assert_eq!(
        html("[Foo  Bar][]\n\n[foo bar]: /u 'T'"),
        "<p><a href=\"/u\" title=\"T\">Foo  Bar</a></p>\n"
    );
}

#[rstest]
#[case::paragraph("line one\nline two", "<p>line one\nline two</p>\n")]
#[case::blockquote("> line one\nline two", "<blockquote>\n<p>line one\nline two</p>\n</blockquote>\n")]
fn lazy_continuation(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(html(input), expected);
}

#[rstest]
#[case("    code", "<pre><code>code\n</code></pre>\n")]
#[case("   para", "<p>para</p>\n")]
fn indentation_threshold(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(html(input), expected);
}

#[test]
fn changing_bullet_starts_a_new_list() {
    assert_eq!(
        html("* a\n- b"),
        "<ul>\n<li>a</li>\n</ul>\n<ul>\n<li>b</li>\n</ul>\n"
    );
}

#[test]
fn tabs_expand_to_the_next_tab_stop() {
    assert_eq!(html("\tfoo\tbaz"), "<pre><code>foo\tbaz\n</code></pre>\n");
    assert_eq!(html(">\t\tfoo"), "<blockquote>\n<pre><code>  foo\n</code></pre>\n</blockquote>\n");
}

#[test]
fn empty_input_renders_nothing() {
    assert_eq!(html(""), "");
    assert_eq!(html("\n\n"), "");
}

#[rstest]
#[case::comment("a <!-- b ")]
#[case::processing_instruction("a <? b ")]
#[case::cdata("a <![CDATA[ b ")]
#[case::declaration("a <!X b ")]
#[case::open_destination("[a](")]
#[case::nested_destination("[a]((")]
#[case::unterminated_entity("&a")]
fn unclosed_constructs_stay_linear(#[case] unit: &str) {
    let input = unit.repeat(20_000);
    let started = Instant::now();
    let out = to_html(&input);
    let elapsed = started.elapsed();
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    assert!(out.starts_with("<p>"), "{}", &out[..40]);
    assert!(!out.contains("<a "));
}
