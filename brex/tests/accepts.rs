//! Whole-string accept/reject scenarios, Unicode and ASCII flavors.

use brex::regex::{Executor, RegexCompiler};
use brex::syntax::{parse_ascii_regex, parse_unicode_regex};

fn compile_unicode(src: &str) -> Executor {
    let (re, diags) = parse_unicode_regex(src);
    assert!(diags.is_empty(), "diagnostics for {src}: {diags:?}");
    RegexCompiler::compile(&re.expect("regex")).expect("compile")
}

fn compile_ascii(src: &str) -> Executor {
    let (re, diags) = parse_ascii_regex(src);
    assert!(diags.is_empty(), "diagnostics for {src}: {diags:?}");
    RegexCompiler::compile(&re.expect("regex")).expect("compile")
}

fn accepts(e: &Executor, hay: &str) -> bool {
    e.test(hay.as_bytes()).expect("no runtime error")
}

#[test]
fn literal_abc() {
    let e = compile_unicode(r#"/"abc"/"#);
    assert!(accepts(&e, "abc"));
    assert!(accepts(&e, "ab") == false);
    assert!(accepts(&e, "") == false);
    assert!(accepts(&e, "abcd") == false);
    assert!(accepts(&e, "xab") == false);
}

#[test]
fn literal_eps() {
    let e = compile_unicode(r#"/""/"#);
    assert!(accepts(&e, ""));
    assert!(accepts(&e, "abc") == false);
}

#[test]
fn literal_unicode() {
    let e = compile_unicode(r#"/"a🌵c"/"#);
    assert!(accepts(&e, "a🌵c"));
    assert!(accepts(&e, "aaa") == false);
}

#[test]
fn literal_escapes() {
    let e = compile_unicode(r#"/"%%;%underscore;%x32;"/"#);
    assert!(accepts(&e, "%_2"));
    assert!(accepts(&e, "aaa") == false);
    assert!(accepts(&e, "%_aa") == false);
}

#[test]
fn ascii_literal() {
    let e = compile_ascii("/'abc'/");
    assert!(accepts(&e, "abc"));
    assert!(accepts(&e, "ab") == false);
    assert!(accepts(&e, "") == false);
    assert!(accepts(&e, "abcd") == false);
}

#[test]
fn ascii_eps() {
    let e = compile_ascii("/''/");
    assert!(accepts(&e, ""));
    assert!(accepts(&e, "abc") == false);
}

#[test]
fn ascii_escapes() {
    let e = compile_ascii("/'%%;%underscore;%x32;'/");
    assert!(accepts(&e, "%_2"));
    assert!(accepts(&e, "%_aa") == false);
}

#[test]
fn class_options() {
    let e = compile_unicode("/[06a]/");
    assert!(accepts(&e, "0"));
    assert!(accepts(&e, "a"));
    assert!(accepts(&e, "6"));
    assert!(accepts(&e, "1") == false);
    assert!(accepts(&e, "") == false);
}

#[test]
fn class_range() {
    let e = compile_unicode("/[0-9]/");
    assert!(accepts(&e, "0"));
    assert!(accepts(&e, "3"));
    assert!(accepts(&e, "9"));
    assert!(accepts(&e, "a") == false);
}

#[test]
fn class_literal_hat() {
    // `^` is only structural as the first class character.
    let e = compile_unicode("/[0^]/");
    assert!(accepts(&e, "0"));
    assert!(accepts(&e, "^"));
    assert!(accepts(&e, "1") == false);
}

#[test]
fn class_mixed() {
    let e = compile_unicode("/[0-9 +]/");
    assert!(accepts(&e, "0"));
    assert!(accepts(&e, "5"));
    assert!(accepts(&e, " "));
    assert!(accepts(&e, "+"));
    assert!(accepts(&e, "a") == false);
}

#[test]
fn class_complement() {
    let e = compile_unicode("/[^A-Z]/");
    assert!(accepts(&e, "0"));
    assert!(accepts(&e, "A") == false);
    assert!(accepts(&e, "Q") == false);
}

#[test]
fn class_complement_multi() {
    let e = compile_unicode("/[^A-Z0a-c]/");
    assert!(accepts(&e, "5"));
    assert!(accepts(&e, " "));
    assert!(accepts(&e, "^"));
    assert!(accepts(&e, "🌵"));
    assert!(accepts(&e, "0") == false);
    assert!(accepts(&e, "b") == false);
}

#[test]
fn class_emoji_range() {
    let e = compile_unicode("/[🌵-🌶]/");
    assert!(accepts(&e, "🌵"));
    assert!(accepts(&e, "🌶"));
    assert!(accepts(&e, "a") == false);
    assert!(accepts(&e, "🌽") == false);

    let e = compile_unicode("/[^🌵-🌶]/");
    assert!(accepts(&e, "a"));
    assert!(accepts(&e, "🌽"));
    assert!(accepts(&e, "🌵") == false);
    assert!(accepts(&e, "🌶") == false);
}

#[test]
fn dot() {
    let e = compile_unicode("/./");
    assert!(accepts(&e, "a"));
    assert!(accepts(&e, "."));
    assert!(accepts(&e, " "));
    assert!(accepts(&e, "🌶"));
    assert!(accepts(&e, "") == false);
    assert!(accepts(&e, "ab") == false);
}

#[test]
fn dot_combos() {
    let e = compile_unicode(r#"/."b"./"#);
    assert!(accepts(&e, ".b."));
    assert!(accepts(&e, "bbx"));
    assert!(accepts(&e, "ab") == false);

    let e = compile_unicode("/[0-9]./");
    assert!(accepts(&e, "9b"));
    assert!(accepts(&e, "4🌶"));
    assert!(accepts(&e, "ab") == false);
}

#[test]
fn repetitions() {
    let e = compile_unicode(r#"/"ab"*/"#);
    assert!(accepts(&e, ""));
    assert!(accepts(&e, "ab"));
    assert!(accepts(&e, "abab"));
    assert!(accepts(&e, "aba") == false);

    let e = compile_unicode(r#"/"a"+/"#);
    assert!(accepts(&e, "") == false);
    assert!(accepts(&e, "aaa"));

    let e = compile_unicode(r#"/"a"?"b"/"#);
    assert!(accepts(&e, "b"));
    assert!(accepts(&e, "ab"));
    assert!(accepts(&e, "aab") == false);

    let e = compile_unicode(r#"/"a"{2,3}/"#);
    assert!(accepts(&e, "a") == false);
    assert!(accepts(&e, "aa"));
    assert!(accepts(&e, "aaa"));
    assert!(accepts(&e, "aaaa") == false);

    let e = compile_unicode(r#"/"a"{0,2}/"#);
    assert!(accepts(&e, ""));
    assert!(accepts(&e, "aa"));
    assert!(accepts(&e, "aaa") == false);

    let e = compile_unicode(r#"/"a"{2,}/"#);
    assert!(accepts(&e, "a") == false);
    assert!(accepts(&e, "aaaaaa"));

    let e = compile_unicode(r#"/"a"{2}/"#);
    assert!(accepts(&e, "aa"));
    assert!(accepts(&e, "a") == false);
    assert!(accepts(&e, "aaa") == false);
}

#[test]
fn alternation_and_sequence() {
    let e = compile_unicode(r#"/"cat" | "dog"/"#);
    assert!(accepts(&e, "cat"));
    assert!(accepts(&e, "dog"));
    assert!(accepts(&e, "catdog") == false);

    let e = compile_unicode(r#"/("a" | "b")"c"/"#);
    assert!(accepts(&e, "ac"));
    assert!(accepts(&e, "bc"));
    assert!(accepts(&e, "abc") == false);
}

#[test]
fn negation_dual() {
    // The negated executor accepts exactly the complement.
    let pos = compile_unicode(r#"/("a" | "bb")+/"#);
    let neg = compile_unicode(r#"/!("a" | "bb")+/"#);
    for hay in ["", "a", "bb", "ab", "abb", "bba", "x", "aax", "ba"] {
        assert_eq!(
            accepts(&pos, hay),
            !accepts(&neg, hay),
            "negation dual on {hay:?}"
        );
    }
}

#[test]
fn intersection_agrees_with_both() {
    let both = compile_unicode(r#"/[0-9]+ & ."5".*/"#);
    let a = compile_unicode("/[0-9]+/");
    let b = compile_unicode(r#"/."5".*/"#);
    for hay in ["", "5", "05", "0555", "55", "x5", "0x", "123", "053"] {
        assert_eq!(
            accepts(&both, hay),
            accepts(&a, hay) && accepts(&b, hay),
            "intersection on {hay:?}"
        );
    }
}

#[test]
fn zipcode_with_conjunct_check() {
    let e = compile_unicode(r#"/[0-9]{5}("-"[0-9]{3})? & ^"4"[0-2]/"#);
    assert!(accepts(&e, "40502"));
    assert!(accepts(&e, "49502") == false);
    assert!(accepts(&e, "40502-123"));
    assert!(accepts(&e, "4050") == false);
}

#[test]
fn negated_extension_filter() {
    let e = compile_unicode(r#"/!(".txt" | ".pdf")/"#);
    assert!(accepts(&e, ""));
    assert!(accepts(&e, ".txt") == false);
    assert!(accepts(&e, ".pdf") == false);
    assert!(accepts(&e, ".txt.bak"));
}

#[test]
fn alphabet_boundaries() {
    // Codepoint 0 and the top of each alphabet.
    let e = compile_unicode(r#"/"%NUL;"/"#);
    assert!(e.test(&[0x00]).expect("verdict"));

    let e = compile_unicode("/[%x0;-%x10ffff;]/");
    assert!(accepts(&e, "a"));
    assert!(accepts(&e, "\u{10FFFF}"));

    let e = compile_ascii("/[^%x0;-%x7f;]/");
    assert!(accepts(&e, "a") == false);

    let e = compile_unicode("/[^%x0;-%x10ffff;]/");
    assert!(accepts(&e, "a") == false);
    assert!(accepts(&e, "") == false);
}
