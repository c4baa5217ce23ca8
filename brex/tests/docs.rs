//! README-style documented behaviors: literal repetition, escapes, named
//! references and range tests.

use brex::regex::{Executor, RangeInput, RegexCompiler};
use brex::syntax::{parse_ascii_regex, parse_unicode_regex};
use brex::system::{NamespaceInfo, ReSystem};

fn compile_unicode(src: &str) -> Executor {
    let (re, diags) = parse_unicode_regex(src);
    assert!(diags.is_empty(), "diagnostics for {src}: {diags:?}");
    RegexCompiler::compile(&re.expect("regex")).expect("compile")
}

fn accepts(e: &Executor, hay: &str) -> bool {
    e.test(hay.as_bytes()).expect("no runtime error")
}

#[test]
fn this_is_a_literal() {
    let e = compile_unicode(r#"/"this is a literal"*/"#);
    assert!(accepts(&e, ""));
    assert!(accepts(&e, "this is a literal"));
    assert!(accepts(&e, "this is a literalthis is a literal"));

    assert!(accepts(&e, "abcd") == false);
    assert!(accepts(&e, "this is ") == false);
    assert!(accepts(&e, " this is a literal") == false);
}

#[test]
fn unicode_literal_pepper() {
    let e = compile_unicode(r#"/"unicode literal 🌶"*/"#);
    assert!(accepts(&e, ""));
    assert!(accepts(&e, "unicode literal 🌶"));

    assert!(accepts(&e, "abcd") == false);
    assert!(accepts(&e, "unicode ") == false);
}

#[test]
fn ascii_literal_hex_escape() {
    let (re, diags) = parse_ascii_regex("/'ascii literals %x59;'/");
    assert!(diags.is_empty(), "{diags:?}");
    let e = RegexCompiler::compile(&re.expect("regex")).expect("compile");
    assert_eq!(e.test(b"bob"), Ok(false));
    assert_eq!(e.test(b"ascii literals Y"), Ok(true));
    assert_eq!(e.test(b"ascii literals Z"), Ok(false));
}

#[test]
fn named_and_hex_escapes_agree() {
    let hex = compile_unicode(r#"/"%x7;%x0;"/"#);
    let named = compile_unicode(r#"/"%a;%NUL;"/"#);
    let hay = [0x07u8, 0x00];
    assert_eq!(hex.test(&hay), Ok(true));
    assert_eq!(named.test(&hay), Ok(true));
}

#[test]
fn named_digit() {
    let ns = NamespaceInfo::new("Docs")
        .regex("Digit", "/[0-9]/")
        .regex("Signed", r#"/[+-]${Digit}+/"#);
    let (sys, errors) = ReSystem::process(vec![ns], None);
    assert!(errors.is_empty(), "{errors:?}");

    let e = sys.executor("Docs::Signed").expect("linked");
    assert_eq!(e.test(b"abc"), Ok(false));
    assert_eq!(e.test(b"0"), Ok(false));
    assert_eq!(e.test(b"+2"), Ok(true));
    assert_eq!(e.test(b"-137"), Ok(true));
}

#[test]
fn scratch_name_range_test() {
    // A scratch-file name: "h" then vowels, never followed by ".tmp".
    let e = compile_unicode(r#"/"h"[aeiou]+ $!".tmp"/"#);

    let hay = b"xxhau.dat";
    assert_eq!(e.test_range(hay, RangeInput::builder(2, 4).build()), Ok(true));

    let hay = b"xxhau.tmp";
    assert_eq!(
        e.test_range(hay, RangeInput::builder(2, 4).build()),
        Ok(false)
    );
}

#[test]
fn range_test_rejects_forbidden_suffix_region() {
    let e = compile_unicode(r#"/"a" $!".tmp"/"#);
    // "mark_a.tmp": the "a" at index 5 is followed by ".tmp".
    assert_eq!(
        e.test_range(b"mark_a.tmp", RangeInput::builder(5, 5).build()),
        Ok(false)
    );
    assert_eq!(
        e.test_range(b"mark_a.doc", RangeInput::builder(5, 5).build()),
        Ok(true)
    );
}

#[test]
fn executors_are_shareable_across_threads() {
    let e = std::sync::Arc::new(compile_unicode(r#"/("ab" | "ba")+/"#));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let e = e.clone();
            std::thread::spawn(move || {
                let hay = if i % 2 == 0 { "abba" } else { "abx" };
                e.test(hay.as_bytes())
            })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        let verdict = h.join().expect("thread").expect("no runtime error");
        assert_eq!(verdict, i % 2 == 0);
    }
}
