/*!
Compilation of resolved ASTs into automaton-backed executors.

The compiler lowers each toplevel entry and anchor to an interval-labelled
Thompson [NFA](nfa); `Negate` and `AllOf` subtrees pass through a total
[DFA](dfa) (complement / product over an alphabet partition) and splice
back in, so matching is a single bitset-frontier sweep with no
backtracking.

```
use brex::regex::RegexCompiler;
use brex::syntax::parse_unicode_regex;

let (re, diags) = parse_unicode_regex(r#"/!(".txt" | ".pdf")/"#);
assert!(diags.is_empty());

let executor = RegexCompiler::compile(&re.unwrap()).unwrap();
assert_eq!(executor.test(b""), Ok(true));
assert_eq!(executor.test(b".txt"), Ok(false));
```
*/

use std::fmt;

use crate::ast::{Regex, RegexComponent};

mod dfa;
mod executor;
mod nfa;

pub use executor::{Executor, ExecutorError, RangeInput};

use executor::{CompiledAnchor, CompiledEntry, EntryMode};
use nfa::Nfa;

/// A problem turning a resolved AST into an executor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    /// A `${Name}` survived to compilation; the regex was not linked.
    UnresolvedName(String),
    /// A `${$NAME}` survived to compilation.
    UnresolvedEnv(String),
    /// A negative anchor over a body that accepts the empty string.
    NegativeAnchorOnEmptyBody,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UnresolvedName(n) => {
                write!(f, "unresolved regex reference ${{{n}}}")
            }
            CompileError::UnresolvedEnv(n) => {
                write!(f, "unresolved env reference ${{${n}}}")
            }
            CompileError::NegativeAnchorOnEmptyBody => {
                write!(
                    f,
                    "a negative anchor requires a body that cannot match the empty string"
                )
            }
        }
    }
}

impl std::error::Error for CompileError {}

pub struct RegexCompiler;

impl RegexCompiler {
    /// Compiles a resolved regex. Errors are accumulated so a caller sees
    /// every problem at once.
    pub fn compile(re: &Regex) -> Result<Executor, Vec<CompileError>> {
        let mut errors = Vec::new();

        let negative_anchor = re.pre_anchor.as_ref().is_some_and(|a| a.negated)
            || re.post_anchor.as_ref().is_some_and(|a| a.negated);
        if negative_anchor && component_accepts_empty(&re.root) {
            errors.push(CompileError::NegativeAnchorOnEmptyBody);
        }

        let mut entries = Vec::new();
        for e in re.root.entries() {
            match Nfa::compile(&e.opt, re.alphabet) {
                Ok(nfa) => entries.push(CompiledEntry {
                    negated: e.negated,
                    mode: if e.front_check {
                        EntryMode::Front
                    } else if e.back_check {
                        EntryMode::Back
                    } else {
                        EntryMode::Whole
                    },
                    nfa,
                }),
                Err(err) => errors.push(err),
            }
        }

        let mut anchor = |a: &Option<crate::ast::ToplevelEntry>| -> Option<CompiledAnchor> {
            let a = a.as_ref()?;
            match Nfa::compile(&a.opt, re.alphabet) {
                Ok(nfa) => Some(CompiledAnchor {
                    negated: a.negated,
                    check: a.front_check || a.back_check,
                    nfa,
                }),
                Err(err) => {
                    errors.push(err);
                    None
                }
            }
        };
        let pre = anchor(&re.pre_anchor);
        let post = anchor(&re.post_anchor);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Executor {
            kind: re.kind,
            alphabet: re.alphabet,
            pre,
            post,
            entries,
        })
    }
}

/// Whether the body component accepts ε: every conjunct's assertion holds
/// on the empty region.
fn component_accepts_empty(root: &RegexComponent) -> bool {
    root.entries()
        .iter()
        .all(|e| e.opt.is_nullable() != e.negated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse_ascii_regex, parse_unicode_regex};

    fn compile(src: &str) -> Executor {
        let (re, diags) = parse_unicode_regex(src);
        assert!(diags.is_empty(), "{diags:?}");
        RegexCompiler::compile(&re.expect("regex")).expect("compile")
    }

    #[test]
    fn whole_string_semantics() {
        let e = compile(r#"/"abc"/"#);
        assert_eq!(e.test(b"abc"), Ok(true));
        assert_eq!(e.test(b"abcd"), Ok(false));
        assert_eq!(e.test(b""), Ok(false));
    }

    #[test]
    fn conjunction_with_front_check() {
        let e = compile(r#"/[0-9]{5}("-"[0-9]{3})? & ^"4"[0-2]/"#);
        assert_eq!(e.test(b"40502"), Ok(true));
        assert_eq!(e.test(b"49502"), Ok(false));
        assert_eq!(e.test(b"40502-123"), Ok(true));
    }

    #[test]
    fn negated_component() {
        let e = compile(r#"/!(".txt" | ".pdf")/"#);
        assert_eq!(e.test(b""), Ok(true));
        assert_eq!(e.test(b".txt"), Ok(false));
        assert_eq!(e.test(b".pdf"), Ok(false));
        assert_eq!(e.test(b".doc"), Ok(true));
    }

    #[test]
    fn bad_encoding() {
        let e = compile(r#"/"a"/"#);
        assert_eq!(e.test(b"\xff\xfe"), Err(ExecutorError::BadEncoding));

        let (re, diags) = parse_ascii_regex("/'a'/");
        assert!(diags.is_empty());
        let e = RegexCompiler::compile(&re.expect("regex")).expect("compile");
        assert_eq!(e.test("🌵".as_bytes()), Err(ExecutorError::BadEncoding));
    }

    #[test]
    fn plain_anchor_needs_range_context() {
        let e = compile(r#"/"a"^ "b"/"#);
        assert_eq!(e.test(b"ab"), Err(ExecutorError::UnsupportedForm));

        // A check anchor works in both entry points.
        let e = compile(r#"/<"a">^ "a" "b"/"#);
        assert_eq!(e.test(b"ab"), Ok(true));
        assert_eq!(e.test(b"xb"), Ok(false));
    }

    #[test]
    fn range_test_with_anchors() {
        // "b" preceded by exactly "a" and followed by exactly "c".
        let e = compile(r#"/"a"^ "b" $"c"/"#);
        let hay = b"abc";
        assert_eq!(
            e.test_range(hay, RangeInput::builder(1, 1).build()),
            Ok(true)
        );
        assert_eq!(
            e.test_range(b"xbc", RangeInput::builder(1, 1).build()),
            Ok(false)
        );
        assert_eq!(
            e.test_range(b"abx", RangeInput::builder(1, 1).build()),
            Ok(false)
        );
    }

    #[test]
    fn range_test_extension() {
        let e = compile(r#"/"ab"+/"#);
        let hay = b"xxabab";
        // [2,3] is "ab".
        assert_eq!(
            e.test_range(hay, RangeInput::builder(2, 3).build()),
            Ok(true)
        );
        // [2,4] is "aba"; only extension to the right rescues it.
        assert_eq!(
            e.test_range(hay, RangeInput::builder(2, 4).build()),
            Ok(false)
        );
        assert_eq!(
            e.test_range(hay, RangeInput::builder(2, 4).extend_end(true).build()),
            Ok(true)
        );
        // [4,5] is "ab"; extending the start also admits "abab".
        assert_eq!(
            e.test_range(hay, RangeInput::builder(4, 5).extend_start(true).build()),
            Ok(true)
        );
    }

    #[test]
    fn range_errors() {
        let e = compile(r#"/"a"/"#);
        assert_eq!(
            e.test_range(b"abc", RangeInput::builder(2, 1).build()),
            Err(ExecutorError::InvalidRange)
        );
        assert_eq!(
            e.test_range(b"abc", RangeInput::builder(0, 3).build()),
            Err(ExecutorError::InvalidRange)
        );
    }

    #[test]
    fn forbidden_suffix_range_test() {
        // A temp-file region: "a" that must not be followed by ".tmp".
        let e = compile(r#"/"a" $!".tmp"/"#);
        assert_eq!(
            e.test_range(b"mark_a.tmp", RangeInput::builder(5, 5).build()),
            Ok(false)
        );
        assert_eq!(
            e.test_range(b"mark_a.txt", RangeInput::builder(5, 5).build()),
            Ok(true)
        );
    }

    #[test]
    fn negative_anchor_rejects_nullable_body() {
        let (re, diags) = parse_unicode_regex(r#"/!"x"^ "a"*/"#);
        assert!(diags.is_empty(), "{diags:?}");
        let errs = RegexCompiler::compile(&re.expect("regex")).expect_err("must not compile");
        assert!(errs.contains(&CompileError::NegativeAnchorOnEmptyBody));
    }

    #[test]
    fn unresolved_name_is_a_compile_error() {
        let (re, diags) = parse_unicode_regex("/${Digit}+/");
        assert!(diags.is_empty());
        let errs = RegexCompiler::compile(&re.expect("regex")).expect_err("unresolved");
        assert!(matches!(errs[0], CompileError::UnresolvedName(_)));
    }

    #[test]
    fn search_finds_substrings() {
        let e = compile(r#"/"h"[aeiou]+/"#);
        assert_eq!(e.search(b"xxhaxx"), Ok(true));
        assert_eq!(e.search(b"hxxx"), Ok(false));
        assert_eq!(e.search(b""), Ok(false));
    }

    #[test]
    fn determinism() {
        let e = compile(r#"/("ab" | "a"."c"?)+/"#);
        for _ in 0..3 {
            assert_eq!(e.test(b"abaxc"), e.test(b"abaxc"));
            assert_eq!(e.test(b"ab"), Ok(true));
        }
    }
}
