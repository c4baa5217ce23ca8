/*!
A composable regex engine. Regexes can be named, imported across namespaces,
intersected (`&`), negated (`!`) and anchored with front/back check
expressions, over either Unicode codepoints or ASCII bytes.

## Features
- Unicode and ASCII regex flavors, plus `path`/`resource` sublanguage tags.
- Extended operators missing from most flavors: intersection, negation,
  anchored conjunction and front/back checks.
- Multi-namespace regex systems: `${Name}` and `${NS::Name}` references are
  linked into standalone executors, with cycle detection; `${$ENV}`
  references inject environment-provided literals at link time.
- Automaton-based matching with no backtracking: whole-string tests and
  explicit sub-range tests.
- A bit-exact canonical JSON form of the AST for tool interchange.

## Usage
```
use brex::syntax::parse_unicode_regex;
use brex::regex::RegexCompiler;

let (re, diags) = parse_unicode_regex(r#"/[0-9]{5}("-"[0-9]{3})?/"#);
assert!(diags.is_empty());

let executor = RegexCompiler::compile(&re.unwrap()).unwrap();
assert_eq!(executor.test(b"40502-123"), Ok(true));
assert_eq!(executor.test(b"4x502"), Ok(false));
```

## Namespaced systems
```
use brex::system::{NamespaceInfo, ReSystem};

let ns = NamespaceInfo::new("Main")
    .regex("Foo", r#"/"abc"/"#)
    .regex("Baz", r#"/${Foo} "-" ${Main::Foo}/"#);

let (sys, errors) = ReSystem::process(vec![ns], None);
assert!(errors.is_empty());

let executor = sys.executor("Main::Baz").unwrap();
assert_eq!(executor.test(b"abc-abc"), Ok(true));
assert_eq!(executor.test(b"abc-123"), Ok(false));
```
*/

pub mod ast;
pub mod json;
pub mod regex;
pub mod syntax;
pub mod system;

pub use brex_unicode as unicode;
