/*!
Surface-syntax parsing.

Two entry points differing only in default alphabet and which escapes are
admissible:

```
use brex::syntax::{parse_unicode_regex, parse_ascii_regex};

let (re, diags) = parse_unicode_regex(r#"/"abc" [0-9]+/"#);
assert!(re.is_some() && diags.is_empty());

let (re, diags) = parse_ascii_regex(r"/'ascii literals %x59;'/");
assert!(re.is_some() && diags.is_empty());
```

A regex is valid only if the diagnostics list comes back empty; the parser
never panics on malformed input.
*/

pub mod escape;
mod parser;
mod token;

pub use parser::{parse_ascii_regex, parse_unicode_regex, Diagnostic};
pub use token::Token;
