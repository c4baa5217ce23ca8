use brex::regex::{RangeInput, RegexCompiler};
use brex::syntax::parse_unicode_regex;
use brex::system::{NamespaceInfo, ReSystem};

fn main() {
    let (re, diags) = parse_unicode_regex(r#"/[0-9]{5}("-"[0-9]{3})? & ^"4"[0-2]/"#);
    assert!(diags.is_empty());
    let zip = RegexCompiler::compile(&re.unwrap()).unwrap();
    assert_eq!(zip.test(b"40502-123"), Ok(true));
    assert_eq!(zip.test(b"49502"), Ok(false));

    let (re, diags) = parse_unicode_regex(r#"/"h"[aeiou]+ $!".tmp"/"#);
    assert!(diags.is_empty());
    let name = RegexCompiler::compile(&re.unwrap()).unwrap();
    let input = RangeInput::builder(2, 4).build();
    assert_eq!(name.test_range(b"xxhau.dat", input), Ok(true));
    assert_eq!(name.test_range(b"xxhau.tmp", input), Ok(false));

    let ns = NamespaceInfo::new("Main")
        .regex("Foo", r#"/"abc"/"#)
        .regex("Baz", r#"/${Foo} "-" ${Main::Foo}/"#);
    let (sys, errors) = ReSystem::process(vec![ns], None);
    assert!(errors.is_empty());
    let baz = sys.executor("Main::Baz").unwrap();
    assert_eq!(baz.test(b"abc-abc"), Ok(true));
    assert_eq!(baz.test(b"abc-123"), Ok(false));
}
