/*!
The `%NAME;` / `%xHH;` escape tables.

Escapes are introduced by `%` and terminated by `;` inside literals and
character classes: `%x32;` is a hex codepoint, `%%;` a literal `%`, `%;`
the enclosing quote, and named forms like `%NUL;` or `%underscore;` cover
controls and glyphs that would otherwise collide with the syntax.
*/

use brex_unicode::CodePoint;

/// Decoded item of a character-class body: a raw (structural) character or
/// a codepoint produced by an escape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClassAtom {
    Raw(char),
    Code(CodePoint),
}

/// Looks up a named escape (the part between `%` and `;`).
pub fn named_escape(name: &str) -> Option<CodePoint> {
    let cp = match name {
        "NUL" => 0x00,
        "a" => 0x07,
        "b" => 0x08,
        "t" => 0x09,
        "n" => 0x0A,
        "v" => 0x0B,
        "f" => 0x0C,
        "r" => 0x0D,
        "e" => 0x1B,
        "space" => ' ' as u32,
        "underscore" => '_' as u32,
        "percent" => '%' as u32,
        "semicolon" => ';' as u32,
        "slash" => '/' as u32,
        "backslash" => '\\' as u32,
        "dot" => '.' as u32,
        "dash" => '-' as u32,
        "caret" => '^' as u32,
        "dollar" => '$' as u32,
        "pipe" => '|' as u32,
        "amp" => '&' as u32,
        "bang" => '!' as u32,
        "quote" => '\'' as u32,
        "dquote" => '"' as u32,
        "lbracket" => '[' as u32,
        "rbracket" => ']' as u32,
        "lparen" => '(' as u32,
        "rparen" => ')' as u32,
        "lbrace" => '{' as u32,
        "rbrace" => '}' as u32,
        "langle" => '<' as u32,
        "rangle" => '>' as u32,
        _ => return None,
    };
    Some(cp)
}

/// Decodes one escape body. `quote` is the enclosing quote char for the
/// `%;` form; literals have one, classes do not.
fn decode_escape(name: &str, quote: Option<char>) -> Result<CodePoint, String> {
    if name.is_empty() {
        return match quote {
            Some(q) => Ok(q as CodePoint),
            None => Err("quote escape %; is not meaningful in a char class".to_string()),
        };
    }
    if name == "%" {
        return Ok('%' as CodePoint);
    }
    if let Some(digits) = name.strip_prefix('x') {
        if digits.is_empty() || digits.len() > 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(format!("invalid hex escape %{name};"));
        }
        let cp = u32::from_str_radix(digits, 16).expect("checked hex digits");
        if cp > brex_unicode::MAX_UNICODE_CP || (0xD800..=0xDFFF).contains(&cp) {
            return Err(format!("hex escape %{name}; is not a valid codepoint"));
        }
        return Ok(cp);
    }
    named_escape(name).ok_or_else(|| format!("unknown escape name %{name};"))
}

/// Walks `body`, decoding `%...;` escapes. `on_char` receives each decoded
/// item together with its byte offset into `body`; errors are collected as
/// `(message, offset)` pairs.
fn walk_escaped(
    body: &str,
    quote: Option<char>,
    errors: &mut Vec<(String, usize)>,
    mut on_char: impl FnMut(ClassAtom, usize),
) {
    let mut i = 0;
    while i < body.len() {
        let c = body[i..].chars().next().expect("in-bounds offset");
        if c != '%' {
            on_char(ClassAtom::Raw(c), i);
            i += c.len_utf8();
            continue;
        }
        let Some(j) = body[i + 1..].find(';') else {
            errors.push(("unterminated escape".to_string(), i));
            return;
        };
        let name = &body[i + 1..i + 1 + j];
        match decode_escape(name, quote) {
            Ok(cp) => on_char(ClassAtom::Code(cp), i),
            Err(msg) => errors.push((msg, i)),
        }
        i += 1 + j + 1;
    }
}

/// Decodes a literal body (the text between the quotes) into codepoints.
pub(crate) fn decode_literal_body(
    body: &str,
    quote: char,
) -> (Vec<CodePoint>, Vec<(String, usize)>) {
    let mut codes = Vec::with_capacity(body.len());
    let mut errors = Vec::new();
    walk_escaped(body, Some(quote), &mut errors, |atom, _| match atom {
        ClassAtom::Raw(c) => codes.push(c as CodePoint),
        ClassAtom::Code(cp) => codes.push(cp),
    });
    (codes, errors)
}

/// Decodes a class body (the text between the brackets) into atoms; `^` and
/// `-` keep their structural meaning only when written raw.
pub(crate) fn decode_class_body(body: &str) -> (Vec<(ClassAtom, usize)>, Vec<(String, usize)>) {
    let mut atoms = Vec::with_capacity(body.len());
    let mut errors = Vec::new();
    walk_escaped(body, None, &mut errors, |atom, off| atoms.push((atom, off)));
    (atoms, errors)
}

/// Prints one literal codepoint, escaping whatever would collide with the
/// enclosing quote or the escape syntax itself.
pub fn escape_literal_char(cp: CodePoint, quote: char) -> String {
    if cp == quote as u32 {
        return "%;".to_string();
    }
    escape_common(cp)
}

/// Prints one class codepoint, escaping the class-structural characters.
pub fn escape_class_char(cp: CodePoint) -> String {
    match char::from_u32(cp) {
        Some('^') => "%caret;".to_string(),
        Some('-') => "%dash;".to_string(),
        Some('[') => "%lbracket;".to_string(),
        Some(']') => "%rbracket;".to_string(),
        _ => escape_common(cp),
    }
}

fn escape_common(cp: CodePoint) -> String {
    match cp {
        0x25 => "%%;".to_string(),
        0x00 => "%NUL;".to_string(),
        0x07 => "%a;".to_string(),
        0x08 => "%b;".to_string(),
        0x09 => "%t;".to_string(),
        0x0A => "%n;".to_string(),
        0x0B => "%v;".to_string(),
        0x0C => "%f;".to_string(),
        0x0D => "%r;".to_string(),
        0x1B => "%e;".to_string(),
        _ => match char::from_u32(cp) {
            Some(c) if cp >= 0x20 && cp != 0x7F => c.to_string(),
            _ => format!("%x{cp:x};"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_escapes() {
        let (codes, errs) = decode_literal_body("%%;%underscore;%x32;", '"');
        assert!(errs.is_empty());
        assert_eq!(codes, vec!['%' as u32, '_' as u32, 0x32]);

        let (codes, errs) = decode_literal_body("a%;b", '"');
        assert!(errs.is_empty());
        assert_eq!(codes, vec!['a' as u32, '"' as u32, 'b' as u32]);

        let (codes, errs) = decode_literal_body("%a;%NUL;", '\'');
        assert!(errs.is_empty());
        assert_eq!(codes, vec![0x07, 0x00]);
    }

    #[test]
    fn bad_escapes() {
        let (_, errs) = decode_literal_body("%nope;", '"');
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].1, 0);

        let (_, errs) = decode_literal_body("ab%x", '"');
        assert_eq!(errs[0].0, "unterminated escape");
        assert_eq!(errs[0].1, 2);

        let (_, errs) = decode_literal_body("%xD800;", '"');
        assert_eq!(errs.len(), 1);

        let (_, errs) = decode_class_body("%;");
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn class_atoms_keep_structure() {
        let (atoms, errs) = decode_class_body("^a-z%dash;");
        assert!(errs.is_empty());
        assert_eq!(atoms[0].0, ClassAtom::Raw('^'));
        assert_eq!(atoms[1].0, ClassAtom::Raw('a'));
        assert_eq!(atoms[2].0, ClassAtom::Raw('-'));
        assert_eq!(atoms[3].0, ClassAtom::Raw('z'));
        assert_eq!(atoms[4].0, ClassAtom::Code('-' as u32));
    }

    #[test]
    fn round_trip_printing() {
        assert_eq!(escape_literal_char('"' as u32, '"'), "%;");
        assert_eq!(escape_literal_char('"' as u32, '\''), "\"");
        assert_eq!(escape_literal_char(0x0A, '"'), "%n;");
        assert_eq!(escape_literal_char(0x1F335, '"'), "🌵");
        assert_eq!(escape_class_char('-' as u32), "%dash;");
        assert_eq!(escape_class_char(0x03), "%x3;");
    }
}
