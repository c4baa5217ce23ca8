use logos::Logos;

/// One token of the BREX surface language.
///
/// Literals, classes and `${...}` references are single tokens; their bodies
/// are decoded by [`escape`](super::escape). Escapes never contain a raw
/// closing delimiter, so the token patterns can simply run to the next one.
/// Comments (`%% ...` to end of line, `%* ... *%`) and whitespace are
/// skipped.
#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"%%[^\n]*")]
#[logos(skip r"%\*[^*]*\*+([^%*][^*]*\*+)*%")]
pub enum Token {
    #[token("/")]
    Slash,

    /// `"..."`
    #[regex(r#""[^"]*""#)]
    UnicodeLiteral,

    /// `'...'`
    #[regex(r"'[^']*'")]
    AsciiLiteral,

    /// `[...]`, complement and ranges included.
    #[regex(r"\[[^\]]*\]")]
    Class,

    /// `${Name}`, `${NS::Name}` or `${$ENV}`.
    #[regex(r"\$\{[^}]*\}")]
    Ref,

    /// `{n}`, `{n,}`, `{,m}` or `{n,m}`.
    #[regex(r"\{[0-9]*(,[0-9]*)?\}")]
    Repeat,

    #[token(".")]
    Dot,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("|")]
    Pipe,

    #[token("&")]
    Amp,

    #[token("!")]
    Bang,

    #[token("^")]
    Hat,

    #[token("$")]
    Dollar,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    /// Bare identifier; only valid as the flavor flag after the closing `/`.
    #[regex(r"[a-zA-Z][a-zA-Z0-9]*")]
    Word,
}
