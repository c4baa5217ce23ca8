use std::fmt;
use std::ops::Range;

use brex_unicode::ranges::{normalize, CharRange};
use logos::Logos;

use crate::ast::{Alphabet, Regex, RegexComponent, RegexKind, RegexOpt, ToplevelEntry};

use super::escape::{self, ClassAtom};
use super::token::Token;

/// A parse problem with its byte offset into the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub msg: String,
    pub pos: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at offset {})", self.msg, self.pos)
    }
}

/// Parses a regex with the Unicode alphabet as default.
///
/// The regex is valid only if the returned diagnostics list is empty; a
/// `Some` regex with diagnostics is a partial parse kept for tooling.
pub fn parse_unicode_regex(src: &str) -> (Option<Regex>, Vec<Diagnostic>) {
    Parser::run(src, Alphabet::Unicode)
}

/// Parses a regex with the ASCII alphabet as default. Codepoints above
/// `0x7F`, raw or escaped, are diagnosed.
pub fn parse_ascii_regex(src: &str) -> (Option<Regex>, Vec<Diagnostic>) {
    Parser::run(src, Alphabet::Ascii)
}

struct Parser<'s> {
    src: &'s str,
    toks: Vec<(Token, Range<usize>)>,
    pos: usize,
    alphabet: Alphabet,
    diags: Vec<Diagnostic>,
}

impl<'s> Parser<'s> {
    fn run(src: &'s str, alphabet: Alphabet) -> (Option<Regex>, Vec<Diagnostic>) {
        let mut diags = Vec::new();
        let mut toks = Vec::new();
        for (tok, span) in Token::lexer(src).spanned() {
            match tok {
                Ok(t) => toks.push((t, span)),
                Err(()) => diags.push(Diagnostic {
                    msg: format!("unrecognized input `{}`", &src[span.clone()]),
                    pos: span.start,
                }),
            }
        }

        let mut p = Parser {
            src,
            toks,
            pos: 0,
            alphabet,
            diags,
        };
        let re = p.parse_regex();
        (re, p.diags)
    }

    // -- token plumbing

    fn peek(&self) -> Option<Token> {
        self.toks.get(self.pos).map(|(t, _)| *t)
    }

    fn peek2(&self) -> Option<Token> {
        self.toks.get(self.pos + 1).map(|(t, _)| *t)
    }

    fn here(&self) -> usize {
        self.toks
            .get(self.pos)
            .map(|(_, s)| s.start)
            .unwrap_or(self.src.len())
    }

    fn bump(&mut self) -> Option<(Token, Range<usize>)> {
        let t = self.toks.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, tok: Token) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token, what: &str) -> bool {
        if self.eat(tok) {
            true
        } else {
            self.diag(format!("expected {what}"), self.here());
            false
        }
    }

    fn diag(&mut self, msg: impl Into<String>, pos: usize) {
        self.diags.push(Diagnostic {
            msg: msg.into(),
            pos,
        });
    }

    // -- grammar

    fn parse_regex(&mut self) -> Option<Regex> {
        if !self.expect(Token::Slash, "`/` to open the regex") {
            return None;
        }
        let (pre_anchor, root, post_anchor) = self.parse_toplevel()?;
        self.expect(Token::Slash, "`/` to close the regex");

        let (kind, alphabet) = self.parse_flag();
        if self.pos < self.toks.len() {
            self.diag("trailing input after regex", self.here());
        }

        let re = Regex {
            kind,
            alphabet,
            pre_anchor,
            root,
            post_anchor,
        };
        if alphabet == Alphabet::Ascii && self.alphabet == Alphabet::Unicode {
            // The `a` flag tightened the alphabet after literals were
            // decoded; re-check bounds structurally.
            self.check_ascii_bounds(&re);
        }
        Some(re)
    }

    fn parse_flag(&mut self) -> (RegexKind, Alphabet) {
        if self.peek() == Some(Token::Word) {
            let (_, span) = self.bump().expect("peeked");
            let word = self.src[span.clone()].to_string();
            return match word.as_str() {
                "a" => (RegexKind::Std, Alphabet::Ascii),
                "p" => (RegexKind::Path, Alphabet::Unicode),
                "r" => (RegexKind::Resource, Alphabet::Unicode),
                other => {
                    self.diag(format!("unknown regex flag `{other}`"), span.start);
                    (RegexKind::Std, self.alphabet)
                }
            };
        }
        (RegexKind::Std, self.alphabet)
    }

    fn parse_toplevel(
        &mut self,
    ) -> Option<(Option<ToplevelEntry>, RegexComponent, Option<ToplevelEntry>)> {
        let mut pre_anchor = None;
        let mut entries = Vec::new();
        let mut failed = false;

        match self.parse_first_entry(&mut pre_anchor) {
            Some(e) => entries.push(e),
            None => {
                failed = true;
                self.recover_entry();
            }
        }
        while self.eat(Token::Amp) {
            match self.parse_entry(None) {
                Some(e) => entries.push(e),
                None => {
                    failed = true;
                    self.recover_entry();
                }
            }
        }

        let mut post_anchor = None;
        if self.eat(Token::Dollar) {
            match self.parse_anchor(false) {
                Some(a) => post_anchor = Some(a),
                None => {
                    failed = true;
                    self.recover_entry();
                }
            }
        }

        if failed || entries.is_empty() {
            return None;
        }
        let root = if entries.len() == 1 {
            RegexComponent::Single(entries.pop().expect("one entry"))
        } else {
            RegexComponent::AllOf(entries)
        };
        Some((pre_anchor, root, post_anchor))
    }

    /// The first `&`-segment doubles as the place the pre-anchor can appear:
    /// `A^ ...`, `!A^ ...` or `<A>^ ...`. A toplevel that *begins* with `^`
    /// is a front-check entry instead.
    fn parse_first_entry(
        &mut self,
        pre_anchor: &mut Option<ToplevelEntry>,
    ) -> Option<ToplevelEntry> {
        let negated = self.eat(Token::Bang);

        if self.eat(Token::Lt) {
            let opt = self.parse_alt()?;
            self.expect(Token::Gt, "`>` to close the front-check anchor");
            self.expect(Token::Hat, "`^` after the front-check anchor");
            *pre_anchor = Some(ToplevelEntry {
                negated,
                front_check: true,
                back_check: false,
                opt,
            });
            return self.parse_entry(None);
        }

        if self.peek() == Some(Token::Hat) {
            return self.parse_entry(Some(negated));
        }

        let opt = self.parse_alt()?;
        if self.eat(Token::Hat) {
            *pre_anchor = Some(ToplevelEntry {
                negated,
                front_check: false,
                back_check: false,
                opt,
            });
            return self.parse_entry(None);
        }

        let back_check = self.try_eat_back_check();
        Some(ToplevelEntry {
            negated,
            front_check: false,
            back_check,
            opt,
        })
    }

    /// One conjunct: `!`? `^`? alternation `$`?.
    fn parse_entry(&mut self, negated: Option<bool>) -> Option<ToplevelEntry> {
        let negated = negated.unwrap_or_else(|| self.eat(Token::Bang));
        let front_check = self.eat(Token::Hat);
        let opt = self.parse_alt()?;
        let back_check = self.try_eat_back_check();
        if front_check && back_check {
            self.diag(
                "front check and back check are mutually exclusive on one entry",
                self.here(),
            );
        }
        Some(ToplevelEntry {
            negated,
            front_check,
            back_check,
            opt,
        })
    }

    /// A `$` is this entry's back-check marker only when the toplevel ends
    /// right after it; otherwise it introduces the post-anchor.
    fn try_eat_back_check(&mut self) -> bool {
        if self.peek() == Some(Token::Dollar)
            && matches!(self.peek2(), Some(Token::Slash) | Some(Token::Amp) | None)
        {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_anchor(&mut self, is_pre: bool) -> Option<ToplevelEntry> {
        let negated = self.eat(Token::Bang);
        let checked = self.eat(Token::Lt);
        let opt = self.parse_alt()?;
        if checked {
            self.expect(Token::Gt, "`>` to close the check anchor");
        }
        Some(ToplevelEntry {
            negated,
            front_check: is_pre && checked,
            back_check: !is_pre && checked,
            opt,
        })
    }

    /// Skips to the next `&`, `$` or `/` after a failed entry so later
    /// conjuncts still produce diagnostics.
    fn recover_entry(&mut self) {
        while !matches!(
            self.peek(),
            None | Some(Token::Amp) | Some(Token::Dollar) | Some(Token::Slash)
        ) {
            self.pos += 1;
        }
    }

    fn parse_alt(&mut self) -> Option<RegexOpt> {
        let mut opts = vec![self.parse_seq()?];
        while self.eat(Token::Pipe) {
            opts.push(self.parse_seq()?);
        }
        Some(if opts.len() == 1 {
            opts.pop().expect("one alternative")
        } else {
            RegexOpt::AnyOf(opts)
        })
    }

    fn parse_seq(&mut self) -> Option<RegexOpt> {
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                None
                | Some(Token::Pipe)
                | Some(Token::Amp)
                | Some(Token::Slash)
                | Some(Token::Dollar)
                | Some(Token::Hat)
                | Some(Token::RParen)
                | Some(Token::Gt) => break,
                _ => parts.push(self.parse_prefixed()?),
            }
        }
        match parts.len() {
            0 => {
                self.diag("expected a regex expression", self.here());
                None
            }
            1 => Some(parts.pop().expect("one part")),
            _ => Some(RegexOpt::Sequence(parts)),
        }
    }

    fn parse_prefixed(&mut self) -> Option<RegexOpt> {
        if self.eat(Token::Bang) {
            return Some(RegexOpt::Negate(Box::new(self.parse_prefixed()?)));
        }
        self.parse_postfixed()
    }

    fn parse_postfixed(&mut self) -> Option<RegexOpt> {
        let mut r = self.parse_atom()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    r = RegexOpt::Star(Box::new(r));
                }
                Some(Token::Plus) => {
                    self.pos += 1;
                    r = RegexOpt::Plus(Box::new(r));
                }
                Some(Token::Question) => {
                    self.pos += 1;
                    r = RegexOpt::Optional(Box::new(r));
                }
                Some(Token::Repeat) => {
                    let (_, span) = self.bump().expect("peeked");
                    r = self.apply_repeat(r, span);
                }
                _ => break,
            }
        }
        Some(r)
    }

    fn apply_repeat(&mut self, r: RegexOpt, span: Range<usize>) -> RegexOpt {
        let body = self.src[span.start + 1..span.end - 1].to_string();
        let (low, high) = match body.split_once(',') {
            None => {
                if body.is_empty() {
                    self.diag("repeat needs at least one bound", span.start);
                    return r;
                }
                match body.parse::<u16>() {
                    Ok(n) => (n, Some(n)),
                    Err(_) => {
                        self.diag("repeat bound out of range", span.start);
                        return r;
                    }
                }
            }
            Some((l, h)) => {
                if l.is_empty() && h.is_empty() {
                    self.diag("repeat needs at least one bound", span.start);
                    return r;
                }
                let low = if l.is_empty() {
                    0
                } else {
                    match l.parse::<u16>() {
                        Ok(n) => n,
                        Err(_) => {
                            self.diag("repeat bound out of range", span.start);
                            return r;
                        }
                    }
                };
                let high = if h.is_empty() {
                    None
                } else {
                    match h.parse::<u16>() {
                        Ok(n) => Some(n),
                        Err(_) => {
                            self.diag("repeat bound out of range", span.start);
                            return r;
                        }
                    }
                };
                (low, high)
            }
        };
        if let Some(h) = high {
            if low > h {
                self.diag("repeat lower bound exceeds upper bound", span.start);
                return r;
            }
        }
        RegexOpt::Range {
            low,
            high,
            opt: Box::new(r),
        }
    }

    fn parse_atom(&mut self) -> Option<RegexOpt> {
        match self.peek() {
            Some(Token::UnicodeLiteral) => {
                let (_, span) = self.bump().expect("peeked");
                Some(self.decode_literal(span, '"', true))
            }
            Some(Token::AsciiLiteral) => {
                let (_, span) = self.bump().expect("peeked");
                Some(self.decode_literal(span, '\'', false))
            }
            Some(Token::Class) => {
                let (_, span) = self.bump().expect("peeked");
                Some(self.decode_class(span))
            }
            Some(Token::Ref) => {
                let (_, span) = self.bump().expect("peeked");
                Some(self.decode_ref(span))
            }
            Some(Token::Dot) => {
                self.pos += 1;
                Some(RegexOpt::Dot)
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let r = self.parse_alt()?;
                self.expect(Token::RParen, "`)` to close the group");
                Some(r)
            }
            _ => {
                self.diag("expected a regex expression", self.here());
                None
            }
        }
    }

    fn decode_literal(&mut self, span: Range<usize>, quote: char, unicode: bool) -> RegexOpt {
        let body = &self.src[span.start + 1..span.end - 1];
        let (codes, errors) = escape::decode_literal_body(body, quote);
        for (msg, off) in errors {
            self.diag(msg, span.start + 1 + off);
        }
        let max = if !unicode {
            brex_unicode::MAX_ASCII_CP
        } else {
            self.alphabet.max_codepoint()
        };
        if codes.iter().any(|&cp| cp > max) {
            let what = if unicode { "regex" } else { "literal" };
            self.diag(
                format!("non-ASCII codepoint in an ASCII {what}"),
                span.start,
            );
        }
        RegexOpt::Literal { codes, unicode }
    }

    fn decode_class(&mut self, span: Range<usize>) -> RegexOpt {
        let body = &self.src[span.start + 1..span.end - 1];
        let (atoms, errors) = escape::decode_class_body(body);
        for (msg, off) in errors {
            self.diag(msg, span.start + 1 + off);
        }

        let mut atoms = &atoms[..];
        let complemented = matches!(atoms.first(), Some((ClassAtom::Raw('^'), _)));
        if complemented {
            atoms = &atoms[1..];
        }

        let code_of = |a: &ClassAtom| match *a {
            ClassAtom::Raw(c) => c as u32,
            ClassAtom::Code(cp) => cp,
        };
        let is_dash = |a: &(ClassAtom, usize)| matches!(a.0, ClassAtom::Raw('-'));

        let mut ranges = Vec::new();
        let mut i = 0;
        while i < atoms.len() {
            if is_dash(&atoms[i]) {
                // A dash with no char on both sides is a literal dash.
                ranges.push(CharRange::single('-' as u32));
                i += 1;
                continue;
            }
            let low = code_of(&atoms[i].0);
            if i + 2 < atoms.len() && is_dash(&atoms[i + 1]) && !is_dash(&atoms[i + 2]) {
                let high = code_of(&atoms[i + 2].0);
                if low > high {
                    self.diag(
                        "char range lower bound exceeds upper bound",
                        span.start + 1 + atoms[i].1,
                    );
                } else {
                    ranges.push(CharRange::new(low, high));
                }
                i += 3;
            } else {
                ranges.push(CharRange::single(low));
                i += 1;
            }
        }

        if ranges.is_empty() {
            self.diag("empty char class", span.start);
        }
        let max = self.alphabet.max_codepoint();
        if ranges.iter().any(|r| r.high > max) {
            self.diag("non-ASCII codepoint in an ASCII regex", span.start);
        }

        RegexOpt::CharRange {
            complemented,
            ranges: normalize(ranges),
            unicode: self.alphabet == Alphabet::Unicode,
        }
    }

    fn decode_ref(&mut self, span: Range<usize>) -> RegexOpt {
        let body = self.src[span.start + 2..span.end - 1].to_string();
        fn is_ident(s: &str) -> bool {
            let mut bytes = s.bytes();
            match bytes.next() {
                Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
                _ => return false,
            }
            bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }

        if let Some(env) = body.strip_prefix('$') {
            if !is_ident(env) {
                self.diag(format!("invalid env reference name `{env}`"), span.start);
            }
            return RegexOpt::EnvRef {
                name: env.to_string(),
            };
        }

        let valid = match body.split_once("::") {
            None => is_ident(&body),
            Some((ns, local)) => is_ident(ns) && is_ident(local) && !local.contains("::"),
        };
        if !valid {
            self.diag(format!("invalid regex reference name `{body}`"), span.start);
        }
        RegexOpt::NamedRef { name: body }
    }

    /// Walks a finished regex for codepoints beyond the ASCII alphabet.
    fn check_ascii_bounds(&mut self, re: &Regex) {
        fn walk(opt: &RegexOpt, bad: &mut bool) {
            match opt {
                RegexOpt::Literal { codes, .. } => {
                    *bad |= codes.iter().any(|&c| c > brex_unicode::MAX_ASCII_CP)
                }
                RegexOpt::CharRange { ranges, .. } => {
                    *bad |= ranges.iter().any(|r| r.high > brex_unicode::MAX_ASCII_CP)
                }
                RegexOpt::Dot | RegexOpt::NamedRef { .. } | RegexOpt::EnvRef { .. } => {}
                RegexOpt::Star(r)
                | RegexOpt::Plus(r)
                | RegexOpt::Range { opt: r, .. }
                | RegexOpt::Optional(r)
                | RegexOpt::Negate(r) => walk(r, bad),
                RegexOpt::AnyOf(rs) | RegexOpt::Sequence(rs) | RegexOpt::AllOf(rs) => {
                    rs.iter().for_each(|r| walk(r, bad))
                }
            }
        }
        let mut bad = false;
        for e in re.root.entries() {
            walk(&e.opt, &mut bad);
        }
        for a in re.pre_anchor.iter().chain(re.post_anchor.iter()) {
            walk(&a.opt, &mut bad);
        }
        if bad {
            self.diag("non-ASCII codepoint in an ASCII regex", 0);
        }
    }
}
