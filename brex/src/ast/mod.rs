/*!
The regex operator tree.

Nodes are produced by the [parser](crate::syntax) and never mutated
afterward; the [resolver](crate::system) builds new resolved trees by
substitution, and the [compiler](crate::regex) consumes resolved trees.

Every node can print itself back to surface syntax ([`Regex::to_bsqon`]),
which round-trips through the parser for canonical sources.
*/

use brex_unicode::{ranges::CharRange, CodePoint};

use crate::syntax::escape::{escape_class_char, escape_literal_char};

/// Which sublanguage a regex belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegexKind {
    Std,
    Path,
    Resource,
}

/// The symbol set a regex operates over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alphabet {
    Unicode,
    Ascii,
}

impl Alphabet {
    /// The largest codepoint of this alphabet.
    pub fn max_codepoint(self) -> CodePoint {
        match self {
            Alphabet::Unicode => brex_unicode::MAX_UNICODE_CP,
            Alphabet::Ascii => brex_unicode::MAX_ASCII_CP,
        }
    }
}

/// A single operator node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegexOpt {
    /// An exact codepoint sequence. `unicode` records which quote form the
    /// literal was written with.
    Literal {
        codes: Vec<CodePoint>,
        unicode: bool,
    },
    /// One character out of a (possibly complemented) class. Ranges are
    /// normalized: disjoint and ascending. `unicode` mirrors the literal
    /// flag: which flavor the class was written in.
    CharRange {
        complemented: bool,
        ranges: Vec<CharRange>,
        unicode: bool,
    },
    /// Any one character of the alphabet.
    Dot,
    /// `${Name}` or `${NS::Name}`; replaced by the target's tree during
    /// resolution.
    NamedRef { name: String },
    /// `${$NAME}`; replaced by an environment-provided literal at link time.
    EnvRef { name: String },
    Star(Box<RegexOpt>),
    Plus(Box<RegexOpt>),
    /// Bounded or half-open repetition; `high == None` means unbounded.
    Range {
        low: u16,
        high: Option<u16>,
        opt: Box<RegexOpt>,
    },
    Optional(Box<RegexOpt>),
    AnyOf(Vec<RegexOpt>),
    Sequence(Vec<RegexOpt>),
    /// Complement under the alphabet's Σ*.
    Negate(Box<RegexOpt>),
    /// Intersection of the operands' languages.
    AllOf(Vec<RegexOpt>),
}

impl RegexOpt {
    /// Whether this node needs parentheses when printed under a postfix or
    /// prefix operator.
    pub fn needs_parens(&self) -> bool {
        !matches!(
            self,
            RegexOpt::Literal { .. }
                | RegexOpt::CharRange { .. }
                | RegexOpt::Dot
                | RegexOpt::NamedRef { .. }
                | RegexOpt::EnvRef { .. }
        )
    }

    /// Whether this node needs parentheses when printed inside a sequence.
    pub fn needs_sequence_parens(&self) -> bool {
        matches!(self, RegexOpt::AnyOf(_) | RegexOpt::AllOf(_))
    }

    /// Whether the node's language contains the empty string.
    ///
    /// References resolve to whatever their target is; callers run this on
    /// resolved trees, where references no longer occur, so both count as
    /// non-nullable here.
    pub fn is_nullable(&self) -> bool {
        match self {
            RegexOpt::Literal { codes, .. } => codes.is_empty(),
            RegexOpt::CharRange { .. } | RegexOpt::Dot => false,
            RegexOpt::NamedRef { .. } | RegexOpt::EnvRef { .. } => false,
            RegexOpt::Star(_) | RegexOpt::Optional(_) => true,
            RegexOpt::Plus(r) => r.is_nullable(),
            RegexOpt::Range { low, opt, .. } => *low == 0 || opt.is_nullable(),
            RegexOpt::AnyOf(opts) => opts.iter().any(RegexOpt::is_nullable),
            RegexOpt::Sequence(opts) => opts.iter().all(RegexOpt::is_nullable),
            RegexOpt::Negate(r) => !r.is_nullable(),
            RegexOpt::AllOf(opts) => opts.iter().all(RegexOpt::is_nullable),
        }
    }

    /// Appends every `NamedRef` name in this subtree to `out`, in syntax
    /// order.
    pub fn collect_named_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            RegexOpt::NamedRef { name } => out.push(name),
            RegexOpt::Literal { .. }
            | RegexOpt::CharRange { .. }
            | RegexOpt::Dot
            | RegexOpt::EnvRef { .. } => {}
            RegexOpt::Star(r)
            | RegexOpt::Plus(r)
            | RegexOpt::Range { opt: r, .. }
            | RegexOpt::Optional(r)
            | RegexOpt::Negate(r) => r.collect_named_refs(out),
            RegexOpt::AnyOf(opts) | RegexOpt::Sequence(opts) | RegexOpt::AllOf(opts) => {
                for r in opts {
                    r.collect_named_refs(out);
                }
            }
        }
    }

    /// Prints the node in surface syntax.
    pub fn to_bsqon(&self) -> String {
        match self {
            RegexOpt::Literal { codes, unicode } => {
                let quote = if *unicode { '"' } else { '\'' };
                let mut s = String::new();
                s.push(quote);
                for &cp in codes {
                    s.push_str(&escape_literal_char(cp, quote));
                }
                s.push(quote);
                s
            }
            RegexOpt::CharRange {
                complemented,
                ranges,
                ..
            } => {
                let mut s = String::from("[");
                if *complemented {
                    s.push('^');
                }
                for r in ranges {
                    s.push_str(&escape_class_char(r.low));
                    if r.low != r.high {
                        s.push('-');
                        s.push_str(&escape_class_char(r.high));
                    }
                }
                s.push(']');
                s
            }
            RegexOpt::Dot => ".".to_string(),
            RegexOpt::NamedRef { name } => format!("${{{name}}}"),
            RegexOpt::EnvRef { name } => format!("${{{name}}}"),
            RegexOpt::Star(r) => format!("{}*", Self::parenthesized(r)),
            RegexOpt::Plus(r) => format!("{}+", Self::parenthesized(r)),
            RegexOpt::Range { low, high, opt } => {
                let iter = match (low, high) {
                    (l, Some(h)) if l == h => format!("{{{l}}}"),
                    (0, Some(h)) => format!("{{,{h}}}"),
                    (l, None) => format!("{{{l},}}"),
                    (l, Some(h)) => format!("{{{l},{h}}}"),
                };
                format!("{}{}", Self::parenthesized(opt), iter)
            }
            RegexOpt::Optional(r) => format!("{}?", Self::parenthesized(r)),
            RegexOpt::AnyOf(opts) => opts
                .iter()
                .map(Self::parenthesized)
                .collect::<Vec<_>>()
                .join(" | "),
            RegexOpt::Sequence(opts) => opts
                .iter()
                .map(|r| {
                    if r.needs_sequence_parens() {
                        format!("({})", r.to_bsqon())
                    } else {
                        r.to_bsqon()
                    }
                })
                .collect(),
            RegexOpt::Negate(r) => format!("!{}", Self::parenthesized(r)),
            RegexOpt::AllOf(opts) => opts
                .iter()
                .map(Self::parenthesized)
                .collect::<Vec<_>>()
                .join("&"),
        }
    }

    fn parenthesized(r: &RegexOpt) -> String {
        if r.needs_parens() {
            format!("({})", r.to_bsqon())
        } else {
            r.to_bsqon()
        }
    }
}

/// One conjunct of a regex body, or an anchor expression.
///
/// `front_check` and `back_check` are mutually exclusive; `negated` inverts
/// the entry's assertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToplevelEntry {
    pub negated: bool,
    pub front_check: bool,
    pub back_check: bool,
    pub opt: RegexOpt,
}

impl ToplevelEntry {
    /// A plain entry with no markers.
    pub fn plain(opt: RegexOpt) -> Self {
        ToplevelEntry {
            negated: false,
            front_check: false,
            back_check: false,
            opt,
        }
    }

    fn to_bsqon(&self) -> String {
        let mut s = String::new();
        if self.negated {
            s.push('!');
        }
        if self.front_check {
            s.push('^');
        }
        s.push_str(&self.opt.to_bsqon());
        if self.back_check {
            s.push('$');
        }
        s
    }
}

/// The body of a regex: a single entry, or an `&`-joined conjunction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegexComponent {
    Single(ToplevelEntry),
    AllOf(Vec<ToplevelEntry>),
}

impl RegexComponent {
    pub fn entries(&self) -> &[ToplevelEntry] {
        match self {
            RegexComponent::Single(e) => std::slice::from_ref(e),
            RegexComponent::AllOf(es) => es,
        }
    }

    fn to_bsqon(&self) -> String {
        match self {
            RegexComponent::Single(e) => e.to_bsqon(),
            RegexComponent::AllOf(es) => es
                .iter()
                .map(ToplevelEntry::to_bsqon)
                .collect::<Vec<_>>()
                .join(" & "),
        }
    }
}

/// A complete regex: kind and alphabet tags, optional pre/post anchors and
/// the body component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Regex {
    pub kind: RegexKind,
    pub alphabet: Alphabet,
    pub pre_anchor: Option<ToplevelEntry>,
    pub root: RegexComponent,
    pub post_anchor: Option<ToplevelEntry>,
}

impl Regex {
    /// Prints the whole regex in surface syntax, including anchors and the
    /// flavor flag.
    pub fn to_bsqon(&self) -> String {
        let mut s = String::from("/");
        if let Some(pre) = &self.pre_anchor {
            if pre.negated {
                s.push('!');
            }
            if pre.front_check {
                s.push('<');
                s.push_str(&pre.opt.to_bsqon());
                s.push('>');
            } else {
                s.push_str(&pre.opt.to_bsqon());
            }
            s.push('^');
        }
        s.push_str(&self.root.to_bsqon());
        if let Some(post) = &self.post_anchor {
            s.push('$');
            if post.negated {
                s.push('!');
            }
            if post.back_check {
                s.push('<');
                s.push_str(&post.opt.to_bsqon());
                s.push('>');
            } else {
                s.push_str(&post.opt.to_bsqon());
            }
        }
        s.push('/');
        match self.kind {
            RegexKind::Path => s.push('p'),
            RegexKind::Resource => s.push('r'),
            RegexKind::Std => {
                if self.alphabet == Alphabet::Ascii {
                    s.push('a');
                }
            }
        }
        s
    }
}
