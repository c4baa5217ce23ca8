/*!
An interval-labelled Thompson NFA.

Transitions carry normalized codepoint range lists instead of per-codepoint
tables, which keeps the large Unicode alphabet tractable. Extended operators
(`Negate`, `AllOf`) are lowered through the [DFA](super::dfa) construction
and spliced back in as fragments, so one flat NFA drives every match.
*/

use brex_unicode::ranges::{self, complement, normalize, CharRange};
use brex_unicode::CodePoint;

use crate::ast::{Alphabet, RegexOpt};

use super::dfa::Dfa;
use super::CompileError;

pub(crate) type StateId = usize;

#[derive(Clone, Debug)]
pub(crate) enum Label {
    Eps,
    /// Normalized, ascending, disjoint. An empty list never matches.
    Ranges(Vec<CharRange>),
}

#[derive(Clone, Debug)]
pub(crate) struct Edge {
    pub label: Label,
    pub to: StateId,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Node {
    pub edges: Vec<Edge>,
}

#[derive(Clone, Debug)]
pub(crate) struct Nfa {
    pub nodes: Vec<Node>,
    pub start: StateId,
    pub accept: StateId,
}

impl Nfa {
    /// Compiles a resolved operator tree. `NamedRef`/`EnvRef` nodes must
    /// have been substituted away by the resolver.
    pub fn compile(opt: &RegexOpt, alphabet: Alphabet) -> Result<Nfa, CompileError> {
        let mut b = Builder {
            nodes: Vec::new(),
            alphabet,
        };
        let (start, accept) = b.build(opt)?;
        Ok(Nfa {
            nodes: b.nodes,
            start,
            accept,
        })
    }

    /// Every distinct range label in the automaton, for partition building.
    pub fn labels(&self) -> Vec<CharRange> {
        let mut out = Vec::new();
        for n in &self.nodes {
            for e in &n.edges {
                if let Label::Ranges(rs) = &e.label {
                    out.extend_from_slice(rs);
                }
            }
        }
        out
    }

    /// Whole-string acceptance of `chars`.
    pub fn matches(&self, chars: &[CodePoint]) -> bool {
        self.simulate(chars, false, false)
    }

    /// Whether some prefix of `chars` (possibly empty) is accepted.
    pub fn matches_prefix(&self, chars: &[CodePoint]) -> bool {
        self.simulate(chars, false, true)
    }

    /// Whether some suffix of `chars` (possibly empty) is accepted.
    pub fn matches_suffix(&self, chars: &[CodePoint]) -> bool {
        self.simulate(chars, true, false)
    }

    /// Whether any substring of `chars` is accepted.
    pub fn matches_within(&self, chars: &[CodePoint]) -> bool {
        self.simulate(chars, true, true)
    }

    /// One frontier sweep over `chars`. `seed_all` re-enters the start state
    /// at every position (match may begin anywhere); `accept_any` reports
    /// acceptance at any step rather than only at the end.
    fn simulate(&self, chars: &[CodePoint], seed_all: bool, accept_any: bool) -> bool {
        let mut cur = vec![false; self.nodes.len()];
        self.add_closure(&mut cur, self.start);
        if accept_any && cur[self.accept] {
            return true;
        }

        for &c in chars {
            let mut next = vec![false; self.nodes.len()];
            for (id, live) in cur.iter().enumerate() {
                if !live {
                    continue;
                }
                for e in &self.nodes[id].edges {
                    if let Label::Ranges(rs) = &e.label {
                        if ranges::contains(rs, c) {
                            self.add_closure(&mut next, e.to);
                        }
                    }
                }
            }
            if seed_all {
                self.add_closure(&mut next, self.start);
            }
            cur = next;
            if accept_any && cur[self.accept] {
                return true;
            }
        }
        cur[self.accept]
    }

    /// Marks `id` and everything ε-reachable from it in `frontier`.
    fn add_closure(&self, frontier: &mut [bool], id: StateId) {
        if frontier[id] {
            return;
        }
        frontier[id] = true;
        let mut stack = vec![id];
        while let Some(s) = stack.pop() {
            for e in &self.nodes[s].edges {
                if matches!(e.label, Label::Eps) && !frontier[e.to] {
                    frontier[e.to] = true;
                    stack.push(e.to);
                }
            }
        }
    }
}

struct Builder {
    nodes: Vec<Node>,
    alphabet: Alphabet,
}

impl Builder {
    fn state(&mut self) -> StateId {
        self.nodes.push(Node::default());
        self.nodes.len() - 1
    }

    fn edge(&mut self, from: StateId, label: Label, to: StateId) {
        self.nodes[from].edges.push(Edge { label, to });
    }

    fn eps(&mut self, from: StateId, to: StateId) {
        self.edge(from, Label::Eps, to);
    }

    fn build(&mut self, opt: &RegexOpt) -> Result<(StateId, StateId), CompileError> {
        match opt {
            RegexOpt::Literal { codes, .. } => {
                let start = self.state();
                let mut at = start;
                for &cp in codes {
                    let next = self.state();
                    self.edge(at, Label::Ranges(vec![CharRange::single(cp)]), next);
                    at = next;
                }
                Ok((start, at))
            }
            RegexOpt::CharRange {
                complemented,
                ranges,
                ..
            } => {
                // JSON-sourced trees may carry unnormalized ranges.
                let rs = normalize(ranges.clone());
                let rs = if *complemented {
                    complement(&rs, self.alphabet.max_codepoint())
                } else {
                    rs
                };
                let (s, a) = (self.state(), self.state());
                self.edge(s, Label::Ranges(rs), a);
                Ok((s, a))
            }
            RegexOpt::Dot => {
                let (s, a) = (self.state(), self.state());
                let all = vec![CharRange::new(0, self.alphabet.max_codepoint())];
                self.edge(s, Label::Ranges(all), a);
                Ok((s, a))
            }
            RegexOpt::NamedRef { name } => Err(CompileError::UnresolvedName(name.clone())),
            RegexOpt::EnvRef { name } => Err(CompileError::UnresolvedEnv(name.clone())),
            RegexOpt::Star(r) => {
                let (fs, fa) = self.build(r)?;
                let (s, a) = (self.state(), self.state());
                self.eps(s, fs);
                self.eps(s, a);
                self.eps(fa, fs);
                self.eps(fa, a);
                Ok((s, a))
            }
            RegexOpt::Plus(r) => {
                let (fs, fa) = self.build(r)?;
                let (s, a) = (self.state(), self.state());
                self.eps(s, fs);
                self.eps(fa, fs);
                self.eps(fa, a);
                Ok((s, a))
            }
            RegexOpt::Optional(r) => {
                let (fs, fa) = self.build(r)?;
                let (s, a) = (self.state(), self.state());
                self.eps(s, fs);
                self.eps(s, a);
                self.eps(fa, a);
                Ok((s, a))
            }
            RegexOpt::Range { low, high, opt } => {
                let start = self.state();
                let mut at = start;
                for _ in 0..*low {
                    let (fs, fa) = self.build(opt)?;
                    self.eps(at, fs);
                    at = fa;
                }
                match high {
                    None => {
                        let star = RegexOpt::Star(opt.clone());
                        let (fs, fa) = self.build(&star)?;
                        self.eps(at, fs);
                        at = fa;
                    }
                    Some(h) => {
                        for _ in *low..*h {
                            let (fs, fa) = self.build(opt)?;
                            let next = self.state();
                            self.eps(at, fs);
                            self.eps(at, next);
                            self.eps(fa, next);
                            at = next;
                        }
                    }
                }
                Ok((start, at))
            }
            RegexOpt::AnyOf(opts) => {
                let (s, a) = (self.state(), self.state());
                for r in opts {
                    let (fs, fa) = self.build(r)?;
                    self.eps(s, fs);
                    self.eps(fa, a);
                }
                Ok((s, a))
            }
            RegexOpt::Sequence(opts) => {
                let start = self.state();
                let mut at = start;
                for r in opts {
                    let (fs, fa) = self.build(r)?;
                    self.eps(at, fs);
                    at = fa;
                }
                Ok((start, at))
            }
            RegexOpt::Negate(r) => {
                let inner = Nfa::compile(r, self.alphabet)?;
                let mut dfa = Dfa::determinize(&inner, self.alphabet);
                dfa.complement();
                Ok(self.splice(&dfa))
            }
            RegexOpt::AllOf(opts) => {
                let inners = opts
                    .iter()
                    .map(|r| Nfa::compile(r, self.alphabet))
                    .collect::<Result<Vec<_>, _>>()?;
                let dfa = Dfa::intersect_all(&inners, self.alphabet);
                Ok(self.splice(&dfa))
            }
        }
    }

    /// Copies a total DFA in as an NFA fragment: one node per DFA state,
    /// range edges grouped per target, accepting states wired to a fresh
    /// accept node.
    fn splice(&mut self, dfa: &Dfa) -> (StateId, StateId) {
        let base = self.nodes.len();
        for _ in 0..dfa.state_count() {
            self.state();
        }
        let accept = self.state();

        for (i, edges) in dfa.grouped_edges().into_iter().enumerate() {
            for (target, rs) in edges {
                self.edge(base + i, Label::Ranges(normalize(rs)), base + target);
            }
            if dfa.is_accepting(i) {
                self.eps(base + i, accept);
            }
        }
        (base + dfa.start(), accept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> RegexOpt {
        RegexOpt::Literal {
            codes: s.chars().map(|c| c as u32).collect(),
            unicode: true,
        }
    }

    fn cps(s: &str) -> Vec<CodePoint> {
        s.chars().map(|c| c as u32).collect()
    }

    #[test]
    fn literal_whole_match() {
        let nfa = Nfa::compile(&lit("abc"), Alphabet::Unicode).expect("compile");
        assert!(nfa.matches(&cps("abc")));
        assert!(nfa.matches(&cps("ab")) == false);
        assert!(nfa.matches(&cps("abcd")) == false);
        assert!(nfa.matches(&cps("")) == false);
    }

    #[test]
    fn star_accepts_empty() {
        let nfa = Nfa::compile(&RegexOpt::Star(Box::new(lit("ab"))), Alphabet::Unicode)
            .expect("compile");
        assert!(nfa.matches(&cps("")));
        assert!(nfa.matches(&cps("abab")));
        assert!(nfa.matches(&cps("aba")) == false);
    }

    #[test]
    fn bounded_repeat() {
        let rep = RegexOpt::Range {
            low: 2,
            high: Some(4),
            opt: Box::new(lit("a")),
        };
        let nfa = Nfa::compile(&rep, Alphabet::Unicode).expect("compile");
        assert!(nfa.matches(&cps("a")) == false);
        assert!(nfa.matches(&cps("aa")));
        assert!(nfa.matches(&cps("aaaa")));
        assert!(nfa.matches(&cps("aaaaa")) == false);

        let rep = RegexOpt::Range {
            low: 1,
            high: None,
            opt: Box::new(lit("a")),
        };
        let nfa = Nfa::compile(&rep, Alphabet::Unicode).expect("compile");
        assert!(nfa.matches(&cps("")) == false);
        assert!(nfa.matches(&cps("aaaaaa")));
    }

    #[test]
    fn prefix_suffix_within() {
        let nfa = Nfa::compile(&lit("ab"), Alphabet::Unicode).expect("compile");
        assert!(nfa.matches_prefix(&cps("abxx")));
        assert!(nfa.matches_prefix(&cps("xxab")) == false);
        assert!(nfa.matches_suffix(&cps("xxab")));
        assert!(nfa.matches_suffix(&cps("abxx")) == false);
        assert!(nfa.matches_within(&cps("xabx")));
        assert!(nfa.matches_within(&cps("xaxb")) == false);
    }

    #[test]
    fn negation_inverts() {
        let neg = RegexOpt::Negate(Box::new(lit("ab")));
        let nfa = Nfa::compile(&neg, Alphabet::Unicode).expect("compile");
        assert!(nfa.matches(&cps("ab")) == false);
        assert!(nfa.matches(&cps("")));
        assert!(nfa.matches(&cps("x")));
        assert!(nfa.matches(&cps("abx")));
        assert!(nfa.matches(&cps("🌵")));
    }

    #[test]
    fn intersection_requires_all() {
        // [0-9]+ & "4".*
        let digits = RegexOpt::Plus(Box::new(RegexOpt::CharRange {
            complemented: false,
            ranges: vec![CharRange::new('0' as u32, '9' as u32)],
            unicode: true,
        }));
        let starts4 = RegexOpt::Sequence(vec![lit("4"), RegexOpt::Star(Box::new(RegexOpt::Dot))]);
        let both = RegexOpt::AllOf(vec![digits, starts4]);
        let nfa = Nfa::compile(&both, Alphabet::Unicode).expect("compile");
        assert!(nfa.matches(&cps("42")));
        assert!(nfa.matches(&cps("24")) == false);
        assert!(nfa.matches(&cps("4x")) == false);
    }

    #[test]
    fn unresolved_refs_error() {
        let r = RegexOpt::NamedRef {
            name: "Main::Foo".to_string(),
        };
        assert!(matches!(
            Nfa::compile(&r, Alphabet::Unicode),
            Err(CompileError::UnresolvedName(_))
        ));
    }
}
