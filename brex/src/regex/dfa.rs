/*!
Subset construction over an interval partition of the alphabet.

`Negate` needs a *total* DFA to invert acceptance, and `AllOf` needs a
product automaton; both are built here. States transition on partition
letters (maximal intervals that never straddle a class boundary of the
source automata), so the construction is polynomial in the number of
distinct class boundaries rather than in alphabet size.
*/

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use brex_unicode::ranges::{partition, CharRange};

use crate::ast::Alphabet;

use super::nfa::{Label, Nfa, StateId};

pub(crate) struct Dfa {
    partition: Vec<CharRange>,
    states: Vec<DfaState>,
    start: usize,
}

struct DfaState {
    /// Indexed by partition letter; always total.
    next: Vec<usize>,
    accepting: bool,
}

impl Dfa {
    /// Subset-constructs `nfa` over the partition its own labels induce.
    pub fn determinize(nfa: &Nfa, alphabet: Alphabet) -> Dfa {
        let letters = partition(&nfa.labels(), alphabet.max_codepoint());
        Self::determinize_with(nfa, letters)
    }

    /// Builds the product automaton of `nfas` over a shared partition;
    /// acceptance requires every component to accept.
    pub fn intersect_all(nfas: &[Nfa], alphabet: Alphabet) -> Dfa {
        let mut labels = Vec::new();
        for nfa in nfas {
            labels.extend(nfa.labels());
        }
        let letters = partition(&labels, alphabet.max_codepoint());
        let dfas: Vec<Dfa> = nfas
            .iter()
            .map(|n| Self::determinize_with(n, letters.clone()))
            .collect();

        let mut states: Vec<DfaState> = Vec::new();
        let mut index: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut queue = VecDeque::new();

        let start_key: Vec<usize> = dfas.iter().map(|d| d.start).collect();
        index.insert(start_key.clone(), 0);
        states.push(DfaState {
            next: Vec::new(),
            accepting: dfas.iter().zip(&start_key).all(|(d, &s)| d.states[s].accepting),
        });
        queue.push_back(start_key);

        while let Some(key) = queue.pop_front() {
            let id = index[&key];
            let mut next = Vec::with_capacity(letters.len());
            for li in 0..letters.len() {
                let target: Vec<usize> = dfas
                    .iter()
                    .zip(&key)
                    .map(|(d, &s)| d.states[s].next[li])
                    .collect();
                let tid = *index.entry(target.clone()).or_insert_with(|| {
                    states.push(DfaState {
                        next: Vec::new(),
                        accepting: dfas
                            .iter()
                            .zip(&target)
                            .all(|(d, &s)| d.states[s].accepting),
                    });
                    queue.push_back(target);
                    states.len() - 1
                });
                next.push(tid);
            }
            states[id].next = next;
        }

        Dfa {
            partition: letters,
            states,
            start: 0,
        }
    }

    fn determinize_with(nfa: &Nfa, letters: Vec<CharRange>) -> Dfa {
        let mut states: Vec<DfaState> = Vec::new();
        let mut index: HashMap<Vec<StateId>, usize> = HashMap::new();
        let mut queue = VecDeque::new();

        let start_set = closure(nfa, [nfa.start].into_iter().collect());
        let start_key: Vec<StateId> = start_set.iter().copied().collect();
        index.insert(start_key.clone(), 0);
        states.push(DfaState {
            next: Vec::new(),
            accepting: start_set.contains(&nfa.accept),
        });
        queue.push_back(start_key);

        while let Some(key) = queue.pop_front() {
            let id = index[&key];
            let mut next = Vec::with_capacity(letters.len());
            for letter in &letters {
                // The partition refines every label, so one sample
                // codepoint decides the whole interval.
                let sample = letter.low;
                let mut moved = BTreeSet::new();
                for &s in &key {
                    for e in &nfa.nodes[s].edges {
                        if let Label::Ranges(rs) = &e.label {
                            if brex_unicode::ranges::contains(rs, sample) {
                                moved.insert(e.to);
                            }
                        }
                    }
                }
                let moved = closure(nfa, moved);
                let target: Vec<StateId> = moved.iter().copied().collect();
                let tid = *index.entry(target.clone()).or_insert_with(|| {
                    states.push(DfaState {
                        next: Vec::new(),
                        accepting: moved.contains(&nfa.accept),
                    });
                    queue.push_back(target);
                    states.len() - 1
                });
                next.push(tid);
            }
            states[id].next = next;
        }

        Dfa {
            partition: letters,
            states,
            start: 0,
        }
    }

    /// Flips acceptance on every state. Totality (the explicit dead state
    /// from the empty subset) is what makes this a true complement.
    pub fn complement(&mut self) {
        for s in &mut self.states {
            s.accepting = !s.accepting;
        }
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn is_accepting(&self, id: usize) -> bool {
        self.states[id].accepting
    }

    /// Per-state outgoing edges with letters grouped by target state, in
    /// deterministic target order.
    pub fn grouped_edges(&self) -> Vec<Vec<(usize, Vec<CharRange>)>> {
        self.states
            .iter()
            .map(|s| {
                let mut by_target: BTreeMap<usize, Vec<CharRange>> = BTreeMap::new();
                for (li, &t) in s.next.iter().enumerate() {
                    by_target.entry(t).or_default().push(self.partition[li]);
                }
                by_target.into_iter().collect()
            })
            .collect()
    }
}

fn closure(nfa: &Nfa, mut set: BTreeSet<StateId>) -> BTreeSet<StateId> {
    let mut stack: Vec<StateId> = set.iter().copied().collect();
    while let Some(s) = stack.pop() {
        for e in &nfa.nodes[s].edges {
            if matches!(e.label, Label::Eps) && set.insert(e.to) {
                stack.push(e.to);
            }
        }
    }
    set
}
