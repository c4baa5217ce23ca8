use std::fmt;

use bon::Builder;
use brex_unicode::{utf8, CodePoint};

use crate::ast::{Alphabet, RegexKind};

use super::nfa::Nfa;

/// A runtime problem; returned instead of a verdict, never thrown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutorError {
    /// Invalid UTF-8 (Unicode flavor) or a byte `>= 0x80` (ASCII flavor).
    BadEncoding,
    /// The regex's shape needs context this entry point cannot provide,
    /// e.g. a plain outside-the-region anchor under `test`.
    UnsupportedForm,
    /// Range indices out of bounds or inverted.
    InvalidRange,
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorError::BadEncoding => write!(f, "haystack is not valid for this alphabet"),
            ExecutorError::UnsupportedForm => {
                write!(f, "regex form requires a range-test context")
            }
            ExecutorError::InvalidRange => write!(f, "range indices are out of bounds"),
        }
    }
}

impl std::error::Error for ExecutorError {}

/// The sub-range to test, in alphabet units (bytes for ASCII, codepoints
/// for Unicode). Both indices are inclusive; the extension flags let the
/// match region grow beyond the range on either side.
///
/// ```
/// use brex::regex::RangeInput;
///
/// let input = RangeInput::builder(5, 5).extend_end(true).build();
/// assert!(input.extend_end && !input.extend_start);
/// ```
#[derive(Builder, Clone, Copy, Debug)]
pub struct RangeInput {
    #[builder(start_fn)]
    pub start: usize,
    #[builder(start_fn)]
    pub end: usize,
    #[builder(default = false)]
    pub extend_start: bool,
    #[builder(default = false)]
    pub extend_end: bool,
}

#[derive(Debug)]
pub(crate) enum EntryMode {
    Whole,
    Front,
    Back,
}

#[derive(Debug)]
pub(crate) struct CompiledEntry {
    pub negated: bool,
    pub mode: EntryMode,
    pub nfa: Nfa,
}

#[derive(Debug)]
pub(crate) struct CompiledAnchor {
    pub negated: bool,
    /// Check anchors (`<...>`) assert inside the match region; plain
    /// anchors assert on the text outside it.
    pub check: bool,
    pub nfa: Nfa,
}

/// A compiled regex. Immutable after construction; `test` calls take no
/// locks and keep all match state on the stack, so an executor may be
/// shared freely across threads.
#[derive(Debug)]
pub struct Executor {
    pub(crate) kind: RegexKind,
    pub(crate) alphabet: Alphabet,
    pub(crate) pre: Option<CompiledAnchor>,
    pub(crate) post: Option<CompiledAnchor>,
    pub(crate) entries: Vec<CompiledEntry>,
}

impl Executor {
    pub fn kind(&self) -> RegexKind {
        self.kind
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Whether the whole haystack is in the language.
    pub fn test(&self, haystack: &[u8]) -> Result<bool, ExecutorError> {
        if self.pre.as_ref().is_some_and(|a| !a.check)
            || self.post.as_ref().is_some_and(|a| !a.check)
        {
            return Err(ExecutorError::UnsupportedForm);
        }
        let chars = self.decode(haystack)?;
        Ok(self.body_holds(&chars) && self.checks_hold(&chars))
    }

    /// Whether a substring bounded by `input` is in the language. The match
    /// region is `[start, end]`, widened to earlier starts / later ends when
    /// the corresponding extension flag is set; plain anchors constrain the
    /// text outside the chosen region.
    pub fn test_range(&self, haystack: &[u8], input: RangeInput) -> Result<bool, ExecutorError> {
        let chars = self.decode(haystack)?;
        if input.start > input.end || input.end >= chars.len() {
            return Err(ExecutorError::InvalidRange);
        }

        let starts = if input.extend_start {
            0..=input.start
        } else {
            input.start..=input.start
        };
        for s in starts {
            if let Some(pre) = &self.pre {
                if !pre.check && (pre.nfa.matches(&chars[..s]) == pre.negated) {
                    continue;
                }
            }
            let ends = if input.extend_end {
                input.end + 1..=chars.len()
            } else {
                input.end + 1..=input.end + 1
            };
            for e in ends {
                let region = &chars[s..e];
                if !self.body_holds(region) || !self.checks_hold(region) {
                    continue;
                }
                if let Some(post) = &self.post {
                    if !post.check && (post.nfa.matches(&chars[e..]) == post.negated) {
                        continue;
                    }
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether any substring of the haystack is in the language.
    pub fn search(&self, haystack: &[u8]) -> Result<bool, ExecutorError> {
        let chars = self.decode(haystack)?;

        // The common shape runs in one sweep.
        if self.pre.is_none() && self.post.is_none() && self.entries.len() == 1 {
            let e = &self.entries[0];
            if !e.negated && matches!(e.mode, EntryMode::Whole) {
                return Ok(e.nfa.matches_within(&chars));
            }
        }

        for s in 0..=chars.len() {
            if let Some(pre) = &self.pre {
                if !pre.check && (pre.nfa.matches(&chars[..s]) == pre.negated) {
                    continue;
                }
            }
            for e in s..=chars.len() {
                let region = &chars[s..e];
                if !self.body_holds(region) || !self.checks_hold(region) {
                    continue;
                }
                if let Some(post) = &self.post {
                    if !post.check && (post.nfa.matches(&chars[e..]) == post.negated) {
                        continue;
                    }
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn decode(&self, haystack: &[u8]) -> Result<Vec<CodePoint>, ExecutorError> {
        match self.alphabet {
            Alphabet::Unicode => {
                utf8::decode_utf8(haystack).map_err(|_| ExecutorError::BadEncoding)
            }
            Alphabet::Ascii => utf8::decode_ascii(haystack).map_err(|_| ExecutorError::BadEncoding),
        }
    }

    /// Every conjunct holds on the region.
    fn body_holds(&self, region: &[CodePoint]) -> bool {
        self.entries.iter().all(|e| {
            let hit = match e.mode {
                EntryMode::Whole => e.nfa.matches(region),
                EntryMode::Front => e.nfa.matches_prefix(region),
                EntryMode::Back => e.nfa.matches_suffix(region),
            };
            hit != e.negated
        })
    }

    /// Check anchors assert on a prefix/suffix of the region itself.
    fn checks_hold(&self, region: &[CodePoint]) -> bool {
        if let Some(pre) = &self.pre {
            if pre.check && (pre.nfa.matches_prefix(region) == pre.negated) {
                return false;
            }
        }
        if let Some(post) = &self.post {
            if post.check && (post.nfa.matches_suffix(region) == post.negated) {
                return false;
            }
        }
        true
    }
}
