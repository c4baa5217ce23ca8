//! Closed codepoint ranges and the set algebra automaton construction needs.

use crate::CodePoint;

/// A closed interval of codepoints, `low <= high`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharRange {
    pub low: CodePoint,
    pub high: CodePoint,
}

impl CharRange {
    pub fn new(low: CodePoint, high: CodePoint) -> Self {
        debug_assert!(low <= high);
        CharRange { low, high }
    }

    pub fn single(cp: CodePoint) -> Self {
        CharRange { low: cp, high: cp }
    }

    #[inline]
    pub fn contains(&self, cp: CodePoint) -> bool {
        self.low <= cp && cp <= self.high
    }
}

/// Sorts and merges overlapping or adjacent ranges into a canonical disjoint
/// ascending list.
///
/// ```
/// use brex_unicode::ranges::{normalize, CharRange};
///
/// let rs = normalize(vec![
///     CharRange::new(5, 9),
///     CharRange::new(0, 4),
///     CharRange::new(20, 30),
/// ]);
/// assert_eq!(rs, vec![CharRange::new(0, 9), CharRange::new(20, 30)]);
/// ```
pub fn normalize(mut ranges: Vec<CharRange>) -> Vec<CharRange> {
    ranges.sort();
    let mut out: Vec<CharRange> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match out.last_mut() {
            // Adjacent intervals fuse too: [0,4] + [5,9] = [0,9].
            Some(last) if r.low <= last.high.saturating_add(1) => {
                last.high = last.high.max(r.high);
            }
            _ => out.push(r),
        }
    }
    out
}

/// Complement of a normalized range list within the alphabet `[0, max]`.
pub fn complement(ranges: &[CharRange], max: CodePoint) -> Vec<CharRange> {
    let mut out = Vec::with_capacity(ranges.len() + 1);
    let mut next = 0u32;
    for r in ranges {
        if r.low > next {
            out.push(CharRange::new(next, r.low - 1));
        }
        next = match r.high.checked_add(1) {
            Some(n) => n,
            None => return out,
        };
    }
    if next <= max {
        out.push(CharRange::new(next, max));
    }
    out
}

/// Whether `cp` lies in any range of a normalized ascending list.
pub fn contains(ranges: &[CharRange], cp: CodePoint) -> bool {
    // Normalized lists are small; a binary search on the low bound suffices.
    match ranges.binary_search_by(|r| r.low.cmp(&cp)) {
        Ok(_) => true,
        Err(0) => false,
        Err(i) => ranges[i - 1].contains(cp),
    }
}

/// Partitions the alphabet `[0, max]` into maximal intervals that never
/// straddle a boundary of any input range.
///
/// Every input range is then an exact union of partition letters, which is
/// what lets subset construction treat each interval as a single symbol.
///
/// ```
/// use brex_unicode::ranges::{partition, CharRange};
///
/// let p = partition(&[CharRange::new(3, 5)], 9);
/// assert_eq!(p, vec![
///     CharRange::new(0, 2),
///     CharRange::new(3, 5),
///     CharRange::new(6, 9),
/// ]);
/// ```
pub fn partition(ranges: &[CharRange], max: CodePoint) -> Vec<CharRange> {
    let mut cuts = Vec::with_capacity(ranges.len() * 2 + 2);
    cuts.push(0u32);
    for r in ranges {
        if r.low <= max {
            cuts.push(r.low);
        }
        if r.high < max {
            cuts.push(r.high + 1);
        }
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut out = Vec::with_capacity(cuts.len());
    for (i, &lo) in cuts.iter().enumerate() {
        let hi = cuts.get(i + 1).map(|&n| n - 1).unwrap_or(max);
        out.push(CharRange::new(lo, hi));
    }
    out
}
