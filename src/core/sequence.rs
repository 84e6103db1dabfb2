//! Block-matching sequence similarity.
//!
//! Finds the longest contiguous block shared by two sequences, then
//! recurses on the unmatched prefixes and suffixes on either side of it.
//! The summed block length `M` yields the ratio `2 * M / (len_a + len_b)`.
//!
//! Notes:
//!   - Works over any `Eq + Hash` element: chars, tokens, lines.
//!   - Ties between equally long blocks go to the block starting
//!     earliest in `a`, then earliest in `b`.
//!   - Optional autojunk pruning drops very frequent elements of long
//!     `b` sequences from the position index. Off by default.

use std::{collections::HashMap, hash::Hash};

use serde::{Deserialize, Serialize};

/// `b` must be at least this long before autojunk kicks in.
const AUTOJUNK_MIN_LEN: usize = 200;

/// A matched block: `a[a..a + len] == b[b..b + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub a: usize,
    pub b: usize,
    pub len: usize,
}

/// Tuning knobs for the matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherOptions {
    /// Ignore elements occurring in more than 1% (+1) of a long `b`.
    pub autojunk: bool,
}

/// Compares two borrowed sequences.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    /// Element of `b` -> ascending positions where it occurs.
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T> SequenceMatcher<'a, T>
where
    T: Eq + Hash,
{
    /// Matcher with default options (no autojunk).
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        Self::with_options(a, b, MatcherOptions::default())
    }

    pub fn with_options(a: &'a [T], b: &'a [T], options: MatcherOptions) -> Self {
        // Index every position of each element in b.
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(j);
        }

        // Popular elements only slow the search down on long inputs.
        if options.autojunk && b.len() >= AUTOJUNK_MIN_LEN {
            let ntest = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// Longest block with `alo <= i < ahi` and `blo <= j < bhi`.
    /// Returns a zero-length block at `(alo, blo)` when nothing matches.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0usize);

        // j2len[j] = length of the match ending at a[i - 1] and b[j].
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_j2len: HashMap<usize, usize> = HashMap::new();

            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }

                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);

                    if k > best_len {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_len = k;
                    }
                }
            }

            j2len = next_j2len;
        }

        // Grow the block over equal neighbours that were pruned from the index.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_len += 1;
        }
        while best_i + best_len < ahi
            && best_j + best_len < bhi
            && self.a[best_i + best_len] == self.b[best_j + best_len]
        {
            best_len += 1;
        }

        Block { a: best_i, b: best_j, len: best_len }
    }

    /// All matching blocks in ascending order, adjacent blocks collapsed.
    /// The last entry is always the sentinel `(len_a, len_b, 0)`.
    pub fn matching_blocks(&self) -> Vec<Block> {
        let (la, lb) = (self.a.len(), self.b.len());

        // Explicit stack instead of recursion keeps deep inputs safe.
        let mut pending = vec![(0, la, 0, lb)];
        let mut found: Vec<Block> = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.len == 0 {
                continue;
            }

            found.push(m);

            if alo < m.a && blo < m.b {
                pending.push((alo, m.a, blo, m.b));
            }
            if m.a + m.len < ahi && m.b + m.len < bhi {
                pending.push((m.a + m.len, ahi, m.b + m.len, bhi));
            }
        }

        found.sort_unstable_by_key(|blk| (blk.a, blk.b));

        let mut blocks: Vec<Block> = Vec::with_capacity(found.len() + 1);
        for blk in found {
            if let Some(last) = blocks.last_mut()
                && last.a + last.len == blk.a
                && last.b + last.len == blk.b
            {
                last.len += blk.len;
                continue;
            }
            blocks.push(blk);
        }

        blocks.push(Block { a: la, b: lb, len: 0 });
        blocks
    }

    /// Similarity in `[0, 1]`. Two empty sequences are identical (1.0).
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }

        let matched: usize = self
            .matching_blocks()
            .iter()
            .map(|blk| blk.len)
            .sum();

        2.0 * matched as f64 / total as f64
    }
}

/// Shorthand for `SequenceMatcher::with_options(a, b, options).ratio()`.
pub fn ratio<T: Eq + Hash>(a: &[T], b: &[T], options: MatcherOptions) -> f64 {
    SequenceMatcher::with_options(a, b, options).ratio()
}
