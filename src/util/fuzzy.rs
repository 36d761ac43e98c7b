//! Approximate string matching built on longest matching blocks.
//!
//! Scores are integers in `0..=100`. The central scorer is [`partial_ratio`],
//! which slides the shorter string over the longer one, anchoring a window at
//! every matching block and keeping the best window similarity. Nothing here
//! computes an edit distance: similarity is `2·M / T`, where `M` is the number
//! of characters covered by matching blocks and `T` the combined length.
//!
//! Both inputs are case-folded and otherwise compared as-is.

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Window similarity above which [`partial_ratio`] reports a perfect match.
const PERFECT_WINDOW_RATIO: f64 = 0.995;

/// A run of characters shared by two sequences: `a[a..a + size] == b[b..b + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchingBlock {
    /// Start of the run in the first sequence.
    pub a: usize,
    /// Start of the run in the second sequence.
    pub b: usize,
    /// Length of the run.
    pub size: usize,
}

/// Finds the matching blocks between two character sequences.
///
/// Blocks are found by taking the longest common run of the whole range and
/// recursing on the ranges to its left and right. Among equally long runs the
/// one starting earliest in `a` (then in `b`) is taken.
#[derive(Debug)]
pub struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each character in `b`, ascending.
    b2j: ahash::AHashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    /// Create a matcher comparing `a` against `b`.
    pub fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: ahash::AHashMap<char, Vec<usize>> = ahash::AHashMap::new();
        for (j, &ch) in b.iter().enumerate() {
            b2j.entry(ch).or_default().push(j);
        }

        SequenceMatcher { a, b, b2j }
    }

    /// Longest common run of `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Returns a block of size 0 anchored at `(alo, blo)` when the ranges share
    /// no character.
    pub fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> MatchingBlock {
        let mut best = MatchingBlock {
            a: alo,
            b: blo,
            size: 0,
        };

        // run_len[j + 1] is the length of the common run ending at a[i - 1], b[j]
        let mut run_len = vec![0usize; self.b.len() + 1];

        for i in alo..ahi {
            let mut next_run_len = vec![0usize; self.b.len() + 1];

            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }

                    let k = run_len[j] + 1;
                    next_run_len[j + 1] = k;

                    if k > best.size {
                        best = MatchingBlock {
                            a: i + 1 - k,
                            b: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }

            run_len = next_run_len;
        }

        best
    }

    /// All matching blocks, sorted and with adjacent blocks merged.
    ///
    /// The last element is always the sentinel `(a.len(), b.len(), 0)`.
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);
            if block.size == 0 {
                continue;
            }

            blocks.push(block);

            if alo < block.a && blo < block.b {
                pending.push((alo, block.a, blo, block.b));
            }
            if block.a + block.size < ahi && block.b + block.size < bhi {
                pending.push((block.a + block.size, ahi, block.b + block.size, bhi));
            }
        }

        blocks.sort();

        let mut merged: Vec<MatchingBlock> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match merged.last_mut() {
                Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }

        merged.push(MatchingBlock {
            a: self.a.len(),
            b: self.b.len(),
            size: 0,
        });

        merged
    }

    /// Similarity in `0.0..=1.0`: twice the matched characters over the total length.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }

        let matched: usize = self.matching_blocks().iter().map(|block| block.size).sum();
        2.0 * matched as f64 / total as f64
    }
}

fn fold(text: &str) -> Vec<char> {
    text.to_lowercase().chars().collect()
}

fn to_score(ratio: f64) -> u8 {
    (100.0 * ratio).round_ties_even().clamp(0.0, 100.0) as u8
}

/// Whole-string similarity score in `0..=100`.
///
/// Empty inputs score 0.
pub fn ratio(s1: &str, s2: &str) -> u8 {
    let s1 = fold(s1);
    let s2 = fold(s2);

    if s1.is_empty() || s2.is_empty() {
        return 0;
    }
    if s1 == s2 {
        return 100;
    }

    to_score(SequenceMatcher::new(&s1, &s2).ratio())
}

/// Best similarity between the shorter string and any equally long window of
/// the longer one, as a score in `0..=100`.
///
/// Windows are anchored where a matching block would line the two strings up.
/// An empty query or candidate scores 0; equal strings score 100.
pub fn partial_ratio(query: &str, candidate: &str) -> u8 {
    let query = fold(query);
    let candidate = fold(candidate);

    if query.is_empty() || candidate.is_empty() {
        return 0;
    }
    if query == candidate {
        return 100;
    }

    let (shorter, longer) = if query.len() <= candidate.len() {
        (&query, &candidate)
    } else {
        (&candidate, &query)
    };

    let mut best = 0.0f64;
    for block in SequenceMatcher::new(shorter, longer).matching_blocks() {
        let start = block.b.saturating_sub(block.a);
        let end = (start + shorter.len()).min(longer.len());

        let window_ratio = SequenceMatcher::new(shorter, &longer[start..end]).ratio();
        if window_ratio > PERFECT_WINDOW_RATIO {
            return 100;
        }
        best = best.max(window_ratio);
    }

    to_score(best)
}

/// A similarity function used by the intent classifier.
pub trait Scorer: Send + Sync + Debug {
    /// Short name used in diagnostics and configuration.
    fn name(&self) -> &'static str;

    /// Score `candidate` against `query` in `0..=100`.
    fn score(&self, query: &str, candidate: &str) -> u8;
}

/// [`Scorer`] backed by [`partial_ratio`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialRatioScorer;

impl Scorer for PartialRatioScorer {
    fn name(&self) -> &'static str {
        "partial"
    }

    fn score(&self, query: &str, candidate: &str) -> u8 {
        partial_ratio(query, candidate)
    }
}

/// [`Scorer`] backed by [`ratio`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RatioScorer;

impl Scorer for RatioScorer {
    fn name(&self) -> &'static str {
        "ratio"
    }

    fn score(&self, query: &str, candidate: &str) -> u8 {
        ratio(query, candidate)
    }
}

/// Selects a [`Scorer`] implementation from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    /// Sliding-window partial matching.
    #[default]
    Partial,
    /// Whole-string matching.
    Ratio,
}

impl ScorerKind {
    /// Build the scorer this kind names.
    pub fn build(self) -> Arc<dyn Scorer> {
        match self {
            ScorerKind::Partial => Arc::new(PartialRatioScorer),
            ScorerKind::Ratio => Arc::new(RatioScorer),
        }
    }
}
