//! Negative sampling over the vocabulary.
//!
//! Negatives are drawn uniformly, excluding the positive child itself and
//! everything in its adjacency set. Rejection sampling with a bounded
//! retry budget; when a node is related to most of the vocabulary the
//! sampler falls back to admitting related indices rather than looping
//! unboundedly. That trades a little training-signal purity for a
//! termination guarantee. Draws are fresh on every visit, never cached, so
//! successive epochs see different negatives for the same positive.

use crate::corpus::RelationCorpus;
use rand::Rng;

/// Retries granted per requested sample before the relaxed fallback kicks in.
const RETRIES_PER_SAMPLE: usize = 20;

/// Uniform negative sampler with related-node exclusion.
#[derive(Debug, Clone, Copy)]
pub struct NegativeSampler<'a> {
    corpus: &'a RelationCorpus,
}

impl<'a> NegativeSampler<'a> {
    /// Create a sampler over a loaded corpus.
    pub fn new(corpus: &'a RelationCorpus) -> Self {
        Self { corpus }
    }

    /// Draw up to `k` distinct indices uniformly from the vocabulary,
    /// excluding `child` and its adjacency set.
    ///
    /// Returns fewer than `k` only when the vocabulary itself is too small
    /// to supply `k` distinct non-child indices.
    pub fn sample<R: Rng>(&self, rng: &mut R, child: usize, k: usize) -> Vec<usize> {
        let n = self.corpus.vocab().len();
        let mut drawn = Vec::with_capacity(k);
        if n <= 1 || k == 0 {
            return drawn;
        }

        let related = self.corpus.related(child);
        let budget = RETRIES_PER_SAMPLE * k;
        let mut tries = 0;
        while drawn.len() < k && tries < budget {
            tries += 1;
            let cand = rng.random_range(0..n);
            if cand == child || related.contains(&cand) || drawn.contains(&cand) {
                continue;
            }
            drawn.push(cand);
        }

        // Relaxed fallback: the exclusion set covers too much of the
        // vocabulary for rejection to finish inside the budget. Admit
        // related indices; the child exclusion and distinctness still hold.
        if drawn.len() < k {
            let offset = rng.random_range(0..n);
            for step in 0..n {
                if drawn.len() == k {
                    break;
                }
                let cand = (offset + step) % n;
                if cand == child || drawn.contains(&cand) {
                    continue;
                }
                drawn.push(cand);
            }
        }

        drawn
    }
}
