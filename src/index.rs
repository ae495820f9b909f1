//! Read-only query layer over a trained embedding table.
//!
//! A [`VectorIndex`] borrows the vocabulary and table immutably, so it can
//! only observe fully-settled tables: the trainer holds the table `&mut`
//! for the duration of a train call, and queries are pure reads that may
//! run freely in parallel with each other.
//!
//! # Ordering
//!
//! Every ranked operation sorts ascending by distance with ties broken by
//! vocabulary index. The tie-break is deterministic and stable across
//! repeated calls on the same table.
//!
//! # Hierarchy conventions
//!
//! Smaller norm means higher in the hierarchy (closer to the root).
//! `closest_child`/`closest_parent` search among nodes with strictly
//! greater/smaller norm only; the chains built on them are therefore
//! directional, and reaching Y via `descendants(X)` does not imply X is
//! reachable via `ancestors(Y)` even though the metric is symmetric.

use crate::ball;
use crate::corpus::Vocabulary;
use crate::embedding::EmbeddingTable;
use crate::error::{Error, Result};
use ndarray::ArrayView1;

/// Read-only queries: distance, nearest neighbors, rank, hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct VectorIndex<'a> {
    vocab: &'a Vocabulary,
    table: &'a EmbeddingTable,
}

impl<'a> VectorIndex<'a> {
    /// Create an index over a vocabulary and its table.
    pub fn new(vocab: &'a Vocabulary, table: &'a EmbeddingTable) -> Self {
        debug_assert_eq!(vocab.len(), table.len());
        Self { vocab, table }
    }

    fn resolve(&self, node: &str) -> Result<usize> {
        self.vocab
            .get(node)
            .ok_or_else(|| Error::UnknownNode(node.to_string()))
    }

    /// Hyperbolic distance between two nodes.
    pub fn distance(&self, u: &str, v: &str) -> Result<f64> {
        let i = self.resolve(u)?;
        let j = self.resolve(v)?;
        ball::try_distance(self.table.row(i), self.table.row(j))
    }

    /// The `top_n` nearest nodes to `node`, ascending by distance,
    /// excluding `node` itself.
    pub fn most_similar(&self, node: &str, top_n: usize) -> Result<Vec<(String, f64)>> {
        let i = self.resolve(node)?;
        let mut scored = Vec::with_capacity(self.vocab.len().saturating_sub(1));
        for j in 0..self.vocab.len() {
            if j == i {
                continue;
            }
            scored.push((j, ball::try_distance(self.table.row(i), self.table.row(j))?));
        }
        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(top_n);
        Ok(scored
            .into_iter()
            .map(|(j, d)| (self.vocab.label(j).to_string(), d))
            .collect())
    }

    /// 1-based position of `v` in `u`'s ascending-distance ranking over
    /// all nodes (closest = 1).
    ///
    /// Defined as one plus the number of nodes strictly closer to `u`
    /// than `v` is, which keeps `rank(u, v) - 1 == nodes_closer_than(u,
    /// v).len()` exact even under distance ties.
    pub fn rank(&self, u: &str, v: &str) -> Result<usize> {
        let i = self.resolve(u)?;
        let j = self.resolve(v)?;
        let reference = ball::try_distance(self.table.row(i), self.table.row(j))?;
        let mut closer = 0;
        for w in 0..self.vocab.len() {
            if w == i {
                continue;
            }
            if ball::try_distance(self.table.row(i), self.table.row(w))? < reference {
                closer += 1;
            }
        }
        Ok(closer + 1)
    }

    /// Nodes strictly closer to `u` than `v` is, ascending by distance,
    /// excluding `u`.
    pub fn nodes_closer_than(&self, u: &str, v: &str) -> Result<Vec<String>> {
        let i = self.resolve(u)?;
        let j = self.resolve(v)?;
        let reference = ball::try_distance(self.table.row(i), self.table.row(j))?;
        let mut closer = Vec::new();
        for w in 0..self.vocab.len() {
            if w == i {
                continue;
            }
            let d = ball::try_distance(self.table.row(i), self.table.row(w))?;
            if d < reference {
                closer.push((w, d));
            }
        }
        closer.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        Ok(closer
            .into_iter()
            .map(|(w, _)| self.vocab.label(w).to_string())
            .collect())
    }

    /// Euclidean norm of a node's vector. Smaller norm = higher in the
    /// hierarchy.
    pub fn norm(&self, node: &str) -> Result<f64> {
        Ok(self.table.norm(self.resolve(node)?))
    }

    /// `norm(v) - norm(u)`; positive means `u` sits higher in the
    /// hierarchy than `v`.
    pub fn difference_in_hierarchy(&self, u: &str, v: &str) -> Result<f64> {
        Ok(self.norm(v)? - self.norm(u)?)
    }

    /// Among nodes with strictly greater norm than `node`, the one at
    /// minimum distance. Fails with [`Error::HierarchyExtremum`] if no
    /// node has a greater norm.
    pub fn closest_child(&self, node: &str) -> Result<String> {
        self.closest_by_norm(node, NormSide::Greater)
            .map(|idx| self.vocab.label(idx).to_string())
    }

    /// Among nodes with strictly smaller norm than `node`, the one at
    /// minimum distance. Fails with [`Error::HierarchyExtremum`] if
    /// `node` already has the minimum norm.
    pub fn closest_parent(&self, node: &str) -> Result<String> {
        self.closest_by_norm(node, NormSide::Smaller)
            .map(|idx| self.vocab.label(idx).to_string())
    }

    /// Greedy chain of `closest_child` steps, at most `max_depth` long.
    ///
    /// The chain ends silently when a step reaches the norm extremum;
    /// each step strictly increases norm, so termination needs no cycle
    /// check. The returned chain excludes `node` itself.
    pub fn descendants(&self, node: &str, max_depth: usize) -> Result<Vec<String>> {
        self.chain(node, max_depth, NormSide::Greater)
    }

    /// Greedy chain of `closest_parent` steps, at most `max_depth` long.
    ///
    /// Each step strictly decreases norm. The returned chain excludes
    /// `node` itself.
    pub fn ancestors(&self, node: &str, max_depth: usize) -> Result<Vec<String>> {
        self.chain(node, max_depth, NormSide::Smaller)
    }

    fn chain(&self, node: &str, max_depth: usize, side: NormSide) -> Result<Vec<String>> {
        let mut current = self.resolve(node)?;
        let mut chain = Vec::new();
        for _ in 0..max_depth {
            match self.closest_by_norm(self.vocab.label(current), side) {
                Ok(next) => {
                    chain.push(self.vocab.label(next).to_string());
                    current = next;
                }
                Err(Error::HierarchyExtremum(_)) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(chain)
    }

    fn closest_by_norm(&self, node: &str, side: NormSide) -> Result<usize> {
        let i = self.resolve(node)?;
        let base = self.table.norm(i);
        let mut best: Option<(f64, usize)> = None;
        for j in 0..self.vocab.len() {
            if j == i {
                continue;
            }
            let eligible = match side {
                NormSide::Greater => self.table.norm(j) > base,
                NormSide::Smaller => self.table.norm(j) < base,
            };
            if !eligible {
                continue;
            }
            let d = ball::try_distance(self.table.row(i), self.table.row(j))?;
            if best.map_or(true, |(bd, bj)| (d, j) < (bd, bj)) {
                best = Some((d, j));
            }
        }
        best.map(|(_, j)| j).ok_or(Error::HierarchyExtremum(match side {
            NormSide::Greater => "child",
            NormSide::Smaller => "parent",
        }))
    }
}

#[derive(Debug, Clone, Copy)]
enum NormSide {
    Greater,
    Smaller,
}

/// Hyperbolic distance between two raw vectors.
///
/// Same formula as [`VectorIndex::distance`], applied directly to slices.
pub fn vector_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    ball::try_distance(ArrayView1::from(a), ArrayView1::from(b))
}

/// Distances from `a` to each vector in `others`, preserving input order.
pub fn vector_distance_batch(a: &[f64], others: &[Vec<f64>]) -> Result<Vec<f64>> {
    others.iter().map(|b| vector_distance(a, b)).collect()
}
