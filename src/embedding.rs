//! Embedding table: an index-addressed arena of ball points.
//!
//! One row per vocabulary index, allocated once the vocabulary is frozen.
//! Rows are initialized uniformly in a small interval around the origin;
//! the loss and its Riemannian correction are numerically unstable at norm
//! 0 and singular at norm 1, so starting near (but not at) the origin
//! avoids both extremes while leaving the optimizer room to spread nodes
//! by depth.
//!
//! The table enforces the open-ball invariant continuously: every update
//! path runs through [`EmbeddingTable::apply_step`], which rescales any row
//! that would reach norm `1 - eps` back onto that shell, preserving
//! direction.

use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Half-width of the uniform initialization interval.
const INIT_RANGE: f64 = 1e-3;

/// Mutable arena of per-node vectors constrained to the open unit ball.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingTable {
    vectors: Array2<f64>,
    boundary_eps: f64,
}

impl EmbeddingTable {
    /// Allocate and initialize a table of `len` vectors of dimension `dim`.
    ///
    /// Coordinates are drawn uniformly from `[-1e-3, 1e-3)` with a seeded
    /// RNG, so initial norms are near zero and construction is
    /// reproducible.
    pub fn new(len: usize, dim: usize, boundary_eps: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let vectors =
            Array2::from_shape_fn((len, dim), |_| (rng.random::<f64>() * 2.0 - 1.0) * INIT_RANGE);
        Self {
            vectors,
            boundary_eps,
        }
    }

    /// Wrap existing vectors, projecting each row inside the ball.
    pub fn from_vectors(vectors: Array2<f64>, boundary_eps: f64) -> Self {
        let mut table = Self {
            vectors,
            boundary_eps,
        };
        for idx in 0..table.len() {
            table.project_row(idx);
        }
        table
    }

    /// Number of vectors.
    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    /// Whether the table holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.nrows() == 0
    }

    /// Vector dimension.
    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    /// Boundary epsilon the table was built with.
    pub fn boundary_eps(&self) -> f64 {
        self.boundary_eps
    }

    /// Read-only view of one vector.
    pub fn row(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.vectors.row(idx)
    }

    /// Euclidean norm of one vector.
    pub fn norm(&self, idx: usize) -> f64 {
        let row = self.vectors.row(idx);
        row.dot(&row).sqrt()
    }

    /// All vectors, row per vocabulary index.
    pub fn vectors(&self) -> &Array2<f64> {
        &self.vectors
    }

    /// Apply one gradient step `x <- project(x - lr * step)`.
    ///
    /// Steps with non-finite components are dropped: near-boundary
    /// arithmetic can overflow, and the contract is that such trouble is
    /// absorbed here, never propagated.
    pub(crate) fn apply_step(&mut self, idx: usize, step: &Array1<f64>, lr: f64) {
        if !step.iter().all(|g| g.is_finite()) {
            return;
        }
        self.vectors.row_mut(idx).scaled_add(-lr, step);
        self.project_row(idx);
    }

    /// Rescale a row toward the origin if it reached the boundary shell.
    fn project_row(&mut self, idx: usize) {
        let mut row = self.vectors.row_mut(idx);
        let norm = row.dot(&row).sqrt();
        let limit = 1.0 - self.boundary_eps;
        if norm >= limit {
            row *= limit / norm;
        }
    }
}
