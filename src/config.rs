//! Model configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default distance kept between every vector and the unit sphere.
pub const DEFAULT_BOUNDARY_EPS: f64 = 1e-5;

/// Configuration for a Poincare embedding model.
///
/// Defaults follow Nickel & Kiela (2017): burn-in at a tenth of the main
/// learning rate, ten negatives per positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoincareConfig {
    /// Embedding dimension (default: 50).
    pub dim: usize,
    /// Negative samples per positive relation (default: 10).
    pub negative_samples: usize,
    /// Main learning rate (default: 0.1).
    pub lr: f64,
    /// Reduced learning rate used during burn-in (default: 0.01).
    pub burn_in_lr: f64,
    /// Number of initial epochs trained at `burn_in_lr`, counted over the
    /// model's lifetime so the schedule survives resumed training
    /// (default: 10).
    pub burn_in_epochs: usize,
    /// Distance kept between vectors and the unit sphere (default: 1e-5).
    pub boundary_eps: f64,
    /// Relations per synchronization interval (default: 10).
    pub batch_size: usize,
    /// Worker thread count; 0 uses the rayon default (default: 0).
    pub workers: usize,
    /// Random seed (default: 42).
    pub seed: u64,
}

impl Default for PoincareConfig {
    fn default() -> Self {
        Self {
            dim: 50,
            negative_samples: 10,
            lr: 0.1,
            burn_in_lr: 0.01,
            burn_in_epochs: 10,
            boundary_eps: DEFAULT_BOUNDARY_EPS,
            batch_size: 10,
            workers: 0,
            seed: 42,
        }
    }
}

impl PoincareConfig {
    /// Set embedding dimension.
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    /// Set negative samples per positive.
    pub fn with_negative_samples(mut self, k: usize) -> Self {
        self.negative_samples = k;
        self
    }

    /// Set the main learning rate.
    pub fn with_lr(mut self, lr: f64) -> Self {
        self.lr = lr;
        self
    }

    /// Set the burn-in learning rate.
    pub fn with_burn_in_lr(mut self, lr: f64) -> Self {
        self.burn_in_lr = lr;
        self
    }

    /// Set the number of burn-in epochs.
    pub fn with_burn_in_epochs(mut self, epochs: usize) -> Self {
        self.burn_in_epochs = epochs;
        self
    }

    /// Set the boundary epsilon.
    pub fn with_boundary_eps(mut self, eps: f64) -> Self {
        self.boundary_eps = eps;
        self
    }

    /// Set the per-worker batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the worker thread count (0 = rayon default).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject invalid hyperparameters before any work begins.
    pub fn validate(&self) -> Result<()> {
        if self.dim == 0 {
            return Err(Error::InvalidConfig("dimension must be positive".into()));
        }
        if self.negative_samples == 0 {
            return Err(Error::InvalidConfig(
                "negative-sample count must be positive".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch size must be positive".into()));
        }
        if !(self.lr > 0.0 && self.lr.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be positive and finite, got {}",
                self.lr
            )));
        }
        if !(self.burn_in_lr > 0.0 && self.burn_in_lr.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "burn-in learning rate must be positive and finite, got {}",
                self.burn_in_lr
            )));
        }
        if !(self.boundary_eps > 0.0 && self.boundary_eps < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "boundary epsilon must lie in (0, 1), got {}",
                self.boundary_eps
            )));
        }
        Ok(())
    }
}
