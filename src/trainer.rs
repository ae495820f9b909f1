//! Riemannian SGD training for Poincare embeddings.
//!
//! Each positive relation (child, parent) is pitted against `k` sampled
//! negatives under a softmax contrastive loss:
//!
//! ```text
//! L = d(u, v) + ln sum_j exp(-d(u, v_j)),   j over {parent} + negatives
//! ```
//!
//! Euclidean gradients flow through the arccosh distance (see the `ball` module),
//! are rescaled by the ball's conformal factor into Riemannian gradients,
//! and applied as `x <- project(x - lr * grad)`.
//!
//! # Burn-in
//!
//! The first `burn_in_epochs` epochs of the model's *lifetime* run at the
//! reduced `burn_in_lr`; after that the rate switches permanently to `lr`,
//! including across resumed `train` calls. Early epochs at the full rate
//! tend to fling vectors toward the boundary before the hierarchy has
//! settled.
//!
//! # Parallelism and reproducibility
//!
//! Relations are processed in batches. Within a batch, rayon workers
//! compute per-relation gradient contributions against an immutable view
//! of the table; the contributions are then applied serially, in shuffle
//! order, at the batch boundary. Negative draws are seeded per relation
//! visit and batch boundaries do not depend on the pool size, so a run is
//! deterministic for a given seed regardless of worker count. Updates
//! inside one batch read the table as it stood at the batch start; that
//! staleness window is `batch_size` examples.
//!
//! # Resuming
//!
//! [`TrainingState`] (epoch counter, processed-example counter, running
//! loss) is carried inside the model and persisted with it, so a second
//! `train` call continues where the first stopped instead of resetting.

use crate::ball;
use crate::config::PoincareConfig;
use crate::corpus::{Relation, RelationCorpus};
use crate::embedding::EmbeddingTable;
use crate::error::{Error, Result};
use crate::index::VectorIndex;
use crate::sampler::NegativeSampler;
use ndarray::Array1;
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Training progress, persisted and restored as a unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    /// Epochs completed over the model lifetime.
    pub epochs_done: usize,
    /// Positive relations processed over the model lifetime.
    pub examples_seen: u64,
    /// Mean loss of the most recently completed non-empty epoch.
    pub running_loss: f64,
}

/// Numbers handed to the progress collaborator at each report interval.
#[derive(Debug, Clone)]
pub struct ProgressReport {
    /// Epoch currently being trained (lifetime index).
    pub epoch: usize,
    /// Positive relations processed so far (lifetime count).
    pub examples_seen: u64,
    /// Mean loss over the examples since the previous report.
    pub running_loss: f64,
    /// Examples per second since the previous report.
    pub examples_per_sec: f64,
}

/// Callback for training progress. The trainer only produces the numbers;
/// formatting and sinks are the collaborator's business.
pub type ProgressCallback = Box<dyn Fn(&ProgressReport) + Send + Sync>;

/// Default report interval for [`PoincareModel::train`], in examples.
pub const DEFAULT_REPORT_EVERY: u64 = 1000;

/// A Poincare embedding model: corpus, table, and training state.
///
/// # Example
///
/// ```rust,ignore
/// use poincare_embed::{PoincareConfig, PoincareModel, RelationCorpus};
///
/// let corpus = RelationCorpus::from_pairs([
///     ("dog", "mammal"),
///     ("cat", "mammal"),
///     ("mammal", "animal"),
/// ]);
/// let config = PoincareConfig::default().with_dim(10).with_burn_in_epochs(5);
/// let mut model = PoincareModel::new(corpus, config)?;
/// model.train(50)?;
///
/// let index = model.index();
/// assert!(index.norm("animal")? < index.norm("dog")?);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoincareModel {
    config: PoincareConfig,
    corpus: RelationCorpus,
    table: EmbeddingTable,
    state: TrainingState,
}

impl PoincareModel {
    /// Create a model over a loaded corpus, allocating the embedding table.
    ///
    /// The configuration is validated here, before any work begins.
    pub fn new(corpus: RelationCorpus, config: PoincareConfig) -> Result<Self> {
        config.validate()?;
        let table = EmbeddingTable::new(
            corpus.vocab().len(),
            config.dim,
            config.boundary_eps,
            config.seed,
        );
        Ok(Self {
            config,
            corpus,
            table,
            state: TrainingState::default(),
        })
    }

    /// Train for `epochs` epochs, reporting progress via `tracing`.
    ///
    /// Returns the mean loss of the final epoch (0.0 for an empty corpus).
    pub fn train(&mut self, epochs: usize) -> Result<f64> {
        self.train_with_callback(
            epochs,
            DEFAULT_REPORT_EVERY,
            Box::new(|report: &ProgressReport| {
                tracing::info!(
                    epoch = report.epoch,
                    examples = report.examples_seen,
                    loss = report.running_loss,
                    examples_per_sec = report.examples_per_sec,
                    "training progress"
                );
            }),
        )
    }

    /// Train for `epochs` epochs, handing a [`ProgressReport`] to
    /// `callback` every `report_every` processed examples.
    ///
    /// Re-entrant: a later call resumes from the stored [`TrainingState`],
    /// so epoch counting and the burn-in schedule continue across calls.
    pub fn train_with_callback(
        &mut self,
        epochs: usize,
        report_every: u64,
        callback: ProgressCallback,
    ) -> Result<f64> {
        if epochs == 0 {
            return Err(Error::InvalidConfig("epoch count must be positive".into()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("worker pool: {e}")))?;
        let interval = report_every.max(1);
        let num_relations = self.corpus.len();
        // Fixed batch length keeps the synchronization points, and with
        // them the result, independent of the worker count.
        let batch_len = self.config.batch_size;

        let mut window_loss = 0.0;
        let mut window_count = 0u64;
        let mut window_started = Instant::now();
        let mut final_loss = 0.0;

        for _ in 0..epochs {
            let epoch = self.state.epochs_done;
            let lr = self.current_lr();
            let mut order: Vec<usize> = (0..num_relations).collect();
            let mut rng = StdRng::seed_from_u64(epoch_seed(self.config.seed, epoch));
            order.shuffle(&mut rng);

            let mut epoch_loss = 0.0;
            for chunk in order.chunks(batch_len.max(1)) {
                let table = &self.table;
                let corpus = &self.corpus;
                let config = &self.config;
                let steps: Vec<(f64, Vec<(usize, Array1<f64>)>)> = pool.install(|| {
                    chunk
                        .par_iter()
                        .map(|&pos| {
                            let relation = corpus.relations()[pos];
                            let mut rng =
                                StdRng::seed_from_u64(visit_seed(config.seed, epoch, pos));
                            relation_step(
                                table,
                                NegativeSampler::new(corpus),
                                relation,
                                config.negative_samples,
                                &mut rng,
                            )
                        })
                        .collect()
                });

                for (loss, updates) in steps {
                    for (idx, step) in &updates {
                        self.table.apply_step(*idx, step, lr);
                    }
                    epoch_loss += loss;
                    window_loss += loss;
                    window_count += 1;
                    self.state.examples_seen += 1;
                    if self.state.examples_seen % interval == 0 {
                        let elapsed = window_started.elapsed().as_secs_f64().max(1e-9);
                        callback(&ProgressReport {
                            epoch,
                            examples_seen: self.state.examples_seen,
                            running_loss: window_loss / window_count as f64,
                            examples_per_sec: window_count as f64 / elapsed,
                        });
                        window_loss = 0.0;
                        window_count = 0;
                        window_started = Instant::now();
                    }
                }
            }

            self.state.epochs_done += 1;
            if num_relations > 0 {
                self.state.running_loss = epoch_loss / num_relations as f64;
            }
            final_loss = self.state.running_loss;
            tracing::debug!(
                epoch,
                loss = self.state.running_loss,
                lr,
                "epoch complete"
            );
        }

        Ok(final_loss)
    }

    /// Learning rate the next trained epoch will use.
    pub fn current_lr(&self) -> f64 {
        if self.state.epochs_done < self.config.burn_in_epochs {
            self.config.burn_in_lr
        } else {
            self.config.lr
        }
    }

    /// Read-only query index over the current table.
    pub fn index(&self) -> VectorIndex<'_> {
        VectorIndex::new(self.corpus.vocab(), &self.table)
    }

    /// The corpus this model was built over.
    pub fn corpus(&self) -> &RelationCorpus {
        &self.corpus
    }

    /// The model configuration.
    pub fn config(&self) -> &PoincareConfig {
        &self.config
    }

    /// The embedding table.
    pub fn table(&self) -> &EmbeddingTable {
        &self.table
    }

    /// The training state.
    pub fn state(&self) -> &TrainingState {
        &self.state
    }
}

fn epoch_seed(seed: u64, epoch: usize) -> u64 {
    seed ^ (epoch as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn visit_seed(seed: u64, epoch: usize, pos: usize) -> u64 {
    seed ^ ((epoch as u64) << 32) ^ (pos as u64).wrapping_mul(0xD1B5_4A32_D192_ED03)
}

/// Loss and Riemannian gradient steps for one positive relation.
///
/// Pure with respect to the table; the returned steps are applied by the
/// caller at the synchronization point.
fn relation_step<R: Rng>(
    table: &EmbeddingTable,
    sampler: NegativeSampler<'_>,
    relation: Relation,
    k: usize,
    rng: &mut R,
) -> (f64, Vec<(usize, Array1<f64>)>) {
    let negatives = sampler.sample(rng, relation.child, k);
    let mut targets = Vec::with_capacity(1 + negatives.len());
    targets.push(relation.parent);
    targets.extend(negatives);

    let child = table.row(relation.child);
    let mut dists = Vec::with_capacity(targets.len());
    let mut grads_child = Vec::with_capacity(targets.len());
    let mut grads_target = Vec::with_capacity(targets.len());
    for &target in &targets {
        let (dist, grad_u, grad_v) = ball::distance_with_grads(child, table.row(target));
        dists.push(dist);
        grads_child.push(grad_u);
        grads_target.push(grad_v);
    }

    // Softmax over exp(-d), stabilized by the largest exponent.
    let max_exp = dists.iter().fold(f64::NEG_INFINITY, |m, &d| m.max(-d));
    let z: f64 = dists.iter().map(|&d| (-d - max_exp).exp()).sum();
    let loss = dists[0] + max_exp + z.ln();

    // dL/dd_pos = 1 - p_pos, dL/dd_neg = -p_neg.
    let mut steps = Vec::with_capacity(targets.len() + 1);
    let mut child_grad = Array1::zeros(table.dim());
    for (j, &target) in targets.iter().enumerate() {
        let p = (-dists[j] - max_exp).exp() / z;
        let coeff = if j == 0 { 1.0 - p } else { -p };
        child_grad.scaled_add(coeff, &grads_child[j]);

        let mut target_grad = grads_target[j].clone();
        target_grad *= coeff * ball::conformal_factor(table.row(target));
        steps.push((target, target_grad));
    }
    child_grad *= ball::conformal_factor(child);
    steps.push((relation.child, child_grad));

    (loss, steps)
}
