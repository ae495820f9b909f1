//! Poincare-ball graph embeddings.
//!
//! Learns low-dimensional vectors for graph nodes in hyperbolic space from
//! a list of directed (child, parent) relations, so that hyperbolic
//! distance approximates graph proximity and vector norm encodes
//! hierarchical depth: roots sit near the origin, leaves near the
//! boundary.
//!
//! # Why Hyperbolic?
//!
//! Trees have exponentially growing neighborhoods, but Euclidean space
//! grows polynomially. The Poincare ball's volume grows exponentially with
//! radius, so tree-like hierarchies embed with low distortion even in a
//! handful of dimensions.
//!
//! # Pipeline
//!
//! | Stage | Type | Role |
//! |-------|------|------|
//! | Load | [`RelationCorpus`] | vocabulary + relations + adjacency |
//! | Init | [`EmbeddingTable`] | per-node vectors inside the open ball |
//! | Train | [`PoincareModel`] | Riemannian SGD, negative sampling, burn-in |
//! | Query | [`VectorIndex`] | distance, neighbors, rank, hierarchy walks |
//! | Persist | [`io`] | resumable snapshots, vectors-only TSV |
//!
//! # Example
//!
//! ```rust,ignore
//! use poincare_embed::{PoincareConfig, PoincareModel, RelationCorpus};
//!
//! let corpus = RelationCorpus::from_pairs([
//!     ("dog", "mammal"),
//!     ("cat", "mammal"),
//!     ("mammal", "animal"),
//!     ("bird", "animal"),
//! ]);
//!
//! let config = PoincareConfig::default().with_dim(20);
//! let mut model = PoincareModel::new(corpus, config)?;
//! model.train(50)?;
//!
//! let index = model.index();
//! let neighbors = index.most_similar("dog", 3)?;
//! let depth_gap = index.difference_in_hierarchy("animal", "dog")?;
//! assert!(depth_gap > 0.0); // animal is higher in the hierarchy
//! ```
//!
//! # References
//!
//! - Nickel & Kiela (2017). "Poincare Embeddings for Learning Hierarchical
//!   Representations"

mod ball;
mod config;
mod corpus;
mod embedding;
mod error;
mod index;
mod sampler;
mod trainer;

pub mod io;

pub use config::{PoincareConfig, DEFAULT_BOUNDARY_EPS};
pub use corpus::{Relation, RelationCorpus, Vocabulary};
pub use embedding::EmbeddingTable;
pub use error::{Error, Result};
pub use index::{vector_distance, vector_distance_batch, VectorIndex};
pub use sampler::NegativeSampler;
pub use trainer::{
    PoincareModel, ProgressCallback, ProgressReport, TrainingState, DEFAULT_REPORT_EVERY,
};
