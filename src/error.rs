//! Error types for poincare-embed.

use thiserror::Error;

/// Errors that can occur while building, training, or querying a model.
#[derive(Error, Debug)]
pub enum Error {
    /// Node label not found in the vocabulary.
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// A vector at or beyond the unit sphere was handed to a distance
    /// computation. Should not occur for trained tables; indicates a
    /// projection bug or corrupt imported vectors.
    #[error("Vector norm {norm} is outside the open unit ball")]
    BoundaryViolation { norm: f64 },

    /// `closest_child`/`closest_parent` called on a node that is already
    /// at the norm extremum, so no candidate exists.
    #[error("Hierarchy extremum: no candidate {0} exists")]
    HierarchyExtremum(&'static str),

    /// Rejected configuration (non-positive dimension, negative-sample
    /// count, epoch count, and similar).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raw vectors of differing dimension passed to a distance operation.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Malformed row in a vectors-only import.
    #[error("Malformed vector row {row}: {reason}")]
    MalformedVector { row: usize, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for poincare-embed.
pub type Result<T> = std::result::Result<T, Error>;
