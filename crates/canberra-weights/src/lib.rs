#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod eigen;
pub mod estimator;
pub mod pca;

pub use eigen::{EigenDecomposition, symmetric_eigen};
pub use estimator::{
    DEFAULT_SPARSITY_THRESHOLD, WeightConfig, WeightEstimator, WeightVector,
};
pub use pca::{PrincipalComponents, fit_pca};

use canberra_panel::SubIndexId;
use thiserror::Error;

/// Errors that can occur during weight estimation.
#[derive(Debug, Error)]
pub enum WeightError {
    /// The sub-index slice has no variables to weight.
    #[error("Sub-index {0} has no variables")]
    NoVariables(SubIndexId),

    /// Target rank of zero or otherwise unusable.
    #[error("Invalid target rank: {0} (must be positive)")]
    InvalidRank(usize),

    /// Target rank exceeds the number of variables.
    #[error("Target rank {rank} exceeds variable count {variables}")]
    RankExceedsVariables {
        /// Configured target rank.
        rank: usize,
        /// Number of variables in the sub-index.
        variables: usize,
    },

    /// Too few complete-case rows for the requested decomposition.
    #[error("Insufficient estimation sample: need at least {required} complete rows, got {actual}")]
    InsufficientSample {
        /// Minimum number of complete rows required.
        required: usize,
        /// Complete rows actually available after filtering.
        actual: usize,
    },

    /// Every variable contribution was sparsified to zero.
    #[error("Degenerate weights for sub-index {0}: all loadings fell below the sparsity threshold")]
    DegenerateWeights(SubIndexId),

    /// Non-square matrix handed to the eigen solver.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },
}
