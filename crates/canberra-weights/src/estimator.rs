//! The weight estimator.
//!
//! Pools a sub-index's observations across countries, keeps complete cases
//! only, runs a fixed-rank PCA, and converts squared loadings plus
//! explained-variance ratios into one non-negative weight vector over the
//! sub-index's variables, summing to one.

use crate::WeightError;
use crate::pca::fit_pca;
use canberra_panel::{SubIndexPanel, VariableId};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default sparsification threshold applied to squared loadings.
pub const DEFAULT_SPARSITY_THRESHOLD: f64 = 0.10;

/// Configuration for the weight estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Number of principal components to retain.
    pub target_rank: usize,

    /// Squared-loading contributions below this value are zeroed before
    /// components are combined, removing noise loadings.
    pub sparsity_threshold: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            target_rank: 2,
            sparsity_threshold: DEFAULT_SPARSITY_THRESHOLD,
        }
    }
}

/// Per-variable weights for one sub-index.
///
/// Invariant: weights are non-negative and sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    weights: BTreeMap<VariableId, f64>,
}

impl WeightVector {
    /// Build a weight vector from raw non-negative weights, normalizing
    /// them to sum to one.
    ///
    /// Returns `None` when the total is not strictly positive, mirroring
    /// the estimator's degenerate-weights condition.
    pub fn normalized(pairs: impl IntoIterator<Item = (VariableId, f64)>) -> Option<Self> {
        let weights: BTreeMap<VariableId, f64> = pairs
            .into_iter()
            .map(|(variable, w)| (variable, w.max(0.0)))
            .collect();
        let total: f64 = weights.values().sum();
        if total <= 0.0 {
            return None;
        }
        Some(Self {
            weights: weights
                .into_iter()
                .map(|(variable, w)| (variable, w / total))
                .collect(),
        })
    }

    /// Weight of a variable, if it appears in the vector.
    pub fn get(&self, variable: &VariableId) -> Option<f64> {
        self.weights.get(variable).copied()
    }

    /// Iterate over (variable, weight) pairs in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&VariableId, f64)> {
        self.weights.iter().map(|(v, &w)| (v, w))
    }

    /// Iterate over the variables carrying strictly positive weight.
    ///
    /// These are the variables whose presence the sub-index aggregator
    /// requires at every country-date.
    pub fn positive(&self) -> impl Iterator<Item = (&VariableId, f64)> {
        self.iter().filter(|(_, w)| *w > 0.0)
    }

    /// Number of variables in the vector.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the vector has no entries.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all weights (1.0 up to floating error).
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// PCA-based weight estimator for one sub-index.
#[derive(Debug, Default)]
pub struct WeightEstimator {
    config: WeightConfig,
}

impl WeightEstimator {
    /// Create an estimator with the given configuration.
    pub const fn new(config: WeightConfig) -> Self {
        Self { config }
    }

    /// Create an estimator with the given rank and the default threshold.
    pub fn with_rank(target_rank: usize) -> Self {
        Self::new(WeightConfig {
            target_rank,
            ..Default::default()
        })
    }

    /// The estimator's configuration.
    pub const fn config(&self) -> &WeightConfig {
        &self.config
    }

    /// Estimate the weight vector for a sub-index slice.
    ///
    /// Pure function of its inputs; see the crate docs for the algorithm.
    ///
    /// # Errors
    ///
    /// Configuration errors ([`WeightError::InvalidRank`],
    /// [`WeightError::RankExceedsVariables`],
    /// [`WeightError::InsufficientSample`]) when the decomposition is not
    /// well-posed, and [`WeightError::DegenerateWeights`] when every
    /// contribution falls below the sparsity threshold.
    pub fn estimate(&self, view: &SubIndexPanel) -> Result<WeightVector, WeightError> {
        let variables = view.variables();
        if variables.is_empty() {
            return Err(WeightError::NoVariables(view.sub_index().clone()));
        }

        let sample = pooled_complete_cases(view, &variables);
        let pca = fit_pca(&sample, self.config.target_rank)?;

        // Variance-ratio-weighted sum of thresholded squared loadings
        let mut combined = vec![0.0; variables.len()];
        for i in 0..self.config.target_rank {
            let ratio = pca.explained_variance_ratio[i];
            for (j, slot) in combined.iter_mut().enumerate() {
                let contribution = pca.loadings[[i, j]].powi(2);
                if contribution >= self.config.sparsity_threshold {
                    *slot += ratio * contribution;
                }
            }
        }

        let total: f64 = combined.iter().sum();
        if total <= 0.0 {
            return Err(WeightError::DegenerateWeights(view.sub_index().clone()));
        }

        let weights = variables
            .into_iter()
            .zip(combined)
            .map(|(variable, w)| (variable, w / total))
            .collect();
        Ok(WeightVector { weights })
    }
}

/// Pool observations across countries into a complete-case sample matrix.
///
/// Rows are (country, date) pairs in sorted order; columns follow
/// `variables`. Any row with a missing value in any column is dropped —
/// this is the estimation sample, distinct from the full panel later used
/// for scoring.
fn pooled_complete_cases(view: &SubIndexPanel, variables: &[VariableId]) -> Array2<f64> {
    let countries = view.countries();
    let dates = view.dates();

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for country in &countries {
        for &date in &dates {
            let row: Option<Vec<f64>> = variables
                .iter()
                .map(|variable| view.value(variable, country, date))
                .collect();
            if let Some(row) = row {
                rows.push(row);
            }
        }
    }

    let mut sample = Array2::<f64>::zeros((rows.len(), variables.len()));
    for (i, row) in rows.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            sample[[i, j]] = value;
        }
    }
    sample
}
