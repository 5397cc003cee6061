//! Pipeline runner.
//!
//! Runs weight estimation and aggregation once per sub-index, isolates
//! failures so one bad sub-index cannot abort the others, averages the
//! surviving sub-indices into the final index, and reports the fate of
//! every sub-index in a run manifest.

use crate::IndexError;
use crate::composite::{FinalIndex, aggregate_index};
use crate::subindex::{SubIndexSeries, aggregate_subindex};
use canberra_panel::{Panel, SubIndexId};
use canberra_weights::{DEFAULT_SPARSITY_THRESHOLD, WeightConfig, WeightEstimator, WeightVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_sparsity_threshold() -> f64 {
    DEFAULT_SPARSITY_THRESHOLD
}

/// Configuration for a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Target PCA rank per sub-index. A sub-index present in the panel but
    /// absent here fails with [`IndexError::MissingRank`].
    pub ranks: BTreeMap<SubIndexId, usize>,

    /// Sparsification threshold for squared loadings.
    #[serde(default = "default_sparsity_threshold")]
    pub sparsity_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ranks: BTreeMap::new(),
            sparsity_threshold: DEFAULT_SPARSITY_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// Configuration with the given rank table and the default threshold.
    pub fn with_ranks(ranks: BTreeMap<SubIndexId, usize>) -> Self {
        Self {
            ranks,
            ..Default::default()
        }
    }
}

/// Fate of one sub-index in a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubIndexStatus {
    /// Weights estimated and scores produced.
    Ok {
        /// Estimated weight vector.
        weights: WeightVector,
    },
    /// Weights estimated but no country-year survived aggregation; the
    /// sub-index is skipped by the final aggregation (upstream data
    /// insufficiency, not an error).
    Empty {
        /// Estimated weight vector.
        weights: WeightVector,
    },
    /// Estimation or configuration failed; the sub-index is skipped.
    Failed {
        /// Human-readable error description.
        error: String,
    },
}

/// Report of which sub-indices succeeded, failed, or came up empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Per-sub-index fate, in sub-index order.
    pub sub_indices: BTreeMap<SubIndexId, SubIndexStatus>,

    /// Sub-indices excluded from the final aggregation (failed or empty).
    pub skipped: Vec<SubIndexId>,

    /// Whether the final index ended up with zero surviving country-years.
    pub final_index_empty: bool,
}

/// Result of a pipeline run: partial results plus the manifest.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Scores of the successful sub-indices.
    pub sub_indices: BTreeMap<SubIndexId, SubIndexSeries>,

    /// The final composite index over the successful sub-indices.
    pub index: FinalIndex,

    /// Fate of every sub-index in the panel.
    pub manifest: RunManifest,
}

/// Run the full weighting-and-aggregation pipeline over a normalized panel.
///
/// Sub-indices are processed independently in sorted order; an error in one
/// is recorded in the manifest and the run continues. The returned outcome
/// always contains whatever could be built.
pub fn run_pipeline(panel: &Panel, config: &PipelineConfig) -> PipelineOutcome {
    let mut statuses = BTreeMap::new();
    let mut outputs = BTreeMap::new();
    let mut skipped = Vec::new();

    for sub_index in panel.sub_indices() {
        match build_sub_index(panel, &sub_index, config) {
            Ok((weights, series)) => {
                if series.is_empty() {
                    statuses.insert(sub_index.clone(), SubIndexStatus::Empty { weights });
                    skipped.push(sub_index);
                } else {
                    statuses.insert(sub_index.clone(), SubIndexStatus::Ok { weights });
                    outputs.insert(sub_index, series);
                }
            }
            Err(err) => {
                statuses.insert(
                    sub_index.clone(),
                    SubIndexStatus::Failed {
                        error: err.to_string(),
                    },
                );
                skipped.push(sub_index);
            }
        }
    }

    let index = aggregate_index(&outputs);
    let manifest = RunManifest {
        sub_indices: statuses,
        skipped,
        final_index_empty: index.is_empty(),
    };

    PipelineOutcome {
        sub_indices: outputs,
        index,
        manifest,
    }
}

/// Estimate weights and aggregate scores for one sub-index.
fn build_sub_index(
    panel: &Panel,
    sub_index: &SubIndexId,
    config: &PipelineConfig,
) -> Result<(WeightVector, SubIndexSeries), IndexError> {
    let target_rank = *config
        .ranks
        .get(sub_index)
        .ok_or_else(|| IndexError::MissingRank(sub_index.clone()))?;
    let view = panel.select(sub_index)?;

    let estimator = WeightEstimator::new(WeightConfig {
        target_rank,
        sparsity_threshold: config.sparsity_threshold,
    });
    let weights = estimator.estimate(&view)?;
    let series = aggregate_subindex(&view, &weights);
    Ok((weights, series))
}
