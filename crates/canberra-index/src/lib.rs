#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod composite;
pub mod pipeline;
pub mod subindex;

pub use composite::{FinalIndex, aggregate_index};
pub use pipeline::{
    PipelineConfig, PipelineOutcome, RunManifest, SubIndexStatus, run_pipeline,
};
pub use subindex::{SubIndexSeries, aggregate_subindex};

use canberra_panel::SubIndexId;
use thiserror::Error;

/// Errors that can occur while building the index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A sub-index present in the panel but absent from the rank table.
    #[error("No target rank configured for sub-index {0}")]
    MissingRank(SubIndexId),

    /// Weight estimation failed.
    #[error(transparent)]
    Weight(#[from] canberra_weights::WeightError),

    /// Panel access failed.
    #[error(transparent)]
    Panel(#[from] canberra_panel::PanelError),
}
