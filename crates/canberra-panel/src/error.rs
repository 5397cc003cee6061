//! Error types for panel operations.

use crate::key::{SeriesKey, SubIndexId};
use chrono::NaiveDate;
use thiserror::Error;

/// Result type for panel operations.
pub type Result<T> = std::result::Result<T, PanelError>;

/// Errors that can occur while building or querying a panel.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Two observations for the same series and date.
    #[error("Duplicate observation for {key} at {date}")]
    DuplicateObservation {
        /// Series the observation belongs to.
        key: SeriesKey,
        /// Normalized (yearly) observation date.
        date: NaiveDate,
    },

    /// A sub-index id not present in the panel.
    #[error("Unknown sub-index: {0}")]
    UnknownSubIndex(SubIndexId),

    /// A non-finite value (NaN or infinity) offered as an observation.
    ///
    /// Missing values are represented by absence, never by NaN; infinities
    /// have no meaning in normalized macro data.
    #[error("Non-finite value for {key} at {date}")]
    NonFiniteValue {
        /// Series the observation belongs to.
        key: SeriesKey,
        /// Normalized (yearly) observation date.
        date: NaiveDate,
    },
}
