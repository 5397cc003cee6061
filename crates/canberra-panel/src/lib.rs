#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod key;
pub mod normalize;
pub mod panel;

pub use error::{PanelError, Result};
pub use key::{CountryId, SeriesKey, SubIndexId, VariableId};
pub use normalize::zscore;
pub use panel::{Observation, Panel, SubIndexPanel};
