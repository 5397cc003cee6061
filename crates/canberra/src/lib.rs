#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod catalog;

// Re-export main types from sub-crates
pub use canberra_index as index;
pub use canberra_output as output;
pub use canberra_panel as panel;
pub use canberra_weights as weights;

pub use catalog::{Catalog, SubIndexDef};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
