//! Identifier newtypes and the explicit series key.
//!
//! Panels are keyed by an explicit tuple-of-identifiers struct rather than
//! positional level magic: every series is addressed by
//! (sub-index, variable, country).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a thematic sub-index (e.g. "culture", "government").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubIndexId(String);

/// Identifier of a source variable within a sub-index (e.g. "rule_of_law").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(String);

/// Country identifier (UNDP/ISO-style code, e.g. "BRA").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(String);

macro_rules! impl_id {
    ($ty:ident) => {
        impl $ty {
            /// Create a new identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

impl_id!(SubIndexId);
impl_id!(VariableId);
impl_id!(CountryId);

/// Full key of one time series in a panel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    /// Thematic sub-index the series belongs to.
    pub sub_index: SubIndexId,
    /// Source variable.
    pub variable: VariableId,
    /// Country the series describes.
    pub country: CountryId,
}

impl SeriesKey {
    /// Create a new series key.
    pub fn new(
        sub_index: impl Into<SubIndexId>,
        variable: impl Into<VariableId>,
        country: impl Into<CountryId>,
    ) -> Self {
        Self {
            sub_index: sub_index.into(),
            variable: variable.into(),
            country: country.into(),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.sub_index, self.variable, self.country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_roundtrip() {
        let id = SubIndexId::from("culture");
        assert_eq!(id.as_str(), "culture");
        assert_eq!(id.to_string(), "culture");
    }

    #[test]
    fn test_series_key_ordering() {
        let a = SeriesKey::new("culture", "whc", "BRA");
        let b = SeriesKey::new("culture", "whc", "USA");
        let c = SeriesKey::new("digital", "internet", "BRA");
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_series_key_display() {
        let key = SeriesKey::new("government", "rule_of_law", "GBR");
        assert_eq!(key.to_string(), "government/rule_of_law/GBR");
    }
}
