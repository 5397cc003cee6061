//! The panel data model.
//!
//! A [`Panel`] maps an explicit [`SeriesKey`] to an ordered yearly time
//! series of floating-point values. Missing values are represented by the
//! absence of a date entry, never by NaN. Panels are immutable once built:
//! every transformation produces a new panel.

use crate::error::{PanelError, Result};
use crate::key::{CountryId, SeriesKey, SubIndexId, VariableId};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One long-format observation, as found in the normalized panel export.
///
/// `value` is `None` for rows that record an explicitly missing cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date (normalized to the year on insertion).
    pub date: NaiveDate,
    /// Sub-index the variable belongs to.
    #[serde(rename = "subindex")]
    pub sub_index: SubIndexId,
    /// Source variable.
    pub variable: VariableId,
    /// Country code.
    pub country: CountryId,
    /// Observed value, if any.
    pub value: Option<f64>,
}

/// Normalize a date to yearly granularity (January 1 of its year).
fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// A three-level keyed panel of yearly time series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    series: BTreeMap<SeriesKey, BTreeMap<NaiveDate, f64>>,
}

impl Panel {
    /// Create an empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a panel from long-format observations.
    ///
    /// Rows with a missing value are skipped (missing = absent entry).
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate (series, year) pairs or non-finite
    /// values.
    pub fn from_observations(rows: impl IntoIterator<Item = Observation>) -> Result<Self> {
        let mut panel = Self::new();
        for row in rows {
            if let Some(value) = row.value {
                let key = SeriesKey {
                    sub_index: row.sub_index,
                    variable: row.variable,
                    country: row.country,
                };
                panel.insert(key, row.date, value)?;
            }
        }
        Ok(panel)
    }

    /// Insert a single observation.
    ///
    /// The date is normalized to January 1 of its year.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::DuplicateObservation`] if the series already
    /// has a value for that year, and [`PanelError::NonFiniteValue`] for
    /// NaN or infinite values.
    pub fn insert(&mut self, key: SeriesKey, date: NaiveDate, value: f64) -> Result<()> {
        let date = year_start(date);
        if !value.is_finite() {
            return Err(PanelError::NonFiniteValue { key, date });
        }
        if self
            .series
            .get(&key)
            .is_some_and(|dates| dates.contains_key(&date))
        {
            return Err(PanelError::DuplicateObservation { key, date });
        }
        self.series.entry(key).or_default().insert(date, value);
        Ok(())
    }

    /// Whether the panel contains no series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of series in the panel.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Value of one series at a (yearly normalized) date, if present.
    pub fn value(&self, key: &SeriesKey, date: NaiveDate) -> Option<f64> {
        self.series.get(key)?.get(&year_start(date)).copied()
    }

    /// The full time series for a key, if present.
    pub fn series(&self, key: &SeriesKey) -> Option<&BTreeMap<NaiveDate, f64>> {
        self.series.get(key)
    }

    /// Iterate over all series in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&SeriesKey, &BTreeMap<NaiveDate, f64>)> {
        self.series.iter()
    }

    /// Distinct sub-index ids, sorted.
    pub fn sub_indices(&self) -> Vec<SubIndexId> {
        self.series
            .keys()
            .map(|k| k.sub_index.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct variables of one sub-index, sorted.
    pub fn variables(&self, sub_index: &SubIndexId) -> Vec<VariableId> {
        self.series
            .keys()
            .filter(|k| &k.sub_index == sub_index)
            .map(|k| k.variable.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct countries of one sub-index, sorted.
    pub fn countries(&self, sub_index: &SubIndexId) -> Vec<CountryId> {
        self.series
            .keys()
            .filter(|k| &k.sub_index == sub_index)
            .map(|k| k.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Union of observation dates across all series, sorted.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series
            .values()
            .flat_map(|dates| dates.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Snapshot of one sub-index's variable x country slice.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::UnknownSubIndex`] if the panel has no series
    /// under `sub_index`.
    pub fn select(&self, sub_index: &SubIndexId) -> Result<SubIndexPanel> {
        let mut series: BTreeMap<VariableId, BTreeMap<CountryId, BTreeMap<NaiveDate, f64>>> =
            BTreeMap::new();
        for (key, dates) in &self.series {
            if &key.sub_index == sub_index {
                series
                    .entry(key.variable.clone())
                    .or_default()
                    .insert(key.country.clone(), dates.clone());
            }
        }
        if series.is_empty() {
            return Err(PanelError::UnknownSubIndex(sub_index.clone()));
        }
        Ok(SubIndexPanel {
            sub_index: sub_index.clone(),
            series,
        })
    }

    /// Forward-fill gaps within each series.
    ///
    /// Missing years strictly between a series' first and last observation
    /// take the most recent preceding value. Matches the guarantee upstream
    /// importers provide for their exports.
    pub fn forward_fill(&self) -> Self {
        let mut filled = BTreeMap::new();
        for (key, dates) in &self.series {
            let mut out = dates.clone();
            if let (Some((&first, _)), Some((&last, _))) =
                (dates.first_key_value(), dates.last_key_value())
            {
                let mut carry = None;
                for year in first.year()..=last.year() {
                    let date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(first);
                    match dates.get(&date) {
                        Some(&v) => carry = Some(v),
                        None => {
                            if let Some(v) = carry {
                                out.insert(date, v);
                            }
                        }
                    }
                }
            }
            filled.insert(key.clone(), out);
        }
        Self { series: filled }
    }
}

/// Owned snapshot of one sub-index's slice of a panel.
///
/// Produced by [`Panel::select`]; consumed read-only by the weight
/// estimator and the sub-index aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct SubIndexPanel {
    sub_index: SubIndexId,
    series: BTreeMap<VariableId, BTreeMap<CountryId, BTreeMap<NaiveDate, f64>>>,
}

impl SubIndexPanel {
    /// The sub-index this slice belongs to.
    pub fn sub_index(&self) -> &SubIndexId {
        &self.sub_index
    }

    /// Variables of this sub-index, sorted.
    pub fn variables(&self) -> Vec<VariableId> {
        self.series.keys().cloned().collect()
    }

    /// Number of variables.
    pub fn variable_count(&self) -> usize {
        self.series.len()
    }

    /// Union of countries across variables, sorted.
    pub fn countries(&self) -> Vec<CountryId> {
        self.series
            .values()
            .flat_map(|countries| countries.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Union of observation dates across all series, sorted.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series
            .values()
            .flat_map(|countries| countries.values())
            .flat_map(|dates| dates.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Value for (variable, country, date), if present.
    pub fn value(&self, variable: &VariableId, country: &CountryId, date: NaiveDate) -> Option<f64> {
        self.series.get(variable)?.get(country)?.get(&date).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    fn obs(year: i32, sub: &str, var: &str, country: &str, value: f64) -> Observation {
        Observation {
            date: date(year),
            sub_index: sub.into(),
            variable: var.into(),
            country: country.into(),
            value: Some(value),
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut panel = Panel::new();
        let key = SeriesKey::new("culture", "whc", "BRA");
        panel.insert(key.clone(), date(2005), 3.0).unwrap();
        assert_eq!(panel.value(&key, date(2005)), Some(3.0));
        assert_eq!(panel.value(&key, date(2006)), None);
    }

    #[test]
    fn test_insert_normalizes_to_year() {
        let mut panel = Panel::new();
        let key = SeriesKey::new("culture", "whc", "BRA");
        let mid_year = NaiveDate::from_ymd_opt(2005, 7, 15).unwrap();
        panel.insert(key.clone(), mid_year, 3.0).unwrap();
        assert_eq!(panel.value(&key, date(2005)), Some(3.0));
    }

    #[test]
    fn test_duplicate_observation_rejected() {
        let mut panel = Panel::new();
        let key = SeriesKey::new("culture", "whc", "BRA");
        panel.insert(key.clone(), date(2005), 3.0).unwrap();
        let err = panel.insert(key, date(2005), 4.0).unwrap_err();
        assert!(matches!(err, PanelError::DuplicateObservation { .. }));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let mut panel = Panel::new();
        let key = SeriesKey::new("culture", "whc", "BRA");
        let err = panel.insert(key, date(2005), f64::NAN).unwrap_err();
        assert!(matches!(err, PanelError::NonFiniteValue { .. }));
    }

    #[test]
    fn test_from_observations_skips_missing() {
        let rows = vec![
            obs(2005, "culture", "whc", "BRA", 3.0),
            Observation {
                value: None,
                ..obs(2006, "culture", "whc", "BRA", 0.0)
            },
        ];
        let panel = Panel::from_observations(rows).unwrap();
        let key = SeriesKey::new("culture", "whc", "BRA");
        assert_eq!(panel.value(&key, date(2005)), Some(3.0));
        assert_eq!(panel.value(&key, date(2006)), None);
    }

    #[test]
    fn test_vocabulary_accessors() {
        let panel = Panel::from_observations(vec![
            obs(2005, "culture", "whc", "BRA", 1.0),
            obs(2005, "culture", "int_tourists", "BRA", 2.0),
            obs(2005, "digital", "internet", "USA", 3.0),
        ])
        .unwrap();

        assert_eq!(
            panel.sub_indices(),
            vec![SubIndexId::from("culture"), SubIndexId::from("digital")]
        );
        assert_eq!(
            panel.variables(&"culture".into()),
            vec![VariableId::from("int_tourists"), VariableId::from("whc")]
        );
        assert_eq!(panel.countries(&"digital".into()), vec![CountryId::from("USA")]);
        assert_eq!(panel.dates(), vec![date(2005)]);
    }

    #[test]
    fn test_select_unknown_sub_index() {
        let panel = Panel::from_observations(vec![obs(2005, "culture", "whc", "BRA", 1.0)]).unwrap();
        let err = panel.select(&"government".into()).unwrap_err();
        assert!(matches!(err, PanelError::UnknownSubIndex(_)));
    }

    #[test]
    fn test_select_slices_one_sub_index() {
        let panel = Panel::from_observations(vec![
            obs(2005, "culture", "whc", "BRA", 1.0),
            obs(2005, "culture", "whc", "USA", 2.0),
            obs(2005, "digital", "internet", "BRA", 9.0),
        ])
        .unwrap();

        let view = panel.select(&"culture".into()).unwrap();
        assert_eq!(view.variables(), vec![VariableId::from("whc")]);
        assert_eq!(
            view.countries(),
            vec![CountryId::from("BRA"), CountryId::from("USA")]
        );
        assert_eq!(view.value(&"whc".into(), &"BRA".into(), date(2005)), Some(1.0));
        assert_eq!(view.value(&"internet".into(), &"BRA".into(), date(2005)), None);
    }

    #[test]
    fn test_forward_fill_interior_gap() {
        let panel = Panel::from_observations(vec![
            obs(2005, "culture", "whc", "BRA", 1.0),
            obs(2008, "culture", "whc", "BRA", 4.0),
        ])
        .unwrap();

        let filled = panel.forward_fill();
        let key = SeriesKey::new("culture", "whc", "BRA");
        assert_eq!(filled.value(&key, date(2006)), Some(1.0));
        assert_eq!(filled.value(&key, date(2007)), Some(1.0));
        assert_eq!(filled.value(&key, date(2008)), Some(4.0));
        // No fill before the first or after the last observation
        assert_eq!(filled.value(&key, date(2004)), None);
        assert_eq!(filled.value(&key, date(2009)), None);
    }
}
