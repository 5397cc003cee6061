//! Final index aggregation.
//!
//! Averages sub-index scores per country-year into the final scalar index.
//! The mean never skips missing inputs: a country-year is defined only when
//! every contributing sub-index has a score there, mirroring the
//! missing-dominance rule of sub-index aggregation one level higher.

use crate::subindex::SubIndexSeries;
use canberra_panel::{CountryId, SubIndexId};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// The final composite index: country to yearly time series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalIndex {
    scores: BTreeMap<CountryId, BTreeMap<NaiveDate, f64>>,
}

impl FinalIndex {
    /// Index value for a country at a date, if defined.
    pub fn value(&self, country: &CountryId, date: NaiveDate) -> Option<f64> {
        self.scores.get(country)?.get(&date).copied()
    }

    /// Countries with at least one defined value, sorted.
    pub fn countries(&self) -> Vec<CountryId> {
        self.scores.keys().cloned().collect()
    }

    /// Dates with at least one defined value, sorted.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.scores
            .values()
            .flat_map(|series| series.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Iterate over (country, series) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&CountryId, &BTreeMap<NaiveDate, f64>)> {
        self.scores.iter()
    }

    /// Whether no values survived aggregation and trimming.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Average sub-index scores into the final index.
///
/// The value for a (country, date) is defined iff every sub-index in
/// `sub_indices` has a score for that country-date; otherwise it is
/// missing. All-missing countries and dates do not appear in the result.
pub fn aggregate_index(sub_indices: &BTreeMap<SubIndexId, SubIndexSeries>) -> FinalIndex {
    let mut index = FinalIndex::default();
    if sub_indices.is_empty() {
        return index;
    }

    let countries: BTreeSet<CountryId> = sub_indices
        .values()
        .flat_map(|series| series.countries())
        .collect();
    let dates: BTreeSet<NaiveDate> = sub_indices
        .values()
        .flat_map(|series| series.dates())
        .collect();
    let count = sub_indices.len() as f64;

    for country in &countries {
        for &date in &dates {
            let mut sum = 0.0;
            let mut complete = true;
            for series in sub_indices.values() {
                match series.value(country, date) {
                    Some(score) => sum += score,
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if complete {
                index
                    .scores
                    .entry(country.clone())
                    .or_default()
                    .insert(date, sum / count);
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subindex::aggregate_subindex;
    use approx::assert_relative_eq;
    use canberra_panel::{Panel, SeriesKey};
    use canberra_weights::WeightVector;

    fn date(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    /// Build a one-variable sub-index series from (country, year, value)
    /// triples.
    fn series(sub: &str, cells: &[(&str, i32, f64)]) -> SubIndexSeries {
        let mut panel = Panel::new();
        for &(country, year, value) in cells {
            panel
                .insert(SeriesKey::new(sub, "v", country), date(year), value)
                .unwrap();
        }
        let view = panel.select(&sub.into()).unwrap();
        let weights = WeightVector::normalized([("v".into(), 1.0)]).unwrap();
        aggregate_subindex(&view, &weights)
    }

    #[test]
    fn test_mean_across_sub_indices() {
        let mut subs = BTreeMap::new();
        subs.insert(
            SubIndexId::from("culture"),
            series("culture", &[("BRA", 2005, 1.0)]),
        );
        subs.insert(
            SubIndexId::from("digital"),
            series("digital", &[("BRA", 2005, 3.0)]),
        );

        let index = aggregate_index(&subs);
        assert_relative_eq!(
            index.value(&"BRA".into(), date(2005)).unwrap(),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_missing_sub_index_score_dominates() {
        // culture is missing for BRA in 2006 while digital is present:
        // the final value must be missing, not digital alone
        let mut subs = BTreeMap::new();
        subs.insert(
            SubIndexId::from("culture"),
            series("culture", &[("BRA", 2005, 1.0)]),
        );
        subs.insert(
            SubIndexId::from("digital"),
            series("digital", &[("BRA", 2005, 3.0), ("BRA", 2006, 4.0)]),
        );

        let index = aggregate_index(&subs);
        assert!(index.value(&"BRA".into(), date(2005)).is_some());
        assert_eq!(index.value(&"BRA".into(), date(2006)), None);
    }

    #[test]
    fn test_trimming_final_index() {
        // USA never has both sub-indices: it must not appear at all, and
        // neither must 2006, which no country completes
        let mut subs = BTreeMap::new();
        subs.insert(
            SubIndexId::from("culture"),
            series("culture", &[("BRA", 2005, 1.0), ("USA", 2006, 5.0)]),
        );
        subs.insert(
            SubIndexId::from("digital"),
            series("digital", &[("BRA", 2005, 3.0), ("BRA", 2006, 4.0)]),
        );

        let index = aggregate_index(&subs);
        assert_eq!(index.countries(), vec![CountryId::from("BRA")]);
        assert_eq!(index.dates(), vec![date(2005)]);
    }

    #[test]
    fn test_empty_input_yields_empty_index() {
        let index = aggregate_index(&BTreeMap::new());
        assert!(index.is_empty());
    }
}
