//! Sub-index aggregation.
//!
//! Applies a sub-index's weight vector to its variable panel, one score per
//! country-year. Missing-dominance is an explicit rule of the summation: a
//! score exists only when every positively weighted variable is present at
//! that country-year, never as a partial sum over the variables that happen
//! to be there. Partial aggregation of a small weighted subset would be
//! materially biased and is suppressed instead.

use canberra_panel::{CountryId, SubIndexPanel};
use canberra_weights::WeightVector;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// One sub-index's scores: country to yearly time series.
///
/// Missing values are absent entries; no country is entirely empty and no
/// date is entirely absent across countries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubIndexSeries {
    scores: BTreeMap<CountryId, BTreeMap<NaiveDate, f64>>,
}

impl SubIndexSeries {
    /// Score for a country at a date, if defined.
    pub fn value(&self, country: &CountryId, date: NaiveDate) -> Option<f64> {
        self.scores.get(country)?.get(&date).copied()
    }

    /// Countries with at least one defined score, sorted.
    pub fn countries(&self) -> Vec<CountryId> {
        self.scores.keys().cloned().collect()
    }

    /// Dates with at least one defined score, sorted.
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

    /// Whether no scores survived aggregation and trimming.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub(crate) fn insert(&mut self, country: CountryId, date: NaiveDate, score: f64) {
        self.scores.entry(country).or_default().insert(date, score);
    }
}

/// Aggregate one sub-index's variable panel into per-country scores.
///
/// For every country and date, the score is the weighted sum over the
/// positively weighted variables of `weights`; if any of them is missing
/// (including a variable entirely absent from that country's data), the
/// score for that country-year is missing. Zero-weight variables never
/// affect presence or value, and variables of the panel that do not appear
/// in `weights` are ignored.
///
/// All-missing countries and dates do not appear in the result.
pub fn aggregate_subindex(view: &SubIndexPanel, weights: &WeightVector) -> SubIndexSeries {
    let mut series = SubIndexSeries::default();

    for country in view.countries() {
        for date in view.dates() {
            let mut score = 0.0;
            let mut complete = true;
            for (variable, weight) in weights.positive() {
                match view.value(variable, &country, date) {
                    Some(value) => score += weight * value,
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if complete {
                series.insert(country.clone(), date, score);
            }
        }
    }

    series
}
