//! Cross-sectional normalization.
//!
//! Variables are standardized across countries, one (sub-index, variable,
//! date) cross-section at a time, before weight estimation. Sample standard
//! deviation (n-1) is used throughout.

use crate::key::{SeriesKey, SubIndexId, VariableId};
use crate::panel::Panel;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Standardize every variable cross-sectionally to zero mean and unit
/// variance.
///
/// A cross-section with fewer than two observations, or with zero variance,
/// yields missing values for that date: a z-score is undefined there.
pub fn zscore(panel: &Panel) -> Panel {
    // Group observations by (sub-index, variable, date) across countries.
    let mut sections: BTreeMap<(SubIndexId, VariableId, NaiveDate), Vec<(SeriesKey, f64)>> =
        BTreeMap::new();
    for (key, dates) in panel.iter() {
        for (&date, &value) in dates {
            sections
                .entry((key.sub_index.clone(), key.variable.clone(), date))
                .or_default()
                .push((key.clone(), value));
        }
    }

    let mut out = Panel::new();
    for ((_, _, date), observations) in sections {
        let n = observations.len();
        if n < 2 {
            continue;
        }
        let mean = observations.iter().map(|(_, v)| v).sum::<f64>() / n as f64;
        let var = observations
            .iter()
            .map(|(_, v)| (v - mean).powi(2))
            .sum::<f64>()
            / (n - 1) as f64;
        if var <= 0.0 {
            continue;
        }
        let std = var.sqrt();
        for (key, value) in observations {
            // Inputs came from a valid panel, so re-insertion cannot
            // produce duplicates or non-finite values.
            let _ = out.insert(key, date, (value - mean) / std);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    fn key(country: &str) -> SeriesKey {
        SeriesKey::new("culture", "whc", country)
    }

    #[test]
    fn test_zscore_moments() {
        let mut panel = Panel::new();
        panel.insert(key("BRA"), date(2005), 1.0).unwrap();
        panel.insert(key("USA"), date(2005), 2.0).unwrap();
        panel.insert(key("GBR"), date(2005), 3.0).unwrap();

        let z = zscore(&panel);
        let values: Vec<f64> = [key("BRA"), key("USA"), key("GBR")]
            .iter()
            .map(|k| z.value(k, date(2005)).unwrap())
            .collect();

        let mean: f64 = values.iter().sum::<f64>() / values.len() as f64;
        let var: f64 =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(var, 1.0, epsilon = 1e-12);
        // Sample std of {1,2,3} is 1, so the z-scores are -1, 0, 1
        assert_relative_eq!(values[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(values[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(values[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zscore_singleton_cross_section_is_missing() {
        let mut panel = Panel::new();
        panel.insert(key("BRA"), date(2005), 1.0).unwrap();

        let z = zscore(&panel);
        assert_eq!(z.value(&key("BRA"), date(2005)), None);
    }

    #[test]
    fn test_zscore_zero_variance_is_missing() {
        let mut panel = Panel::new();
        panel.insert(key("BRA"), date(2005), 2.0).unwrap();
        panel.insert(key("USA"), date(2005), 2.0).unwrap();

        let z = zscore(&panel);
        assert_eq!(z.value(&key("BRA"), date(2005)), None);
        assert_eq!(z.value(&key("USA"), date(2005)), None);
    }

    #[test]
    fn test_zscore_sections_are_independent() {
        let mut panel = Panel::new();
        panel.insert(key("BRA"), date(2005), 1.0).unwrap();
        panel.insert(key("USA"), date(2005), 3.0).unwrap();
        panel.insert(key("BRA"), date(2006), 10.0).unwrap();
        panel.insert(key("USA"), date(2006), 30.0).unwrap();

        let z = zscore(&panel);
        // Both years standardize to the same pair despite different scales
        assert_relative_eq!(
            z.value(&key("BRA"), date(2005)).unwrap(),
            z.value(&key("BRA"), date(2006)).unwrap(),
            epsilon = 1e-12
        );
    }
}
