//! Wide score tables with dates as rows.
//!
//! The sub-index table carries one column per (sub-index, country) pair and
//! the final index table one column per country. Missing cells export as
//! empty CSV fields and JSON `null`s.

use crate::export::{ExportError, ExportFormat, Exporter, csv_into_string};
use canberra_index::{FinalIndex, SubIndexSeries};
use canberra_panel::{CountryId, SubIndexId};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Per-sub-index score table: dates as rows, (sub-index, country) columns.
#[derive(Debug, Clone, Serialize)]
pub struct SubIndexTable {
    /// Row labels (ascending dates).
    dates: Vec<NaiveDate>,
    /// Column labels, sorted by (sub-index, country).
    columns: Vec<(SubIndexId, CountryId)>,
    /// Cell values, row-major; `None` marks a missing score.
    values: Vec<Vec<Option<f64>>>,
}

impl SubIndexTable {
    /// Build the table from per-sub-index scores.
    pub fn from_scores(scores: &BTreeMap<SubIndexId, SubIndexSeries>) -> Self {
        let columns: Vec<(SubIndexId, CountryId)> = scores
            .iter()
            .flat_map(|(sub_index, series)| {
                series
                    .countries()
                    .into_iter()
                    .map(move |country| (sub_index.clone(), country))
            })
            .collect();
        let dates: Vec<NaiveDate> = scores
            .values()
            .flat_map(|series| series.dates())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let values = dates
            .iter()
            .map(|&date| {
                columns
                    .iter()
                    .map(|(sub_index, country)| {
                        scores
                            .get(sub_index)
                            .and_then(|series| series.value(country, date))
                    })
                    .collect()
            })
            .collect();

        Self {
            dates,
            columns,
            values,
        }
    }

    /// Row labels (ascending dates).
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column labels.
    pub fn columns(&self) -> &[(SubIndexId, CountryId)] {
        &self.columns
    }

    /// Cell value at (row, column).
    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        *self.values.get(row)?.get(column)?
    }
}

impl Exporter for SubIndexTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = vec!["date".to_string()];
                header.extend(
                    self.columns
                        .iter()
                        .map(|(sub_index, country)| format!("{sub_index}:{country}")),
                );
                wtr.write_record(&header)?;
                for (date, row) in self.dates.iter().zip(&self.values) {
                    let mut record = vec![date.to_string()];
                    record.extend(row.iter().map(format_cell));
                    wtr.write_record(&record)?;
                }
                csv_into_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Final index table: dates as rows, country columns.
#[derive(Debug, Clone, Serialize)]
pub struct IndexTable {
    /// Row labels (ascending dates).
    dates: Vec<NaiveDate>,
    /// Column labels (sorted countries).
    countries: Vec<CountryId>,
    /// Cell values, row-major; `None` marks a missing value.
    values: Vec<Vec<Option<f64>>>,
}

impl IndexTable {
    /// Build the table from the final index.
    pub fn from_index(index: &FinalIndex) -> Self {
        let countries = index.countries();
        let dates = index.dates();

        let values = dates
            .iter()
            .map(|&date| {
                countries
                    .iter()
                    .map(|country| index.value(country, date))
                    .collect()
            })
            .collect();

        Self {
            dates,
            countries,
            values,
        }
    }

    /// Row labels (ascending dates).
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column labels.
    pub fn countries(&self) -> &[CountryId] {
        &self.countries
    }

    /// Cell value at (row, column).
    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        *self.values.get(row)?.get(column)?
    }
}

impl Exporter for IndexTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = vec!["date".to_string()];
                header.extend(self.countries.iter().map(ToString::to_string));
                wtr.write_record(&header)?;
                for (date, row) in self.dates.iter().zip(&self.values) {
                    let mut record = vec![date.to_string()];
                    record.extend(row.iter().map(format_cell));
                    wtr.write_record(&record)?;
                }
                csv_into_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Missing cells become empty CSV fields.
fn format_cell(value: &Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
