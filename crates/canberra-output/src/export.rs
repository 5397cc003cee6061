//! Export plumbing: formats, errors, and the `Exporter` trait.

use canberra_index::RunManifest;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer buffer could not be recovered.
    #[error("CSV buffer error: {0}")]
    CsvBuffer(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values, dates as rows.
    Csv,

    /// Compact JSON.
    Json,

    /// Pretty-printed JSON.
    PrettyJson,
}

impl ExportFormat {
    /// File extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Finish a CSV writer into a string.
pub(crate) fn csv_into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::CsvBuffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::CsvBuffer(e.to_string()))
}

/// Flat manifest row for CSV export.
#[derive(Debug, Serialize)]
struct ManifestRow {
    subindex: String,
    status: String,
    detail: String,
}

impl Exporter for RunManifest {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for (sub_index, status) in &self.sub_indices {
                    let (status_name, detail) = match status {
                        canberra_index::SubIndexStatus::Ok { .. } => ("ok", String::new()),
                        canberra_index::SubIndexStatus::Empty { .. } => {
                            ("empty", "no surviving country-years".to_string())
                        }
                        canberra_index::SubIndexStatus::Failed { error } => {
                            ("failed", error.clone())
                        }
                    };
                    wtr.serialize(ManifestRow {
                        subindex: sub_index.to_string(),
                        status: status_name.to_string(),
                        detail,
                    })?;
                }
                csv_into_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canberra_index::{PipelineConfig, run_pipeline};
    use canberra_panel::{Panel, SeriesKey};
    use chrono::NaiveDate;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn manifest() -> RunManifest {
        let mut panel = Panel::new();
        let mut t = 0.0;
        for country in ["BRA", "GBR", "USA"] {
            for year in 2000..2005 {
                let date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
                panel
                    .insert(SeriesKey::new("digital", "internet", country), date, 0.8 * t)
                    .unwrap();
                panel
                    .insert(SeriesKey::new("digital", "cellphones", country), date, 0.6 * t)
                    .unwrap();
                t += 1.0;
            }
        }
        // No rank for "culture": it fails and lands in the manifest
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        panel
            .insert(SeriesKey::new("culture", "whc", "BRA"), date, 1.0)
            .unwrap();

        let ranks: BTreeMap<_, _> = [("digital".into(), 1)].into_iter().collect();
        run_pipeline(&panel, &PipelineConfig::with_ranks(ranks)).manifest
    }

    #[rstest]
    #[case(ExportFormat::Csv, "csv")]
    #[case(ExportFormat::Json, "json")]
    #[case(ExportFormat::PrettyJson, "json")]
    fn test_export_format_extension(#[case] format: ExportFormat, #[case] expected: &str) {
        assert_eq!(format.extension(), expected);
    }

    #[test]
    fn test_manifest_csv() {
        let csv = manifest().export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("subindex,status,detail"));
        assert!(csv.contains("digital,ok"));
        assert!(csv.contains("culture,failed"));
    }

    #[test]
    fn test_manifest_json() {
        let json = manifest().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"skipped\":[\"culture\"]"));
    }

    #[test]
    fn test_manifest_to_file() {
        use std::io::Read;

        let path = std::env::temp_dir().join("canberra_manifest_test.json");
        manifest()
            .export_to_file(&path, ExportFormat::PrettyJson)
            .unwrap();

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.contains("digital"));

        std::fs::remove_file(path).ok();
    }
}
