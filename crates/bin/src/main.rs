//! Canberra CLI binary.
//!
//! Reads a long-format normalized panel, runs the weighting-and-aggregation
//! pipeline, and writes the score tables plus the run manifest.

use canberra::Catalog;
use canberra::index::{PipelineConfig, PipelineOutcome, RunManifest, SubIndexStatus, run_pipeline};
use canberra::output::{ExportFormat, Exporter, IndexTable, SubIndexTable};
use canberra::panel::{Observation, Panel, SubIndexId, zscore};
use canberra::weights::WeightVector;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "canberra")]
#[command(about = "Canberra: composite soft-power index model", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build sub-indices and the final index from a panel export
    Build {
        /// Long-format panel CSV (date,subindex,variable,country,value)
        input: PathBuf,

        /// Pipeline configuration JSON (rank table and threshold);
        /// defaults to the standard catalog
        #[arg(long)]
        config: Option<PathBuf>,

        /// Apply cross-sectional z-scoring before estimation
        #[arg(long)]
        normalize: bool,

        /// Forward-fill gaps within each series before normalization
        #[arg(long)]
        forward_fill: bool,

        /// Output directory for sub_indices, index, and manifest files
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,

        /// Table output format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,
    },

    /// Estimate and print the weight vectors per sub-index
    Weights {
        /// Long-format panel CSV (date,subindex,variable,country,value)
        input: PathBuf,

        /// Pipeline configuration JSON; defaults to the standard catalog
        #[arg(long)]
        config: Option<PathBuf>,

        /// Apply cross-sectional z-scoring before estimation
        #[arg(long)]
        normalize: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            config,
            normalize,
            forward_fill,
            out_dir,
            format,
        } => {
            let table_format = parse_table_format(&format)?;
            let panel = load_panel(&input, normalize, forward_fill)?;
            let config = load_config(config.as_deref())?;
            let outcome = run_pipeline(&panel, &config);
            write_outputs(&outcome, &out_dir, table_format)?;
            print_summary(&outcome);
        }
        Commands::Weights {
            input,
            config,
            normalize,
            format,
        } => {
            let panel = load_panel(&input, normalize, false)?;
            let config = load_config(config.as_deref())?;
            let outcome = run_pipeline(&panel, &config);
            print_weights(&outcome, &format)?;
        }
    }

    Ok(())
}

/// Read a long-format panel CSV and apply the requested preprocessing.
fn load_panel(
    path: &Path,
    normalize: bool,
    forward_fill: bool,
) -> Result<Panel, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<Observation>() {
        rows.push(result?);
    }
    let mut panel = Panel::from_observations(rows)?;
    if forward_fill {
        panel = panel.forward_fill();
    }
    if normalize {
        panel = zscore(&panel);
    }
    Ok(panel)
}

/// Load a pipeline configuration, falling back to the standard catalog.
fn load_config(path: Option<&Path>) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            Ok(serde_json::from_reader(file)?)
        }
        None => Ok(Catalog::standard().default_config()),
    }
}

fn parse_table_format(format: &str) -> Result<ExportFormat, Box<dyn std::error::Error>> {
    match format {
        "csv" => Ok(ExportFormat::Csv),
        "json" => Ok(ExportFormat::Json),
        other => Err(format!("unknown table format: {other} (expected csv or json)").into()),
    }
}

/// Write the score tables and the manifest into the output directory.
fn write_outputs(
    outcome: &PipelineOutcome,
    out_dir: &Path,
    format: ExportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(out_dir)?;

    let sub_table = SubIndexTable::from_scores(&outcome.sub_indices);
    let index_table = IndexTable::from_index(&outcome.index);

    let ext = format.extension();
    sub_table.export_to_file(&out_dir.join(format!("sub_indices.{ext}")), format)?;
    index_table.export_to_file(&out_dir.join(format!("index.{ext}")), format)?;
    outcome
        .manifest
        .export_to_file(&out_dir.join("manifest.json"), ExportFormat::PrettyJson)?;

    Ok(())
}

/// Print a one-line status per sub-index and the final-index shape.
fn print_summary(outcome: &PipelineOutcome) {
    for (sub_index, status) in &outcome.manifest.sub_indices {
        match status {
            SubIndexStatus::Ok { .. } => println!("{sub_index}: ok"),
            SubIndexStatus::Empty { .. } => {
                println!("{sub_index}: empty (no surviving country-years)");
            }
            SubIndexStatus::Failed { error } => println!("{sub_index}: failed ({error})"),
        }
    }
    if outcome.manifest.final_index_empty {
        println!("final index: empty");
    } else {
        println!(
            "final index: {} countries x {} years",
            outcome.index.countries().len(),
            outcome.index.dates().len()
        );
    }
}

/// Weight vectors of the sub-indices that produced an estimate.
fn estimated_weights(manifest: &RunManifest) -> BTreeMap<&SubIndexId, &WeightVector> {
    manifest
        .sub_indices
        .iter()
        .filter_map(|(sub_index, status)| match status {
            SubIndexStatus::Ok { weights } | SubIndexStatus::Empty { weights } => {
                Some((sub_index, weights))
            }
            SubIndexStatus::Failed { .. } => None,
        })
        .collect()
}

/// Print the estimated weights in text or JSON form.
fn print_weights(
    outcome: &PipelineOutcome,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => {
            println!(
                "{}",
                serde_json::to_string_pretty(&estimated_weights(&outcome.manifest))?
            );
        }
        "text" => {
            for (sub_index, status) in &outcome.manifest.sub_indices {
                match status {
                    SubIndexStatus::Ok { weights } | SubIndexStatus::Empty { weights } => {
                        println!("{sub_index}:");
                        for (variable, weight) in weights.iter() {
                            println!("  {variable}: {weight:.4}");
                        }
                    }
                    SubIndexStatus::Failed { error } => {
                        println!("{sub_index}: failed ({error})");
                    }
                }
            }
        }
        other => return Err(format!("unknown format: {other} (expected text or json)").into()),
    }
    Ok(())
}
