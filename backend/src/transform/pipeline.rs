//! High-level pipeline: raw JSON file → Darwin Core CSV.
//!
//! # Example
//!
//! ```rust,no_run
//! use dwcexport::transform::pipeline::{dwc_normalize_to_csv, ExportOptions, PipelineOutcome};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ExportOptions::new("memory/plantnet_raw_reunion.json", "memory/occurrences.csv")
//!         .with_config_dir("config");
//!
//!     match dwc_normalize_to_csv(&options)? {
//!         PipelineOutcome::Exported { summary, .. } => println!("{} rows", summary.rows_written),
//!         PipelineOutcome::NoOccurrences => println!("nothing to export"),
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::ExportConfig;
use crate::error::PipelineResult;
use crate::export::export_csv_file;
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::models::ExportSummary;
use crate::parser::{find_occurrence_list, read_raw_json};

/// Options for one export run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Raw occurrence JSON written by the fetch step
    pub input: PathBuf,

    /// CSV file to create or overwrite
    pub output: PathBuf,

    /// Directory holding `dwc_core_fields.json` / `basis_of_record_map.json`
    pub config_dir: Option<PathBuf>,
}

impl ExportOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            config_dir: None,
        }
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PipelineOutcome {
    /// The CSV was written.
    Exported { path: PathBuf, summary: ExportSummary },
    /// No occurrences were found; no file was written.
    NoOccurrences,
}

/// Run the full pipeline.
///
/// 1. Read the raw JSON (missing file or bad JSON aborts the run)
/// 2. Extract the occurrence list
/// 3. Stop without writing anything if it is empty
/// 4. Load the configuration (each file falls back to its default)
/// 5. Normalize and write the CSV
/// 6. Report counts
pub fn dwc_normalize_to_csv(options: &ExportOptions) -> PipelineResult<PipelineOutcome> {
    log_info(format!("Reading raw occurrences: {}", options.input.display()));
    let payload = read_raw_json(&options.input).map_err(|e| {
        log_error(format!("Cannot load raw occurrences: {e}"));
        e
    })?;

    let occurrences = find_occurrence_list(payload);
    if occurrences.is_empty() {
        log_warning("No occurrences detected, nothing written");
        return Ok(PipelineOutcome::NoOccurrences);
    }

    let config = ExportConfig::load(options.config_dir.as_deref());
    let summary = export_occurrences(&occurrences, &options.output, &config)?;

    log_success(format!("CSV written: {}", options.output.display()));
    log_info(format!("Occurrences: {}", occurrences.len()));
    log_info_indent(summary.summary(), 1);
    log_info(format!(
        "Config → DwC fields: {} | basisOfRecord map: {}",
        config.fields.len(),
        config.basis_of_record.len()
    ));

    Ok(PipelineOutcome::Exported {
        path: options.output.clone(),
        summary,
    })
}

/// Export already-extracted occurrences with a loaded configuration.
pub fn export_occurrences(
    occurrences: &[Value],
    output: &Path,
    config: &ExportConfig,
) -> PipelineResult<ExportSummary> {
    let summary = export_csv_file(occurrences, output, &config.fields, &config.basis_of_record).map_err(|e| {
        log_error(format!("Cannot write {}: {e}", output.display()));
        e
    })?;
    if summary.skipped > 0 {
        log_warning(format!("{} entries skipped (not JSON objects)", summary.skipped));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InputError, PipelineError};
    use tempfile::TempDir;

    #[test]
    fn test_options_builder() {
        let opts = ExportOptions::new("raw.json", "out.csv").with_config_dir("config");
        assert_eq!(opts.input, PathBuf::from("raw.json"));
        assert_eq!(opts.config_dir, Some(PathBuf::from("config")));
    }

    #[test]
    fn test_empty_list_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("raw.json");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "[]").unwrap();

        let outcome = dwc_normalize_to_csv(&ExportOptions::new(&input, &output)).unwrap();
        assert_eq!(outcome, PipelineOutcome::NoOccurrences);
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.csv");
        let err = dwc_normalize_to_csv(&ExportOptions::new(dir.path().join("nope.json"), &output)).unwrap_err();

        assert!(matches!(err, PipelineError::Input(InputError::NotFound(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_unwritable_output_is_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = export_occurrences(
            &[serde_json::json!({"id": "a"})],
            &blocker.join("occurrences.csv"),
            &ExportConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Export(_)));
    }

    #[test]
    fn test_export_with_results_container() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("raw.json");
        let output = dir.path().join("out").join("occurrences.csv");
        std::fs::write(&input, r#"{"results": [{"scientificName": "Iris japonica", "lat": -20.9, "lon": 55.3}, 7]}"#)
            .unwrap();

        match dwc_normalize_to_csv(&ExportOptions::new(&input, &output)).unwrap() {
            PipelineOutcome::Exported { path, summary } => {
                assert_eq!(path, output);
                assert_eq!(summary.rows_written, 1);
                assert_eq!(summary.skipped, 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(output.exists());
    }
}
