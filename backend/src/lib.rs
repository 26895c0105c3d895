//! # dwcexport - Darwin Core normalization and CSV export
//!
//! dwcexport turns raw biodiversity occurrence records (as returned by the
//! Pl@ntNet API, or anything shaped like them) into a GBIF-compatible
//! Darwin Core CSV.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Raw JSON   │────▶│   Parser    │────▶│  Normalize  │────▶│  DwC CSV    │
//! │ (any shape) │     │ (+ extract) │     │ (per record)│     │ (core+extra)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dwcexport::{dwc_normalize_to_csv, ExportOptions};
//!
//! let options = ExportOptions::new("memory/raw.json", "memory/occurrences.csv");
//! let outcome = dwc_normalize_to_csv(&options).unwrap();
//! println!("{outcome:?}");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Raw and normalized records, export summary
//! - [`parser`] - Input decoding and occurrence list extraction
//! - [`transform`] - Field normalizers, identifiers, record mapping, pipeline
//! - [`config`] - Core column list and basis-of-record map
//! - [`validation`] - Configuration shape checks
//! - [`export`] - CSV writer
//! - [`logs`] - Pipeline log helpers

// Core modules
pub mod error;
pub mod models;

// Input
pub mod parser;

// Normalization
pub mod transform;

// Configuration
pub mod config;
pub mod validation;

// Output
pub mod export;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, ExportError, InputError, PipelineError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{ExportSummary, NormalizedRecord, OutputRow, RawOccurrence};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{decode_content, detect_encoding, find_occurrence_list, read_raw_json};

// =============================================================================
// Re-exports - Normalization
// =============================================================================

pub use transform::{
    build_occurrence_id, ensure_wgs84, normalize_all, normalize_country_code, normalize_record,
    to_float, to_iso_date, NormalizedBatch,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{BasisOfRecordMap, ConfigSource, ExportConfig, FieldSchema};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{collect_extra_fields, export_csv_file, export_dwc_csv};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{dwc_normalize_to_csv, export_occurrences, ExportOptions, PipelineOutcome};
