//! Domain models for the Darwin Core export pipeline.
//!
//! - [`RawOccurrence`] - One source record, any JSON shape, never mutated
//! - [`NormalizedRecord`] - Canonical Darwin Core view of one occurrence
//! - [`OutputRow`] - One rendered CSV line, aligned with the header
//! - [`ExportSummary`] - Counts reported after an export

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw occurrence as produced by the fetch step.
///
/// Keys keep their source order; values are arbitrary JSON.
pub type RawOccurrence = Map<String, Value>;

/// One CSV data line. Cells are aligned with the export header.
pub type OutputRow = Vec<String>;

// =============================================================================
// Normalized Record
// =============================================================================

/// Canonical Darwin Core record.
///
/// Holds every term the normalizer owns, always including `year`/`month`/`day`.
/// A term mapped to `Value::Null` had no usable value and is exported empty.
/// A term missing entirely has no normalizer at all (`associatedMedia`, for
/// example); only those columns are filled from the raw record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedRecord(Map<String, Value>);

impl NormalizedRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Set a term, replacing any previous value.
    pub fn set(&mut self, term: &str, value: Value) {
        self.0.insert(term.to_string(), value);
    }

    /// Set a term from an optional string (`None` becomes null).
    pub fn set_text(&mut self, term: &str, value: Option<String>) {
        self.set(term, value.map(Value::String).unwrap_or(Value::Null));
    }

    /// Set a term from an optional float (`None` becomes null).
    pub fn set_float(&mut self, term: &str, value: Option<f64>) {
        let value = value
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        self.set(term, value);
    }

    pub fn get(&self, term: &str) -> Option<&Value> {
        self.0.get(term)
    }

    /// Whether the normalizer produced this term (even as null).
    pub fn contains(&self, term: &str) -> bool {
        self.0.contains_key(term)
    }

    /// String value of a term, if it is a string.
    pub fn text(&self, term: &str) -> Option<&str> {
        self.0.get(term).and_then(Value::as_str)
    }

    /// The stable identifier. Always present on records built by
    /// [`crate::transform::record::normalize_record`].
    pub fn occurrence_id(&self) -> Option<&str> {
        self.text("occurrenceID")
    }
}

// =============================================================================
// Export Summary
// =============================================================================

/// Observability counts for one export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    /// Data rows written (one per mapping-shaped input entry).
    pub rows_written: usize,
    /// Input entries that were not mappings and were dropped.
    pub skipped: usize,
    /// Full header, schema columns first.
    pub columns: Vec<String>,
    /// Number of schema columns at the start of `columns`.
    pub core_columns: usize,
    /// Number of extra columns after the schema columns.
    pub extra_columns: usize,
}

impl ExportSummary {
    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} rows, {} skipped, {} columns ({} core + {} extra)",
            self.rows_written,
            self.skipped,
            self.columns.len(),
            self.core_columns,
            self.extra_columns
        )
    }
}
