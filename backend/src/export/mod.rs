//! Darwin Core CSV export.
//!
//! The header is the configured core columns followed by every other key seen
//! in the raw records (first-seen order). Each row takes normalized values
//! first; a raw value only fills a column the normalizer did not produce, so
//! source data never overwrites a normalized term.
//!
//! ```text
//! raw entries ──▶ normalize_all ──▶ (raw, normalized) pairs ──▶ rows ──▶ CSV
//!      │                                                         ▲
//!      └──────────────▶ collect_extra_fields ────────────────────┘
//! ```

use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::{BasisOfRecordMap, FieldSchema};
use crate::error::ExportResult;
use crate::models::{ExportSummary, NormalizedRecord, OutputRow, RawOccurrence};
use crate::transform::normalizers::cell_text;
use crate::transform::record::{normalize_all, NormalizedBatch};

/// Keys present in raw mapping entries but not in the schema.
///
/// First-seen order across all entries; membership is exact-string.
pub fn collect_extra_fields(entries: &[Value], schema: &FieldSchema) -> Vec<String> {
    let mut extras: Vec<String> = Vec::new();
    for raw in entries.iter().filter_map(Value::as_object) {
        for key in raw.keys() {
            if !schema.contains(key) && !extras.iter().any(|seen| seen == key) {
                extras.push(key.clone());
            }
        }
    }
    extras
}

/// Header row: schema columns, then extras.
pub fn build_header(schema: &FieldSchema, extras: &[String]) -> Vec<String> {
    schema.iter().map(str::to_string).chain(extras.iter().cloned()).collect()
}

/// Value for one column of one record.
///
/// A term the normalizer produced wins, even when it is null. Otherwise the
/// raw value of the same key is used; lists and mappings become compact JSON.
pub fn render_cell(normalized: &NormalizedRecord, raw: &RawOccurrence, column: &str) -> String {
    if normalized.contains(column) {
        normalized.get(column).map(cell_text).unwrap_or_default()
    } else {
        raw.get(column).map(cell_text).unwrap_or_default()
    }
}

/// Render every normalized record against `header`.
pub fn build_rows(batch: &NormalizedBatch<'_>, header: &[String]) -> Vec<OutputRow> {
    batch
        .records
        .iter()
        .map(|(raw, normalized)| header.iter().map(|column| render_cell(normalized, raw, column)).collect())
        .collect()
}

/// Write header and rows as UTF-8 CSV (no BOM, `\n` line endings).
pub fn write_csv<W: Write>(writer: W, header: &[String], rows: &[OutputRow]) -> ExportResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Normalize `entries` and write the Darwin Core CSV to `writer`.
///
/// Entries that are not mappings are skipped and counted.
pub fn export_dwc_csv<W: Write>(
    entries: &[Value],
    writer: W,
    schema: &FieldSchema,
    basis_of_record: &BasisOfRecordMap,
) -> ExportResult<ExportSummary> {
    let batch = normalize_all(entries, basis_of_record);
    let extras = collect_extra_fields(entries, schema);
    let header = build_header(schema, &extras);
    let rows = build_rows(&batch, &header);

    write_csv(writer, &header, &rows)?;

    Ok(ExportSummary {
        rows_written: rows.len(),
        skipped: batch.skipped.len(),
        core_columns: schema.len(),
        extra_columns: extras.len(),
        columns: header,
    })
}

/// Export to a file.
///
/// The whole CSV is rendered in memory first; the parent directory is created
/// if needed and the file is written in a single call.
pub fn export_csv_file(
    entries: &[Value],
    path: &Path,
    schema: &FieldSchema,
    basis_of_record: &BasisOfRecordMap,
) -> ExportResult<ExportSummary> {
    let mut buffer = Vec::new();
    let summary = export_dwc_csv(entries, &mut buffer, schema, basis_of_record)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, buffer)?;
    Ok(summary)
}
