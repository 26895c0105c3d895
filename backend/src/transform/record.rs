//! Raw occurrence → Darwin Core record.
//!
//! Each term is filled from the first supplied source field (left to right in
//! the lists below) and passed through its normalizer. Failures only blank the
//! affected term.

use serde_json::Value;

use super::identity::build_occurrence_id;
use super::normalizers::{
    cell_text, ensure_wgs84, first_present, normalize_country_code, split_ymd, to_float, to_iso_date,
};
use crate::config::{BasisOfRecordMap, DEFAULT_DATASET_NAME};
use crate::models::{NormalizedRecord, RawOccurrence};

/// Taxonomic terms copied without transformation.
const TAXON_TERMS: [&str; 10] = [
    "scientificNameAuthorship",
    "taxonRank",
    "kingdom",
    "phylum",
    "class",
    "order",
    "family",
    "genus",
    "specificEpithet",
    "infraspecificEpithet",
];

/// Occurrence terms copied without transformation.
const OCCURRENCE_TERMS: [&str; 4] = ["recordNumber", "individualCount", "sex", "lifeStage"];

/// Place terms copied without transformation (locality has a fallback).
const PLACE_TERMS: [&str; 4] = ["municipality", "county", "stateProvince", "country"];

/// Provenance terms copied without transformation.
const PROVENANCE_TERMS: [&str; 4] = ["institutionCode", "collectionCode", "catalogNumber", "datasetID"];

/// `occurrenceStatus` when the source has none.
const DEFAULT_OCCURRENCE_STATUS: &str = "present";

/// Normalize one raw occurrence.
///
/// `occurrenceID` is computed last, over the normalized terms laid on top of
/// the raw record, so it sees cleaned dates and coordinates.
pub fn normalize_record(raw: &RawOccurrence, basis_of_record: &BasisOfRecordMap) -> NormalizedRecord {
    let mut out = NormalizedRecord::new();

    // Taxon
    copy_first(&mut out, raw, "scientificName", &["scientificName", "acceptedScientificName", "name"]);
    for term in TAXON_TERMS {
        copy_first(&mut out, raw, term, &[term]);
    }

    // Occurrence
    out.set_text("basisOfRecord", Some(basis_of_record.resolve(raw.get("basisOfRecord"))));
    copy_first(&mut out, raw, "recordedBy", &["recordedBy", "observer"]);
    let status = first_present(raw, &["occurrenceStatus"])
        .map(|v| cell_text(v).to_lowercase())
        .unwrap_or_else(|| DEFAULT_OCCURRENCE_STATUS.to_string());
    out.set_text("occurrenceStatus", Some(status));
    for term in OCCURRENCE_TERMS {
        copy_first(&mut out, raw, term, &[term]);
    }

    // Event
    let event_date = first_present(raw, &["eventDate", "date", "observationDate"]).and_then(to_iso_date);
    let parts = event_date.as_deref().and_then(split_ymd);
    out.set("year", parts.map_or(Value::Null, |(year, _, _)| Value::from(year)));
    out.set("month", parts.map_or(Value::Null, |(_, month, _)| Value::from(month)));
    out.set("day", parts.map_or(Value::Null, |(_, _, day)| Value::from(day)));
    out.set_text("eventDate", event_date);

    // Location
    out.set_float("decimalLatitude", first_present(raw, &["decimalLatitude", "lat"]).and_then(to_float));
    out.set_float("decimalLongitude", first_present(raw, &["decimalLongitude", "lon"]).and_then(to_float));
    out.set_float(
        "coordinateUncertaintyInMeters",
        first_present(raw, &["coordinateUncertaintyInMeters", "uncertainty"]).and_then(to_float),
    );
    out.set_text("geodeticDatum", Some(ensure_wgs84(raw.get("geodeticDatum"))));
    copy_first(&mut out, raw, "locality", &["locality", "place"]);
    for term in PLACE_TERMS {
        copy_first(&mut out, raw, term, &[term]);
    }
    out.set_text("countryCode", raw.get("countryCode").and_then(normalize_country_code));

    // Source / rights
    for term in PROVENANCE_TERMS {
        copy_first(&mut out, raw, term, &[term]);
    }
    let dataset = first_present(raw, &["datasetName"])
        .cloned()
        .unwrap_or_else(|| Value::String(DEFAULT_DATASET_NAME.to_string()));
    out.set("datasetName", dataset);
    copy_first(&mut out, raw, "license", &["license", "rights"]);
    copy_first(&mut out, raw, "references", &["references", "reference"]);

    // Identification
    copy_first(&mut out, raw, "identifiedBy", &["identifiedBy"]);
    out.set_text("dateIdentified", raw.get("dateIdentified").and_then(to_iso_date));

    let occurrence_id = build_occurrence_id(raw, &out);
    out.set_text("occurrenceID", Some(occurrence_id));
    out
}

/// Copy the first supplied source value verbatim, or null.
fn copy_first(out: &mut NormalizedRecord, raw: &RawOccurrence, term: &str, sources: &[&str]) {
    out.set(term, first_present(raw, sources).cloned().unwrap_or(Value::Null));
}

// =============================================================================
// Batches
// =============================================================================

/// Normalized records paired with the raw entries they came from.
#[derive(Debug)]
pub struct NormalizedBatch<'a> {
    /// `(raw, normalized)` in input order.
    pub records: Vec<(&'a RawOccurrence, NormalizedRecord)>,
    /// Input indices of entries that were not mappings.
    pub skipped: Vec<usize>,
}

impl NormalizedBatch<'_> {
    /// Normalized records only, in input order.
    pub fn normalized(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.records.iter().map(|(_, normalized)| normalized)
    }
}

/// Normalize every mapping entry, in order. Other entries are skipped.
pub fn normalize_all<'a>(entries: &'a [Value], basis_of_record: &BasisOfRecordMap) -> NormalizedBatch<'a> {
    let mut batch = NormalizedBatch { records: Vec::with_capacity(entries.len()), skipped: Vec::new() };

    for (index, entry) in entries.iter().enumerate() {
        match entry.as_object() {
            Some(raw) => batch.records.push((raw, normalize_record(raw, basis_of_record))),
            None => {
                tracing::debug!(index, "skipping non-mapping occurrence entry");
                batch.skipped.push(index);
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> NormalizedRecord {
        normalize_record(value.as_object().unwrap(), &BasisOfRecordMap::default())
    }

    #[test]
    fn test_minimal_plantnet_record() {
        let record = normalize(json!({"scientificName": "Iris japonica", "lat": -20.9, "lon": 55.3}));

        assert_eq!(record.get("decimalLatitude"), Some(&json!(-20.9)));
        assert_eq!(record.get("decimalLongitude"), Some(&json!(55.3)));
        assert_eq!(record.text("occurrenceStatus"), Some("present"));
        assert_eq!(record.text("basisOfRecord"), Some("HUMAN_OBSERVATION"));
        assert_eq!(record.text("geodeticDatum"), Some("WGS84"));
        assert_eq!(record.text("datasetName"), Some(DEFAULT_DATASET_NAME));
        assert!(record.occurrence_id().is_some());
    }

    #[test]
    fn test_scientific_name_fallbacks() {
        assert_eq!(
            normalize(json!({"acceptedScientificName": "Aciotis purpurascens", "name": "x"})).text("scientificName"),
            Some("Aciotis purpurascens")
        );
        assert_eq!(
            normalize(json!({"scientificName": "", "name": "Iris japonica"})).text("scientificName"),
            Some("Iris japonica")
        );
        assert_eq!(normalize(json!({})).get("scientificName"), Some(&Value::Null));
    }

    #[test]
    fn test_event_date_derives_year_month_day() {
        let record = normalize(json!({"date": "2024-03-15"}));
        assert_eq!(record.text("eventDate"), Some("2024-03-15"));
        assert_eq!(record.get("year"), Some(&json!(2024)));
        assert_eq!(record.get("month"), Some(&json!(3)));
        assert_eq!(record.get("day"), Some(&json!(15)));
    }

    #[test]
    fn test_naive_timestamp_event_date() {
        let record = normalize(json!({"observationDate": "2024-03-15T10:00:00"}));
        assert_eq!(record.text("eventDate"), Some("2024-03-15T10:00:00Z"));
        assert_eq!(record.get("day"), Some(&json!(15)));
    }

    #[test]
    fn test_unparseable_date_nulls_parts() {
        let record = normalize(json!({"eventDate": "spring 2024", "year": "bogus"}));
        assert_eq!(record.get("eventDate"), Some(&Value::Null));
        assert_eq!(record.get("year"), Some(&Value::Null));

        let shaped = normalize(json!({"eventDate": "2024-XX-01", "month": 99}));
        assert_eq!(shaped.text("eventDate"), Some("2024-XX-01"));
        assert_eq!(shaped.get("year"), Some(&Value::Null));
        assert_eq!(shaped.get("month"), Some(&Value::Null));
        assert_eq!(shaped.get("day"), Some(&Value::Null));
    }

    #[test]
    fn test_basis_of_record_and_status() {
        let record = normalize(json!({"basisOfRecord": "Photo", "occurrenceStatus": "ABSENT"}));
        assert_eq!(record.text("basisOfRecord"), Some("HUMAN_OBSERVATION"));
        assert_eq!(record.text("occurrenceStatus"), Some("absent"));

        let unknown = normalize(json!({"basisOfRecord": "unknown_value"}));
        assert_eq!(unknown.text("basisOfRecord"), Some("HUMAN_OBSERVATION"));
    }

    #[test]
    fn test_location_terms() {
        let record = normalize(json!({
            "decimalLatitude": "-21.1",
            "lat": -99,
            "uncertainty": "15",
            "geodeticDatum": "NAD83",
            "place": "Cilaos",
            "countryCode": " re ",
            "country": "France"
        }));
        assert_eq!(record.get("decimalLatitude"), Some(&json!(-21.1)));
        assert_eq!(record.get("decimalLongitude"), Some(&Value::Null));
        assert_eq!(record.get("coordinateUncertaintyInMeters"), Some(&json!(15.0)));
        assert_eq!(record.text("geodeticDatum"), Some("NAD83"));
        assert_eq!(record.text("locality"), Some("Cilaos"));
        assert_eq!(record.text("countryCode"), Some("RE"));
        assert_eq!(record.text("country"), Some("France"));
    }

    #[test]
    fn test_rights_and_identification() {
        let record = normalize(json!({
            "rights": "CC-BY-SA",
            "reference": "https://identify.plantnet.org/x",
            "observer": "A. Payet",
            "identifiedBy": "Pl@ntNet",
            "dateIdentified": "2024/03/20"
        }));
        assert_eq!(record.text("license"), Some("CC-BY-SA"));
        assert_eq!(record.text("references"), Some("https://identify.plantnet.org/x"));
        assert_eq!(record.text("recordedBy"), Some("A. Payet"));
        assert_eq!(record.text("identifiedBy"), Some("Pl@ntNet"));
        assert_eq!(record.text("dateIdentified"), Some("2024-03-20"));
    }

    #[test]
    fn test_source_identifier_passthrough() {
        assert_eq!(normalize(json!({"occurrenceID": "PN-1"})).occurrence_id(), Some("PN-1"));
        assert_eq!(normalize(json!({"id": "abc-42"})).occurrence_id(), Some("abc-42"));
    }

    #[test]
    fn test_identifier_uses_normalized_values() {
        let slashed = normalize(json!({"scientificName": "Iris japonica", "eventDate": "2024/03/15", "lat": "-20.9"}));
        let clean = normalize(json!({"scientificName": "Iris japonica", "eventDate": "2024-03-15", "lat": -20.9}));
        assert_eq!(slashed.occurrence_id(), clean.occurrence_id());
    }

    #[test]
    fn test_normalize_all_skips_non_mappings() {
        let entries = vec![json!({"id": "a"}), json!("stray"), json!(null), json!({"id": "b"})];
        let batch = normalize_all(&entries, &BasisOfRecordMap::default());

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped, vec![1, 2]);
        let ids: Vec<_> = batch.normalized().filter_map(NormalizedRecord::occurrence_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
