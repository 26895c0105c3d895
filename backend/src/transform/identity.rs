//! Stable `occurrenceID` generation.
//!
//! A source identifier is reused verbatim. Otherwise a UUID v5 (URL namespace)
//! is derived from the normalized scientific name, event date, coordinates and
//! dataset name, so re-exporting the same data yields the same identifiers.

use serde_json::Value;
use uuid::Uuid;

use super::normalizers::{cell_text, is_present};
use crate::config::DEFAULT_DATASET_NAME;
use crate::models::{NormalizedRecord, RawOccurrence};

/// Separator between seed components.
const SEED_SEPARATOR: &str = "|";

/// Source fields that already identify an occurrence, in priority order.
const SOURCE_ID_FIELDS: [&str; 2] = ["occurrenceID", "id"];

/// Build the identifier for a record.
///
/// `normalized` overlays `raw`: a term the normalizer produced is read from
/// `normalized`, everything else from `raw`.
pub fn build_occurrence_id(raw: &RawOccurrence, normalized: &NormalizedRecord) -> String {
    if let Some(existing) = SOURCE_ID_FIELDS
        .iter()
        .filter_map(|field| lookup(raw, normalized, field))
        .find(|value| is_present(value))
    {
        return cell_text(existing);
    }

    let part = |term: &str| lookup(raw, normalized, term).map(cell_text).unwrap_or_default();
    let dataset = lookup(raw, normalized, "datasetName")
        .filter(|v| is_present(v))
        .map(cell_text)
        .unwrap_or_else(|| DEFAULT_DATASET_NAME.to_string());

    let seed = [
        part("scientificName"),
        part("eventDate"),
        part("decimalLatitude"),
        part("decimalLongitude"),
        dataset,
    ]
    .join(SEED_SEPARATOR);

    Uuid::new_v5(&Uuid::NAMESPACE_URL, seed.as_bytes()).to_string()
}

fn lookup<'a>(raw: &'a RawOccurrence, normalized: &'a NormalizedRecord, term: &str) -> Option<&'a Value> {
    if normalized.contains(term) {
        normalized.get(term)
    } else {
        raw.get(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawOccurrence {
        value.as_object().cloned().unwrap()
    }

    fn seeded(name: &str, date: &str, lat: f64, lon: f64) -> NormalizedRecord {
        let mut record = NormalizedRecord::new();
        record.set_text("scientificName", Some(name.into()));
        record.set_text("eventDate", Some(date.into()));
        record.set_float("decimalLatitude", Some(lat));
        record.set_float("decimalLongitude", Some(lon));
        record.set_text("datasetName", Some(DEFAULT_DATASET_NAME.into()));
        record
    }

    #[test]
    fn test_source_occurrence_id_is_reused() {
        let id = build_occurrence_id(&raw(json!({"occurrenceID": "urn:x:1", "id": 7})), &NormalizedRecord::new());
        assert_eq!(id, "urn:x:1");
    }

    #[test]
    fn test_numeric_id_is_reused_as_text() {
        let id = build_occurrence_id(&raw(json!({"occurrenceID": "", "id": 1234})), &NormalizedRecord::new());
        assert_eq!(id, "1234");
    }

    #[test]
    fn test_derived_id_is_deterministic() {
        let normalized = seeded("Iris japonica", "2024-03-15", -20.9, 55.3);
        let a = build_occurrence_id(&raw(json!({})), &normalized);
        let b = build_occurrence_id(&raw(json!({})), &normalized.clone());
        assert_eq!(a, b);
        assert_eq!(Uuid::parse_str(&a).unwrap().get_version_num(), 5);
    }

    #[test]
    fn test_derived_id_matches_seed() {
        let normalized = seeded("Iris japonica", "2024-03-15", -20.9, 55.0);
        let expected = Uuid::new_v5(
            &Uuid::NAMESPACE_URL,
            b"Iris japonica|2024-03-15|-20.9|55.0|Pl@ntNet Occurrences",
        );
        assert_eq!(build_occurrence_id(&raw(json!({})), &normalized), expected.to_string());
    }

    #[test]
    fn test_any_seed_difference_changes_id() {
        let base = build_occurrence_id(&raw(json!({})), &seeded("Iris japonica", "2024-03-15", -20.9, 55.3));
        let other_date = build_occurrence_id(&raw(json!({})), &seeded("Iris japonica", "2024-03-16", -20.9, 55.3));
        let other_lon = build_occurrence_id(&raw(json!({})), &seeded("Iris japonica", "2024-03-15", -20.9, 55.4));
        assert_ne!(base, other_date);
        assert_ne!(base, other_lon);
    }

    #[test]
    fn test_normalized_values_shadow_raw() {
        let source = raw(json!({"eventDate": "2024/03/15"}));
        let normalized = seeded("Iris japonica", "2024-03-15", -20.9, 55.3);
        let from_normalized = build_occurrence_id(&source, &normalized);
        let from_clean_raw = build_occurrence_id(&raw(json!({"eventDate": "2024-03-15"})), &normalized);
        assert_eq!(from_normalized, from_clean_raw);
    }
}
