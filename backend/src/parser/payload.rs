//! Locate the occurrence list inside an arbitrarily shaped API response.

use serde_json::Value;

/// Container keys searched in a mapping root, in priority order.
pub const CONTAINER_KEYS: [&str; 5] = ["occurrences", "records", "results", "data", "items"];

/// Extract the occurrence entries from a decoded JSON root.
///
/// - a list is returned as-is;
/// - a mapping yields the first container key whose value is a list;
/// - a non-empty mapping without such a key is one record on its own;
/// - anything else yields nothing.
///
/// Entries are not checked here: non-mapping items are dropped later by the
/// exporter.
///
/// # Example
/// ```
/// use serde_json::json;
/// use dwcexport::parser::find_occurrence_list;
///
/// let found = find_occurrence_list(json!({"results": [{"scientificName": "Iris japonica"}]}));
/// assert_eq!(found.len(), 1);
/// ```
pub fn find_occurrence_list(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut root) => {
            for key in CONTAINER_KEYS {
                if let Some(Value::Array(_)) = root.get(key) {
                    if let Some(Value::Array(items)) = root.remove(key) {
                        return items;
                    }
                }
            }
            if root.is_empty() {
                Vec::new()
            } else {
                vec![Value::Object(root)]
            }
        }
        _ => Vec::new(),
    }
}
