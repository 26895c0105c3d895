//! JSON Schema validation for configuration documents.
//!
//! Both optional configuration files are checked against a Draft 7 schema
//! before use, so a list-where-a-mapping-was-expected (or the reverse) is
//! reported with a readable message instead of failing later.
//!
//! # Embedded Schemas
//!
//! Schemas are embedded at compile time from `schemas/` directory:
//! - `dwc-core-fields.json`
//! - `basis-of-record-map.json`
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use dwcexport::validation::{validate_core_fields, is_valid_basis_of_record_map};
//!
//! assert!(validate_core_fields(&json!(["occurrenceID", "eventDate"])).is_ok());
//! assert!(!is_valid_basis_of_record_map(&json!(["photo"])));
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static CORE_FIELDS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/dwc-core-fields.json"))
        .expect("Invalid embedded schema")
});

static BASIS_OF_RECORD_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/basis-of-record-map.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
///
/// # Example
/// ```
/// use serde_json::json;
/// use dwcexport::validation::validate;
///
/// let schema = json!({ "type": "array", "items": { "type": "string" } });
///
/// assert!(validate(&schema, &json!(["scientificName"])).is_ok());
/// assert!(validate(&schema, &json!({ "scientificName": 1 })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Boolean form of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a core field list document (array of non-empty strings).
pub fn validate_core_fields(data: &Value) -> Result<(), Vec<String>> {
    validate(&CORE_FIELDS_SCHEMA, data)
}

/// Quick check for a core field list document.
pub fn is_valid_core_fields(data: &Value) -> bool {
    is_valid(&CORE_FIELDS_SCHEMA, data)
}

/// Validate a basis-of-record map document (object of string → string).
pub fn validate_basis_of_record_map(data: &Value) -> Result<(), Vec<String>> {
    validate(&BASIS_OF_RECORD_SCHEMA, data)
}

/// Quick check for a basis-of-record map document.
pub fn is_valid_basis_of_record_map(data: &Value) -> bool {
    is_valid(&BASIS_OF_RECORD_SCHEMA, data)
}
