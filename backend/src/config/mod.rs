//! Export configuration: the core column list and the basis-of-record map.
//!
//! Both come from optional JSON files in a configuration directory and each
//! falls back to a built-in default on its own when the file is missing,
//! unreadable or has the wrong shape. Values are loaded once per run and
//! passed down explicitly.

use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::logs::{log_info, log_warning};
use crate::transform::normalizers::as_text;
use crate::validation::{validate_basis_of_record_map, validate_core_fields};

/// File holding the ordered core column list.
pub const CORE_FIELDS_FILE: &str = "dwc_core_fields.json";

/// File holding the basis-of-record vocabulary map.
pub const BASIS_OF_RECORD_FILE: &str = "basis_of_record_map.json";

/// Environment variable naming the configuration directory.
pub const CONFIG_DIR_ENV: &str = "DWCEXPORT_CONFIG_DIR";

/// `datasetName` used when the source has none.
pub const DEFAULT_DATASET_NAME: &str = "Pl@ntNet Occurrences";

/// `basisOfRecord` used when the source label is absent or unmapped.
pub const DEFAULT_BASIS_OF_RECORD: &str = "HUMAN_OBSERVATION";

/// Built-in Darwin Core columns, in export order.
pub const DEFAULT_DWC_CORE_FIELDS: [&str; 43] = [
    "occurrenceID", "basisOfRecord", "institutionCode", "collectionCode",
    "catalogNumber", "recordNumber", "recordedBy",
    "eventDate", "year", "month", "day",
    "country", "countryCode", "stateProvince", "county", "municipality",
    "locality", "decimalLatitude", "decimalLongitude", "coordinateUncertaintyInMeters",
    "geodeticDatum",
    "occurrenceStatus", "individualCount", "sex", "lifeStage",
    "identifiedBy", "dateIdentified",
    "scientificName", "scientificNameAuthorship", "taxonRank",
    "kingdom", "phylum", "class", "order", "family", "genus",
    "specificEpithet", "infraspecificEpithet",
    "datasetID", "datasetName", "license", "references",
    "associatedMedia",
];

/// Built-in provenance labels → GBIF `basisOfRecord` terms.
pub const DEFAULT_BASIS_OF_RECORD_MAP: [(&str, &str); 9] = [
    ("human_observation", "HUMAN_OBSERVATION"),
    ("observation", "OBSERVATION"),
    ("machine_observation", "MACHINE_OBSERVATION"),
    ("preserved_specimen", "PRESERVED_SPECIMEN"),
    ("living_specimen", "LIVING_SPECIMEN"),
    ("material_sample", "MATERIAL_SAMPLE"),
    // labels common in consumer apps
    ("photograph", "HUMAN_OBSERVATION"),
    ("photo", "HUMAN_OBSERVATION"),
    ("image", "MACHINE_OBSERVATION"),
];

// =============================================================================
// Field Schema
// =============================================================================

/// Ordered, duplicate-free list of core export columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldSchema {
    fields: Vec<String>,
    #[serde(skip)]
    members: HashSet<String>,
}

impl FieldSchema {
    /// Build from names in order. Repeated names keep their first position.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self { fields: Vec::new(), members: HashSet::new() };
        for field in fields {
            let field = field.into();
            if schema.members.insert(field.clone()) {
                schema.fields.push(field);
            }
        }
        schema
    }

    /// Exact-string membership.
    pub fn contains(&self, field: &str) -> bool {
        self.members.contains(field)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::from_fields(DEFAULT_DWC_CORE_FIELDS)
    }
}

// =============================================================================
// Basis of Record Map
// =============================================================================

/// Lower-case provenance labels mapped to GBIF `basisOfRecord` terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BasisOfRecordMap {
    terms: HashMap<String, String>,
}

impl BasisOfRecordMap {
    /// Build from `(label, term)` pairs. Labels are lower-cased.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let terms = pairs
            .into_iter()
            .map(|(label, term)| (label.as_ref().to_lowercase(), term.into()))
            .collect();
        Self { terms }
    }

    /// Map a raw `basisOfRecord` value to a GBIF term.
    ///
    /// The label is trimmed and lower-cased; anything unmapped (including a
    /// missing value) resolves to `HUMAN_OBSERVATION`.
    pub fn resolve(&self, raw: Option<&Value>) -> String {
        let label = raw
            .and_then(as_text)
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();
        self.terms
            .get(&label)
            .cloned()
            .unwrap_or_else(|| DEFAULT_BASIS_OF_RECORD.to_string())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for BasisOfRecordMap {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_BASIS_OF_RECORD_MAP)
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Where a configuration value came from.
#[derive(Debug)]
pub enum ConfigSource {
    /// No configuration directory was given.
    BuiltIn,
    /// Loaded from this file.
    File(PathBuf),
    /// The file could not be used; the default was substituted.
    Fallback(ConfigError),
}

impl ConfigSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ConfigSource::Fallback(_))
    }

    /// Short label for logs and the `fields` command.
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::BuiltIn => "built-in defaults".to_string(),
            ConfigSource::File(path) => path.display().to_string(),
            ConfigSource::Fallback(reason) => format!("defaults ({reason})"),
        }
    }
}

/// Schema and vocabulary for one export run.
#[derive(Debug)]
pub struct ExportConfig {
    pub fields: FieldSchema,
    pub basis_of_record: BasisOfRecordMap,
    pub fields_source: ConfigSource,
    pub basis_of_record_source: ConfigSource,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fields: FieldSchema::default(),
            basis_of_record: BasisOfRecordMap::default(),
            fields_source: ConfigSource::BuiltIn,
            basis_of_record_source: ConfigSource::BuiltIn,
        }
    }
}

impl ExportConfig {
    /// Load both files from `config_dir`, or use defaults when it is `None`.
    ///
    /// Never fails: every problem is logged and replaced by the default.
    pub fn load(config_dir: Option<&Path>) -> Self {
        let Some(dir) = config_dir else {
            return Self::default();
        };

        let (fields, fields_source) = match read_document(&dir.join(CORE_FIELDS_FILE), validate_core_fields) {
            Ok((path, doc)) => (FieldSchema::from_fields(string_items(&doc)), ConfigSource::File(path)),
            Err(reason) => (FieldSchema::default(), ConfigSource::Fallback(reason)),
        };

        let (basis_of_record, basis_of_record_source) =
            match read_document(&dir.join(BASIS_OF_RECORD_FILE), validate_basis_of_record_map) {
                Ok((path, doc)) => (BasisOfRecordMap::from_pairs(string_entries(&doc)), ConfigSource::File(path)),
                Err(reason) => (BasisOfRecordMap::default(), ConfigSource::Fallback(reason)),
            };

        let config = Self { fields, basis_of_record, fields_source, basis_of_record_source };
        config.log_sources();
        config
    }

    fn log_sources(&self) {
        for source in [&self.fields_source, &self.basis_of_record_source] {
            match source {
                ConfigSource::Fallback(reason @ ConfigError::Missing(_)) => {
                    log_info(format!("{reason} → defaults"));
                }
                ConfigSource::Fallback(reason) => log_warning(format!("{reason} → defaults")),
                ConfigSource::File(path) => log_info(format!("Config loaded: {}", path.display())),
                ConfigSource::BuiltIn => {}
            }
        }
    }
}

/// Read, parse and shape-check one configuration document.
fn read_document(
    path: &Path,
    check: fn(&Value) -> Result<(), Vec<String>>,
) -> Result<(PathBuf, Value), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::Missing(path.to_path_buf())
        } else {
            ConfigError::Unreadable { path: path.to_path_buf(), source }
        }
    })?;

    let doc: Value = serde_json::from_str(&content)
        .map_err(|source| ConfigError::InvalidJson { path: path.to_path_buf(), source })?;

    check(&doc).map_err(|errors| ConfigError::ShapeMismatch { path: path.to_path_buf(), errors })?;

    Ok((path.to_path_buf(), doc))
}

fn string_items(doc: &Value) -> Vec<String> {
    doc.as_array()
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

fn string_entries(doc: &Value) -> Vec<(String, String)> {
    doc.as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|term| (k.clone(), term.to_string())))
                .collect()
        })
        .unwrap_or_default()
}
