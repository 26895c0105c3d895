//! Normalization module.
//!
//! This module turns raw occurrences into Darwin Core records:
//! - Normalizers: dates, numbers, country codes, geodetic datum
//! - Identity: stable `occurrenceID`
//! - Record: per-record field mapping
//! - Pipeline: file in, CSV out

pub mod identity;
pub mod normalizers;
pub mod pipeline;
pub mod record;

pub use identity::build_occurrence_id;
pub use normalizers::{ensure_wgs84, normalize_country_code, to_float, to_iso_date};
pub use pipeline::*;
pub use record::{normalize_all, normalize_record, NormalizedBatch};
