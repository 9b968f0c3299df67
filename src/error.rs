//! Error types for the census transform.
//!
//! - [`LoadError`] - CSV ingestion errors
//! - [`ClassificationError`] - wide column names that violate the
//!   `<CROP> <METRIC> [unit]` naming convention
//! - [`TransformError`] - structural violations during reshape, fact
//!   assembly and dimension extraction
//!
//! Every variant is unrecoverable at the point of detection: the run aborts
//! rather than producing a partial star schema. Conversions are automatic via
//! `From` so `?` works across layer boundaries.

use crate::types::Metric;
use thiserror::Error;

/// Errors while ingesting the wide CSV into a typed `WideTable`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("identity column '{0}' not found in header")]
    MissingIdentityColumn(&'static str),

    #[error("row {row}: cannot parse Year from '{value}'")]
    BadYear { row: usize, value: String },

    #[error("row {row}, column '{column}': cannot parse number from '{value}'")]
    BadNumber {
        row: usize,
        column: String,
        value: String,
    },
}

/// A wide column name that does not classify into exactly one
/// (crop, metric) pair.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassificationError {
    /// No metric token (AREA, PRODUCTION, YIELD) in the column name.
    #[error("column '{column}' contains no metric token (AREA, PRODUCTION or YIELD)")]
    NoMetricFound { column: String },

    /// More than one metric token matched. The naming convention forbids
    /// this; picking one silently would hide a schema defect.
    #[error("column '{column}' matches more than one metric token: {matched:?}")]
    AmbiguousMetric { column: String, matched: Vec<Metric> },
}

/// Structural violations detected while building the star schema.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    /// Two measurements for one (district, year, state, crop, metric).
    /// Indicates a duplicated measure column or a duplicated source row.
    #[error(
        "duplicate {metric} measurement for crop '{crop}' \
         (district {dist_code}, year {year}, state {state_code})"
    )]
    DuplicateMeasurement {
        dist_code: String,
        year: i32,
        state_code: String,
        crop: String,
        metric: Metric,
    },

    /// One identity code carries two different attribute values across the
    /// source. The source is assumed to have one canonical name per code.
    #[error("{entity} code '{code}': conflicting {attribute} '{first}' vs '{second}'")]
    InconsistentDimension {
        entity: &'static str,
        code: String,
        attribute: &'static str,
        first: String,
        second: String,
    },
}
