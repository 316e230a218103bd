//! Custom error types for the listing analysis pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Errors carry a
//! stable code so the `--json` output can report failures in a
//! machine-readable form.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Input CSV file does not exist.
    #[error("File {} not found", .0.display())]
    InputNotFound(PathBuf),

    /// A column the pipeline depends on is absent from the schema.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A numeric listing column arrived with a non-numeric type (e.g. free
    /// text in the price column).
    #[error("Column '{column}' must be numeric, found {dtype}")]
    SchemaMismatch { column: String, dtype: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The table has no rows at a stage that needs data.
    #[error("Dataset is empty {0}")]
    EmptyDataset(String),

    /// An imputation column has no observed values to average, under the
    /// fail policy.
    #[error("Cannot impute column '{0}': every value is missing")]
    EmptyImputationColumn(String),

    /// Data cleaning failed.
    #[error("Failed to clean data: {0}")]
    CleaningFailed(String),

    /// Imputation failed.
    #[error("Failed to impute missing values in column '{column}': {reason}")]
    ImputationFailed { column: String, reason: String },

    /// Derived-column computation failed.
    #[error("Failed to derive column '{column}': {reason}")]
    DerivationFailed { column: String, reason: String },

    /// Group aggregation failed.
    #[error("Failed to aggregate by '{key}': {reason}")]
    AggregationFailed { key: String, reason: String },

    /// Chart rendering failed.
    #[error("Failed to render chart '{chart}': {reason}")]
    ChartRenderFailed { chart: String, reason: String },

    /// Report generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// Internal error (e.g., a violated pipeline invariant).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get the stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputNotFound(_) => "INPUT_NOT_FOUND",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::EmptyImputationColumn(_) => "EMPTY_IMPUTATION_COLUMN",
            Self::CleaningFailed(_) => "CLEANING_FAILED",
            Self::ImputationFailed { .. } => "IMPUTATION_FAILED",
            Self::DerivationFailed { .. } => "DERIVATION_FAILED",
            Self::AggregationFailed { .. } => "AGGREGATION_FAILED",
            Self::ChartRenderFailed { .. } => "CHART_RENDER_FAILED",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check whether the error is something the user can fix at the call
    /// site (bad path, bad flags, wrong file) rather than a processing
    /// failure.
    pub fn is_usage_error(&self) -> bool {
        match self {
            Self::InputNotFound(_)
            | Self::ColumnNotFound(_)
            | Self::SchemaMismatch { .. }
            | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_usage_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields so the
/// JSON output stays stable when messages are reworded.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            AnalysisError::InputNotFound(PathBuf::from("output.csv")).error_code(),
            "INPUT_NOT_FOUND"
        );
        assert_eq!(
            AnalysisError::ColumnNotFound("price".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_missing_file_message_names_path() {
        let err = AnalysisError::InputNotFound(PathBuf::from("output.csv"));
        assert_eq!(err.to_string(), "File output.csv not found");
    }

    #[test]
    fn test_is_usage_error() {
        assert!(AnalysisError::InputNotFound(PathBuf::from("x.csv")).is_usage_error());
        assert!(AnalysisError::InvalidConfig("top_brands must be >= 1".into()).is_usage_error());
        assert!(!AnalysisError::CleaningFailed("error".to_string()).is_usage_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = AnalysisError::ColumnNotFound("km".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("km"));
    }

    #[test]
    fn test_with_context() {
        let error =
            AnalysisError::ColumnNotFound("seats".to_string()).with_context("During aggregation");
        assert!(error.to_string().contains("During aggregation"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND"); // Preserves original code
    }

    #[test]
    fn test_usage_error_preserved_through_context() {
        let error = AnalysisError::InputNotFound(PathBuf::from("missing.csv"))
            .with_context("Loading listings");
        assert!(error.is_usage_error());
    }
}
