//! Configuration types for the listing analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. The defaults reproduce the
//! zero-argument behavior of the tool: read `output.csv`, impute the four
//! secondary numeric columns, render every chart.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Policy for an imputation column whose values are all missing (mean
/// undefined).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EmptyColumnPolicy {
    /// Leave the column untouched and record it as skipped
    #[default]
    Skip,
    /// Abort the pipeline with an imputation error
    Fail,
}

/// Policy for records with km = 0 when deriving price_per_km.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ZeroKmPolicy {
    /// Leave price_per_km missing for those records
    #[default]
    Null,
    /// Remove those records before derivation
    Drop,
}

/// Configuration for the analysis pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use carlens::config::{PipelineConfig, ZeroKmPolicy};
///
/// let config = PipelineConfig::builder()
///     .input_path("listings.csv")
///     .zero_km_policy(ZeroKmPolicy::Drop)
///     .top_brands(5)
///     .build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path of the input CSV file.
    /// Default: "output.csv"
    pub input_path: PathBuf,

    /// Output directory for charts and reports.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// Columns that must be present in every record; rows missing any of
    /// them are dropped during cleaning.
    /// Default: ["price", "km"]
    pub required_columns: Vec<String>,

    /// Numeric columns whose missing values are filled with the column mean.
    /// Columns absent from the schema are silently skipped.
    /// Default: ["engine", "mileage", "power", "seats"]
    pub impute_columns: Vec<String>,

    /// Categorical columns the analysis groups and charts by; all must be
    /// present in the schema.
    /// Default: ["fuel", "transmission", "brand"]
    pub categorical_columns: Vec<String>,

    /// Policy for an all-missing imputation column.
    /// Default: Skip
    pub empty_column_policy: EmptyColumnPolicy,

    /// Policy for km = 0 records in the price_per_km derivation.
    /// Default: Null
    pub zero_km_policy: ZeroKmPolicy,

    /// Number of groups shown in the brand summary table.
    /// Default: 10
    pub top_brands: usize,

    /// Number of bins in the price and km histograms.
    /// Default: 50
    pub histogram_bins: usize,

    /// Whether to render the chart suite.
    /// Default: true
    pub render_charts: bool,

    /// Chart bitmap width in pixels.
    /// Default: 1280
    pub chart_width: u32,

    /// Chart bitmap height in pixels.
    /// Default: 720
    pub chart_height: u32,

    /// Whether to write the JSON report file under the output directory.
    /// Default: false
    pub emit_report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("output.csv"),
            output_dir: PathBuf::from("outputs"),
            required_columns: vec!["price".to_string(), "km".to_string()],
            impute_columns: vec![
                "engine".to_string(),
                "mileage".to_string(),
                "power".to_string(),
                "seats".to_string(),
            ],
            categorical_columns: vec![
                "fuel".to_string(),
                "transmission".to_string(),
                "brand".to_string(),
            ],
            empty_column_policy: EmptyColumnPolicy::default(),
            zero_km_policy: ZeroKmPolicy::default(),
            top_brands: 10,
            histogram_bins: 50,
            render_charts: true,
            chart_width: 1280,
            chart_height: 720,
            emit_report: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.required_columns.is_empty() {
            return Err(ConfigValidationError::EmptyColumnList("required_columns"));
        }

        if let Some(overlap) = self
            .impute_columns
            .iter()
            .find(|c| self.required_columns.contains(c))
        {
            return Err(ConfigValidationError::ColumnOverlap {
                column: overlap.clone(),
            });
        }

        if self.top_brands == 0 {
            return Err(ConfigValidationError::InvalidTopBrands(self.top_brands));
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidHistogramBins(
                self.histogram_bins,
            ));
        }

        if self.chart_width < 64 || self.chart_height < 64 {
            return Err(ConfigValidationError::InvalidChartDimensions {
                width: self.chart_width,
                height: self.chart_height,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("'{0}' must not be empty")]
    EmptyColumnList(&'static str),

    #[error("Column '{column}' is both required and in the imputation list")]
    ColumnOverlap { column: String },

    #[error("Invalid top_brands: {0} (must be at least 1)")]
    InvalidTopBrands(usize),

    #[error("Invalid histogram_bins: {0} (must be at least 1)")]
    InvalidHistogramBins(usize),

    #[error("Invalid chart dimensions: {width}x{height} (each side must be at least 64 px)")]
    InvalidChartDimensions { width: u32, height: u32 },
}

impl From<ConfigValidationError> for crate::error::AnalysisError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::AnalysisError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    required_columns: Option<Vec<String>>,
    impute_columns: Option<Vec<String>>,
    categorical_columns: Option<Vec<String>>,
    empty_column_policy: Option<EmptyColumnPolicy>,
    zero_km_policy: Option<ZeroKmPolicy>,
    top_brands: Option<usize>,
    histogram_bins: Option<usize>,
    render_charts: Option<bool>,
    chart_width: Option<u32>,
    chart_height: Option<u32>,
    emit_report: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the input CSV path.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the output directory for charts and reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the columns a record must have to survive cleaning.
    pub fn required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the columns to mean-impute.
    pub fn impute_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.impute_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the categorical columns the analysis groups by.
    pub fn categorical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the policy for an all-missing imputation column.
    pub fn empty_column_policy(mut self, policy: EmptyColumnPolicy) -> Self {
        self.empty_column_policy = Some(policy);
        self
    }

    /// Set the policy for km = 0 records.
    pub fn zero_km_policy(mut self, policy: ZeroKmPolicy) -> Self {
        self.zero_km_policy = Some(policy);
        self
    }

    /// Set the brand table size.
    pub fn top_brands(mut self, n: usize) -> Self {
        self.top_brands = Some(n);
        self
    }

    /// Set the histogram bin count.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Set the chart bitmap dimensions in pixels.
    pub fn chart_dimensions(mut self, width: u32, height: u32) -> Self {
        self.chart_width = Some(width);
        self.chart_height = Some(height);
        self
    }

    /// Enable or disable writing the JSON report file.
    pub fn emit_report(mut self, emit: bool) -> Self {
        self.emit_report = Some(emit);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            required_columns: self.required_columns.unwrap_or(defaults.required_columns),
            impute_columns: self.impute_columns.unwrap_or(defaults.impute_columns),
            categorical_columns: self
                .categorical_columns
                .unwrap_or(defaults.categorical_columns),
            empty_column_policy: self.empty_column_policy.unwrap_or_default(),
            zero_km_policy: self.zero_km_policy.unwrap_or_default(),
            top_brands: self.top_brands.unwrap_or(defaults.top_brands),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            render_charts: self.render_charts.unwrap_or(defaults.render_charts),
            chart_width: self.chart_width.unwrap_or(defaults.chart_width),
            chart_height: self.chart_height.unwrap_or(defaults.chart_height),
            emit_report: self.emit_report.unwrap_or(defaults.emit_report),
        };

        config.validate()?;
        Ok(config)
    }
}
