//! Analysis pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the listing analysis workflow: load, profile, clean,
//! impute, deduplicate, derive, aggregate, render.

use crate::aggregate::GroupSummarizer;
use crate::charts::ChartRenderer;
use crate::cleaner::DataCleaner;
use crate::config::{PipelineConfig, ZeroKmPolicy};
use crate::error::{AnalysisError, Result};
use crate::features::FeatureDeriver;
use crate::imputers::MeanImputer;
use crate::loader;
use crate::profiler::DatasetProfiler;
use crate::reporting::ReportGenerator;
use crate::types::{AnalysisResult, CleaningReport};
use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, error, info};

/// The main analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom
/// configuration.
///
/// # Example
///
/// ```rust,ignore
/// use carlens::{Pipeline, PipelineConfig, ZeroKmPolicy};
///
/// let result = Pipeline::builder()
///     .config(
///         PipelineConfig::builder()
///             .input_path("listings.csv")
///             .zero_km_policy(ZeroKmPolicy::Drop)
///             .build()?,
///     )
///     .build()?
///     .run()?;
///
/// println!("{} seat groups", result.seats_summary.len());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the configured input file and analyze it.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InputNotFound`] when the input path does not
    /// exist; no later stage runs in that case. Other errors surface from the
    /// individual stages.
    pub fn run(&self) -> Result<AnalysisResult> {
        match self.run_internal() {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Analyze an already-loaded table.
    ///
    /// Library entry point for callers that hold a `DataFrame` from
    /// elsewhere; [`Pipeline::run`] is this plus the CSV load.
    pub fn analyze(&self, df: DataFrame) -> Result<AnalysisResult> {
        match self.analyze_internal(df) {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn run_internal(&self) -> Result<AnalysisResult> {
        let df = loader::load_listings(&self.config.input_path, &self.config)?;
        self.analyze_internal(df)
    }

    fn analyze_internal(&self, df: DataFrame) -> Result<AnalysisResult> {
        let start_time = Instant::now();

        info!("Starting listing analysis pipeline...");

        let mut steps: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        // Step 1: Profile the raw table
        info!("Step 1: Profiling raw table...");
        let overview = DatasetProfiler::overview(&df)?;
        steps.push(format!(
            "Profiled {} rows x {} columns",
            overview.shape.0, overview.shape.1
        ));

        let mut cleaning = CleaningReport::new(df.height());

        // Step 2: Drop rows missing a required field
        info!("Step 2: Dropping rows with missing required fields...");
        let (df, rows_dropped) =
            DataCleaner::drop_missing_required(df, &self.config.required_columns)?;
        cleaning.rows_dropped = rows_dropped;
        steps.push(format!(
            "Dropped {} rows with missing required fields",
            rows_dropped
        ));

        // Step 3: Mean-impute the secondary numeric columns. Means are taken
        // after the row filter and before deduplication.
        info!("Step 3: Imputing missing values...");
        let mut df = df;
        let outcome = MeanImputer::fill_columns(
            &mut df,
            &self.config.impute_columns,
            self.config.empty_column_policy,
        )?;
        for column in &outcome.skipped {
            warnings.push(format!(
                "Column '{}' has no observed values; skipped during imputation",
                column
            ));
        }
        let cells_filled: usize = outcome.imputed.iter().map(|c| c.filled_count).sum();
        steps.push(format!(
            "Imputed {} columns with column means ({} cells)",
            outcome.imputed.len(),
            cells_filled
        ));
        cleaning.imputed = outcome.imputed;
        cleaning.skipped_columns = outcome.skipped;

        // Step 4: Remove exact duplicates, keeping first occurrences
        info!("Step 4: Removing duplicate records...");
        let (df, duplicates_removed) = DataCleaner::deduplicate(df)?;
        cleaning.duplicates_removed = duplicates_removed;
        cleaning.rows_after = df.height();
        steps.push(format!("Removed {} duplicate rows", duplicates_removed));

        // Filter and dedup must account for every row.
        if !cleaning.is_consistent() {
            return Err(AnalysisError::Internal(format!(
                "cleaning row counts do not add up: {} != {} + {} + {}",
                cleaning.rows_before,
                cleaning.rows_after,
                cleaning.rows_dropped,
                cleaning.duplicates_removed
            )));
        }

        if df.height() == 0 {
            return Err(AnalysisError::EmptyDataset(format!(
                "after cleaning (0 of {} rows survived)",
                cleaning.rows_before
            )));
        }

        if cleaning.rows_dropped_percentage() > 30.0 {
            warnings.push(format!(
                "High data loss: {:.1}% of rows had a missing required field",
                cleaning.rows_dropped_percentage()
            ));
        }

        // Step 5: Derive price_per_km
        info!("Step 5: Deriving price_per_km...");
        let (df, zero_km_records) =
            FeatureDeriver::derive_price_per_km(df, self.config.zero_km_policy)?;
        steps.push(format!(
            "Derived price_per_km ({} zero-km records)",
            zero_km_records
        ));
        if zero_km_records > 0 {
            warnings.push(match self.config.zero_km_policy {
                ZeroKmPolicy::Null => format!(
                    "{} records have km = 0; their price_per_km is left missing",
                    zero_km_records
                ),
                ZeroKmPolicy::Drop => format!(
                    "{} records with km = 0 removed before derivation",
                    zero_km_records
                ),
            });
        }

        // Step 6: Aggregate by the categorical keys
        info!("Step 6: Aggregating by seats, transmission and brand...");
        let seats_summary = GroupSummarizer::summarize(&df, "seats", true)?;
        let transmission_summary = GroupSummarizer::summarize(&df, "transmission", false)?;
        let brand_summary = GroupSummarizer::summarize(&df, "brand", true)?;
        let fuel_distribution = GroupSummarizer::category_distribution(&df, "fuel")?;
        steps.push(format!(
            "Aggregated {} seat, {} transmission and {} brand groups",
            seats_summary.len(),
            transmission_summary.len(),
            brand_summary.len()
        ));

        // Step 7: Render the chart suite
        let charts = if self.config.render_charts {
            info!("Step 7: Rendering charts...");
            let renderer = ChartRenderer::new(&self.config);
            let output = renderer.render_all(
                &df,
                &seats_summary,
                &transmission_summary,
                &fuel_distribution,
            )?;
            warnings.extend(output.warnings);
            steps.push(format!(
                "Rendered {} charts to {}",
                output.rendered.len(),
                renderer.charts_dir().display()
            ));
            output.rendered
        } else {
            debug!("Chart rendering disabled");
            Vec::new()
        };

        let mut result = AnalysisResult {
            overview,
            cleaning,
            zero_km_records,
            seats_summary,
            transmission_summary,
            brand_summary,
            fuel_distribution,
            charts,
            steps,
            warnings,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        // Step 8: Write the JSON report when enabled
        if self.config.emit_report {
            info!("Step 8: Writing analysis report...");
            let report = ReportGenerator::build_report(
                &self.config.input_path.display().to_string(),
                &result,
            );
            let path = ReportGenerator::new(self.config.output_dir.clone())
                .write_report_to_file(&report, "analysis")
                .map_err(|e| AnalysisError::ReportGenerationFailed(e.to_string()))?;
            result.steps.push(format!("Report written to {}", path.display()));
        }

        info!(
            "Pipeline finished: {} rows in {} ms",
            result.cleaning.rows_after, result.duration_ms
        );

        Ok(result)
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline { config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmptyColumnPolicy;

    fn listings_frame() -> DataFrame {
        df!(
            "price" => [Some(10.0), Some(20.0), Some(30.0), None, Some(20.0)],
            "km" => [Some(100.0), Some(200.0), Some(300.0), Some(400.0), Some(200.0)],
            "engine" => [Some(1200.0), None, Some(1800.0), Some(9000.0), None],
            "seats" => [Some(4.0), Some(4.0), Some(2.0), Some(5.0), Some(4.0)],
            "fuel" => ["Petrol", "Diesel", "Petrol", "Petrol", "Diesel"],
            "transmission" => ["Manual", "Manual", "Automatic", "Manual", "Manual"],
            "brand" => ["Maruti", "Hyundai", "BMW", "Tata", "Hyundai"],
        )
        .unwrap()
    }

    fn quiet_config() -> PipelineConfig {
        PipelineConfig::builder().render_charts(false).build().unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config().input_path.to_str().unwrap(), "output.csv");
        assert!(pipeline.config().render_charts);
    }

    #[test]
    fn test_pipeline_builder_with_config() {
        let config = PipelineConfig::builder()
            .input_path("listings.csv")
            .top_brands(3)
            .build()
            .unwrap();

        let pipeline = Pipeline::builder().config(config).build().unwrap();

        assert_eq!(pipeline.config().input_path.to_str().unwrap(), "listings.csv");
        assert_eq!(pipeline.config().top_brands, 3);
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = PipelineConfig {
            top_brands: 0,
            ..PipelineConfig::default()
        };

        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_analyze_cleans_and_counts() {
        let pipeline = Pipeline::builder().config(quiet_config()).build().unwrap();
        let result = pipeline.analyze(listings_frame()).unwrap();

        // One row misses price, and rows 2 and 5 are exact duplicates after
        // engine imputation fills both with the same mean.
        assert_eq!(result.cleaning.rows_before, 5);
        assert_eq!(result.cleaning.rows_dropped, 1);
        assert_eq!(result.cleaning.duplicates_removed, 1);
        assert_eq!(result.cleaning.rows_after, 3);
        assert!(result.cleaning.is_consistent());

        let engine = result
            .cleaning
            .imputed
            .iter()
            .find(|c| c.column == "engine")
            .expect("engine should be imputed");
        assert_eq!(engine.filled_count, 2);
        // Mean of the surviving observed values 1200 and 1800; the dropped
        // row's 9000 must not contribute.
        assert!((engine.fill_value - 1500.0).abs() < 1e-9);

        assert_eq!(result.zero_km_records, 0);
        assert!(!result.steps.is_empty());
        assert!(result.charts.is_empty());
    }

    #[test]
    fn test_analyze_seats_aggregation() {
        let df = df!(
            "price" => [10.0, 20.0, 30.0],
            "km" => [100.0, 200.0, 300.0],
            "seats" => [4.0, 4.0, 2.0],
            "fuel" => ["Petrol", "Petrol", "Diesel"],
            "transmission" => ["Manual", "Manual", "Manual"],
            "brand" => ["Maruti", "Maruti", "BMW"],
        )
        .unwrap();

        let pipeline = Pipeline::builder().config(quiet_config()).build().unwrap();
        let result = pipeline.analyze(df).unwrap();

        let four = result.seats_summary.group("4").unwrap();
        assert_eq!(four.count, 2);
        assert!((four.average_price - 15.0).abs() < 1e-9);

        let two = result.seats_summary.group("2").unwrap();
        assert_eq!(two.count, 1);
        assert!((two.average_price - 30.0).abs() < 1e-9);

        // Brand summary carries average km, transmission does not.
        let bmw = result.brand_summary.group("BMW").unwrap();
        assert_eq!(bmw.average_km, Some(300.0));
        let manual = result.transmission_summary.group("Manual").unwrap();
        assert_eq!(manual.average_km, None);
        assert_eq!(manual.count, 3);
    }

    #[test]
    fn test_analyze_empty_after_cleaning() {
        let df = df!(
            "price" => [Option::<f64>::None, None],
            "km" => [Some(100.0), Some(200.0)],
            "seats" => [Some(4.0), Some(4.0)],
            "fuel" => ["Petrol", "Diesel"],
            "transmission" => ["Manual", "Manual"],
            "brand" => ["Maruti", "Tata"],
        )
        .unwrap();

        let pipeline = Pipeline::builder().config(quiet_config()).build().unwrap();
        let err = pipeline.analyze(df).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_DATASET");
    }

    #[test]
    fn test_analyze_zero_km_warning() {
        let df = df!(
            "price" => [10.0, 20.0],
            "km" => [0.0, 200.0],
            "seats" => [4.0, 4.0],
            "fuel" => ["Petrol", "Diesel"],
            "transmission" => ["Manual", "Manual"],
            "brand" => ["Maruti", "Tata"],
        )
        .unwrap();

        let pipeline = Pipeline::builder().config(quiet_config()).build().unwrap();
        let result = pipeline.analyze(df).unwrap();

        assert_eq!(result.zero_km_records, 1);
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.contains("km = 0")),
            "zero-km records should be surfaced as a warning"
        );
    }

    #[test]
    fn test_analyze_fail_policy_on_all_missing_column() {
        let df = df!(
            "price" => [10.0, 20.0],
            "km" => [100.0, 200.0],
            "engine" => [Option::<f64>::None, None],
            "seats" => [4.0, 4.0],
            "fuel" => ["Petrol", "Diesel"],
            "transmission" => ["Manual", "Manual"],
            "brand" => ["Maruti", "Tata"],
        )
        .unwrap();

        let config = PipelineConfig::builder()
            .render_charts(false)
            .empty_column_policy(EmptyColumnPolicy::Fail)
            .build()
            .unwrap();
        let pipeline = Pipeline::builder().config(config).build().unwrap();

        let err = pipeline.analyze(df).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_IMPUTATION_COLUMN");
    }

    #[test]
    fn test_run_missing_file_stops_before_any_stage() {
        let config = PipelineConfig::builder()
            .input_path("definitely_not_here.csv")
            .render_charts(false)
            .build()
            .unwrap();
        let pipeline = Pipeline::builder().config(config).build().unwrap();

        let err = pipeline.run().unwrap_err();
        assert_eq!(err.error_code(), "INPUT_NOT_FOUND");
    }
}
