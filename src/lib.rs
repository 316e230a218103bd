//! Used-Car Listing Analysis Library
//!
//! An exploratory analysis pipeline for used-car listing data built with Rust
//! and Polars.
//!
//! # Overview
//!
//! This library provides the stages of a fixed analysis over a CSV of car
//! listings (price, km, engine, mileage, power, seats, fuel, transmission,
//! brand):
//!
//! - **Loading**: CSV read with schema checks and Float64 normalization of
//!   the numeric listing columns
//! - **Profiling**: shape, per-column dtypes and describe-style statistics of
//!   the raw table
//! - **Cleaning**: drop rows missing price or km, mean-impute the secondary
//!   numeric columns, remove exact duplicates (first occurrence kept)
//! - **Derivation**: `price_per_km` with configurable zero-km handling
//! - **Aggregation**: average price / average km / count by seats,
//!   transmission and brand, plus the fuel-type distribution
//! - **Charts**: histograms, bar charts, pie and scatter rendered to PNG
//! - **Reports**: console rendering and a serializable JSON report
//!
//! Every stage is a pure function over `DataFrame` values; the pipeline wires
//! them together and collects an [`AnalysisResult`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use carlens::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .input_path("listings.csv")
//!     .output_dir("artifacts")
//!     .top_brands(5)
//!     .build()?;
//!
//! let result = Pipeline::builder().config(config).build()?.run()?;
//!
//! println!("Cleaned rows: {}", result.cleaning.rows_after);
//! for row in &result.seats_summary.rows {
//!     println!(
//!         "{} seats: avg price {:.2} over {} listings",
//!         row.key, row.average_price, row.count
//!     );
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to customize the run:
//!
//! ```rust,ignore
//! use carlens::config::*;
//!
//! let config = PipelineConfig::builder()
//!     .required_columns(["price", "km"])
//!     .impute_columns(["engine", "mileage", "power", "seats"])
//!     .empty_column_policy(EmptyColumnPolicy::Fail)  // error on all-missing columns
//!     .zero_km_policy(ZeroKmPolicy::Drop)            // drop km = 0 records
//!     .render_charts(false)
//!     .build()?;
//! ```
//!
//! # Reports
//!
//! An [`AnalysisResult`] can be rendered for people or machines:
//!
//! ```rust,ignore
//! use carlens::reporting::{self, ReportGenerator};
//!
//! let report = ReportGenerator::build_report("listings.csv", &result);
//! reporting::print_console_report(&report, 10);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

pub mod aggregate;
pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod features;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregate::GroupSummarizer;
pub use charts::{ChartOutput, ChartRenderer};
pub use cleaner::DataCleaner;
pub use config::{
    ConfigValidationError, EmptyColumnPolicy, PipelineConfig, PipelineConfigBuilder, ZeroKmPolicy,
};
pub use error::{AnalysisError, ResultExt};
pub use features::{FeatureDeriver, PRICE_PER_KM_COLUMN};
pub use imputers::{ImputationOutcome, MeanImputer};
pub use loader::load_listings;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use profiler::DatasetProfiler;
pub use reporting::{AnalysisReport, ReportGenerator};
pub use types::{
    AnalysisResult, CategoryCount, CleaningReport, ColumnOverview, DatasetOverview, GroupRow,
    GroupSummary, ImputedColumn, NumericSummary,
};
pub use utils::{fill_numeric_nulls, format_numeric_label, is_numeric_dtype, non_null_f64_values};
