//! Report generation module.
//!
//! This module provides functionality for turning an [`AnalysisResult`] into
//! shareable output.
//!
//! # Analysis Reports
//!
//! Use [`AnalysisReport`] to generate unified reports suitable for:
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--emit-report` CLI flag)
//! - Programmatic access in library mode
//!
//! # Example
//!
//! ```rust,ignore
//! use carlens::reporting::ReportGenerator;
//!
//! // Build a report from a pipeline result
//! let report = ReportGenerator::build_report("output.csv", &result);
//!
//! // Print as JSON
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! // Or write to file
//! let generator = ReportGenerator::new(PathBuf::from("outputs"));
//! generator.write_report_to_file(&report, "output")?;
//! ```
//!
//! [`AnalysisResult`]: crate::types::AnalysisResult

mod generator;

pub use generator::{AnalysisReport, ReportGenerator, print_console_report, print_overview};
