use crate::error::Result;
use crate::types::{AnalysisResult, DatasetOverview, GroupSummary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// Analysis Report Types
// ============================================================================

/// Unified report merging run metadata with the pipeline result.
///
/// The result fields are flattened, so the JSON output reads as one flat
/// document: `generated_at` and `input_file` sit next to `overview`,
/// `cleaning`, the group summaries and the rest.
///
/// Use this for both JSON output (`--json`) and file writing
/// (`--emit-report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input CSV file
    pub input_file: String,
    /// Everything the pipeline run produced
    #[serde(flatten)]
    pub result: AnalysisResult,
}

/// Writes [`AnalysisReport`]s as pretty-printed JSON files.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    /// Create a new ReportGenerator writing under the given directory.
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Build a report from a pipeline result.
    ///
    /// This creates a single, unified report structure that can be:
    /// - Serialized to JSON and printed to stdout (`--json`)
    /// - Written to a file (`--emit-report`)
    /// - Used programmatically in library mode
    pub fn build_report(input_file: &str, result: &AnalysisResult) -> AnalysisReport {
        AnalysisReport {
            generated_at: Local::now().to_rfc3339(),
            input_file: input_file.to_string(),
            result: result.clone(),
        }
    }

    /// Write the report to `<output_dir>/<report_base_name>_report.json`.
    ///
    /// Returns the path of the written file.
    pub fn write_report_to_file(
        &self,
        report: &AnalysisReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

// ============================================================================
// Console Rendering
// ============================================================================

/// Print the human-readable analysis report.
///
/// This is the default output when neither `--json` nor `--quiet` are
/// specified.
///
/// Note: this uses `println!` intentionally for user-facing CLI output;
/// diagnostics go through `tracing`.
pub fn print_console_report(report: &AnalysisReport, top_brands: usize) {
    let result = &report.result;

    println!();
    println!("{}", "=".repeat(80));
    println!("USED CAR LISTINGS ANALYSIS");
    println!("{}", "=".repeat(80));

    print_overview(&result.overview, &report.input_file);

    println!("CLEANING");
    println!("{}", "-".repeat(40));
    let cleaning = &result.cleaning;
    println!("  Rows before: {}", cleaning.rows_before);
    println!("  Rows dropped: {}", cleaning.rows_dropped);
    for imputed in &cleaning.imputed {
        println!(
            "  Missing values in {} filled with mean {:.2} ({} cells)",
            imputed.column, imputed.fill_value, imputed.filled_count
        );
    }
    for column in &cleaning.skipped_columns {
        println!("  Column {} skipped: no observed values", column);
    }
    println!("  Duplicates removed: {}", cleaning.duplicates_removed);
    println!("  Rows after: {}", cleaning.rows_after);
    if result.zero_km_records > 0 {
        println!("  Zero-km records: {}", result.zero_km_records);
    }
    println!();

    print_group_table("AVERAGE PRICE BY SEATS", "Seats", &result.seats_summary);

    let brands = result.top_brands(top_brands);
    print_group_table("TOP BRANDS", "Brand", &brands);
    if result.brand_summary.len() > brands.len() {
        println!(
            "  ... and {} more brands",
            result.brand_summary.len() - brands.len()
        );
        println!();
    }

    if !result.charts.is_empty() {
        println!("CHARTS");
        println!("{}", "-".repeat(40));
        for chart in &result.charts {
            println!("  - {}", chart.display());
        }
        println!();
    }

    if !result.warnings.is_empty() {
        println!("Warnings:");
        for warning in &result.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("Duration: {}ms", result.duration_ms);
    println!("{}", "=".repeat(80));
    println!("Analysis complete.");
}

/// Print the raw-table overview: shape, per-column dtypes and the describe
/// table for the numeric columns. `--dry-run` stops after this.
pub fn print_overview(overview: &DatasetOverview, input_file: &str) {
    println!();
    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", input_file);
    println!(
        "  Shape: {} rows x {} columns",
        overview.shape.0, overview.shape.1
    );
    println!();

    println!("  {:<20} {:<12} {:<16}", "Column", "Type", "Missing");
    println!("  {}", "-".repeat(50));
    for column in &overview.columns {
        println!(
            "  {:<20} {:<12} {:<16}",
            truncate_str(&column.name, 19),
            column.dtype,
            format!("{} ({:.1}%)", column.null_count, column.null_percentage)
        );
    }
    println!();

    if !overview.numeric.is_empty() {
        println!("NUMERIC SUMMARY");
        println!("{}", "-".repeat(40));
        println!(
            "  {:<14} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "Column", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"
        );
        println!("  {}", "-".repeat(112));
        for stats in &overview.numeric {
            println!(
                "  {:<14} {:>8} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
                truncate_str(&stats.name, 13),
                stats.count,
                stats.mean,
                stats.std,
                stats.min,
                stats.p25,
                stats.median,
                stats.p75,
                stats.max
            );
        }
        println!();
    }
}

/// Print one group summary as a fixed-width table.
fn print_group_table(title: &str, key_label: &str, summary: &GroupSummary) {
    println!("{}", title);
    println!("{}", "-".repeat(40));

    if summary.is_empty() {
        println!("  (no groups)");
        println!();
        return;
    }

    println!(
        "  {:<20} {:>14} {:>14} {:>8}",
        key_label, "Avg Price", "Avg Km", "Count"
    );
    println!("  {}", "-".repeat(60));
    for row in &summary.rows {
        let average_km = row
            .average_km
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<20} {:>14.2} {:>14} {:>8}",
            truncate_str(&row.key, 19),
            row.average_price,
            average_km,
            row.count
        );
    }
    println!();
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    // Cut on a char boundary; brand names can contain multi-byte characters.
    let mut cut = max_len.saturating_sub(3);
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &s[..cut])
}
