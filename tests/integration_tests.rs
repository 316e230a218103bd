//! Integration tests for the listing analysis pipeline.
//!
//! These tests verify end-to-end behavior of the pipeline using CSV fixtures.

use carlens::{
    AnalysisError, AnalysisReport, EmptyColumnPolicy, Pipeline, PipelineConfig,
    PipelineConfigBuilder, ZeroKmPolicy,
};
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn temp_output_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("carlens_it_{}_{}", tag, std::process::id()))
}

/// Config builder pointed at a fixture, charts off so tests stay fast.
fn base_config(fixture: &str) -> PipelineConfigBuilder {
    PipelineConfig::builder()
        .input_path(fixtures_path().join(fixture))
        .render_charts(false)
}

fn run_fixture(fixture: &str) -> carlens::AnalysisResult {
    let config = base_config(fixture).build().expect("config should build");
    Pipeline::builder()
        .config(config)
        .build()
        .expect("pipeline should build")
        .run()
        .expect("pipeline should complete successfully")
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_listings_fixture() {
    let result = run_fixture("listings.csv");

    // Raw shape before any cleaning.
    assert_eq!(result.overview.shape, (12, 9));

    // Two rows miss a required field, one exact duplicate pair collapses.
    assert_eq!(result.cleaning.rows_before, 12);
    assert_eq!(result.cleaning.rows_dropped, 2);
    assert_eq!(result.cleaning.duplicates_removed, 1);
    assert_eq!(result.cleaning.rows_after, 9);
    assert!(result.cleaning.is_consistent());

    // Every cleaned row lands in exactly one seats group.
    let grouped: usize = result.seats_summary.rows.iter().map(|r| r.count).sum();
    assert_eq!(grouped, result.cleaning.rows_after);

    assert_eq!(result.zero_km_records, 0);
    assert!(result.charts.is_empty(), "charts are disabled in this run");
    assert!(!result.steps.is_empty());
}

#[test]
fn test_pipeline_imputation_means_from_surviving_rows() {
    let result = run_fixture("listings.csv");
    let imputed = &result.cleaning.imputed;

    // Mean over the seven observed survivors; the dropped rows' mileage
    // values must not contribute.
    let mileage = imputed
        .iter()
        .find(|c| c.column == "mileage")
        .expect("mileage should be imputed");
    assert_eq!(mileage.filled_count, 3);
    assert!((mileage.fill_value - 141.0 / 7.0).abs() < 1e-6);

    let power = imputed
        .iter()
        .find(|c| c.column == "power")
        .expect("power should be imputed");
    assert_eq!(power.filled_count, 1);
    assert!((power.fill_value - 860.0 / 9.0).abs() < 1e-6);

    let seats = imputed
        .iter()
        .find(|c| c.column == "seats")
        .expect("seats should be imputed");
    assert_eq!(seats.filled_count, 1);
    assert!((seats.fill_value - 48.0 / 9.0).abs() < 1e-6);

    // Engine is fully observed, so it is not reported.
    assert!(imputed.iter().all(|c| c.column != "engine"));
    assert!(result.cleaning.skipped_columns.is_empty());
    assert_eq!(result.cleaning.cells_filled(), 5);
}

#[test]
fn test_pipeline_seats_summary_groups() {
    let result = run_fixture("listings.csv");

    let five = result
        .seats_summary
        .group("5")
        .expect("five-seat group should exist");
    assert_eq!(five.count, 6);
    assert!((five.average_price - 725_000.0).abs() < 1e-6);

    // The imputed seat count forms its own fractional group.
    let imputed_group = result
        .seats_summary
        .group("5.33")
        .expect("imputed seats group should exist");
    assert_eq!(imputed_group.count, 1);

    // Numeric keys sort ascending.
    let keys: Vec<&str> = result.seats_summary.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["5", "5.33", "6", "7"]);
}

#[test]
fn test_pipeline_top_brands_by_count() {
    let result = run_fixture("listings.csv");

    assert_eq!(result.brand_summary.len(), 7);

    // Hyundai and Maruti have two listings each; ties keep key order.
    let top = result.top_brands(2);
    let keys: Vec<&str> = top.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["Hyundai", "Maruti"]);
    assert!(top.rows.iter().all(|r| r.count == 2));

    let maruti = top.group("Maruti").expect("Maruti should make the cut");
    assert!((maruti.average_price - 425_000.0).abs() < 1e-6);
    assert_eq!(maruti.average_km, Some(36_500.0));
}

#[test]
fn test_pipeline_fuel_and_transmission_summaries() {
    let result = run_fixture("listings.csv");

    // Fuel shares come back most frequent first.
    assert_eq!(result.fuel_distribution[0].value, "Petrol");
    assert_eq!(result.fuel_distribution[0].count, 5);
    assert!((result.fuel_distribution[0].share - 5.0 / 9.0).abs() < 1e-9);
    assert_eq!(result.fuel_distribution[1].value, "Diesel");
    assert_eq!(result.fuel_distribution[1].count, 4);

    let manual = result
        .transmission_summary
        .group("Manual")
        .expect("manual group should exist");
    assert_eq!(manual.count, 6);
    assert!((manual.average_price - 495_000.0).abs() < 1e-6);
    // The transmission summary does not carry average km.
    assert_eq!(manual.average_km, None);
}

// ============================================================================
// Edge Case Tests
// ============================================================================

#[test]
fn test_pipeline_no_missing_fixture() {
    let result = run_fixture("no_missing.csv");

    assert_eq!(result.cleaning.rows_before, 5);
    assert_eq!(result.cleaning.rows_dropped, 0);
    assert_eq!(result.cleaning.duplicates_removed, 0);
    assert_eq!(result.cleaning.rows_after, 5);
    assert!(result.cleaning.imputed.is_empty());
    assert_eq!(result.cleaning.cells_filled(), 0);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_pipeline_empty_engine_column_skip_policy() {
    // Skip is the default policy.
    let result = run_fixture("empty_engine.csv");

    assert_eq!(result.cleaning.skipped_columns, vec!["engine".to_string()]);
    assert!(
        result.warnings.iter().any(|w| w.contains("engine")),
        "skipping a column should leave a warning"
    );
    assert_eq!(result.cleaning.rows_after, 3);
}

#[test]
fn test_pipeline_empty_engine_column_fail_policy() {
    let config = base_config("empty_engine.csv")
        .empty_column_policy(EmptyColumnPolicy::Fail)
        .build()
        .unwrap();

    let err = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run()
        .unwrap_err();

    assert_eq!(err.error_code(), "EMPTY_IMPUTATION_COLUMN");
    assert!(err.to_string().contains("engine"));
}

// ============================================================================
// Zero-Km Policy Tests
// ============================================================================

#[test]
fn test_pipeline_zero_km_null_policy_keeps_rows() {
    let result = run_fixture("zero_km.csv");

    assert_eq!(result.zero_km_records, 2);
    assert_eq!(result.cleaning.rows_after, 4);

    // The zero-km rows stay in every summary.
    let grouped: usize = result.seats_summary.rows.iter().map(|r| r.count).sum();
    assert_eq!(grouped, 4);
    assert!(result.warnings.iter().any(|w| w.contains("left missing")));
}

#[test]
fn test_pipeline_zero_km_drop_policy_removes_rows() {
    let config = base_config("zero_km.csv")
        .zero_km_policy(ZeroKmPolicy::Drop)
        .build()
        .unwrap();

    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(result.zero_km_records, 2);
    // Cleaning counts are untouched; the rows leave during derivation.
    assert_eq!(result.cleaning.rows_after, 4);
    let grouped: usize = result.seats_summary.rows.iter().map(|r| r.count).sum();
    assert_eq!(grouped, 2);
}

// ============================================================================
// Failure Mode Tests
// ============================================================================

#[test]
fn test_pipeline_missing_input_file_is_fatal() {
    let config = base_config("does_not_exist.csv").build().unwrap();

    let err = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run()
        .unwrap_err();

    assert!(matches!(err, AnalysisError::InputNotFound(_)));
    assert_eq!(err.error_code(), "INPUT_NOT_FOUND");
    assert!(err.is_usage_error());
}

// ============================================================================
// Report Output Tests
// ============================================================================

#[test]
fn test_pipeline_emit_report_round_trip() {
    let output_dir = temp_output_dir("report");
    let config = base_config("listings.csv")
        .output_dir(&output_dir)
        .emit_report(true)
        .build()
        .unwrap();

    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run()
        .unwrap();

    let report_path = output_dir.join("analysis_report.json");
    assert!(report_path.exists(), "report file should be written");
    assert!(
        result
            .steps
            .iter()
            .any(|s| s.contains("analysis_report.json")),
        "report step should be recorded"
    );

    let body = std::fs::read_to_string(&report_path).expect("report should be readable");
    let report: AnalysisReport = serde_json::from_str(&body).expect("report should deserialize");

    assert!(!report.generated_at.is_empty());
    assert!(report.input_file.ends_with("listings.csv"));
    assert_eq!(report.result.cleaning.rows_after, result.cleaning.rows_after);
    assert_eq!(report.result.seats_summary.len(), result.seats_summary.len());

    let _ = std::fs::remove_dir_all(&output_dir);
}

// ============================================================================
// Chart Output Tests
// ============================================================================

#[test]
fn test_pipeline_chart_files_land_in_charts_dir() {
    let output_dir = temp_output_dir("charts");
    let config = base_config("listings.csv")
        .output_dir(&output_dir)
        .render_charts(true)
        .build()
        .unwrap();

    let result = Pipeline::builder().config(config).build().unwrap().run();
    assert!(result.is_ok(), "chart problems degrade to warnings, not errors");
    let result = result.unwrap();

    let charts_dir = output_dir.join("charts");
    assert!(charts_dir.is_dir(), "charts directory should be created");

    // The renderer reports exactly the files it produced.
    for path in &result.charts {
        assert!(path.exists(), "listed chart {} should exist", path.display());
        assert!(path.starts_with(&charts_dir));
    }

    // Each of the five charts either rendered or left a warning.
    assert!(
        result.charts.len() + result.warnings.len() >= 5,
        "five charts should be accounted for"
    );

    let _ = std::fs::remove_dir_all(&output_dir);
}
