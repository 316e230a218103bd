use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Overview Types
// ============================================================================

/// Schema-level view of one column in the raw table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
    pub null_percentage: f64,
}

/// Describe-style statistics for one numeric column.
///
/// `count` is the number of observed (non-missing) values; the remaining
/// fields are computed over those values only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

/// Snapshot of the raw table before any cleaning: shape, per-column dtypes
/// and null counts, and describe-style statistics for the numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOverview {
    /// (rows, columns) of the loaded table.
    pub shape: (usize, usize),
    pub columns: Vec<ColumnOverview>,
    pub numeric: Vec<NumericSummary>,
}

impl DatasetOverview {
    /// Look up the describe row for a numeric column.
    pub fn numeric_summary(&self, name: &str) -> Option<&NumericSummary> {
        self.numeric.iter().find(|s| s.name == name)
    }
}

// ============================================================================
// Cleaning Report Types
// ============================================================================

/// One mean-imputed column: the fill value used and how many cells it filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImputedColumn {
    pub column: String,
    pub fill_value: f64,
    pub filled_count: usize,
}

/// What cleaning did to the table, stage by stage.
///
/// The counts satisfy
/// `rows_after == rows_before - rows_dropped - duplicates_removed`;
/// [`CleaningReport::is_consistent`] checks exactly that and the pipeline
/// treats a violation as an internal error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Rows in the raw table.
    pub rows_before: usize,
    /// Rows discarded for a missing required field (price or km).
    pub rows_dropped: usize,
    /// Mean-imputed columns, in imputation order.
    pub imputed: Vec<ImputedColumn>,
    /// Imputation columns skipped because every value was missing.
    pub skipped_columns: Vec<String>,
    /// Exact-duplicate rows removed (first occurrence kept).
    pub duplicates_removed: usize,
    /// Rows in the cleaned table.
    pub rows_after: usize,
}

impl CleaningReport {
    /// Create a report with only the starting row count filled in.
    pub fn new(rows_before: usize) -> Self {
        Self {
            rows_before,
            ..Self::default()
        }
    }

    /// Check the row-count invariant of the filter → dedup order.
    pub fn is_consistent(&self) -> bool {
        self.rows_before == self.rows_after + self.rows_dropped + self.duplicates_removed
    }

    /// Total number of cells filled across all imputed columns.
    pub fn cells_filled(&self) -> usize {
        self.imputed.iter().map(|c| c.filled_count).sum()
    }

    /// Percentage of raw rows that were dropped for missing required fields.
    pub fn rows_dropped_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_dropped as f64 / self.rows_before as f64) * 100.0
        }
    }
}

// ============================================================================
// Aggregation Types
// ============================================================================

/// One group in a summary: key label plus its aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    /// Display label of the group key (numeric keys lose a trailing ".0").
    pub key: String,
    pub average_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_km: Option<f64>,
    pub count: usize,
}

/// Aggregates over a partition of the cleaned table by one categorical key,
/// rows sorted ascending by key value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Name of the grouping column.
    pub key_column: String,
    pub rows: Vec<GroupRow>,
}

impl GroupSummary {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the summary has no groups.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `n` largest groups by row count, ties keeping key order.
    pub fn top(&self, n: usize) -> GroupSummary {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows.truncate(n);
        GroupSummary {
            key_column: self.key_column.clone(),
            rows,
        }
    }

    /// Look up a group by its key label.
    pub fn group(&self, key: &str) -> Option<&GroupRow> {
        self.rows.iter().find(|r| r.key == key)
    }
}

/// One value of a categorical column with its occurrence count and share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
    /// Fraction of all observed values, in [0, 1].
    pub share: f64,
}

// ============================================================================
// Pipeline Result
// ============================================================================

/// Everything one pipeline run produced, ready for reporting.
///
/// The cleaned table itself stays inside the pipeline; consumers work from
/// the summaries here, which is all the console report, the JSON report and
/// downstream tooling need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Raw-table snapshot taken before cleaning.
    pub overview: DatasetOverview,
    /// Row filter, imputation and deduplication outcome.
    pub cleaning: CleaningReport,
    /// Records with km = 0 encountered while deriving price_per_km.
    pub zero_km_records: usize,
    /// Summary by number of seats (average price, average km, count).
    pub seats_summary: GroupSummary,
    /// Summary by transmission type (average price, count).
    pub transmission_summary: GroupSummary,
    /// Full summary by brand (average price, average km, count).
    pub brand_summary: GroupSummary,
    /// Fuel-type share of the cleaned table, descending by count.
    pub fuel_distribution: Vec<CategoryCount>,
    /// Chart files written, in render order. Empty when charts are disabled.
    pub charts: Vec<PathBuf>,
    /// Human-readable log of the stages that ran.
    pub steps: Vec<String>,
    /// Warnings raised along the way (skipped columns, zero-km records).
    pub warnings: Vec<String>,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
}

impl AnalysisResult {
    /// The brand table shown in reports: the `n` brands with the most listings.
    pub fn top_brands(&self, n: usize) -> GroupSummary {
        self.brand_summary.top(n)
    }
}

// ============================================================================
// Tests
// ============================================================================
