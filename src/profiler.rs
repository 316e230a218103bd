//! Raw-table profiling: shape, per-column dtypes and describe-style
//! statistics.
//!
//! The overview is taken before any cleaning so the console report can show
//! the dataset as it arrived. Statistics use the sample standard deviation
//! (n−1) and linear-interpolation percentiles, matching the conventional
//! describe() output.

use crate::error::Result;
use crate::types::{ColumnOverview, DatasetOverview, NumericSummary};
use crate::utils::{is_numeric_dtype, non_null_f64_values};
use polars::prelude::*;

/// Profiler for the raw listings table.
pub struct DatasetProfiler;

impl DatasetProfiler {
    /// Build the overview: shape, per-column dtype and null counts, and a
    /// describe row for every numeric column.
    ///
    /// Numeric columns with no observed values are listed in `columns` but
    /// omitted from `numeric`; there is nothing meaningful to describe and
    /// the JSON report stays free of non-finite floats.
    pub fn overview(df: &DataFrame) -> Result<DatasetOverview> {
        let mut columns = Vec::new();
        let mut numeric = Vec::new();
        let height = df.height();

        for name in df.get_column_names() {
            let column = df.column(name.as_str())?;
            let series = column.as_materialized_series();
            let null_count = series.null_count();
            let null_percentage = if height > 0 {
                (null_count as f64 / height as f64) * 100.0
            } else {
                0.0
            };

            columns.push(ColumnOverview {
                name: name.to_string(),
                dtype: format!("{:?}", series.dtype()),
                null_count,
                null_percentage,
            });

            if is_numeric_dtype(series.dtype())
                && let Some(summary) = describe_numeric(name.as_str(), series)?
            {
                numeric.push(summary);
            }
        }

        Ok(DatasetOverview {
            shape: (df.height(), df.width()),
            columns,
            numeric,
        })
    }
}

/// Compute the describe row for one numeric column, or None when the column
/// has no observed values.
fn describe_numeric(name: &str, series: &Series) -> Result<Option<NumericSummary>> {
    let mut values = non_null_f64_values(series)?;
    if values.is_empty() {
        return Ok(None);
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;

    Ok(Some(NumericSummary {
        name: name.to_string(),
        count,
        mean,
        std: sample_std(&values, mean),
        min: values[0],
        p25: percentile(&values, 25.0),
        median: percentile(&values, 50.0),
        p75: percentile(&values, 75.0),
        max: values[count - 1],
    }))
}

/// Sample standard deviation (n−1 denominator).
pub(crate) fn sample_std(values: &[f64], mean: f64) -> f64 {
    let n = values.len() as f64;
    if n <= 1.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Linear-interpolation percentile over an ascending-sorted slice.
pub(crate) fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (rank - lower as f64) * (sorted[upper] - sorted[lower])
    }
}
