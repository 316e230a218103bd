//! Row-level cleaning: required-field filtering and deduplication.
//!
//! Both operations are pure: they take the table by value and return a new
//! table plus the count the cleaning report needs. Imputation sits between
//! them in the pipeline and lives in [`crate::imputers`].

use crate::error::{AnalysisError, Result};
use polars::prelude::*;
use tracing::{debug, info};

/// Cleaning operations over the listings table.
pub struct DataCleaner;

impl DataCleaner {
    /// Discard every record missing one of the required fields.
    ///
    /// Returns the filtered table and the number of rows dropped. The
    /// filter runs before imputation and deduplication, so the dropped
    /// count matches the "Rows dropped" line of the report.
    pub fn drop_missing_required(
        df: DataFrame,
        required: &[String],
    ) -> Result<(DataFrame, usize)> {
        let before = df.height();

        let mut mask: Option<BooleanChunked> = None;
        for name in required {
            let series = df
                .column(name)
                .map_err(|_| AnalysisError::ColumnNotFound(name.clone()))?
                .as_materialized_series();
            let not_null = series.is_not_null();
            mask = Some(match mask {
                Some(m) => &m & &not_null,
                None => not_null,
            });
        }

        let filtered = match mask {
            Some(m) => df
                .filter(&m)
                .map_err(|e| AnalysisError::CleaningFailed(e.to_string()))?,
            None => df,
        };

        let dropped = before - filtered.height();
        info!("Rows dropped: {}", dropped);
        if dropped > 0 {
            debug!(
                "Dropped {} of {} rows for missing {:?}",
                dropped, before, required
            );
        }

        Ok((filtered, dropped))
    }

    /// Remove exact-duplicate rows, keeping the first occurrence.
    ///
    /// Returns the deduplicated table and the number of rows removed.
    pub fn deduplicate(df: DataFrame) -> Result<(DataFrame, usize)> {
        let before = df.height();
        let deduped = df
            .unique_stable(None, UniqueKeepStrategy::First, None)
            .map_err(|e| AnalysisError::CleaningFailed(e.to_string()))?;
        let removed = before - deduped.height();

        info!("Duplicates removed: {}", removed);
        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            debug!("Removed {} duplicate rows ({:.1}%)", removed, pct);
        }

        Ok((deduped, removed))
    }
}
