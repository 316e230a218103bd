//! Mean imputation for numeric listing attributes.

use crate::config::EmptyColumnPolicy;
use crate::error::{AnalysisError, Result};
use crate::types::ImputedColumn;
use crate::utils::fill_numeric_nulls;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Outcome of running mean imputation over the configured columns.
#[derive(Debug, Clone, Default)]
pub struct ImputationOutcome {
    /// Columns that had at least one missing value filled.
    pub imputed: Vec<ImputedColumn>,
    /// Columns skipped because every value was missing.
    pub skipped: Vec<String>,
}

/// Mean-based imputation for numeric columns.
pub struct MeanImputer;

impl MeanImputer {
    /// Fill missing values in each configured column with that column's mean.
    ///
    /// The mean is computed over the observed values of the frame as passed
    /// in, so callers must run required-field filtering first. Columns absent
    /// from the table are ignored: the imputation list is a superset of what
    /// any particular dataset carries. A column with no observed values has
    /// no mean; `policy` decides whether that skips the column or fails the
    /// run.
    pub fn fill_columns(
        df: &mut DataFrame,
        columns: &[String],
        policy: EmptyColumnPolicy,
    ) -> Result<ImputationOutcome> {
        let mut outcome = ImputationOutcome::default();

        for name in columns {
            let Ok(column) = df.column(name) else {
                debug!("Imputation column '{}' not in dataset, ignoring", name);
                continue;
            };
            let series = column.as_materialized_series().clone();

            let Some(mean) = series.mean() else {
                match policy {
                    EmptyColumnPolicy::Skip => {
                        warn!("Column '{}' has no observed values, skipping imputation", name);
                        outcome.skipped.push(name.clone());
                        continue;
                    }
                    EmptyColumnPolicy::Fail => {
                        return Err(AnalysisError::EmptyImputationColumn(name.clone()));
                    }
                }
            };

            let missing = series.null_count();
            if missing == 0 {
                debug!("Column '{}' has no missing values", name);
                continue;
            }

            let filled = fill_numeric_nulls(&series, mean).map_err(|e| {
                AnalysisError::ImputationFailed {
                    column: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            df.replace(name, filled)
                .map_err(|e| AnalysisError::ImputationFailed {
                    column: name.clone(),
                    reason: e.to_string(),
                })?;

            info!("Filled '{}' with mean: {:.2} ({} values)", name, mean, missing);
            outcome.imputed.push(ImputedColumn {
                column: name.clone(),
                fill_value: mean,
                filled_count: missing,
            });
        }

        Ok(outcome)
    }
}
