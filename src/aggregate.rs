//! Group summaries over the cleaned listings table.
//!
//! Produces the per-key averages the report and charts are built from
//! (average price by seat count, by transmission, by brand) and the
//! categorical share breakdown behind the fuel pie chart.

use crate::error::{AnalysisError, Result};
use crate::types::{CategoryCount, GroupRow, GroupSummary};
use crate::utils::format_numeric_label;
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

#[derive(Default)]
struct GroupAccum {
    sort_key: Option<f64>,
    price_sum: f64,
    price_n: usize,
    km_sum: f64,
    km_n: usize,
    count: usize,
}

/// Grouped aggregation over the listings table.
pub struct GroupSummarizer;

impl GroupSummarizer {
    /// Summarize listings grouped by `key_column`.
    ///
    /// Each group yields its average price, optionally its average
    /// kilometers driven, and its row count. Rows with a missing key are
    /// excluded from every group; a group whose prices are all missing is
    /// omitted, since it has no average to report. Groups are ordered by
    /// key: numerically for numeric keys (so seat count 10 sorts after 4),
    /// alphabetically otherwise.
    pub fn summarize(
        df: &DataFrame,
        key_column: &str,
        include_average_km: bool,
    ) -> Result<GroupSummary> {
        let key_series = df
            .column(key_column)
            .map_err(|_| AnalysisError::ColumnNotFound(key_column.to_string()))?
            .as_materialized_series()
            .clone();
        let price = df
            .column("price")
            .map_err(|_| AnalysisError::ColumnNotFound("price".to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| AnalysisError::AggregationFailed {
                key: key_column.to_string(),
                reason: e.to_string(),
            })?;
        let price_ca = price.f64()?;

        let km = if include_average_km {
            let series = df
                .column("km")
                .map_err(|_| AnalysisError::ColumnNotFound("km".to_string()))?
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| AnalysisError::AggregationFailed {
                    key: key_column.to_string(),
                    reason: e.to_string(),
                })?;
            Some(series)
        } else {
            None
        };
        let km_ca = match &km {
            Some(series) => Some(series.f64()?),
            None => None,
        };

        let mut groups: HashMap<String, GroupAccum> = HashMap::new();
        for i in 0..df.height() {
            let (label, sort_key) = match key_series.get(i)? {
                AnyValue::Null => continue,
                AnyValue::String(s) => (s.to_string(), None),
                AnyValue::StringOwned(s) => (s.to_string(), None),
                other => {
                    let value =
                        other
                            .try_extract::<f64>()
                            .map_err(|e| AnalysisError::AggregationFailed {
                                key: key_column.to_string(),
                                reason: e.to_string(),
                            })?;
                    (format_numeric_label(value), Some(value))
                }
            };

            let entry = groups.entry(label).or_insert_with(|| GroupAccum {
                sort_key,
                ..GroupAccum::default()
            });
            entry.count += 1;
            if let Some(p) = price_ca.get(i) {
                entry.price_sum += p;
                entry.price_n += 1;
            }
            if let Some(ca) = km_ca
                && let Some(k) = ca.get(i)
            {
                entry.km_sum += k;
                entry.km_n += 1;
            }
        }

        let group_count = groups.len();
        let mut rows: Vec<(Option<f64>, GroupRow)> = groups
            .into_iter()
            .filter(|(_, acc)| acc.price_n > 0)
            .map(|(key, acc)| {
                let average_price = acc.price_sum / acc.price_n as f64;
                let average_km = if include_average_km && acc.km_n > 0 {
                    Some(acc.km_sum / acc.km_n as f64)
                } else {
                    None
                };
                (
                    acc.sort_key,
                    GroupRow {
                        key,
                        average_price,
                        average_km,
                        count: acc.count,
                    },
                )
            })
            .collect();

        if rows.iter().all(|(sort_key, _)| sort_key.is_some()) {
            rows.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        } else {
            rows.sort_by(|a, b| a.1.key.cmp(&b.1.key));
        }

        if rows.len() < group_count {
            debug!(
                "Omitted {} groups by '{}' with no observed price",
                group_count - rows.len(),
                key_column
            );
        }
        debug!("Summarized {} groups by '{}'", rows.len(), key_column);
        Ok(GroupSummary {
            key_column: key_column.to_string(),
            rows: rows.into_iter().map(|(_, row)| row).collect(),
        })
    }

    /// Count occurrences of each category in `column`, most frequent first.
    ///
    /// Missing values are excluded; each share is that category's fraction
    /// of the observed total.
    pub fn category_distribution(df: &DataFrame, column: &str) -> Result<Vec<CategoryCount>> {
        let series = df
            .column(column)
            .map_err(|_| AnalysisError::ColumnNotFound(column.to_string()))?
            .as_materialized_series()
            .clone();
        let non_null = series.drop_nulls();
        if non_null.is_empty() {
            return Ok(Vec::new());
        }

        let counts_df = non_null
            .value_counts(true, false, "count".into(), false)
            .map_err(|e| AnalysisError::AggregationFailed {
                key: column.to_string(),
                reason: e.to_string(),
            })?;
        let values_col = counts_df.column(non_null.name())?;
        let counts = counts_df
            .column("count")?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let counts_ca = counts.f64()?;

        let total: f64 = counts_ca.into_iter().flatten().sum();
        let mut distribution = Vec::with_capacity(counts_df.height());
        for i in 0..counts_df.height() {
            let value = match values_col.get(i)? {
                AnyValue::String(s) => s.to_string(),
                AnyValue::StringOwned(s) => s.to_string(),
                other => format!("{}", other),
            };
            let count = counts_ca.get(i).unwrap_or(0.0);
            distribution.push(CategoryCount {
                value,
                count: count as usize,
                share: if total > 0.0 { count / total } else { 0.0 },
            });
        }

        Ok(distribution)
    }
}
