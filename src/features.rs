//! Derived listing features.
//!
//! Currently a single derivation: price per kilometer driven, used by the
//! dataset overview and available to downstream consumers of the cleaned
//! table.

use crate::config::ZeroKmPolicy;
use crate::error::{AnalysisError, Result};
use polars::prelude::*;
use tracing::{info, warn};

/// Name of the derived price-per-kilometer column.
pub const PRICE_PER_KM_COLUMN: &str = "price_per_km";

/// Derivation of new columns from the cleaned listings table.
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Add a `price_per_km` column computed as `price / km`.
    ///
    /// Division by zero is never performed: `policy` decides whether a
    /// zero-kilometer listing keeps a missing ratio or is dropped from the
    /// table. Returns the table plus the number of zero-kilometer rows
    /// encountered.
    pub fn derive_price_per_km(
        df: DataFrame,
        policy: ZeroKmPolicy,
    ) -> Result<(DataFrame, usize)> {
        let price = df
            .column("price")
            .map_err(|_| AnalysisError::ColumnNotFound("price".to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| AnalysisError::DerivationFailed {
                column: PRICE_PER_KM_COLUMN.to_string(),
                reason: e.to_string(),
            })?;
        let km = df
            .column("km")
            .map_err(|_| AnalysisError::ColumnNotFound("km".to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| AnalysisError::DerivationFailed {
                column: PRICE_PER_KM_COLUMN.to_string(),
                reason: e.to_string(),
            })?;

        let mut ratios: Vec<Option<f64>> = Vec::with_capacity(df.height());
        let mut keep: Vec<bool> = Vec::with_capacity(df.height());
        let mut zero_km = 0usize;

        for (p, k) in price.f64()?.into_iter().zip(km.f64()?.into_iter()) {
            let is_zero_km = k == Some(0.0);
            if is_zero_km {
                zero_km += 1;
            }
            match (p, k) {
                (Some(p), Some(k)) if k != 0.0 => ratios.push(Some(p / k)),
                _ => ratios.push(None),
            }
            keep.push(!is_zero_km);
        }

        let mut df = df;
        let ratio_series = Series::new(PRICE_PER_KM_COLUMN.into(), ratios);
        df.with_column(ratio_series)
            .map_err(|e| AnalysisError::DerivationFailed {
                column: PRICE_PER_KM_COLUMN.to_string(),
                reason: e.to_string(),
            })?;

        if zero_km > 0 {
            match policy {
                ZeroKmPolicy::Null => {
                    warn!(
                        "{} zero-kilometer rows, leaving their price_per_km missing",
                        zero_km
                    );
                }
                ZeroKmPolicy::Drop => {
                    let mask = Series::new("keep".into(), keep);
                    df = df.filter(mask.bool()?)?;
                    warn!("Dropped {} zero-kilometer rows", zero_km);
                }
            }
        }

        info!("Derived column '{}'", PRICE_PER_KM_COLUMN);
        Ok((df, zero_km))
    }
}
