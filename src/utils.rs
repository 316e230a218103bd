//! Shared utilities for the listing analysis pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let mask = series.is_null();
    let len = series.len();
    let mut result_vec = Vec::with_capacity(len);

    for i in 0..len {
        if mask.get(i).unwrap_or(false) {
            result_vec.push(Some(fill_value));
        } else {
            let val = series.get(i)?;
            result_vec.push(Some(val.try_extract::<f64>()?));
        }
    }

    Ok(Series::new(series.name().clone(), result_vec))
}

/// Collect the non-null values of a numeric Series as f64, in row order.
pub fn non_null_f64_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let float_series = series.drop_nulls().cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().flatten().collect())
}

// =============================================================================
// Formatting Utilities
// =============================================================================

/// Render a numeric group key the way the summary tables show it: whole
/// values lose the trailing ".0", fractional values keep two decimals
/// (an imputed seat count can land between whole numbers).
pub fn format_numeric_label(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(is_numeric_dtype(&DataType::UInt32));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("seats".into(), &[Some(4.0), None, Some(2.0)]);
        let filled = fill_numeric_nulls(&series, 3.0).unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(0).unwrap().try_extract::<f64>().unwrap(), 4.0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 2.0);
    }

    #[test]
    fn test_fill_numeric_nulls_preserves_name() {
        let series = Series::new("power".into(), &[Some(90.0), None]);
        let filled = fill_numeric_nulls(&series, 1.0).unwrap();
        assert_eq!(filled.name().as_str(), "power");
    }

    #[test]
    fn test_non_null_f64_values() {
        let series = Series::new("km".into(), &[Some(10i64), None, Some(30)]);
        let values = non_null_f64_values(&series).unwrap();
        assert_eq!(values, vec![10.0, 30.0]);
    }

    #[test]
    fn test_non_null_f64_values_empty() {
        let series = Series::new("km".into(), Vec::<Option<f64>>::new());
        let values = non_null_f64_values(&series).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_format_numeric_label() {
        assert_eq!(format_numeric_label(4.0), "4");
        assert_eq!(format_numeric_label(5.5), "5.50");
        assert_eq!(format_numeric_label(5.25), "5.25");
        assert_eq!(format_numeric_label(-2.0), "-2");
    }
}
