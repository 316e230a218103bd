//! CSV loading and schema normalization for listing data.
//!
//! Loading is the only stage that touches the filesystem on the input side.
//! It verifies the file exists, reads it through polars, checks that the
//! columns later stages depend on are present, and normalizes the numeric
//! listing columns to `Float64` so imputed means, the price/km ratio and
//! duplicate comparison behave the same whether or not a column happened to
//! infer as integers.

use crate::config::PipelineConfig;
use crate::error::{AnalysisError, Result, ResultExt};
use crate::utils::is_numeric_dtype;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Load the raw listings table.
///
/// Fails with [`AnalysisError::InputNotFound`] when the path does not exist,
/// [`AnalysisError::ColumnNotFound`] when a required or categorical column is
/// absent, and [`AnalysisError::SchemaMismatch`] when a numeric listing
/// column inferred as something non-numeric.
pub fn load_listings(path: &Path, config: &PipelineConfig) -> Result<DataFrame> {
    if !path.exists() {
        return Err(AnalysisError::InputNotFound(path.to_path_buf()));
    }

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Reading {}", path.display()))?
        .finish()
        .context(format!("Parsing {}", path.display()))?;

    info!(
        "Data loaded from {} ({} rows, {} columns)",
        path.display(),
        df.height(),
        df.width()
    );

    if df.height() == 0 {
        return Err(AnalysisError::EmptyDataset(format!(
            "after loading {}",
            path.display()
        )));
    }

    ensure_columns(&df, config)?;
    normalize_numeric_columns(df, config)
}

/// Verify the columns every run depends on are in the schema.
///
/// Imputation columns are deliberately not checked: an absent one is skipped
/// during cleaning rather than treated as an error.
fn ensure_columns(df: &DataFrame, config: &PipelineConfig) -> Result<()> {
    let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();

    for column in config
        .required_columns
        .iter()
        .chain(config.categorical_columns.iter())
    {
        if !names.contains(&column.as_str()) {
            return Err(AnalysisError::ColumnNotFound(column.clone()));
        }
    }

    Ok(())
}

/// Cast the numeric listing columns (required + imputation list) to Float64.
fn normalize_numeric_columns(mut df: DataFrame, config: &PipelineConfig) -> Result<DataFrame> {
    let numeric_columns: Vec<String> = config
        .required_columns
        .iter()
        .chain(config.impute_columns.iter())
        .cloned()
        .collect();

    for name in &numeric_columns {
        let dtype = match df.column(name) {
            Ok(column) => column.dtype().clone(),
            // Absent imputation column; cleaning will skip it too.
            Err(_) => continue,
        };

        if dtype == DataType::Float64 {
            continue;
        }

        let column = df.column(name)?;
        // CSV inference types an all-empty column as String; with no
        // observed values it still casts cleanly to Float64.
        let all_null = column.null_count() == column.len();
        if !is_numeric_dtype(&dtype) && !all_null {
            return Err(AnalysisError::SchemaMismatch {
                column: name.clone(),
                dtype: format!("{:?}", dtype),
            });
        }

        debug!("Casting column '{}' from {:?} to Float64", name, dtype);
        let cast = column.as_materialized_series().cast(&DataType::Float64)?;
        df.replace(name, cast)?;
    }

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    const LISTINGS_CSV: &str = "\
price,km,engine,mileage,power,seats,fuel,transmission,brand
4000,52000,1200,18.5,82,5,Petrol,Manual,Maruti
6500,30000,1500,,110,5,Diesel,Manual,Hyundai
12000,15000,2000,14.2,190,4,Petrol,Automatic,BMW
";

    fn write_temp_csv(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("carlens_loader_{}_{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let config = PipelineConfig::default();
        let err = load_listings(Path::new("does_not_exist.csv"), &config).unwrap_err();
        assert_eq!(err.error_code(), "INPUT_NOT_FOUND");
        assert!(err.to_string().contains("does_not_exist.csv"));
    }

    #[test]
    fn test_load_reads_shape_and_normalizes_to_float() {
        let path = write_temp_csv("ok.csv", LISTINGS_CSV);
        let config = PipelineConfig::default();

        let df = load_listings(&path, &config).unwrap();
        assert_eq!(df.shape(), (3, 9));

        // Integer-inferred columns come out as Float64.
        for name in ["price", "km", "engine", "power", "seats"] {
            assert_eq!(
                df.column(name).unwrap().dtype(),
                &DataType::Float64,
                "column {name} should be normalized"
            );
        }
        // Categorical columns stay strings.
        assert_eq!(df.column("fuel").unwrap().dtype(), &DataType::String);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_missing_required_column() {
        let path = write_temp_csv(
            "no_km.csv",
            "price,engine,fuel,transmission,brand\n4000,1200,Petrol,Manual,Maruti\n",
        );
        let config = PipelineConfig::default();

        let err = load_listings(&path, &config).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert!(err.to_string().contains("km"));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_missing_impute_column_is_fine() {
        let path = write_temp_csv(
            "no_engine.csv",
            "price,km,fuel,transmission,brand\n4000,52000,Petrol,Manual,Maruti\n",
        );
        let config = PipelineConfig::default();

        let df = load_listings(&path, &config).unwrap();
        assert_eq!(df.shape(), (1, 5));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_all_empty_column_becomes_float() {
        let path = write_temp_csv(
            "empty_engine.csv",
            "price,km,engine,fuel,transmission,brand\n\
             4000,52000,,Petrol,Manual,Maruti\n\
             6500,30000,,Diesel,Manual,Hyundai\n",
        );
        let config = PipelineConfig::default();

        let df = load_listings(&path, &config).unwrap();
        let engine = df.column("engine").unwrap();
        assert_eq!(engine.dtype(), &DataType::Float64);
        assert_eq!(engine.null_count(), 2);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_non_numeric_price_is_schema_error() {
        let path = write_temp_csv(
            "bad_price.csv",
            "price,km,fuel,transmission,brand\ncheap,52000,Petrol,Manual,Maruti\n",
        );
        let config = PipelineConfig::default();

        let err = load_listings(&path, &config).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_MISMATCH");
        assert!(err.to_string().contains("price"));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_empty_file_is_error() {
        let path = write_temp_csv(
            "empty.csv",
            "price,km,engine,mileage,power,seats,fuel,transmission,brand\n",
        );
        let config = PipelineConfig::default();

        let err = load_listings(&path, &config).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_DATASET");

        let _ = std::fs::remove_file(path);
    }
}
