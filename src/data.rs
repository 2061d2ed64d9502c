//! DataFrame ingestion
//!
//! Construction convenience: pull covariates and response out of a polars
//! DataFrame so a Tuner can be built straight from tabular data.

use crate::error::{Result, TuneError};
use crate::tuner::Tuner;
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Extract named columns into a row-major f64 matrix.
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| {
            let series = df
                .column(name)
                .map_err(|_| TuneError::ValidationError(format!("column {name:?} not found")))?;
            let as_f64 = series.cast(&DataType::Float64)?;
            let values: Vec<f64> = as_f64
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_data[c][r]))
}

fn column_to_array1(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    let series = df
        .column(name)
        .map_err(|_| TuneError::ValidationError(format!("target column {name:?} not found")))?;
    let as_f64 = series.cast(&DataType::Float64)?;
    Ok(as_f64.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

impl Tuner {
    /// Build a tuner from a DataFrame: the target column becomes the
    /// response, every other column a covariate.
    pub fn from_dataframe(df: &DataFrame, target: &str) -> Result<Self> {
        let feature_cols: Vec<String> = df
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != target)
            .map(|s| s.to_string())
            .collect();
        if feature_cols.is_empty() {
            return Err(TuneError::ValidationError(
                "dataframe has no feature columns besides the target".to_string(),
            ));
        }

        let x = columns_to_array2(df, &feature_cols)?;
        let y = column_to_array1(df, target)?;
        Ok(Tuner::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dataframe_splits_features_and_target() {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0],
            "b" => &[4.0, 5.0, 6.0],
            "label" => &[0.0, 1.0, 0.0]
        )
        .unwrap();

        let tuner = Tuner::from_dataframe(&df, "label").unwrap();
        assert_eq!(tuner.x().dim(), (3, 2));
        assert_eq!(tuner.y().len(), 3);
        assert_eq!(tuner.x()[[1, 0]], 2.0);
        assert_eq!(tuner.x()[[1, 1]], 5.0);
        assert_eq!(tuner.y()[1], 1.0);
    }

    #[test]
    fn test_integer_columns_cast_to_f64() {
        let df = df!(
            "a" => &[1i64, 2, 3],
            "label" => &[0i64, 1, 0]
        )
        .unwrap();
        let tuner = Tuner::from_dataframe(&df, "label").unwrap();
        assert_eq!(tuner.x()[[2, 0]], 3.0);
        assert_eq!(tuner.y()[1], 1.0);
    }

    #[test]
    fn test_missing_target_errors() {
        let df = df!("a" => &[1.0, 2.0]).unwrap();
        assert!(Tuner::from_dataframe(&df, "label").is_err());
    }
}
