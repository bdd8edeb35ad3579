use polars::prelude::*;

use crate::error::StatsError;
use crate::ingest::{TimeSeries, VARIABLE_COLUMN};

/// Descriptive summary of the `variable` column over its non-null values.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (N-1). NaN for a single value.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// The four headline metrics, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub mean: String,
    pub max: String,
    pub min: String,
    pub std: String,
}

impl Summary {
    /// Zero-variance: every value is the same.
    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }

    /// Row labels and values in the conventional describe() order.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            mean: format_metric(self.mean),
            max: format_metric(self.max),
            min: format_metric(self.min),
            std: format_metric(self.std),
        }
    }
}

/// Two decimal digits.
pub fn format_metric(v: f64) -> String {
    format!("{:.2}", v)
}

/// Summarize the measured column of a normalized upload.
pub fn describe(series: &TimeSeries) -> Result<Summary, StatsError> {
    let column = series.variable()?;
    describe_series(column.as_materialized_series())
}

/// Summarize any numeric series. Nulls and NaNs are skipped.
pub fn describe_series(series: &Series) -> Result<Summary, StatsError> {
    // An all-empty column is inferred as text; report it as empty rather than non-numeric.
    if series.null_count() == series.len() {
        return Err(StatsError::NoValues(display_name(series)));
    }
    let values = numeric_values(series)?;
    if values.is_empty() {
        return Err(StatsError::NoValues(display_name(series)));
    }

    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = sample_std(&values, mean);

    Ok(Summary {
        count,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.50),
        q75: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Non-null values of a numeric series as f64, in row order.
pub fn numeric_values(series: &Series) -> Result<Vec<f64>, StatsError> {
    if !is_numeric_type(series.dtype()) {
        return Err(StatsError::NonNumeric {
            column: display_name(series),
            dtype: series.dtype().to_string(),
        });
    }
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.iter().flatten().filter(|v| !v.is_nan()).collect())
}

pub(crate) fn is_numeric_type(dtype: &DataType) -> bool {
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

fn display_name(series: &Series) -> String {
    let name = series.name().to_string();
    if name.is_empty() {
        VARIABLE_COLUMN.to_string()
    } else {
        name
    }
}

fn sample_std(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Linear interpolation between the two closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate_linearly() {
        let s = Series::new("v".into(), &[1.0_f64, 2.0, 3.0, 4.0]);
        let summary = describe_series(&s).unwrap();
        assert!((summary.q25 - 1.75).abs() < 1e-12);
        assert!((summary.median - 2.5).abs() < 1e-12);
        assert!((summary.q75 - 3.25).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_nan_std() {
        let s = Series::new("v".into(), &[7_i64]);
        let summary = describe_series(&s).unwrap();
        assert_eq!(summary.count, 1);
        assert!(summary.std.is_nan());
        assert_eq!(summary.min, 7.0);
        assert_eq!(summary.max, 7.0);
        assert!(summary.is_constant());
    }

    #[test]
    fn constant_series_has_zero_std() {
        let s = Series::new("v".into(), &[5_i64, 5, 5]);
        let summary = describe_series(&s).unwrap();
        assert_eq!(summary.std, 0.0);
        assert!(summary.is_constant());
    }

    #[test]
    fn nulls_are_skipped() {
        let s = Series::new("v".into(), &[Some(1.0_f64), None, Some(3.0)]);
        let summary = describe_series(&s).unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.mean, 2.0);
    }

    #[test]
    fn strings_are_rejected() {
        let s = Series::new("v".into(), &["a", "b"]);
        assert!(matches!(
            describe_series(&s),
            Err(StatsError::NonNumeric { .. })
        ));
    }

    #[test]
    fn all_null_has_no_values() {
        let s = Series::new("v".into(), &[None::<f64>, None]);
        assert!(matches!(describe_series(&s), Err(StatsError::NoValues(_))));
    }

    #[test]
    fn metrics_use_two_decimals() {
        assert_eq!(format_metric(21.666_666), "21.67");
        assert_eq!(format_metric(25.0), "25.00");
        assert_eq!(format_metric(f64::NAN), "NaN");
    }
}
