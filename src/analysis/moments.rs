//! Statistical moments of a numeric column
//!
//! This module computes the mean, sample variance, sample skewness and sample
//! excess kurtosis of a column and prints them for inspection.

use crate::common::data_structures::{ColumnError, HousingTable};
use tracing::info;

/// Central-moment sums below this magnitude are treated as zero
const ZERO_TOLERANCE: f64 = 1e-14;

/// Errors that can occur during moment analysis
#[derive(Debug)]
pub enum MomentsError {
    Column(ColumnError),
}

impl std::fmt::Display for MomentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MomentsError::Column(e) => write!(f, "Failed to read column: {}", e),
        }
    }
}

impl std::error::Error for MomentsError {}

impl From<ColumnError> for MomentsError {
    fn from(err: ColumnError) -> Self {
        MomentsError::Column(err)
    }
}

type Result<T> = core::result::Result<T, MomentsError>;

/// The four moments of a sample
///
/// Statistics that are undefined for the sample size are `NaN`: the mean of
/// an empty sample, the variance below 2 values, the skewness below 3 and the
/// kurtosis below 4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub count: usize,
    pub mean: f64,
    /// Sample variance (denominator `n - 1`)
    pub variance: f64,
    /// Adjusted Fisher-Pearson skewness (G1)
    pub skewness: f64,
    /// Sample excess kurtosis (G2); a normal distribution scores 0
    pub kurtosis: f64,
}

fn zero_out(sum: f64) -> f64 {
    if sum.abs() < ZERO_TOLERANCE {
        0.0
    } else {
        sum
    }
}

impl Moments {
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        let n = count as f64;

        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                variance: f64::NAN,
                skewness: f64::NAN,
                kurtosis: f64::NAN,
            };
        }

        let mean = values.iter().sum::<f64>() / n;

        let (mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0);
        for value in values {
            let d = value - mean;
            let d2 = d * d;
            s2 += d2;
            s3 += d2 * d;
            s4 += d2 * d2;
        }
        let (s2, s3, s4) = (zero_out(s2), zero_out(s3), zero_out(s4));

        let variance = if count < 2 { f64::NAN } else { s2 / (n - 1.0) };

        let skewness = if count < 3 {
            f64::NAN
        } else if s2 == 0.0 {
            0.0
        } else {
            (n * (n - 1.0).sqrt() / (n - 2.0)) * (s3 / s2.powf(1.5))
        };

        let kurtosis = if count < 4 {
            f64::NAN
        } else {
            let numerator = n * (n + 1.0) * (n - 1.0) * s4;
            let denominator = (n - 2.0) * (n - 3.0) * s2 * s2;
            if denominator == 0.0 {
                0.0
            } else {
                let adjustment = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
                numerator / denominator - adjustment
            }
        };

        Self {
            count,
            mean,
            variance,
            skewness,
            kurtosis,
        }
    }

    /// Console report: mean and variance to 2 decimals, shape moments to 4
    pub fn report(&self, label: &str) -> String {
        format!(
            "--- Statistical Moments for {} ---\nMean: {:.2}\nVariance: {:.2}\nSkewness: {:.4}\nKurtosis: {:.4}",
            label, self.mean, self.variance, self.skewness, self.kurtosis
        )
    }
}

/// Capitalises the first letter of a column name for display
fn display_name(column: &str) -> String {
    let mut chars = column.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Generate the moment analysis for `column` and print it
///
/// # Arguments
/// * `table` - The cleaned housing table
/// * `column` - Numeric column to summarise
///
/// # Returns
/// * `Ok(Moments)` - The computed moments
/// * `Err(MomentsError)` - If the column is missing or not numeric
pub fn generate_moments_analysis(table: &HousingTable, column: &str) -> Result<Moments> {
    let values = table.numeric_values(column)?;
    let moments = Moments::from_values(&values);

    info!(column, count = moments.count, "computed moments");
    println!("\n{}", moments.report(&display_name(column)));

    Ok(moments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::{Column, ColumnKind, Value};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_known_values() {
        let moments = Moments::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(moments.count, 5);
        assert_close(moments.mean, 3.0);
        assert_close(moments.variance, 2.5);
        assert_close(moments.skewness, 0.0);
        assert_close(moments.kurtosis, -1.2);
    }

    #[test]
    fn test_symmetric_distribution_has_no_skew() {
        let values: Vec<f64> = (-50..=50).map(|v| v as f64 * 1000.0 + 500_000.0).collect();
        let moments = Moments::from_values(&values);

        assert_close(moments.mean, 500_000.0);
        assert!(moments.skewness.abs() < 1e-9);
    }

    #[test]
    fn test_right_skewed_distribution() {
        let moments = Moments::from_values(&[1.0, 1.0, 1.0, 2.0, 10.0]);
        assert!(moments.skewness > 0.0);
        assert!(moments.kurtosis > 0.0);
    }

    #[test]
    fn test_small_samples() {
        let empty = Moments::from_values(&[]);
        assert!(empty.mean.is_nan());
        assert!(empty.variance.is_nan());

        let single = Moments::from_values(&[4.0]);
        assert_eq!(single.mean, 4.0);
        assert!(single.variance.is_nan());

        let pair = Moments::from_values(&[1.0, 3.0]);
        assert_close(pair.variance, 2.0);
        assert!(pair.skewness.is_nan());

        let triple = Moments::from_values(&[1.0, 2.0, 6.0]);
        assert!(triple.skewness.is_finite());
        assert!(triple.kurtosis.is_nan());
    }

    #[test]
    fn test_constant_values() {
        let moments = Moments::from_values(&[7.0; 6]);

        assert_eq!(moments.variance, 0.0);
        assert_eq!(moments.skewness, 0.0);
        assert_eq!(moments.kurtosis, 0.0);
    }

    #[test]
    fn test_report_rounding() {
        let report = Moments::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).report("Price");

        assert!(report.starts_with("--- Statistical Moments for Price ---"));
        assert!(report.contains("Mean: 3.00"));
        assert!(report.contains("Variance: 2.50"));
        assert!(report.contains("Skewness: 0.0000"));
        assert!(report.contains("Kurtosis: -1.2000"));
    }

    #[test]
    fn test_generate_moments_analysis() {
        let table = HousingTable::new(
            vec![Column {
                name: "price".to_string(),
                kind: ColumnKind::Numeric,
            }],
            (1..=5).map(|v| vec![Value::Number(v as f64)]).collect(),
        );

        let moments = generate_moments_analysis(&table, "price").unwrap();
        assert_close(moments.mean, 3.0);

        let result = generate_moments_analysis(&table, "sqft_living");
        assert!(matches!(
            result,
            Err(MomentsError::Column(ColumnError::NotFound(_)))
        ));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("price"), "Price");
        assert_eq!(display_name(""), "");
    }
}
