//! Correlation analysis across all numeric columns
//!
//! This module computes the Pearson correlation matrix of every numeric column
//! and renders it as a heatmap.

use super::constants::{HEATMAP_FIGURE, HEATMAP_FILE};
use crate::common::data_structures::HousingTable;
use crate::common::plots::create_heatmap_plot;
use crate::common::PlotError;
use crate::config::AnalysisConfig;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during correlation analysis
#[derive(Error, Debug)]
pub enum CorrelationError {
    #[error("No numeric columns to correlate")]
    NoNumericColumns,

    #[error("Failed to generate plot: {0}")]
    PlotGeneration(#[from] PlotError),
}

type Result<T> = core::result::Result<T, CorrelationError>;

/// Square matrix of pairwise Pearson correlations
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// `values[i][j]` is the correlation of `labels[i]` with `labels[j]`
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlates every numeric column of `table`
    ///
    /// Each pair uses the rows where both columns are present. The result is
    /// symmetric, the diagonal is `1.0` for every column with non-zero
    /// variance, and pairs with fewer than two shared observations or a
    /// constant side are `NaN`.
    pub fn pearson(table: &HousingTable) -> Self {
        let indices = table.numeric_columns();
        let labels: Vec<String> = indices
            .iter()
            .map(|&index| table.columns()[index].name.clone())
            .collect();
        let columns: Vec<Vec<Option<f64>>> = indices
            .iter()
            .map(|&index| table.rows().iter().map(|row| row[index].as_f64()).collect())
            .collect();

        let n = columns.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = pearson_pair(&columns[i], &columns[j]);
                let r = if i == j && r.is_finite() { 1.0 } else { r };
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self { labels, values }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Pearson correlation over the rows where both sides are present
fn pearson_pair(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }

    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Generate the correlation heatmap
///
/// Creates `plot3_heatmap.png` in the output directory.
///
/// # Arguments
/// * `table` - The cleaned housing table
/// * `config` - Dpi and output directory
///
/// # Returns
/// * `Ok(CorrelationMatrix)` - The plotted matrix
/// * `Err(CorrelationError)` - If there is nothing to correlate or plot generation failed
pub fn generate_correlation_heatmap(
    table: &HousingTable,
    config: &AnalysisConfig,
) -> Result<CorrelationMatrix> {
    let matrix = CorrelationMatrix::pearson(table);
    if matrix.is_empty() {
        return Err(CorrelationError::NoNumericColumns);
    }
    debug!(columns = matrix.len(), "computed correlation matrix");

    create_heatmap_plot(
        &matrix.labels,
        &matrix.values,
        "Correlation Heatmap of Housing Variables",
        HEATMAP_FIGURE,
        config.dpi,
        &config.output_dir.join(HEATMAP_FILE),
    )?;

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::{Column, ColumnKind, Value};

    fn column(name: &str, kind: ColumnKind) -> Column {
        Column {
            name: name.to_string(),
            kind,
        }
    }

    fn table() -> HousingTable {
        let rows = [
            (221900.0, 1180.0, 3.0, 1.0),
            (538000.0, 2570.0, 3.0, 2.0),
            (180000.0, 770.0, 2.0, 1.0),
            (604000.0, 1960.0, 4.0, 1.0),
            (510000.0, 1680.0, 3.0, 1.0),
        ];
        HousingTable::new(
            vec![
                column("price", ColumnKind::Numeric),
                column("sqft_living", ColumnKind::Numeric),
                column("bedrooms", ColumnKind::Numeric),
                column("floors", ColumnKind::Numeric),
                column("zip", ColumnKind::Text),
            ],
            rows.iter()
                .map(|&(price, area, bedrooms, floors)| {
                    vec![
                        Value::Number(price),
                        Value::Number(area),
                        Value::Number(bedrooms),
                        Value::Number(floors),
                        Value::Text("98178".to_string()),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_matrix_covers_numeric_columns_only() {
        let matrix = CorrelationMatrix::pearson(&table());
        assert_eq!(matrix.labels, vec!["price", "sqft_living", "bedrooms", "floors"]);
        assert_eq!(matrix.len(), 4);
        assert!(matrix.values.iter().all(|row| row.len() == 4));
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let matrix = CorrelationMatrix::pearson(&table());

        for i in 0..matrix.len() {
            assert_eq!(matrix.values[i][i], 1.0);
            for j in 0..matrix.len() {
                assert_eq!(matrix.values[i][j], matrix.values[j][i]);
                assert!(matrix.values[i][j].abs() <= 1.0);
            }
        }
    }

    #[test]
    fn test_pearson_pair_values() {
        let a = [Some(1.0), Some(2.0), Some(3.0)];
        let up = [Some(2.0), Some(4.0), Some(6.0)];
        let down = [Some(3.0), Some(2.0), Some(1.0)];

        assert!((pearson_pair(&a, &up) - 1.0).abs() < 1e-12);
        assert!((pearson_pair(&a, &down) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_pair_skips_missing() {
        let a = [Some(1.0), None, Some(2.0), Some(3.0)];
        let b = [Some(1.0), Some(100.0), Some(2.0), Some(3.0)];
        assert!((pearson_pair(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_pair_degenerate() {
        let constant = [Some(5.0), Some(5.0), Some(5.0)];
        let varying = [Some(1.0), Some(2.0), Some(3.0)];

        assert!(pearson_pair(&constant, &varying).is_nan());
        assert!(pearson_pair(&constant, &constant).is_nan());
        assert!(pearson_pair(&[Some(1.0)], &[Some(2.0)]).is_nan());
    }

    #[test]
    fn test_single_row_matrix_is_blank() {
        let (columns, mut rows) = table().into_parts();
        rows.truncate(1);
        let matrix = CorrelationMatrix::pearson(&HousingTable::new(columns, rows));

        assert_eq!(matrix.len(), 4);
        assert!(matrix.values.iter().flatten().all(|v| v.is_nan()));
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_heatmap_renders_blank_matrix() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            output_dir: temp_dir.path().to_path_buf(),
            dpi: 100,
            ..AnalysisConfig::default()
        };
        let (columns, mut rows) = table().into_parts();
        rows.truncate(1);

        let matrix =
            generate_correlation_heatmap(&HousingTable::new(columns, rows), &config).unwrap();
        assert!(matrix.values.iter().flatten().all(|v| v.is_nan()));
        assert!(temp_dir.path().join(HEATMAP_FILE).exists());
    }

    #[test]
    fn test_heatmap_requires_numeric_columns() {
        let table = HousingTable::new(vec![column("zip", ColumnKind::Text)], Vec::new());
        let result = generate_correlation_heatmap(&table, &AnalysisConfig::default());
        assert!(matches!(result, Err(CorrelationError::NoNumericColumns)));
    }
}
