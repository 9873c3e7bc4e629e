//! Price distribution charts
//!
//! Produces the price histogram and the living area vs price scatter chart.

use super::constants::{CHART_FIGURE, HISTOGRAM_FILE, SCATTER_FILE};
use crate::common::buckets::{format_bin_table, histogram};
use crate::common::data_structures::{ColumnError, HousingTable};
use crate::common::plots::{create_histogram_plot, create_scatter_plot, ChartLabels};
use crate::common::PlotError;
use crate::config::AnalysisConfig;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while charting the price distribution
#[derive(Error, Debug)]
pub enum DistributionError {
    #[error("Failed to read column: {0}")]
    Column(#[from] ColumnError),

    #[error("Failed to generate plot: {0}")]
    PlotGeneration(#[from] PlotError),
}

type Result<T> = core::result::Result<T, DistributionError>;

/// `(area, price)` pairs of every row where both are present
pub fn area_price_pairs(
    table: &HousingTable,
    area_column: &str,
    price_column: &str,
) -> Result<Vec<(f64, f64)>> {
    let area = table.numeric_index(area_column)?;
    let price = table.numeric_index(price_column)?;

    Ok(table
        .rows()
        .iter()
        .filter_map(|row| Some((row[area].as_f64()?, row[price].as_f64()?)))
        .collect())
}

/// Generate the price histogram and the living area scatter chart
///
/// Creates:
/// - `plot1_histogram_price.png` - price histogram with the configured bin count
/// - `plot2_scatter_price_sqft.png` - living area (x) against price (y)
///
/// # Arguments
/// * `table` - The cleaned housing table
/// * `config` - Column names, bin count, dpi and output directory
///
/// # Returns
/// * `Ok(())` - If both plots were successfully generated
/// * `Err(DistributionError)` - If a column is unusable or plot generation failed
pub fn generate_distribution_plots(table: &HousingTable, config: &AnalysisConfig) -> Result<()> {
    let prices = table.numeric_values(&config.price_column)?;
    let bins = histogram(&prices, config.histogram_bins);
    debug!(
        "\n{}",
        format_bin_table(&bins, Some("Price Distribution (Equal Width)"))
    );

    create_histogram_plot(
        &bins,
        ChartLabels {
            title: "Distribution of House Prices",
            x: "Price",
            y: "Frequency",
        },
        CHART_FIGURE,
        config.dpi,
        &config.output_dir.join(HISTOGRAM_FILE),
    )?;

    let points = area_price_pairs(table, &config.area_column, &config.price_column)?;
    create_scatter_plot(
        &points,
        ChartLabels {
            title: "Price vs Living Area",
            x: "Sqft Living",
            y: "Price",
        },
        CHART_FIGURE,
        config.dpi,
        &config.output_dir.join(SCATTER_FILE),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::{Column, ColumnKind, Value};

    fn table() -> HousingTable {
        let numeric = |name: &str| Column {
            name: name.to_string(),
            kind: ColumnKind::Numeric,
        };
        HousingTable::new(
            vec![numeric("price"), numeric("sqft_living")],
            vec![
                vec![Value::Number(221900.0), Value::Number(1180.0)],
                vec![Value::Number(538000.0), Value::Missing],
                vec![Value::Number(180000.0), Value::Number(770.0)],
            ],
        )
    }

    #[test]
    fn test_area_price_pairs() {
        let pairs = area_price_pairs(&table(), "sqft_living", "price").unwrap();
        assert_eq!(pairs, vec![(1180.0, 221900.0), (770.0, 180000.0)]);
    }

    #[test]
    fn test_generate_rejects_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            output_dir: dir.path().to_path_buf(),
            ..AnalysisConfig::default()
        };
        let (columns, _) = table().into_parts();
        let empty = HousingTable::new(columns, Vec::new());

        let result = generate_distribution_plots(&empty, &config);
        assert!(matches!(
            result,
            Err(DistributionError::PlotGeneration(PlotError::InvalidData(_)))
        ));
    }

    #[test]
    fn test_generate_unknown_column() {
        let config = AnalysisConfig {
            price_column: "sale_price".to_string(),
            ..AnalysisConfig::default()
        };
        let result = generate_distribution_plots(&table(), &config);
        assert!(matches!(
            result,
            Err(DistributionError::Column(ColumnError::NotFound(_)))
        ));
    }
}
