//! Run configuration
//!
//! The analysis takes no flags; [`AnalysisConfig::default`] carries the fixed
//! paths, column names and rendering settings.

use std::path::PathBuf;

/// Relative path of the input dataset
pub const DATA_PATH: &str = "data/kc_house_data.csv";

/// Relative path of the directory receiving the charts
pub const OUTPUT_DIR: &str = "outputs";

/// Settings for a single analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// CSV file to load
    pub data_path: PathBuf,
    /// Directory the PNG files are written to; created if absent
    pub output_dir: PathBuf,
    /// Column parsed as the sale date
    pub date_column: String,
    /// Column summarised by the moments and plotted on the price axes
    pub price_column: String,
    /// Column plotted against price in the scatter chart
    pub area_column: String,
    pub histogram_bins: usize,
    pub dpi: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DATA_PATH),
            output_dir: PathBuf::from(OUTPUT_DIR),
            date_column: "date".to_string(),
            price_column: "price".to_string(),
            area_column: "sqft_living".to_string(),
            histogram_bins: 30,
            dpi: 300,
        }
    }
}
