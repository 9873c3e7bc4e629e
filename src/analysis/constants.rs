//! Fixed names and figure sizes used by the analysis modules
//!
//! Output file names are relative to the configured output directory.

use crate::common::plots::FigureSize;

/// Histogram of prices
pub const HISTOGRAM_FILE: &str = "plot1_histogram_price.png";

/// Living area against price
pub const SCATTER_FILE: &str = "plot2_scatter_price_sqft.png";

/// Month-end average price over time
pub const TREND_FILE: &str = "plot2b_line_price_time.png";

/// Correlation heatmap of every numeric column
pub const HEATMAP_FILE: &str = "plot3_heatmap.png";

/// Every file written by a full run, in write order
pub const OUTPUT_FILES: [&str; 4] = [HISTOGRAM_FILE, SCATTER_FILE, TREND_FILE, HEATMAP_FILE];

/// Size of the histogram, scatter and trend figures
pub const CHART_FIGURE: FigureSize = FigureSize::new(6.0, 4.0);

/// Size of the heatmap figure
pub const HEATMAP_FIGURE: FigureSize = FigureSize::new(8.0, 6.0);
