//! Domain-specific analysis modules
//!
//! This module contains the analysis steps run on the cleaned table:
//! - Statistical moments of the price column
//! - Price distribution charts
//! - Monthly price trend
//! - Correlation heatmap

pub mod constants;
pub mod correlation;
pub mod distribution;
pub mod moments;
pub mod price_trend;

// Re-export analysis functions for convenience
pub use correlation::generate_correlation_heatmap;
pub use distribution::generate_distribution_plots;
pub use moments::generate_moments_analysis;
pub use price_trend::generate_price_trend_plot;
