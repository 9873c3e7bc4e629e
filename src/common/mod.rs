//! Common infrastructure modules shared across analysis phases
//!
//! This module provides reusable infrastructure for:
//! - The housing table and its cell values
//! - Histogram binning and ASCII table formatting
//! - Rendering charts to PNG files

pub mod buckets;
pub mod data_structures;
pub mod plots;

// Re-export commonly used items
pub use data_structures::HousingTable;
pub use plots::PlotError;
