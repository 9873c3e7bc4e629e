//! Equal-width histogram binning and ASCII table formatting
//!
//! This module provides shared functionality for bin-based analysis:
//! - [`histogram`] splitting values into equal-width [`HistogramBin`]s
//! - ASCII table formatting using the [`tabled`] crate

use tabled::{Table, Tabled};

/// A single histogram bin covering `[lower, upper)`
///
/// The last bin of a histogram also includes its upper edge.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Row of the table produced by [`format_bin_table`]
#[derive(Debug, Clone, Tabled)]
struct BinRow {
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Percentage")]
    percentage: String,
}

impl BinRow {
    fn new(bin: &HistogramBin, total: usize) -> Self {
        let percentage = if total == 0 {
            "0.00%".to_string()
        } else {
            format!("{:.2}%", (bin.count as f64 / total as f64) * 100.0)
        };

        Self {
            range: format!("{:.0}-{:.0}", bin.lower, bin.upper),
            count: bin.count,
            percentage,
        }
    }
}

/// Splits `values` into `bins` equal-width bins spanning their min..max
///
/// When every value is identical the range is widened by 0.5 on either side.
/// Non-finite values are ignored. Returns no bins for empty input or `bins == 0`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in finite {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| HistogramBin {
            lower: min + width * index as f64,
            upper: if index + 1 == bins {
                max
            } else {
                min + width * (index + 1) as f64
            },
            count,
        })
        .collect()
}

/// Formats histogram bins as an ASCII table using the [`tabled`] crate
///
/// # Arguments
/// * `bins` - A slice of [`HistogramBin`] to format
/// * `title` - Optional title for the table
///
/// # Returns
/// A formatted ASCII table as a [`String`]
pub fn format_bin_table(bins: &[HistogramBin], title: Option<&str>) -> String {
    if bins.is_empty() {
        return "No data available for binning".to_string();
    }

    let total = bins.iter().map(|bin| bin.count).sum();
    let rows: Vec<BinRow> = bins.iter().map(|bin| BinRow::new(bin, total)).collect();
    let table = Table::new(rows).to_string();

    if let Some(title) = title {
        format!("{}\n{}\n{}", title, "=".repeat(title.len()), table)
    } else {
        table
    }
}
