//! Plotting infrastructure for the housing charts
//!
//! This module draws histogram, scatter, line and heatmap charts using the
//! [`plotters`] crate. Charts are saved as PNG files whose pixel size is the
//! figure size in inches multiplied by the requested dpi; font sizes are given
//! in points and scaled the same way.

use crate::common::buckets::HistogramBin;
use chrono::{Datelike, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Default series colour
const SERIES_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Title font size in points
const TITLE_POINTS: f64 = 12.0;

/// Tick and axis label font size in points
const LABEL_POINTS: f64 = 10.0;

/// Viridis colour map sampled at nine evenly spaced stops
const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

/// Physical size of a figure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width_inches: f64,
    pub height_inches: f64,
}

impl FigureSize {
    pub const fn new(width_inches: f64, height_inches: f64) -> Self {
        Self {
            width_inches,
            height_inches,
        }
    }

    /// Pixel dimensions of the figure at `dpi`
    pub fn pixels(&self, dpi: u32) -> (u32, u32) {
        (
            (self.width_inches * dpi as f64).round() as u32,
            (self.height_inches * dpi as f64).round() as u32,
        )
    }
}

/// Title and axis descriptions of a chart
#[derive(Debug, Clone, Copy)]
pub struct ChartLabels<'a> {
    pub title: &'a str,
    pub x: &'a str,
    pub y: &'a str,
}

/// Converts a length in points to pixels at `dpi`
fn points_to_pixels(points: f64, dpi: u32) -> f64 {
    points * dpi as f64 / 72.0
}

fn font<'a>(points: f64, dpi: u32) -> FontDesc<'a> {
    ("sans-serif", points_to_pixels(points, dpi)).into_font()
}

fn pixels(points: f64, dpi: u32) -> i32 {
    points_to_pixels(points, dpi).round() as i32
}

/// Formats axis values compactly for tick labels
///
/// Large magnitudes are shortened with `k`/`M` suffixes so that price axes
/// stay readable.
fn format_axis_value(value: f64) -> String {
    let abs_value = value.abs();

    if abs_value >= 1_000_000.0 {
        let scaled = value / 1_000_000.0;
        if (scaled - scaled.round()).abs() < 1e-9 {
            format!("{:.0}M", scaled)
        } else {
            format!("{:.1}M", scaled)
        }
    } else if abs_value >= 1_000.0 {
        format!("{:.0}k", (value / 1_000.0).round())
    } else if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Maps `fraction` (clamped to 0..=1) onto the viridis colour map
pub fn viridis(fraction: f64) -> RGBColor {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };

    let scaled = fraction * (VIRIDIS.len() - 1) as f64;
    let index = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let t = scaled - index as f64;

    let (r0, g0, b0) = VIRIDIS[index];
    let (r1, g1, b1) = VIRIDIS[index + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;

    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Pads a value range so that it is never empty
fn padded_range(min: f64, max: f64, fraction: f64) -> (f64, f64) {
    if min >= max {
        let pad = if min == 0.0 { 0.5 } else { min.abs() * fraction };
        return (min - pad, max + pad);
    }

    let pad = (max - min) * fraction;
    (min - pad, max + pad)
}

/// Creates a PNG canvas, runs `draw` on it and writes the file
///
/// The drawing area is dropped before returning so that every chart's pixel
/// buffer is released as soon as it has been saved.
fn render_png<F>(output_path: &Path, size: FigureSize, dpi: u32, draw: F) -> Result<()>
where
    F: FnOnce(&Canvas<'_>) -> Result<()>,
{
    let root = BitMapBackend::new(output_path, size.pixels(dpi)).into_drawing_area();

    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    draw(&root)?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    drop(root);

    debug!(path = %output_path.display(), "wrote plot");
    Ok(())
}

/// Creates a histogram chart from precomputed bins and saves it as a PNG file
///
/// # Arguments
/// * `bins` - Equal-width bins as produced by [`crate::common::buckets::histogram`]
/// * `labels` - Chart title and axis descriptions
/// * `size` - Figure size in inches
/// * `dpi` - Output resolution
/// * `output_path` - Path where the PNG file should be saved
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If there are no bins or drawing failed
pub fn create_histogram_plot(
    bins: &[HistogramBin],
    labels: ChartLabels<'_>,
    size: FigureSize,
    dpi: u32,
    output_path: &Path,
) -> Result<()> {
    let (first, last) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(PlotError::InvalidData("Bins cannot be empty".to_string())),
    };

    let max_count = bins.iter().map(|bin| bin.count).max().unwrap_or(0).max(1) as f64;
    let x_range = first.lower..last.upper;
    let y_range = 0.0..max_count * 1.05;

    render_png(output_path, size, dpi, |area| {
        let mut chart = ChartBuilder::on(area)
            .caption(labels.title, font(TITLE_POINTS, dpi))
            .margin(pixels(8.0, dpi))
            .x_label_area_size(pixels(30.0, dpi))
            .y_label_area_size(pixels(40.0, dpi))
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc(labels.x)
            .y_desc(labels.y)
            .label_style(font(LABEL_POINTS, dpi))
            .axis_desc_style(font(LABEL_POINTS, dpi))
            .x_label_formatter(&|x| format_axis_value(*x))
            .y_label_formatter(&|y| format_axis_value(*y))
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        chart
            .draw_series(bins.iter().map(|bin| {
                Rectangle::new(
                    [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
                    SERIES_COLOR.filled(),
                )
            }))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        Ok(())
    })
}

/// Creates a scatter chart with semi-transparent markers and saves it as a PNG file
///
/// # Arguments
/// * `points` - `(x, y)` pairs; non-finite pairs are skipped
/// * `labels` - Chart title and axis descriptions
/// * `size` - Figure size in inches
/// * `dpi` - Output resolution
/// * `output_path` - Path where the PNG file should be saved
pub fn create_scatter_plot(
    points: &[(f64, f64)],
    labels: ChartLabels<'_>,
    size: FigureSize,
    dpi: u32,
    output_path: &Path,
) -> Result<()> {
    let points: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if points.is_empty() {
        return Err(PlotError::InvalidData(
            "Scatter points cannot be empty".to_string(),
        ));
    }

    let (x_min, x_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
            (lo.min(*x), hi.max(*x))
        });
    let (y_min, y_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| {
            (lo.min(*y), hi.max(*y))
        });
    let (x_lo, x_hi) = padded_range(x_min, x_max, 0.05);
    let (y_lo, y_hi) = padded_range(y_min, y_max, 0.05);

    render_png(output_path, size, dpi, |area| {
        let mut chart = ChartBuilder::on(area)
            .caption(labels.title, font(TITLE_POINTS, dpi))
            .margin(pixels(8.0, dpi))
            .x_label_area_size(pixels(30.0, dpi))
            .y_label_area_size(pixels(40.0, dpi))
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc(labels.x)
            .y_desc(labels.y)
            .label_style(font(LABEL_POINTS, dpi))
            .axis_desc_style(font(LABEL_POINTS, dpi))
            .x_label_formatter(&|x| format_axis_value(*x))
            .y_label_formatter(&|y| format_axis_value(*y))
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        let radius = pixels(3.0, dpi);
        chart
            .draw_series(points.iter().map(|&(x, y)| {
                Circle::new((x, y), radius, SERIES_COLOR.mix(0.5).filled())
            }))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        Ok(())
    })
}

/// Creates a date-indexed line chart and saves it as a PNG file
///
/// Points without a value break the line, so a month with no sales shows as a
/// gap rather than being interpolated across.
///
/// # Arguments
/// * `points` - `(date, value)` pairs sorted by date
/// * `labels` - Chart title and axis descriptions
/// * `size` - Figure size in inches
/// * `dpi` - Output resolution
/// * `output_path` - Path where the PNG file should be saved
pub fn create_date_line_plot(
    points: &[(NaiveDate, Option<f64>)],
    labels: ChartLabels<'_>,
    size: FigureSize,
    dpi: u32,
    output_path: &Path,
) -> Result<()> {
    let present: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|(date, value)| {
            value
                .filter(|v| v.is_finite())
                .map(|v| (date.num_days_from_ce() as f64, v))
        })
        .collect();
    if present.is_empty() {
        return Err(PlotError::InvalidData(
            "Line points cannot be empty".to_string(),
        ));
    }

    let x_min = present.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
    let x_max = present
        .iter()
        .map(|(x, _)| *x)
        .fold(f64::NEG_INFINITY, f64::max);
    let y_min = present.iter().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
    let y_max = present
        .iter()
        .map(|(_, y)| *y)
        .fold(f64::NEG_INFINITY, f64::max);

    // Half a month either side when there is a single month
    let (x_lo, x_hi) = if x_min >= x_max {
        (x_min - 15.0, x_max + 15.0)
    } else {
        (x_min, x_max)
    };
    let (y_lo, y_hi) = padded_range(y_min, y_max, 0.05);

    // Split into runs of consecutive present values
    let mut segments: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
    for (date, value) in points {
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                if let Some(segment) = segments.last_mut() {
                    segment.push((date.num_days_from_ce() as f64, v));
                }
            }
            None => {
                if segments.last().is_some_and(|segment| !segment.is_empty()) {
                    segments.push(Vec::new());
                }
            }
        }
    }

    let date_formatter = |x: &f64| {
        NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
            .map(|date| date.format("%Y-%m").to_string())
            .unwrap_or_default()
    };

    render_png(output_path, size, dpi, |area| {
        let mut chart = ChartBuilder::on(area)
            .caption(labels.title, font(TITLE_POINTS, dpi))
            .margin(pixels(8.0, dpi))
            .x_label_area_size(pixels(30.0, dpi))
            .y_label_area_size(pixels(40.0, dpi))
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(6)
            .x_desc(labels.x)
            .y_desc(labels.y)
            .label_style(font(LABEL_POINTS, dpi))
            .axis_desc_style(font(LABEL_POINTS, dpi))
            .x_label_formatter(&date_formatter)
            .y_label_formatter(&|y| format_axis_value(*y))
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        let line_width = pixels(1.5, dpi).max(1) as u32;
        for segment in segments.iter().filter(|segment| !segment.is_empty()) {
            chart
                .draw_series(LineSeries::new(
                    segment.iter().copied(),
                    SERIES_COLOR.stroke_width(line_width),
                ))
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }

        Ok(())
    })
}

/// Creates a colour-mapped matrix chart with a colour scale legend
///
/// Row `0` is drawn at the top. Every row and column is labelled with the
/// matching entry of `labels`; the column labels under the grid are rotated
/// 90 degrees. Non-finite cells are left blank.
///
/// # Arguments
/// * `labels` - One label per row/column
/// * `values` - Square matrix, `values[row][column]`
/// * `title` - Chart title
/// * `size` - Figure size in inches
/// * `dpi` - Output resolution
/// * `output_path` - Path where the PNG file should be saved
///
/// # Returns
/// * `Ok(())` - If the chart was saved, including when every cell is blank
/// * `Err(PlotError)` - If the matrix is empty or not square, or drawing failed
pub fn create_heatmap_plot(
    labels: &[String],
    values: &[Vec<f64>],
    title: &str,
    size: FigureSize,
    dpi: u32,
    output_path: &Path,
) -> Result<()> {
    let n = labels.len();
    if n == 0 {
        return Err(PlotError::InvalidData(
            "Heatmap needs at least one column".to_string(),
        ));
    }
    if values.len() != n || values.iter().any(|row| row.len() != n) {
        return Err(PlotError::InvalidData(format!(
            "Heatmap values must form a {n}x{n} matrix"
        )));
    }

    let (scale_lo, scale_hi) = color_scale_range(values);
    let fraction = |v: f64| (v - scale_lo) / (scale_hi - scale_lo);

    // Reserve room for the longest label
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    let label_area = pixels(longest * LABEL_POINTS * 0.6 + 8.0, dpi);
    let (width, _) = size.pixels(dpi);

    render_png(output_path, size, dpi, |root| {
        let bar_width = (width as f64 * 0.15).round() as i32;
        let (main_area, bar_area) = root.split_horizontally(width as i32 - bar_width);

        let mut chart = ChartBuilder::on(&main_area)
            .caption(title, font(TITLE_POINTS, dpi))
            .margin(pixels(8.0, dpi))
            .x_label_area_size(label_area)
            .y_label_area_size(label_area)
            .build_cartesian_2d(0.0..n as f64, 0.0..n as f64)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        chart
            .draw_series(values.iter().enumerate().flat_map(|(row, cells)| {
                let top = (n - row) as f64;
                cells.iter().enumerate().filter_map(move |(column, v)| {
                    v.is_finite().then(|| {
                        Rectangle::new(
                            [(column as f64, top - 1.0), (column as f64 + 1.0, top)],
                            viridis(fraction(*v)).filled(),
                        )
                    })
                })
            }))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(0.0, 0.0), (n as f64, n as f64)],
                BLACK.stroke_width(1),
            )))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        // Tick labels are drawn on the root area in backend coordinates so that
        // they land in the label areas outside the plotting region
        let gap = pixels(3.0, dpi);
        let x_style = TextStyle::from(font(LABEL_POINTS, dpi).transform(FontTransform::Rotate270))
            .pos(Pos::new(HPos::Right, VPos::Center));
        let y_style =
            TextStyle::from(font(LABEL_POINTS, dpi)).pos(Pos::new(HPos::Right, VPos::Center));

        for (index, label) in labels.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(index as f64 + 0.5, 0.0));
            root.draw(&Text::new(label.as_str(), (x, y + gap), x_style.clone()))
                .map_err(|e| PlotError::Drawing(e.to_string()))?;

            let (x, y) = chart.backend_coord(&(0.0, (n - index) as f64 - 0.5));
            root.draw(&Text::new(label.as_str(), (x - gap, y), y_style.clone()))
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }

        draw_color_scale(&bar_area, scale_lo, scale_hi, dpi, label_area)
    })
}

/// Colour bar limits for a heatmap
///
/// Spans the finite values of the matrix, widened by 0.5 on each side when they
/// are all equal. A matrix without any finite value gets `-1.0..1.0`.
fn color_scale_range(values: &[Vec<f64>]) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });

    if !lo.is_finite() {
        (-1.0, 1.0)
    } else if lo >= hi {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

/// Draws a vertical viridis colour bar spanning `lo..hi`
fn draw_color_scale(
    area: &Canvas<'_>,
    lo: f64,
    hi: f64,
    dpi: u32,
    bottom_space: i32,
) -> Result<()> {
    const STEPS: usize = 200;

    let mut chart = ChartBuilder::on(area)
        .margin_top(pixels(8.0 + TITLE_POINTS * 1.5, dpi))
        .margin_bottom(bottom_space + pixels(8.0, dpi))
        .margin_left(pixels(4.0, dpi))
        .margin_right(pixels(4.0, dpi))
        .right_y_label_area_size(pixels(30.0, dpi))
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let step = (hi - lo) / STEPS as f64;
    chart
        .draw_series((0..STEPS).map(|i| {
            let start = lo + step * i as f64;
            Rectangle::new(
                [(0.0, start), (1.0, start + step)],
                viridis(i as f64 / (STEPS - 1) as f64).filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(0)
        .y_labels(6)
        .label_style(font(LABEL_POINTS, dpi))
        .y_label_formatter(&|y| format!("{:.1}", y))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}
