//! Price trend over time
//!
//! This module buckets sales by calendar month and charts the month-end
//! average price.

use super::constants::{CHART_FIGURE, TREND_FILE};
use crate::common::data_structures::{ColumnError, ColumnKind, HousingTable};
use crate::common::plots::{create_date_line_plot, ChartLabels};
use crate::common::PlotError;
use crate::config::AnalysisConfig;
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during price trend analysis
#[derive(Error, Debug)]
pub enum PriceTrendError {
    #[error("Failed to read column: {0}")]
    Column(#[from] ColumnError),

    #[error("Failed to generate plot: {0}")]
    PlotGeneration(#[from] PlotError),
}

type Result<T> = core::result::Result<T, PriceTrendError>;

/// Average of one calendar month, labelled by the month's last day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyMean {
    pub month_end: NaiveDate,
    /// `None` when the month has no observations
    pub mean: Option<f64>,
}

/// Last day of the month `(year, month)` falls in
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

fn next_month((year, month): (i32, u32)) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Resamples timestamped values into calendar months
///
/// Each month's value is the mean of its present values. Every month between
/// the first and the last observed month is emitted, in order; months without
/// any present value carry `None`. Resampling the output again, keyed by the
/// month-end dates, yields the same series.
pub fn resample_monthly_mean<I>(points: I) -> Vec<MonthlyMean>
where
    I: IntoIterator<Item = (NaiveDateTime, Option<f64>)>,
{
    // (sum, count) per (year, month)
    let mut months: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for (timestamp, value) in points {
        let entry = months
            .entry((timestamp.year(), timestamp.month()))
            .or_insert((0.0, 0));
        if let Some(value) = value.filter(|v| !v.is_nan()) {
            entry.0 += value;
            entry.1 += 1;
        }
    }

    let (first, last) = match (months.keys().next(), months.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Vec::new(),
    };

    let mut series = Vec::new();
    let mut current = first;
    loop {
        let mean = months
            .get(&current)
            .filter(|(_, count)| *count > 0)
            .map(|(sum, count)| sum / *count as f64);

        if let Some(month_end) = month_end(current.0, current.1) {
            series.push(MonthlyMean { month_end, mean });
        }

        if current == last {
            break;
        }
        current = next_month(current);
    }

    series
}

/// `(date, price)` pairs of every row with a parsed date
///
/// Missing prices are kept as `None` so the month still appears in the series.
fn dated_prices(
    table: &HousingTable,
    date_column: &str,
    price_column: &str,
) -> Result<Vec<(NaiveDateTime, Option<f64>)>> {
    let date = table.column_index(date_column)?;
    if table.columns()[date].kind != ColumnKind::DateTime {
        return Err(ColumnError::NotDateTime(date_column.to_string()).into());
    }
    let price = table.numeric_index(price_column)?;

    Ok(table
        .rows()
        .iter()
        .filter_map(|row| Some((row[date].as_datetime()?, row[price].as_f64())))
        .collect())
}

/// Generate the monthly average price line chart
///
/// Creates `plot2b_line_price_time.png` in the output directory.
///
/// # Arguments
/// * `table` - The cleaned housing table (date column already parsed)
/// * `config` - Column names, dpi and output directory
///
/// # Returns
/// * `Ok(Vec<MonthlyMean>)` - The plotted monthly series
/// * `Err(PriceTrendError)` - If a column is unusable or plot generation failed
pub fn generate_price_trend_plot(
    table: &HousingTable,
    config: &AnalysisConfig,
) -> Result<Vec<MonthlyMean>> {
    let points = dated_prices(table, &config.date_column, &config.price_column)?;
    let monthly = resample_monthly_mean(points);
    debug!(months = monthly.len(), "resampled prices by month");

    let line: Vec<(NaiveDate, Option<f64>)> = monthly
        .iter()
        .map(|month| (month.month_end, month.mean))
        .collect();

    create_date_line_plot(
        &line,
        ChartLabels {
            title: "Average House Price Over Time",
            x: "Time",
            y: "Average Price",
        },
        CHART_FIGURE,
        config.dpi,
        &config.output_dir.join(TREND_FILE),
    )?;

    Ok(monthly)
}
