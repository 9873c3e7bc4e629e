//! Data cleaning for the housing table
//!
//! Three fixed steps, each consuming a table and returning a reduced one:
//! - [`drop_duplicates`] removes exact duplicate rows
//! - [`parse_dates`] converts the date column, coercing bad dates to missing
//! - [`drop_missing`] removes every row holding a missing value

use crate::common::data_structures::{ColumnError, ColumnKind, HousingTable, Value, ValueKey};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use tabled::{Table, Tabled};
use tracing::{debug, warn};

/// Date-time layouts accepted by [`parse_datetime`], tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y%m%dT%H%M%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts accepted by [`parse_datetime`], tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Row counts around a single cleaning step
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct CleaningStep {
    #[tabled(rename = "Step")]
    pub name: &'static str,
    #[tabled(rename = "Rows Before")]
    pub rows_before: usize,
    #[tabled(rename = "Rows After")]
    pub rows_after: usize,
}

impl CleaningStep {
    pub fn removed(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

/// Outcome of [`clean`]
#[derive(Debug, Clone, Default)]
pub struct CleaningReport {
    pub steps: Vec<CleaningStep>,
}

impl CleaningReport {
    fn record(&mut self, name: &'static str, rows_before: usize, rows_after: usize) {
        let step = CleaningStep {
            name,
            rows_before,
            rows_after,
        };
        debug!(step = name, removed = step.removed(), "cleaning step done");
        self.steps.push(step);
    }

    /// Formats the report as an ASCII table using the [`tabled`] crate
    pub fn format_table(&self) -> String {
        if self.steps.is_empty() {
            return "No cleaning steps recorded".to_string();
        }

        Table::new(&self.steps).to_string()
    }
}

/// Removes rows that exactly match an earlier row across all columns
///
/// The first occurrence of each row is kept and row order is preserved.
pub fn drop_duplicates(table: HousingTable) -> HousingTable {
    let (columns, rows) = table.into_parts();
    let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(rows.len());

    let rows = rows
        .into_iter()
        .filter(|row| seen.insert(row.iter().map(Value::key).collect()))
        .collect();

    HousingTable::new(columns, rows)
}

/// Converts `column` into a date column
///
/// Values that cannot be read as a date become [`Value::Missing`]; this never
/// fails on bad data, only on an unknown column.
pub fn parse_dates(table: HousingTable, column: &str) -> Result<HousingTable, ColumnError> {
    let index = table.column_index(column)?;
    let (mut columns, mut rows) = table.into_parts();

    let mut coerced = 0usize;
    for row in &mut rows {
        let parsed = match &row[index] {
            Value::Missing => None,
            Value::DateTime(value) => Some(*value),
            Value::Text(text) => parse_datetime(text),
            Value::Number(number) => parse_numeric_date(*number),
        };

        if parsed.is_none() && !row[index].is_missing() {
            coerced += 1;
        }
        row[index] = parsed.map_or(Value::Missing, Value::DateTime);
    }

    if coerced > 0 {
        warn!(column, coerced, "unparseable dates coerced to missing");
    }

    columns[index].kind = ColumnKind::DateTime;
    Ok(HousingTable::new(columns, rows))
}

/// Removes every row that holds a missing value in any column
pub fn drop_missing(table: HousingTable) -> HousingTable {
    let (columns, rows) = table.into_parts();
    let rows = rows
        .into_iter()
        .filter(|row| !row.iter().any(Value::is_missing))
        .collect();

    HousingTable::new(columns, rows)
}

/// Runs the full cleaning sequence
///
/// # Arguments
/// * `table` - The table as loaded from disk
/// * `date_column` - Name of the column to parse as dates
///
/// # Returns
/// * `Ok((HousingTable, CleaningReport))` - The cleaned table and per-step row counts
/// * `Err(ColumnError)` - If `date_column` does not exist
pub fn clean(
    table: HousingTable,
    date_column: &str,
) -> Result<(HousingTable, CleaningReport), ColumnError> {
    let mut report = CleaningReport::default();

    let before = table.shape().0;
    let table = drop_duplicates(table);
    report.record("Remove duplicates", before, table.shape().0);

    let before = table.shape().0;
    let table = parse_dates(table, date_column)?;
    report.record("Parse dates", before, table.shape().0);

    let before = table.shape().0;
    let table = drop_missing(table);
    report.record("Drop missing", before, table.shape().0);

    Ok((table, report))
}

/// Reads a date or date-time in any of the accepted layouts
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Numeric date columns (e.g. `20141013`) are read as `YYYYMMDD`
fn parse_numeric_date(number: f64) -> Option<NaiveDateTime> {
    if number.fract() != 0.0 || !(0.0..=99_991_231.0).contains(&number) {
        return None;
    }

    NaiveDate::parse_from_str(&format!("{:08}", number as u64), "%Y%m%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
