//! File parsing functionality for the housing sales dataset
//!
//! This module handles loading `kc_house_data.csv` into a [`HousingTable`],
//! inferring which columns are numeric along the way.

use crate::common::data_structures::{Column, ColumnKind, HousingTable, Value};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during file parsing
#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("Failed to read input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),
}

type Result<T> = core::result::Result<T, ParsingError>;

/// Field contents that are read as a missing value
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing_token(field: &str) -> bool {
    MISSING_TOKENS.contains(&field)
}

fn parse_number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok()
}

/// Parse the housing CSV file and load the data for analysis
///
/// This function:
/// - Opens the file and reads the header row
/// - Reads every record, mapping missing-value tokens to [`Value::Missing`]
/// - Marks a column numeric when every present field parses as a number
///
/// # Arguments
/// * `file_path` - Path to the CSV file
///
/// # Returns
/// * `Ok(HousingTable)` - Successfully parsed table
/// * `Err(ParsingError)` - If the file could not be opened or a record is malformed
pub fn load_housing_table(file_path: &Path) -> Result<HousingTable> {
    let file = File::open(file_path)?;
    let table = read_housing_table(file)?;

    info!(
        path = %file_path.display(),
        rows = table.shape().0,
        columns = table.shape().1,
        "loaded housing table"
    );
    Ok(table)
}

/// Reads a housing table from any CSV source
pub fn read_housing_table<R: std::io::Read>(source: R) -> Result<HousingTable> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(source);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        raw_rows.push(
            record
                .iter()
                .map(|field| (!is_missing_token(field)).then(|| field.to_string()))
                .collect(),
        );
    }

    // Infer column kinds from the present fields
    let columns: Vec<Column> = headers
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let numeric = raw_rows.iter().all(|row| match &row[index] {
                Some(field) => parse_number(field).is_some(),
                None => true,
            });
            let kind = if numeric {
                ColumnKind::Numeric
            } else {
                ColumnKind::Text
            };
            debug!(column = %name, ?kind, "inferred column kind");
            Column { name, kind }
        })
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&columns)
                .map(|(field, column)| match (field, column.kind) {
                    (None, _) => Value::Missing,
                    (Some(field), ColumnKind::Numeric) => {
                        parse_number(&field).map_or(Value::Missing, Value::Number)
                    }
                    (Some(field), _) => Value::Text(field),
                })
                .collect()
        })
        .collect();

    Ok(HousingTable::new(columns, rows))
}
