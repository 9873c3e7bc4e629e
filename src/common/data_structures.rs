use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors raised when a column lookup does not match the table's schema
#[derive(Error, Debug)]
pub enum ColumnError {
    #[error("Column '{0}' not found")]
    NotFound(String),

    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("Column '{0}' does not hold dates")]
    NotDateTime(String),
}

/// A single cell of the housing table
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Empty field, a missing-value token, or a date that failed to parse
    Missing,
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    /// Hashable identity of the cell, used for duplicate detection
    ///
    /// Numbers compare by value, so `-0.0` and `0.0` share a key and every NaN
    /// shares a key.
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Missing => ValueKey::Missing,
            Value::Number(value) => {
                let normalized = if *value == 0.0 {
                    0.0
                } else if value.is_nan() {
                    f64::NAN
                } else {
                    *value
                };
                ValueKey::Number(normalized.to_bits())
            }
            Value::Text(value) => ValueKey::Text(value.clone()),
            Value::DateTime(value) => ValueKey::DateTime(*value),
        }
    }
}

/// See [`Value::key`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Missing,
    Number(u64),
    Text(String),
    DateTime(NaiveDateTime),
}

/// Storage type of a column, decided when the file is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
    DateTime,
}

/// Name and kind of a single column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// The housing sales table, stored row-major
///
/// Every row holds exactly one [`Value`] per column.
#[derive(Debug, Clone, PartialEq)]
pub struct HousingTable {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl HousingTable {
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    /// Returns `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn into_parts(self) -> (Vec<Column>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }

    pub fn column_index(&self, name: &str) -> Result<usize, ColumnError> {
        self.columns
            .iter()
            .position(|column| column.name == name)
            .ok_or_else(|| ColumnError::NotFound(name.to_string()))
    }

    /// Index of a column that must be numeric
    pub fn numeric_index(&self, name: &str) -> Result<usize, ColumnError> {
        let index = self.column_index(name)?;
        match self.columns[index].kind {
            ColumnKind::Numeric => Ok(index),
            _ => Err(ColumnError::NotNumeric(name.to_string())),
        }
    }

    /// Present values of a numeric column; missing cells are skipped
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>, ColumnError> {
        let index = self.numeric_index(name)?;
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row[index].as_f64())
            .collect())
    }

    /// Indices of all numeric columns, in table order
    ///
    /// Date and text columns are excluded.
    pub fn numeric_columns(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.kind == ColumnKind::Numeric)
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> HousingTable {
        HousingTable::new(
            vec![
                Column {
                    name: "price".to_string(),
                    kind: ColumnKind::Numeric,
                },
                Column {
                    name: "zipcode".to_string(),
                    kind: ColumnKind::Text,
                },
            ],
            vec![
                vec![Value::Number(1.0), Value::Text("98178".to_string())],
                vec![Value::Missing, Value::Text("98125".to_string())],
                vec![Value::Number(3.0), Value::Missing],
            ],
        )
    }

    #[test]
    fn test_shape() {
        assert_eq!(sample_table().shape(), (3, 2));
    }

    #[test]
    fn test_numeric_values_skip_missing() {
        let table = sample_table();
        assert_eq!(table.numeric_values("price").unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_column_lookup_errors() {
        let table = sample_table();
        assert!(matches!(
            table.numeric_values("sqft_living"),
            Err(ColumnError::NotFound(_))
        ));
        assert!(matches!(
            table.numeric_values("zipcode"),
            Err(ColumnError::NotNumeric(_))
        ));
    }

    #[test]
    fn test_numeric_columns() {
        assert_eq!(sample_table().numeric_columns(), vec![0]);
    }

    #[test]
    fn test_value_key_normalizes_zero() {
        assert_eq!(Value::Number(-0.0).key(), Value::Number(0.0).key());
        assert_ne!(Value::Number(1.0).key(), Value::Number(2.0).key());
        assert_ne!(Value::Missing.key(), Value::Number(0.0).key());
    }
}
