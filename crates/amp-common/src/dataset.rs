//! In-memory tabular dataset with explicit missing-value markers.
//!
//! A [`Dataset`] is an n×m grid of [`Cell`]s with optional column names and
//! optional row labels. Amputation only ever replaces cells with
//! [`Cell::Missing`]; labels and shape are preserved.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Field spellings treated as missing when parsing text input.
const MISSING_TOKENS: &[&str] = &["", "na", "nan", "null"];

/// A single dataset value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Parse a raw text field: missing tokens, then numbers, then text.
    pub fn parse_field(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
        {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => Cell::Number(value),
            Err(_) => Cell::Text(raw.to_string()),
        }
    }

    /// `Missing` and `Number(NaN)` both count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Number(v) => v.is_nan(),
            Cell::Text(_) => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Number(v) if !v.is_nan())
    }

    /// Numeric view of the cell, coercing text that parses as a number.
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if !v.is_nan() => Some(*v),
            Cell::Number(_) | Cell::Missing => None,
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) if v.is_nan() => Ok(()),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Missing => Ok(()),
        }
    }
}

/// Row-major n×m table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Option<Vec<String>>,
    row_labels: Option<Vec<String>>,
    rows: Vec<Vec<Cell>>,
    n_cols: usize,
}

impl Dataset {
    /// Build an unlabeled dataset; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self> {
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(Error::RaggedRow {
                row,
                expected: n_cols,
                actual: cells.len(),
            });
        }
        Ok(Self {
            columns: None,
            row_labels: None,
            rows,
            n_cols,
        })
    }

    /// Build an unlabeled, fully numeric dataset.
    pub fn from_matrix(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(Cell::Number).collect())
                .collect(),
        )
    }

    /// Attach column names. An empty dataset adopts the name count as its width.
    pub fn with_columns<S: Into<String>>(mut self, names: Vec<S>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if self.rows.is_empty() {
            self.n_cols = names.len();
        } else if names.len() != self.n_cols {
            return Err(Error::Dataset(format!(
                "{} column names given for {} columns",
                names.len(),
                self.n_cols
            )));
        }
        let mut seen = HashMap::new();
        for (idx, name) in names.iter().enumerate() {
            if let Some(prev) = seen.insert(name.as_str(), idx) {
                return Err(Error::Dataset(format!(
                    "duplicate column name `{}` at positions {} and {}",
                    name, prev, idx
                )));
            }
        }
        self.columns = Some(names);
        Ok(self)
    }

    /// Attach row labels, one per row.
    pub fn with_row_labels<S: Into<String>>(mut self, labels: Vec<S>) -> Result<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.len() != self.rows.len() {
            return Err(Error::Dataset(format!(
                "{} row labels given for {} rows",
                labels.len(),
                self.rows.len()
            )));
        }
        self.row_labels = Some(labels);
        Ok(self)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn row_labels(&self) -> Option<&[String]> {
        self.row_labels.as_deref()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.rows[row][col]
    }

    pub fn set_missing(&mut self, row: usize, col: usize) {
        self.rows[row][col] = Cell::Missing;
    }

    /// Display name for a column: its label, or its index when unlabeled.
    pub fn column_name(&self, col: usize) -> String {
        match &self.columns {
            Some(names) => names[col].clone(),
            None => col.to_string(),
        }
    }

    /// Map from column name to position. Empty for unlabeled data.
    pub fn column_index(&self) -> HashMap<String, usize> {
        self.columns
            .iter()
            .flatten()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect()
    }

    pub fn column_missing_count(&self, col: usize) -> usize {
        self.rows.iter().filter(|row| row[col].is_missing()).count()
    }

    /// True when some non-missing cell of the column is not a number.
    pub fn column_needs_coercion(&self, col: usize) -> bool {
        self.rows
            .iter()
            .any(|row| !row[col].is_missing() && !row[col].is_numeric())
    }

    /// Numeric values of `col` for the given rows, coercing text.
    ///
    /// Fails on the first cell that is missing or does not parse.
    pub fn numeric_column(&self, col: usize, rows: &[usize]) -> Result<Vec<f64>> {
        rows.iter()
            .map(|&row| {
                let cell = &self.rows[row][col];
                cell.coerce_f64().ok_or_else(|| {
                    if cell.is_missing() {
                        Error::IncompleteFeature {
                            column: self.column_name(col),
                        }
                    } else {
                        Error::NonNumericFeature {
                            column: self.column_name(col),
                            row,
                            value: cell.to_string(),
                        }
                    }
                })
            })
            .collect()
    }

    /// Total number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|c| c.is_missing()).count())
            .sum()
    }
}
