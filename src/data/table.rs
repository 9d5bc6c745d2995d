//! Loosely-typed labeled table produced by ingestion
//!
//! Rows and columns both carry optional labels so a table can be transposed
//! without losing information; a `None` label is a missing identifier.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Tokens treated as a missing value
const MISSING_TOKENS: [&str; 8] = ["", "NA", "NaN", "nan", "null", "NULL", "N/A", "None"];

/// A single parsed cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Type a raw field: missing tokens, then numbers, then free text
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if MISSING_TOKENS.contains(&s) {
            return Cell::Missing;
        }
        match s.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(s.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(_))
    }

    /// Numeric value, if the cell holds one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

/// Row-major table with optional row and column labels
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    row_labels: Vec<Option<String>>,
    col_labels: Vec<Option<String>>,
    /// cells[row][col]
    cells: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build a table, checking that every row matches the label dimensions
    pub fn new(
        row_labels: Vec<Option<String>>,
        col_labels: Vec<Option<String>>,
        cells: Vec<Vec<Cell>>,
    ) -> Result<Self> {
        if cells.len() != row_labels.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: format!("{} rows", row_labels.len()),
                got: format!("{} rows", cells.len()),
            });
        }
        if let Some(row) = cells.iter().find(|r| r.len() != col_labels.len()) {
            return Err(AnalysisError::DimensionMismatch {
                expected: format!("{} columns", col_labels.len()),
                got: format!("{} columns", row.len()),
            });
        }
        Ok(Self {
            row_labels,
            col_labels,
            cells,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn row_labels(&self) -> &[Option<String>] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[Option<String>] {
        &self.col_labels
    }

    /// The cell at `row`, `col`, or `None` outside the table
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Iterate over the cells of one column; `col` must be in range
    pub(crate) fn column(&self, col: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().map(move |r| &r[col])
    }

    /// Swap rows and columns
    pub fn transpose(&self) -> Self {
        let cells = (0..self.n_cols())
            .map(|j| self.cells.iter().map(|r| r[j].clone()).collect())
            .collect();
        Self {
            row_labels: self.col_labels.clone(),
            col_labels: self.row_labels.clone(),
            cells,
        }
    }

    /// New table holding only the listed rows, in the given order.
    /// Indices come from scanning this table and must be in range.
    pub(crate) fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            row_labels: rows.iter().map(|&i| self.row_labels[i].clone()).collect(),
            col_labels: self.col_labels.clone(),
            cells: rows.iter().map(|&i| self.cells[i].clone()).collect(),
        }
    }

    /// New table holding only the listed columns, in the given order.
    /// Indices come from scanning this table and must be in range.
    pub(crate) fn select_columns(&self, cols: &[usize]) -> Self {
        Self {
            row_labels: self.row_labels.clone(),
            col_labels: cols.iter().map(|&j| self.col_labels[j].clone()).collect(),
            cells: self
                .cells
                .iter()
                .map(|r| cols.iter().map(|&j| r[j].clone()).collect())
                .collect(),
        }
    }
}
