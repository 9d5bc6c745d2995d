//! Removal of non-numeric sample columns

use crate::data::RawTable;

/// What a column holds, for deciding whether it is a sample column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    /// No text cell and at least one number
    Numeric,
    /// At least one text cell
    Text,
    /// Every cell missing
    Empty,
}

fn column_kind(table: &RawTable, col: usize) -> ColumnKind {
    let mut any_number = false;
    for cell in table.column(col) {
        if cell.is_text() {
            return ColumnKind::Text;
        }
        any_number |= cell.as_number().is_some();
    }
    if any_number {
        ColumnKind::Numeric
    } else {
        ColumnKind::Empty
    }
}

fn column_names(table: &RawTable, cols: &[usize]) -> String {
    cols.iter()
        .map(|&j| table.col_labels()[j].clone().unwrap_or_else(|| format!("#{}", j + 1)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Drop every column whose values cannot be read as numbers.
///
/// Columns with no values at all carry no counts and are dropped as well,
/// but reported apart from text columns. Returns the reduced table and a
/// message naming the dropped columns.
pub fn drop_non_numeric_columns(table: &RawTable) -> (RawTable, String) {
    let kinds: Vec<ColumnKind> = (0..table.n_cols()).map(|j| column_kind(table, j)).collect();
    let of_kind = |kind: ColumnKind| -> Vec<usize> {
        (0..kinds.len()).filter(|&j| kinds[j] == kind).collect()
    };
    let keep = of_kind(ColumnKind::Numeric);
    let text = of_kind(ColumnKind::Text);
    let empty = of_kind(ColumnKind::Empty);

    let mut parts = Vec::new();
    if !text.is_empty() {
        parts.push(format!(
            "{} non-numeric columns removed: {}.",
            text.len(),
            column_names(table, &text)
        ));
    }
    if !empty.is_empty() {
        parts.push(format!(
            "{} empty columns removed: {}.",
            empty.len(),
            column_names(table, &empty)
        ));
    }
    let message = if parts.is_empty() {
        "All columns are numeric; no columns removed.".to_string()
    } else {
        parts.join(" ")
    };

    (table.select_columns(&keep), message)
}
