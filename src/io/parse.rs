//! Ingestion of uploaded delimited text into typed tables
//!
//! Both inputs may be comma- or tab-separated; the delimiter is taken from the
//! first line (tab if it contains one, comma otherwise).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::data::{Cell, DesignMatrix, RawTable};
use crate::error::{AnalysisError, Result};

/// Options for reading a design table
#[derive(Debug, Clone)]
pub struct DesignOptions {
    /// First line holds factor names. Without a header the first factor is
    /// named `condition` and later ones `factor_<n>`.
    pub has_header: bool,
}

impl Default for DesignOptions {
    fn default() -> Self {
        Self { has_header: true }
    }
}

/// Pick the field delimiter from the first line of the text
pub fn detect_delimiter(text: &str) -> u8 {
    match text.lines().next() {
        Some(line) if line.contains('\t') => b'\t',
        _ => b',',
    }
}

/// Split text into trimmed records, checking every record has the width of the first
fn read_records(text: &str) -> Result<Vec<Vec<String>>> {
    if text.trim().is_empty() {
        return Err(AnalysisError::parse("table was provided as an empty dataset"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(text))
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let fields: Vec<String> = record.iter().map(|f| f.to_string()).collect();
        if let Some(first) = records.first() {
            if fields.len() != first.len() {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                return Err(AnalysisError::parse(format!(
                    "line {} has {} fields, expected {}",
                    line,
                    fields.len(),
                    first.len()
                )));
            }
        }
        records.push(fields);
    }
    Ok(records)
}

fn optional_label(field: &str) -> Option<String> {
    if Cell::parse(field).is_missing() {
        None
    } else {
        Some(field.trim().to_string())
    }
}

/// Parse a delimited table with a header row.
///
/// When `id_column` is given the table is keyed by that column and the column
/// is removed from the data; otherwise rows are keyed by their 0-based ordinal.
pub fn parse_table(text: &str, id_column: Option<&str>) -> Result<RawTable> {
    let mut records = read_records(text)?.into_iter();
    let header = records
        .next()
        .ok_or_else(|| AnalysisError::parse("table has no header row"))?;
    let body: Vec<Vec<String>> = records.collect();
    if body.is_empty() {
        return Err(AnalysisError::parse("table has a header but no data rows"));
    }

    let mut seen = HashSet::new();
    for name in header.iter().filter(|h| !h.is_empty()) {
        if !seen.insert(name.as_str()) {
            return Err(AnalysisError::parse(format!("duplicate column name '{}'", name)));
        }
    }

    let id_idx = match id_column {
        Some(name) => Some(header.iter().position(|h| h == name).ok_or_else(|| {
            AnalysisError::parse(format!("identifier column '{}' not found", name))
        })?),
        None => None,
    };

    let col_labels: Vec<Option<String>> = header
        .iter()
        .enumerate()
        .filter(|(j, _)| Some(*j) != id_idx)
        .map(|(_, h)| if h.is_empty() { None } else { Some(h.clone()) })
        .collect();

    let mut row_labels = Vec::with_capacity(body.len());
    let mut cells = Vec::with_capacity(body.len());
    for (i, fields) in body.iter().enumerate() {
        row_labels.push(match id_idx {
            Some(k) => optional_label(&fields[k]),
            None => Some(i.to_string()),
        });
        cells.push(
            fields
                .iter()
                .enumerate()
                .filter(|(j, _)| Some(*j) != id_idx)
                .map(|(_, f)| Cell::parse(f))
                .collect(),
        );
    }

    RawTable::new(row_labels, col_labels, cells)
}

/// Parse a design table: first column is the sample identifier, the remaining
/// columns are categorical factors.
pub fn parse_design(text: &str, options: &DesignOptions) -> Result<DesignMatrix> {
    let records = read_records(text)?;
    let width = records.first().map(|r| r.len()).unwrap_or(0);
    if width < 2 {
        return Err(AnalysisError::parse(
            "design matrix needs a sample column and at least one factor column",
        ));
    }

    let (factor_names, body): (Vec<String>, &[Vec<String>]) = if options.has_header {
        let names = records[0][1..]
            .iter()
            .enumerate()
            .map(|(k, h)| {
                if h.is_empty() {
                    format!("factor_{}", k + 1)
                } else {
                    h.clone()
                }
            })
            .collect();
        (names, &records[1..])
    } else {
        let names = (1..width)
            .map(|k| {
                if k == 1 {
                    "condition".to_string()
                } else {
                    format!("factor_{}", k)
                }
            })
            .collect();
        (names, &records[..])
    };

    if body.is_empty() {
        return Err(AnalysisError::parse("design matrix has no sample rows"));
    }

    let sample_ids = body
        .iter()
        .enumerate()
        .map(|(i, r)| {
            optional_label(&r[0]).ok_or_else(|| {
                AnalysisError::parse(format!("design row {} has no sample identifier", i + 1))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut design = DesignMatrix::new(sample_ids)?;
    for (k, name) in factor_names.iter().enumerate() {
        let values = body
            .iter()
            .map(|r| {
                optional_label(&r[k + 1]).ok_or_else(|| {
                    AnalysisError::parse(format!(
                        "missing value for factor '{}' in sample '{}'",
                        name, r[0]
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        design.add_factor(name, values)?;
    }

    Ok(design)
}

/// Read a count table from a file
pub fn read_count_table<P: AsRef<Path>>(path: P, id_column: Option<&str>) -> Result<RawTable> {
    let text = fs::read_to_string(path)?;
    parse_table(&text, id_column)
}

/// Read a design matrix from a file
pub fn read_design<P: AsRef<Path>>(path: P, options: &DesignOptions) -> Result<DesignMatrix> {
    let text = fs::read_to_string(path)?;
    parse_design(&text, options)
}
