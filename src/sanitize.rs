//! Cleaning of differential expression engine output
//!
//! Engines may hand back missing cells, infinities or text in numeric
//! columns. Rows carrying any of these in the four result columns are
//! dropped; the surviving rows keep their original order.

use serde::Serialize;

use crate::contrast::Contrast;
use crate::data::Cell;
use crate::error::{AnalysisError, Result};
use crate::io::{DgeResults, RawDgeTable, BASE_MEAN, LOG2_FOLD_CHANGE, PADJ, PVALUE};

/// Why a row was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Missing,
    Infinite,
    NonNumeric,
}

/// Row counts from one sanitization pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeSummary {
    pub input_rows: usize,
    pub kept: usize,
    pub dropped_missing: usize,
    pub dropped_infinite: usize,
    pub dropped_non_numeric: usize,
}

impl SanitizeSummary {
    pub fn dropped(&self) -> usize {
        self.dropped_missing + self.dropped_infinite + self.dropped_non_numeric
    }

    /// One-line description for the analysis report
    pub fn message(&self) -> String {
        format!(
            "Sanitized {} result rows: kept {}, removed {} with missing values, {} with infinite values, {} non-numeric.",
            self.input_rows, self.kept, self.dropped_missing, self.dropped_infinite, self.dropped_non_numeric
        )
    }
}

/// Coerce one cell to a finite number
fn coerce(cell: &Cell) -> std::result::Result<f64, Rejection> {
    let value = match cell {
        Cell::Missing => return Err(Rejection::Missing),
        Cell::Number(v) => *v,
        Cell::Text(s) => s.trim().parse::<f64>().map_err(|_| Rejection::NonNumeric)?,
    };
    if value.is_nan() {
        Err(Rejection::Missing)
    } else if value.is_infinite() {
        Err(Rejection::Infinite)
    } else {
        Ok(value)
    }
}

/// Drop unusable rows from a raw engine table.
///
/// A row is kept only when mean abundance, log2 fold change, p-value and
/// adjusted p-value all coerce to finite numbers. An empty result is an
/// error rather than a silent success.
pub fn sanitize_results(raw: &RawDgeTable, contrast: &Contrast) -> Result<(DgeResults, SanitizeSummary)> {
    raw.check_shape()?;

    let mut results = DgeResults::new(contrast.clone());
    let mut summary = SanitizeSummary {
        input_rows: raw.n_rows(),
        ..Default::default()
    };

    for (i, gene) in raw.gene_ids.iter().enumerate() {
        let row = coerce(&raw.base_mean[i]).and_then(|base_mean| {
            Ok([
                base_mean,
                coerce(&raw.log2_fold_change[i])?,
                coerce(&raw.pvalue[i])?,
                coerce(&raw.padj[i])?,
            ])
        });

        match row {
            Ok([base_mean, lfc, pvalue, padj]) => {
                results.gene_ids.push(gene.clone());
                results.base_means.push(base_mean);
                results.log2_fold_changes.push(lfc);
                results.pvalues.push(pvalue);
                results.padj.push(padj);
            }
            Err(Rejection::Missing) => summary.dropped_missing += 1,
            Err(Rejection::Infinite) => summary.dropped_infinite += 1,
            Err(Rejection::NonNumeric) => summary.dropped_non_numeric += 1,
        }
    }
    summary.kept = results.n_genes();

    log::debug!("{}", summary.message());

    if results.n_genes() == 0 {
        return Err(AnalysisError::EmptyResult {
            reason: format!(
                "all {} rows had a missing, infinite or non-numeric value in {}, {}, {} or {}",
                summary.input_rows, BASE_MEAN, LOG2_FOLD_CHANGE, PVALUE, PADJ
            ),
        });
    }

    Ok((results, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Cell {
        Cell::Number(v)
    }

    fn contrast() -> Contrast {
        Contrast::new("condition", "treated", "control")
    }

    fn table(rows: Vec<(&str, [Cell; 4])>) -> RawDgeTable {
        let mut raw = RawDgeTable::new();
        for (gene, [a, b, c, d]) in rows {
            raw.push(gene, a, b, c, d);
        }
        raw
    }

    #[test]
    fn test_infinite_effect_size_row_removed() {
        let raw = table(vec![
            ("g1", [num(10.0), num(1.0), num(0.01), num(0.02)]),
            ("g2", [num(5.0), num(f64::INFINITY), num(0.5), num(0.6)]),
            ("g3", [num(8.0), num(-2.0), num(0.001), num(0.003)]),
            ("g4", [num(1.0), num(0.1), num(0.9), num(0.9)]),
        ]);
        let (results, summary) = sanitize_results(&raw, &contrast()).unwrap();

        assert_eq!(results.gene_ids, vec!["g1", "g3", "g4"]);
        assert_eq!(results.log2_fold_changes, vec![1.0, -2.0, 0.1]);
        assert_eq!(summary.dropped_infinite, 1);
        assert_eq!(summary.dropped(), 1);
        assert_eq!(summary.kept, 3);
    }

    #[test]
    fn test_missing_and_text_cells() {
        let raw = table(vec![
            ("g1", [num(10.0), num(1.0), Cell::Missing, num(0.02)]),
            ("g2", [num(5.0), Cell::Text("0.5".into()), num(0.5), num(0.6)]),
            ("g3", [num(8.0), num(-2.0), num(0.01), Cell::Text("n/a?".into())]),
            ("g4", [num(f64::NAN), num(0.1), num(0.9), num(0.9)]),
            ("g5", [num(1.0), num(0.2), num(0.3), Cell::Text("-inf".into())]),
        ]);
        let (results, summary) = sanitize_results(&raw, &contrast()).unwrap();

        assert_eq!(results.gene_ids, vec!["g2"]);
        assert_eq!(results.log2_fold_changes, vec![0.5]);
        assert_eq!(summary.dropped_missing, 2);
        assert_eq!(summary.dropped_non_numeric, 1);
        assert_eq!(summary.dropped_infinite, 1);
        assert_eq!(summary.input_rows, 5);
    }

    #[test]
    fn test_output_is_finite() {
        let raw = table(vec![
            ("a", [num(1.0), num(f64::NEG_INFINITY), num(0.1), num(0.1)]),
            ("b", [num(2.0), num(0.5), num(0.2), num(0.3)]),
        ]);
        let (results, _) = sanitize_results(&raw, &contrast()).unwrap();
        for column in [&results.base_means, &results.log2_fold_changes, &results.pvalues, &results.padj] {
            assert!(column.iter().all(|v| v.is_finite()));
        }
        assert_eq!(results.contrast, contrast());
    }

    #[test]
    fn test_all_rows_removed_is_error() {
        let raw = table(vec![
            ("a", [num(1.0), Cell::Missing, num(0.1), num(0.1)]),
            ("b", [num(2.0), num(0.5), num(f64::INFINITY), num(0.3)]),
        ]);
        let err = sanitize_results(&raw, &contrast()).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResult { .. }));
    }

    #[test]
    fn test_empty_input_is_error() {
        let err = sanitize_results(&RawDgeTable::new(), &contrast()).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResult { .. }));
    }

    #[test]
    fn test_ragged_table_rejected() {
        let mut raw = table(vec![("a", [num(1.0), num(0.5), num(0.1), num(0.1)])]);
        raw.padj.pop();
        let err = sanitize_results(&raw, &contrast()).unwrap_err();
        assert!(matches!(err, AnalysisError::DimensionMismatch { .. }));
    }
}
