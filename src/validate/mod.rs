//! Validation of uploaded count and design tables
//!
//! Steps run in a fixed order, each returning a new table and a message:
//!
//! 1. [`normalize_orientation`] - genes as rows, unless the design's sample
//!    names show which axis holds the samples ([`transpose_for_samples`])
//! 2. [`drop_non_numeric_columns`]
//! 3. [`drop_unlabeled_rows`]
//! 4. [`deduplicate_labels`]
//! 5. [`reconcile_samples`] - against the design matrix

mod columns;
mod labels;
mod orientation;
mod samples;

pub use columns::drop_non_numeric_columns;
pub use labels::{deduplicate_labels, drop_unlabeled_rows, KeepPolicy};
pub use orientation::{
    needs_transpose, normalize_orientation, orientation_message, transpose_for_samples,
};
pub use samples::{reconcile_samples, Reconciled};

use crate::data::{CountMatrix, DesignMatrix, RawTable, ReportBuilder, ReportStage};
use crate::error::{AnalysisError, Result};

/// Parameters for validation
#[derive(Debug, Clone, Default)]
pub struct ValidationParams {
    /// Occurrence kept for duplicated gene labels
    pub keep: KeepPolicy,
}

/// Validated, compatible inputs
#[derive(Debug, Clone)]
pub struct ValidatedData {
    pub counts: CountMatrix,
    pub design: DesignMatrix,
}

/// Run every validation step, appending one message per step to `report`.
///
/// On failure the failure itself is also recorded before the error returns.
pub fn validate(
    table: &RawTable,
    design: &DesignMatrix,
    params: &ValidationParams,
    report: &mut ReportBuilder,
) -> Result<ValidatedData> {
    let mut stage = ReportStage::Ingestion;
    let result = run_steps(table, design, params, report, &mut stage);
    if let Err(e) = &result {
        report.warn(stage, format!("Validation failed: {}", e));
    }
    result
}

/// Steps 1-4 only: a gene-major count matrix without a design to check against
pub fn clean_counts(
    table: &RawTable,
    params: &ValidationParams,
    report: &mut ReportBuilder,
) -> Result<CountMatrix> {
    let mut stage = ReportStage::Ingestion;
    let result = clean_steps(table, None, params, report, &mut stage);
    if let Err(e) = &result {
        report.warn(stage, format!("Validation failed: {}", e));
    }
    result
}

fn clean_steps(
    table: &RawTable,
    samples: Option<&[String]>,
    params: &ValidationParams,
    report: &mut ReportBuilder,
    stage: &mut ReportStage,
) -> Result<CountMatrix> {
    if table.n_rows() == 0 || table.n_cols() == 0 {
        return Err(AnalysisError::parse(
            "count or design matrix was provided as an empty dataset",
        ));
    }

    *stage = ReportStage::Orientation;
    let by_samples = samples.and_then(|s| transpose_for_samples(table, s));
    let oriented = match by_samples {
        Some(true) => table.transpose(),
        Some(false) => table.clone(),
        None => normalize_orientation(table),
    };
    let transposed = by_samples.unwrap_or_else(|| needs_transpose(table));
    let mut message = orientation_message(table.n_rows(), table.n_cols(), transposed);
    if by_samples.is_some() {
        message.push_str(" Decided by the design matrix sample names.");
    }
    report.info(ReportStage::Orientation, message);

    *stage = ReportStage::NumericColumns;
    let (numeric, message) = drop_non_numeric_columns(&oriented);
    report.info(ReportStage::NumericColumns, message);
    if numeric.n_cols() == 0 {
        return Err(AnalysisError::parse(
            "count matrix contains only non-numerical columns",
        ));
    }

    *stage = ReportStage::UnlabeledRows;
    let (labeled, message) = drop_unlabeled_rows(&numeric);
    report.info(ReportStage::UnlabeledRows, message);

    *stage = ReportStage::Deduplication;
    let (unique, message) = deduplicate_labels(&labeled, params.keep);
    report.info(ReportStage::Deduplication, message);
    if unique.n_rows() == 0 {
        return Err(AnalysisError::parse("no annotated genes left after cleaning"));
    }

    CountMatrix::from_table(&unique)
}

fn run_steps(
    table: &RawTable,
    design: &DesignMatrix,
    params: &ValidationParams,
    report: &mut ReportBuilder,
    stage: &mut ReportStage,
) -> Result<ValidatedData> {
    if design.n_samples() == 0 {
        return Err(AnalysisError::parse(
            "count or design matrix was provided as an empty dataset",
        ));
    }

    let counts = clean_steps(table, Some(design.sample_ids()), params, report, stage)?;

    *stage = ReportStage::SampleReconciliation;
    let reconciled = reconcile_samples(&counts, design)?;
    if reconciled.removed.is_empty() {
        report.info(ReportStage::SampleReconciliation, reconciled.message);
    } else {
        report.warn(ReportStage::SampleReconciliation, reconciled.message);
    }

    Ok(ValidatedData {
        counts: reconciled.counts,
        design: reconciled.design,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{parse_design, parse_table, DesignOptions};

    fn design(text: &str) -> DesignMatrix {
        parse_design(text, &DesignOptions::default()).unwrap()
    }

    #[test]
    fn test_validation_messages_in_order() {
        let table = parse_table(
            "gene,note,S1,S2,S3\nA,x,10,20,30\nB,y,5,5,5\nNA,z,1,1,1\nA,w,99,99,99\nC,v,7,8,9\n",
            Some("gene"),
        )
        .unwrap();
        let design = design("sample,condition\nS1,control\nS2,treated\n");

        let mut report = ReportBuilder::new();
        let data = validate(&table, &design, &ValidationParams::default(), &mut report).unwrap();
        let report = report.finish();

        assert_eq!(data.counts.gene_ids(), &["A", "B", "C"]);
        assert_eq!(data.counts.sample_ids(), &["S1", "S2"]);
        assert_eq!(data.counts.counts()[[0, 0]], 10.0);

        let stages: Vec<_> = report.entries().iter().map(|e| e.stage).collect();
        assert_eq!(
            stages,
            vec![
                ReportStage::Orientation,
                ReportStage::NumericColumns,
                ReportStage::UnlabeledRows,
                ReportStage::Deduplication,
                ReportStage::SampleReconciliation,
            ]
        );
        assert_eq!(report.messages()[2], "1 unannotated genes removed.");
        assert!(report.messages()[4].contains("S3"));
    }

    #[test]
    fn test_wide_table_transposed_before_cleaning() {
        // samples as rows, genes as columns
        let table = parse_table("sample,g1,g2,g3,g4\nS1,1,2,3,4\nS2,5,6,7,8\n", Some("sample")).unwrap();
        let design = design("sample,condition\nS1,a\nS2,b\n");

        let mut report = ReportBuilder::new();
        let data = validate(&table, &design, &ValidationParams::default(), &mut report).unwrap();
        assert_eq!(data.counts.n_genes(), 4);
        assert_eq!(data.counts.sample_ids(), &["S1", "S2"]);
        assert_eq!(data.counts.counts()[[3, 1]], 8.0);
    }

    #[test]
    fn test_incompatible_design_recorded_and_returned() {
        let table = parse_table("gene,S1,S2\nA,1,2\nB,3,4\nC,5,6\n", Some("gene")).unwrap();
        let design = design("sample,condition\nS1,a\nS7,b\n");

        let mut report = ReportBuilder::new();
        let err = validate(&table, &design, &ValidationParams::default(), &mut report).unwrap_err();
        assert!(matches!(err, AnalysisError::Incompatibility { .. }));

        let report = report.finish();
        assert_eq!(report.len(), 5);
        assert_eq!(report.entries()[4].stage, ReportStage::SampleReconciliation);
        assert!(report.messages()[4].contains("S7"));
    }

    #[test]
    fn test_only_text_columns_fails() {
        let table = parse_table("gene,a,b\nA,x,y\nB,z,w\nC,u,v\n", Some("gene")).unwrap();
        let design = design("sample,condition\na,1\n");

        let mut report = ReportBuilder::new();
        let err = validate(&table, &design, &ValidationParams::default(), &mut report).unwrap_err();
        assert!(err.to_string().contains("only non-numerical"));
    }

    #[test]
    fn test_clean_counts_without_design() {
        let table = parse_table("gene,S1,S2
A,1,2
A,3,4
B,5,6
C,7,8
", Some("gene")).unwrap();
        let params = ValidationParams {
            keep: KeepPolicy::Last,
        };

        let mut report = ReportBuilder::new();
        let counts = clean_counts(&table, &params, &mut report).unwrap();
        assert_eq!(counts.gene_ids(), &["A", "B", "C"]);
        assert_eq!(counts.counts()[[0, 0]], 3.0);
        assert_eq!(report.len(), 4);
    }

    #[test]
    fn test_design_keeps_wide_gene_major_table() {
        // fewer genes than samples would be transposed on shape alone
        let table = parse_table("gene,S1,S2,S3,S4
A,1,2,3,4
B,5,6,7,8
", Some("gene")).unwrap();
        let design = design("sample,condition
S1,a
S2,a
S3,b
S4,b
");

        let mut report = ReportBuilder::new();
        let data = validate(&table, &design, &ValidationParams::default(), &mut report).unwrap();
        assert_eq!(data.counts.gene_ids(), &["A", "B"]);
        assert_eq!(data.counts.n_samples(), 4);
        assert!(report.finish().messages()[0].contains("sample names"));
    }

    #[test]
    fn test_missing_design_sample_keeps_orientation() {
        let table = parse_table("gene,S1,S2,S3,S4\nA,1,2,3,4\nB,5,6,7,8\nC,9,9,9,9\n", Some("gene")).unwrap();
        let design = design("sample,condition\nS1,a\nS2,a\nS3,b\nS5,b\n");

        let mut report = ReportBuilder::new();
        let err = validate(&table, &design, &ValidationParams::default(), &mut report).unwrap_err();
        match err {
            AnalysisError::Incompatibility { missing_in_data } => {
                assert_eq!(missing_in_data, vec!["S5"]);
            }
            other => panic!("unexpected error: {}", other),
        }

        let report = report.finish();
        assert!(report.messages()[0].starts_with("Count matrix orientation kept: 3 genes x 4 samples."));
    }
}
