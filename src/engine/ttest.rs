//! Two-group t-test on log-CPM values
//!
//! A lightweight differential expression engine for exploratory use: each
//! gene is tested with a pooled-variance Student t-test between the tested
//! and control samples on log2(CPM + 1), then p-values are BH-adjusted.

use ndarray::ArrayView2;
use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::fdr::benjamini_hochberg;
use super::DgeEngine;
use crate::contrast::Contrast;
use crate::data::{CountMatrix, DesignMatrix};
use crate::error::{AnalysisError, Result};
use crate::io::RawDgeTable;
use crate::normalization::{counts_per_million, log_counts_per_million};
use crate::stats::{mean, sample_variance};

/// Parameters for the t-test engine
#[derive(Debug, Clone)]
pub struct TTestParams {
    /// Minimum samples required in each group
    pub min_replicates: usize,
}

impl Default for TTestParams {
    fn default() -> Self {
        Self { min_replicates: 2 }
    }
}

/// Per-gene Student t-test between two levels of a factor
#[derive(Debug, Clone, Default)]
pub struct TTestEngine {
    params: TTestParams,
}

/// Statistics for one gene
#[derive(Debug, Clone, Copy)]
struct GeneTest {
    base_mean: f64,
    log2_fold_change: f64,
    pvalue: f64,
}

impl TTestEngine {
    pub fn new(params: TTestParams) -> Self {
        Self { params }
    }

    /// Column indices of `counts` whose design level equals `level`
    fn group_columns(
        &self,
        counts: &CountMatrix,
        design: &DesignMatrix,
        factor: &str,
        level: &str,
    ) -> Result<Vec<usize>> {
        let values = design.factor(factor).ok_or_else(|| {
            AnalysisError::engine(self.name(), format!("factor '{}' not in design", factor))
        })?;

        let mut columns = Vec::new();
        for (j, sample) in counts.sample_ids().iter().enumerate() {
            let row = design.sample_index(sample).ok_or_else(|| {
                AnalysisError::engine(self.name(), format!("sample '{}' not in design", sample))
            })?;
            if values[row] == level {
                columns.push(j);
            }
        }

        if columns.len() < self.params.min_replicates {
            return Err(AnalysisError::engine(
                self.name(),
                format!(
                    "level '{}' has {} samples, at least {} required",
                    level,
                    columns.len(),
                    self.params.min_replicates
                ),
            ));
        }
        Ok(columns)
    }
}

fn test_gene(
    log_cpm: ArrayView2<f64>,
    cpm: ArrayView2<f64>,
    gene: usize,
    tested: &[usize],
    control: &[usize],
    t_dist: &StudentsT,
) -> GeneTest {
    let x: Vec<f64> = tested.iter().map(|&j| log_cpm[[gene, j]]).collect();
    let y: Vec<f64> = control.iter().map(|&j| log_cpm[[gene, j]]).collect();
    let (n1, n2) = (x.len() as f64, y.len() as f64);

    let log2_fold_change = mean(&x) - mean(&y);
    let pooled =
        ((n1 - 1.0) * sample_variance(&x) + (n2 - 1.0) * sample_variance(&y)) / (n1 + n2 - 2.0);
    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();

    let pvalue = if se > 0.0 && se.is_finite() {
        let t = log2_fold_change / se;
        2.0 * t_dist.cdf(-t.abs())
    } else {
        f64::NAN
    };

    let abundances: Vec<f64> = tested
        .iter()
        .chain(control.iter())
        .map(|&j| cpm[[gene, j]])
        .collect();

    GeneTest {
        base_mean: mean(&abundances),
        log2_fold_change,
        pvalue,
    }
}

impl DgeEngine for TTestEngine {
    fn name(&self) -> &str {
        "t-test"
    }

    fn run(
        &self,
        counts: &CountMatrix,
        design: &DesignMatrix,
        contrast: &Contrast,
    ) -> Result<RawDgeTable> {
        let tested = self.group_columns(counts, design, &contrast.factor, &contrast.tested)?;
        let control = self.group_columns(counts, design, &contrast.factor, &contrast.control)?;

        let df = (tested.len() + control.len()).saturating_sub(2) as f64;
        if df < 1.0 {
            return Err(AnalysisError::engine(self.name(), "no degrees of freedom left"));
        }
        let t_dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|e| AnalysisError::engine(self.name(), e.to_string()))?;

        let cpm = counts_per_million(counts.counts());
        let log_cpm = log_counts_per_million(counts.counts());

        log::info!(
            "t-test on {} genes: {} tested vs {} control samples",
            counts.n_genes(),
            tested.len(),
            control.len()
        );

        let tests: Vec<GeneTest> = (0..counts.n_genes())
            .into_par_iter()
            .map(|g| test_gene(log_cpm.view(), cpm.view(), g, &tested, &control, &t_dist))
            .collect();

        let pvalues: Vec<f64> = tests.iter().map(|t| t.pvalue).collect();
        let padj = benjamini_hochberg(&pvalues);

        RawDgeTable::from_values(
            counts.gene_ids().to_vec(),
            tests.iter().map(|t| t.base_mean).collect(),
            tests.iter().map(|t| t.log2_fold_change).collect(),
            pvalues,
            padj,
        )
    }
}
