//! Differential expression result tables

use serde::{Deserialize, Serialize};

use crate::contrast::Contrast;
use crate::data::Cell;
use crate::error::{AnalysisError, Result};

/// Column names shared by raw and sanitized tables
pub const BASE_MEAN: &str = "baseMean";
pub const LOG2_FOLD_CHANGE: &str = "log2FoldChange";
pub const PVALUE: &str = "pvalue";
pub const PADJ: &str = "padj";

/// Engine output before sanitization.
/// Cells may be missing, non-finite or text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDgeTable {
    pub gene_ids: Vec<String>,
    pub base_mean: Vec<Cell>,
    pub log2_fold_change: Vec<Cell>,
    pub pvalue: Vec<Cell>,
    pub padj: Vec<Cell>,
}

fn numeric_cell(v: f64) -> Cell {
    if v.is_nan() {
        Cell::Missing
    } else {
        Cell::Number(v)
    }
}

impl RawDgeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from numeric columns; NaN becomes a missing cell
    pub fn from_values(
        gene_ids: Vec<String>,
        base_mean: Vec<f64>,
        log2_fold_change: Vec<f64>,
        pvalue: Vec<f64>,
        padj: Vec<f64>,
    ) -> Result<Self> {
        let table = Self {
            gene_ids,
            base_mean: base_mean.into_iter().map(numeric_cell).collect(),
            log2_fold_change: log2_fold_change.into_iter().map(numeric_cell).collect(),
            pvalue: pvalue.into_iter().map(numeric_cell).collect(),
            padj: padj.into_iter().map(numeric_cell).collect(),
        };
        table.check_shape()?;
        Ok(table)
    }

    /// Append one row
    pub fn push(&mut self, gene_id: &str, base_mean: Cell, log2_fold_change: Cell, pvalue: Cell, padj: Cell) {
        self.gene_ids.push(gene_id.to_string());
        self.base_mean.push(base_mean);
        self.log2_fold_change.push(log2_fold_change);
        self.pvalue.push(pvalue);
        self.padj.push(padj);
    }

    pub fn n_rows(&self) -> usize {
        self.gene_ids.len()
    }

    /// Check that every column has one cell per gene
    pub fn check_shape(&self) -> Result<()> {
        let n = self.gene_ids.len();
        for (name, len) in [
            (BASE_MEAN, self.base_mean.len()),
            (LOG2_FOLD_CHANGE, self.log2_fold_change.len()),
            (PVALUE, self.pvalue.len()),
            (PADJ, self.padj.len()),
        ] {
            if len != n {
                return Err(AnalysisError::DimensionMismatch {
                    expected: format!("{} {} values", n, name),
                    got: format!("{} {} values", len, name),
                });
            }
        }
        Ok(())
    }
}

/// Sanitized differential expression results: every value is finite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DgeResults {
    /// Gene identifiers
    pub gene_ids: Vec<String>,
    /// Mean abundance across the compared samples
    pub base_means: Vec<f64>,
    /// Log2 fold change, tested over control
    pub log2_fold_changes: Vec<f64>,
    /// Raw p-values
    pub pvalues: Vec<f64>,
    /// Adjusted p-values
    pub padj: Vec<f64>,
    /// Contrast the results belong to
    pub contrast: Contrast,
}

impl DgeResults {
    /// Empty results for a contrast
    pub fn new(contrast: Contrast) -> Self {
        Self {
            gene_ids: Vec::new(),
            base_means: Vec::new(),
            log2_fold_changes: Vec::new(),
            pvalues: Vec::new(),
            padj: Vec::new(),
            contrast,
        }
    }

    /// Get number of genes
    pub fn n_genes(&self) -> usize {
        self.gene_ids.len()
    }

    /// Get significant genes at given alpha level
    pub fn significant_genes(&self, alpha: f64) -> Vec<&str> {
        self.gene_ids
            .iter()
            .zip(self.padj.iter())
            .filter(|(_, &p)| p < alpha)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Get up-regulated genes (positive log2FC, significant)
    pub fn upregulated_genes(&self, alpha: f64, min_lfc: f64) -> Vec<&str> {
        self.gene_ids
            .iter()
            .zip(self.padj.iter().zip(self.log2_fold_changes.iter()))
            .filter(|(_, (&p, &lfc))| p < alpha && lfc > min_lfc)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Get down-regulated genes (negative log2FC, significant)
    pub fn downregulated_genes(&self, alpha: f64, min_lfc: f64) -> Vec<&str> {
        self.gene_ids
            .iter()
            .zip(self.padj.iter().zip(self.log2_fold_changes.iter()))
            .filter(|(_, (&p, &lfc))| p < alpha && lfc < -min_lfc)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Summary statistics
    pub fn summary(&self, alpha: f64) -> ResultsSummary {
        ResultsSummary {
            contrast: self.contrast.clone(),
            total_genes: self.n_genes(),
            significant: self.significant_genes(alpha).len(),
            upregulated: self.upregulated_genes(alpha, 0.0).len(),
            downregulated: self.downregulated_genes(alpha, 0.0).len(),
            alpha,
        }
    }
}

/// Summary of differential expression results
#[derive(Debug, Clone, Serialize)]
pub struct ResultsSummary {
    pub contrast: Contrast,
    pub total_genes: usize,
    pub significant: usize,
    pub upregulated: usize,
    pub downregulated: usize,
    pub alpha: f64,
}

impl std::fmt::Display for ResultsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Differential Expression Summary ({})", self.contrast)?;
        writeln!(f, "======================")?;
        writeln!(f, "Genes with valid statistics: {}", self.total_genes)?;
        writeln!(
            f,
            "Significant (padj < {}): {}",
            self.alpha, self.significant
        )?;
        writeln!(f, "  Up-regulated: {}", self.upregulated)?;
        writeln!(f, "  Down-regulated: {}", self.downregulated)?;
        Ok(())
    }
}
