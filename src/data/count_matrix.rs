//! Count matrix representation for RNA-seq data

use std::collections::HashSet;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use super::table::{Cell, RawTable};
use crate::error::{AnalysisError, Result};
use crate::normalization::library_sizes;

/// A validated count matrix
/// Rows are genes, columns are samples
#[derive(Debug, Clone, PartialEq)]
pub struct CountMatrix {
    /// Raw count data (genes x samples)
    counts: Array2<f64>,
    /// Gene identifiers, unique
    gene_ids: Vec<String>,
    /// Sample identifiers, unique
    sample_ids: Vec<String>,
}

fn first_duplicate(ids: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    ids.iter().find(|id| !seen.insert(id.as_str())).map(|s| s.as_str())
}

impl CountMatrix {
    /// Create a new count matrix from raw data
    pub fn new(
        counts: Array2<f64>,
        gene_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let (n_genes, n_samples) = counts.dim();

        if gene_ids.len() != n_genes {
            return Err(AnalysisError::DimensionMismatch {
                expected: format!("{} gene IDs", n_genes),
                got: format!("{} gene IDs", gene_ids.len()),
            });
        }

        if sample_ids.len() != n_samples {
            return Err(AnalysisError::DimensionMismatch {
                expected: format!("{} sample IDs", n_samples),
                got: format!("{} sample IDs", sample_ids.len()),
            });
        }

        if counts.iter().any(|&x| x < 0.0 || !x.is_finite()) {
            return Err(AnalysisError::InvalidCountMatrix {
                reason: "Counts must be non-negative finite values".to_string(),
            });
        }

        if let Some(dup) = first_duplicate(&gene_ids) {
            return Err(AnalysisError::InvalidCountMatrix {
                reason: format!("Duplicate gene identifier '{}'", dup),
            });
        }

        if let Some(dup) = first_duplicate(&sample_ids) {
            return Err(AnalysisError::InvalidCountMatrix {
                reason: format!("Duplicate sample identifier '{}'", dup),
            });
        }

        if counts.iter().any(|&x| x != x.round()) {
            log::debug!("Count matrix contains non-integer values");
        }

        Ok(Self {
            counts,
            gene_ids,
            sample_ids,
        })
    }

    /// Convert a cleaned gene-major table into a count matrix.
    ///
    /// Every row must be labeled and every cell must hold a number; any other
    /// content is reported as an invalid count matrix.
    pub fn from_table(table: &RawTable) -> Result<Self> {
        let gene_ids: Vec<String> = table
            .row_labels()
            .iter()
            .enumerate()
            .map(|(i, l)| {
                l.clone().ok_or_else(|| AnalysisError::InvalidCountMatrix {
                    reason: format!("row {} has no gene identifier", i + 1),
                })
            })
            .collect::<Result<_>>()?;

        let sample_ids: Vec<String> = table
            .col_labels()
            .iter()
            .enumerate()
            .map(|(j, l)| {
                l.clone().ok_or_else(|| AnalysisError::InvalidCountMatrix {
                    reason: format!("column {} has no sample name", j + 1),
                })
            })
            .collect::<Result<_>>()?;

        let mut counts = Array2::zeros((gene_ids.len(), sample_ids.len()));
        for (i, gene) in gene_ids.iter().enumerate() {
            for (j, sample) in sample_ids.iter().enumerate() {
                counts[[i, j]] = match table.cell(i, j) {
                    Some(Cell::Number(v)) => *v,
                    Some(Cell::Missing) | None => {
                        return Err(AnalysisError::InvalidCountMatrix {
                            reason: format!("missing count for gene '{}' in sample '{}'", gene, sample),
                        })
                    }
                    Some(Cell::Text(s)) => {
                        return Err(AnalysisError::InvalidCountMatrix {
                            reason: format!(
                                "non-numeric count '{}' for gene '{}' in sample '{}'",
                                s, gene, sample
                            ),
                        })
                    }
                };
            }
        }

        Self::new(counts, gene_ids, sample_ids)
    }

    /// Get the number of genes
    pub fn n_genes(&self) -> usize {
        self.counts.nrows()
    }

    /// Get the number of samples
    pub fn n_samples(&self) -> usize {
        self.counts.ncols()
    }

    /// Get the raw counts as a view
    pub fn counts(&self) -> ArrayView2<'_, f64> {
        self.counts.view()
    }

    /// Get gene IDs
    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    /// Get sample IDs
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get counts for a specific gene
    pub fn gene_counts(&self, gene_idx: usize) -> ArrayView1<'_, f64> {
        self.counts.row(gene_idx)
    }

    /// Calculate sum of counts per sample (library size)
    pub fn library_sizes(&self) -> Vec<f64> {
        library_sizes(self.counts.view())
    }

    /// Subset to specific samples
    pub fn subset_samples(&self, sample_indices: &[usize]) -> Result<Self> {
        if let Some(&i) = sample_indices.iter().find(|&&i| i >= self.n_samples()) {
            return Err(AnalysisError::InvalidInput {
                reason: format!("sample index {} out of range for {} samples", i, self.n_samples()),
            });
        }
        let new_counts = self.counts.select(Axis(1), sample_indices);
        let new_sample_ids: Vec<String> = sample_indices
            .iter()
            .map(|&i| self.sample_ids[i].clone())
            .collect();

        Self::new(new_counts, self.gene_ids.clone(), new_sample_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_count_matrix_creation() {
        let counts = array![[10.0, 20.0, 30.0], [5.0, 15.0, 25.0]];
        let matrix = CountMatrix::new(counts, ids(&["gene1", "gene2"]), ids(&["s1", "s2", "s3"])).unwrap();
        assert_eq!(matrix.n_genes(), 2);
        assert_eq!(matrix.n_samples(), 3);
    }

    #[test]
    fn test_negative_counts_rejected() {
        let counts = array![[10.0, -5.0], [5.0, 15.0]];
        let result = CountMatrix::new(counts, ids(&["gene1", "gene2"]), ids(&["s1", "s2"]));
        assert!(matches!(result, Err(AnalysisError::InvalidCountMatrix { .. })));
    }

    #[test]
    fn test_duplicate_genes_rejected() {
        let counts = array![[1.0, 2.0], [3.0, 4.0]];
        let result = CountMatrix::new(counts, ids(&["g", "g"]), ids(&["s1", "s2"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_library_sizes() {
        let counts = array![[10.0, 20.0], [5.0, 15.0]];
        let matrix = CountMatrix::new(counts, ids(&["gene1", "gene2"]), ids(&["s1", "s2"])).unwrap();
        assert_eq!(matrix.library_sizes(), vec![15.0, 35.0]);
    }

    #[test]
    fn test_from_table_rejects_missing_cell() {
        let table = RawTable::new(
            vec![Some("g1".to_string())],
            vec![Some("s1".to_string()), Some("s2".to_string())],
            vec![vec![Cell::Number(1.0), Cell::Missing]],
        )
        .unwrap();
        let err = CountMatrix::from_table(&table).unwrap_err();
        assert!(err.to_string().contains("missing count"));
    }

    #[test]
    fn test_subset_samples() {
        let counts = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let matrix = CountMatrix::new(counts, ids(&["a", "b"]), ids(&["s1", "s2", "s3"])).unwrap();
        let sub = matrix.subset_samples(&[2, 0]).unwrap();
        assert_eq!(sub.sample_ids(), &ids(&["s3", "s1"])[..]);
        assert_eq!(sub.counts()[[1, 0]], 6.0);
        assert!(matches!(
            matrix.subset_samples(&[3]),
            Err(AnalysisError::InvalidInput { .. })
        ));
    }
}
