//! Products of an analysis session

use ndarray::{Array2, ArrayView2};
use serde::Serialize;

use crate::contrast::Contrast;
use crate::data::{AnalysisReport, CountMatrix, Factor};
use crate::error::{AnalysisError, Result};
use crate::io::DgeResults;
use crate::normalization::{counts_per_million, log_counts_per_million};
use crate::sanitize::SanitizeSummary;

/// Number of embedding axes produced for plotting
pub const EMBEDDING_COMPONENTS: usize = 2;

/// Parameters for the exploratory artifacts
#[derive(Debug, Clone)]
pub struct EmbeddingParams {
    /// Axes per embedding
    pub n_components: usize,
    /// Design factor attached to embeddings and library sizes.
    /// Defaults to the first factor of the design.
    pub color_by: Option<String>,
}

impl Default for EmbeddingParams {
    fn default() -> Self {
        Self {
            n_components: EMBEDDING_COMPONENTS,
            color_by: None,
        }
    }
}

/// Scale of a normalized table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scale {
    /// Counts per million
    Cpm,
    /// log2(CPM + 1)
    LogCpm,
}

/// Library-size normalized counts; the session caches the log-CPM scale
#[derive(Debug, Clone)]
pub struct NormalizedMatrix {
    scale: Scale,
    gene_ids: Vec<String>,
    sample_ids: Vec<String>,
    /// genes x samples
    values: Array2<f64>,
}

impl NormalizedMatrix {
    /// log2(CPM + 1) of `counts`
    pub fn from_counts(counts: &CountMatrix) -> Result<Self> {
        Self::with_scale(counts, Scale::LogCpm)
    }

    /// Normalize `counts`, rejecting samples whose library is empty
    pub fn with_scale(counts: &CountMatrix, scale: Scale) -> Result<Self> {
        let empty: Vec<&str> = counts
            .sample_ids()
            .iter()
            .zip(counts.library_sizes())
            .filter(|(_, total)| *total <= 0.0)
            .map(|(id, _)| id.as_str())
            .collect();
        if !empty.is_empty() {
            return Err(AnalysisError::InvalidCountMatrix {
                reason: format!("samples with zero total counts: {}", empty.join(", ")),
            });
        }

        let values = match scale {
            Scale::Cpm => counts_per_million(counts.counts()),
            Scale::LogCpm => log_counts_per_million(counts.counts()),
        };
        Ok(Self {
            scale,
            gene_ids: counts.gene_ids().to_vec(),
            sample_ids: counts.sample_ids().to_vec(),
            values,
        })
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// genes x samples
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }
}

/// Sample coordinates from one embedding engine
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    pub method: String,
    pub sample_ids: Vec<String>,
    pub axis_names: Vec<String>,
    /// samples x axes
    pub coords: Array2<f64>,
    pub annotation: Option<Factor>,
}

impl EmbeddingTable {
    /// Column names: axes, then the annotation factor
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.axis_names.clone();
        if let Some(factor) = &self.annotation {
            columns.push(factor.name.clone());
        }
        columns
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }
}

/// Total counts per sample
#[derive(Debug, Clone, Serialize)]
pub struct LibrarySizes {
    pub sample_ids: Vec<String>,
    pub totals: Vec<f64>,
    pub annotation: Option<Factor>,
}

/// Pearson correlation between samples on log-CPM
#[derive(Debug, Clone)]
pub struct SampleCorrelation {
    pub sample_ids: Vec<String>,
    /// samples x samples
    pub values: Array2<f64>,
}

/// Everything the exploratory view needs
#[derive(Debug, Clone)]
pub struct EmbeddingArtifacts {
    pub library_sizes: LibrarySizes,
    pub pca: EmbeddingTable,
    pub umap: Option<EmbeddingTable>,
    pub correlation: SampleCorrelation,
    pub report: AnalysisReport,
}

/// One differential expression run for one contrast
#[derive(Debug, Clone)]
pub struct DgeRun {
    pub contrast: Contrast,
    pub engine: String,
    pub results: DgeResults,
    pub sanitize: SanitizeSummary,
    pub report: AnalysisReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_embedding_columns_include_annotation() {
        let table = EmbeddingTable {
            method: "PCA".into(),
            sample_ids: vec!["a".into(), "b".into()],
            axis_names: vec!["PC1".into(), "PC2".into()],
            coords: array![[0.5, -0.5], [-0.5, 0.5]],
            annotation: Some(Factor {
                name: "batch".into(),
                values: vec!["x".into(), "y".into()],
            }),
        };
        assert_eq!(table.columns(), vec!["PC1", "PC2", "batch"]);
        assert_eq!(table.n_samples(), 2);
    }

    #[test]
    fn test_normalized_matrix_keeps_labels() {
        let counts = CountMatrix::new(
            array![[0.0, 1.0], [3.0, 1.0]],
            vec!["g1".into(), "g2".into()],
            vec!["s1".into(), "s2".into()],
        )
        .unwrap();
        let normalized = NormalizedMatrix::from_counts(&counts).unwrap();
        assert_eq!(normalized.scale(), Scale::LogCpm);
        assert_eq!(normalized.gene_ids(), counts.gene_ids());
        assert_eq!(normalized.sample_ids(), counts.sample_ids());
        assert_eq!(normalized.values()[[0, 0]], 0.0);
        assert!((normalized.values()[[1, 0]] - (1e6f64 + 1.0).log2()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_library_samples_named() {
        let counts = CountMatrix::new(
            array![[0.0, 1.0, 0.0], [0.0, 3.0, 0.0]],
            vec!["g1".into(), "g2".into()],
            vec!["s1".into(), "s2".into(), "s3".into()],
        )
        .unwrap();
        let err = NormalizedMatrix::with_scale(&counts, Scale::Cpm).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidCountMatrix { .. }));
        assert!(err.to_string().contains("s1, s3"));
    }

    #[test]
    fn test_cpm_scale() {
        let counts = CountMatrix::new(
            array![[1.0, 2.0], [3.0, 2.0]],
            vec!["g1".into(), "g2".into()],
            vec!["s1".into(), "s2".into()],
        )
        .unwrap();
        let cpm = NormalizedMatrix::with_scale(&counts, Scale::Cpm).unwrap();
        assert_eq!(cpm.values()[[0, 0]], 250_000.0);
        assert_eq!(cpm.values()[[1, 1]], 500_000.0);
    }
}
