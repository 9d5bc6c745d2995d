//! Seams to the numerically heavy engines
//!
//! Embedding (PCA, UMAP) and differential expression engines are consumed as
//! black boxes through these traits. Built-in implementations: [`PcaEngine`]
//! and [`TTestEngine`]. No UMAP implementation ships with the crate; one can be
//! plugged in through [`EmbeddingEngine`].

mod fdr;
mod pca;
mod ttest;

pub use fdr::benjamini_hochberg;
pub use pca::PcaEngine;
pub use ttest::{TTestEngine, TTestParams};

use ndarray::{Array2, ArrayView2};

use crate::contrast::Contrast;
use crate::data::{CountMatrix, DesignMatrix};
use crate::error::Result;
use crate::io::RawDgeTable;

/// Projects samples into a low-dimensional space
pub trait EmbeddingEngine {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Prefix for coordinate column names (`PC` gives `PC1`, `PC2`, ...)
    fn axis_prefix(&self) -> &str;

    /// Embed `data` (samples x features), returning samples x `n_components`
    fn embed(&self, data: ArrayView2<f64>, n_components: usize) -> Result<Array2<f64>>;
}

/// Computes per-gene differential expression statistics for one contrast.
///
/// Receives the raw (non-normalized) count matrix and a design whose rows
/// match its columns. Output may contain missing, infinite or non-numeric
/// values; it is sanitized before use.
pub trait DgeEngine {
    fn name(&self) -> &str;

    fn run(
        &self,
        counts: &CountMatrix,
        design: &DesignMatrix,
        contrast: &Contrast,
    ) -> Result<RawDgeTable>;
}

/// The embedding engines used by one exploratory run
pub struct EmbeddingEngines {
    pub pca: Box<dyn EmbeddingEngine>,
    pub umap: Option<Box<dyn EmbeddingEngine>>,
}

impl Default for EmbeddingEngines {
    fn default() -> Self {
        Self {
            pca: Box::new(PcaEngine::new()),
            umap: None,
        }
    }
}
