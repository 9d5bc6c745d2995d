//! Principal component analysis of samples

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array2, ArrayView2, Axis};

use super::EmbeddingEngine;
use crate::error::{AnalysisError, Result};

/// PCA through the eigen-decomposition of the centred sample Gram matrix.
///
/// Samples are few and genes many, so the n x n Gram matrix is the cheap
/// side to decompose. Scores are `u_k * sqrt(lambda_k)`; each component's
/// sign is fixed so that its largest-magnitude score is positive.
#[derive(Debug, Clone, Default)]
pub struct PcaEngine;

impl PcaEngine {
    pub fn new() -> Self {
        Self
    }
}

impl EmbeddingEngine for PcaEngine {
    fn name(&self) -> &str {
        "PCA"
    }

    fn axis_prefix(&self) -> &str {
        "PC"
    }

    fn embed(&self, data: ArrayView2<f64>, n_components: usize) -> Result<Array2<f64>> {
        let (n_samples, n_features) = data.dim();
        if n_samples < 2 || n_features == 0 {
            return Err(AnalysisError::engine(
                self.name(),
                format!("need at least 2 samples and 1 feature, got {} x {}", n_samples, n_features),
            ));
        }
        if n_components > n_samples {
            return Err(AnalysisError::engine(
                self.name(),
                format!("{} components requested from {} samples", n_components, n_samples),
            ));
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(AnalysisError::engine(self.name(), "input contains non-finite values"));
        }

        let means = data.mean_axis(Axis(0)).ok_or_else(|| {
            AnalysisError::engine(self.name(), "cannot centre an empty matrix")
        })?;
        let centred = &data - &means;

        let gram = centred.dot(&centred.t());
        let gram = DMatrix::from_fn(n_samples, n_samples, |i, j| gram[[i, j]]);
        let eigen = SymmetricEigen::new(gram);

        let mut order: Vec<usize> = (0..n_samples).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let mut scores = Array2::zeros((n_samples, n_components));
        for (k, &idx) in order.iter().take(n_components).enumerate() {
            let scale = eigen.eigenvalues[idx].max(0.0).sqrt();
            let vector = eigen.eigenvectors.column(idx);

            let pivot = vector
                .iter()
                .copied()
                .fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
            let sign = if pivot < 0.0 { -1.0 } else { 1.0 };

            for i in 0..n_samples {
                scores[[i, k]] = sign * vector[i] * scale;
            }
        }

        log::debug!(
            "PCA on {} samples x {} features, top eigenvalues: {:?}",
            n_samples,
            n_features,
            order
                .iter()
                .take(n_components)
                .map(|&i| eigen.eigenvalues[i])
                .collect::<Vec<_>>()
        );

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pca_shape_and_centering() {
        let data = array![
            [1.0, 2.0, 3.0],
            [2.0, 4.0, 1.0],
            [5.0, 1.0, 0.0],
            [0.0, 3.0, 7.0],
        ];
        let scores = PcaEngine::new().embed(data.view(), 2).unwrap();
        assert_eq!(scores.dim(), (4, 2));
        for col in scores.axis_iter(Axis(1)) {
            assert!(col.sum().abs() < 1e-9);
        }
    }

    #[test]
    fn test_pca_recovers_single_axis() {
        // points on a line: all variance on PC1
        let data = array![[0.0, 0.0], [1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
        let scores = PcaEngine::new().embed(data.view(), 2).unwrap();

        let pc1: Vec<f64> = scores.column(0).to_vec();
        let spread = pc1[3] - pc1[0];
        assert!((spread.abs() - 45f64.sqrt()).abs() < 1e-9);
        assert!(scores.column(1).iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_pca_total_variance_preserved() {
        let data = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [3.0, 2.0]];
        let scores = PcaEngine::new().embed(data.view(), 2).unwrap();

        let centred = &data - &data.mean_axis(Axis(0)).unwrap();
        let total: f64 = centred.iter().map(|v| v * v).sum();
        let captured: f64 = scores.iter().map(|v| v * v).sum();
        assert!((total - captured).abs() < 1e-9);
    }

    #[test]
    fn test_pca_deterministic_sign() {
        let data = array![[1.0, 5.0], [2.0, 3.0], [9.0, 1.0]];
        let scores = PcaEngine::new().embed(data.view(), 2).unwrap();
        for col in scores.axis_iter(Axis(1)) {
            let pivot = col.iter().copied().fold(0.0_f64, |a, v| if v.abs() > a.abs() { v } else { a });
            assert!(pivot >= 0.0);
        }
    }

    #[test]
    fn test_pca_too_few_samples() {
        let data = array![[1.0, 2.0, 3.0]];
        assert!(PcaEngine::new().embed(data.view(), 2).is_err());
    }
}
