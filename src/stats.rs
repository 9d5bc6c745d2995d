//! Statistical utility functions shared across modules
//!
//! Plain mean/variance helpers and the sample correlation matrix used for
//! exploratory summaries.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// Arithmetic mean; NaN for an empty slice
pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    x.iter().sum::<f64>() / x.len() as f64
}

/// Unbiased sample variance (n - 1 denominator); NaN with fewer than two values
pub fn sample_variance(x: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(x);
    x.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Pearson correlation of two equally long vectors.
/// NaN when either vector is constant.
pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len();
    if n != y.len() || n < 2 {
        return f64::NAN;
    }
    let mx = x.sum() / n as f64;
    let my = y.sum() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx * syy).sqrt()
}

/// Pairwise Pearson correlation between the columns of `data`
pub fn column_correlation(data: ArrayView2<f64>) -> Array2<f64> {
    let n = data.len_of(Axis(1));
    let mut corr = Array2::from_elem((n, n), f64::NAN);
    for i in 0..n {
        for j in i..n {
            let r = pearson(data.column(i), data.column(j));
            corr[[i, j]] = r;
            corr[[j, i]] = r;
        }
    }
    corr
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mean_and_variance() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!((mean(&x) - 2.5).abs() < 1e-12);
        assert!((sample_variance(&x) - 5.0 / 3.0).abs() < 1e-12);
        assert!(sample_variance(&[1.0]).is_nan());
    }

    #[test]
    fn test_pearson_perfect() {
        let x = array![1.0, 2.0, 3.0];
        let y = array![2.0, 4.0, 6.0];
        let z = array![3.0, 2.0, 1.0];
        assert!((pearson(x.view(), y.view()) - 1.0).abs() < 1e-12);
        assert!((pearson(x.view(), z.view()) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_constant_is_nan() {
        let x = array![1.0, 1.0, 1.0];
        let y = array![1.0, 2.0, 3.0];
        assert!(pearson(x.view(), y.view()).is_nan());
    }

    #[test]
    fn test_column_correlation_symmetric() {
        let data = array![[1.0, 2.0, 5.0], [2.0, 4.0, 1.0], [3.0, 7.0, 2.0]];
        let corr = column_correlation(data.view());
        for i in 0..3 {
            assert!((corr[[i, i]] - 1.0).abs() < 1e-12);
            for j in 0..3 {
                assert_eq!(corr[[i, j]], corr[[j, i]]);
            }
        }
    }
}
