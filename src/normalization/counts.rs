//! Library-size normalized count transformations
//!
//! Provides CPM (Counts Per Million) and log2(CPM + 1), the transform used for
//! correlation and embeddings.

use ndarray::{Array2, ArrayView2, Axis};

/// Scale factor for counts-per-million
pub const PER_MILLION: f64 = 1e6;

/// Pseudocount added before the log transform
pub const LOG_PSEUDOCOUNT: f64 = 1.0;

/// Total counts per sample column
pub fn library_sizes(counts: ArrayView2<f64>) -> Vec<f64> {
    counts.axis_iter(Axis(1)).map(|col| col.sum()).collect()
}

/// Calculate Counts Per Million
///
/// CPM = counts * 1e6 / colSums(counts)
///
/// Every column must have a positive sum. A zero column is not special-cased
/// and yields NaN; callers are expected to reject such samples first.
pub fn counts_per_million(counts: ArrayView2<f64>) -> Array2<f64> {
    let lib_sizes = library_sizes(counts);
    let mut result = counts.to_owned();
    for (mut col, &lib_size) in result.axis_iter_mut(Axis(1)).zip(lib_sizes.iter()) {
        col.mapv_inplace(|x| x * PER_MILLION / lib_size);
    }
    result
}

/// Calculate log2(CPM + 1) element-wise
pub fn log_counts_per_million(counts: ArrayView2<f64>) -> Array2<f64> {
    counts_per_million(counts).mapv(|x| (x + LOG_PSEUDOCOUNT).log2())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cpm_columns_sum_to_million() {
        let counts = array![[100.0, 200.0], [300.0, 400.0]];
        let cpm = counts_per_million(counts.view());

        assert!((cpm[[0, 0]] - 250_000.0).abs() < 1e-6);
        assert!((cpm[[1, 1]] - 666_666.666_666).abs() < 1e-3);
        for col in cpm.axis_iter(Axis(1)) {
            assert!((col.sum() - PER_MILLION).abs() < 1e-6);
        }
    }

    #[test]
    fn test_log_cpm_inverts_to_cpm() {
        let counts = array![[5.0, 17.0, 2.0], [40.0, 3.0, 9.0], [1.0, 1.0, 30.0]];
        let cpm = counts_per_million(counts.view());
        let log_cpm = log_counts_per_million(counts.view());

        for (l, c) in log_cpm.iter().zip(cpm.iter()) {
            let recovered = 2f64.powf(*l) - 1.0;
            assert!((recovered - c).abs() / c < 1e-10);
        }
    }

    #[test]
    fn test_log_cpm_zero_count_is_zero() {
        let counts = array![[0.0, 10.0], [10.0, 10.0]];
        let log_cpm = log_counts_per_million(counts.view());
        assert_eq!(log_cpm[[0, 0]], 0.0);
        assert!(log_cpm.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_library_sizes() {
        let counts = array![[1.0, 2.0, 0.0], [3.0, 4.0, 0.0]];
        assert_eq!(library_sizes(counts.view()), vec![4.0, 6.0, 0.0]);
    }
}
