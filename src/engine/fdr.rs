//! Multiple testing correction

/// Benjamini-Hochberg adjusted p-values.
///
/// Non-finite p-values are left out of the ranking and come back as NaN.
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    let mut ranked: Vec<usize> = (0..pvalues.len())
        .filter(|&i| pvalues[i].is_finite())
        .collect();
    let m = ranked.len();

    let mut padj = vec![f64::NAN; pvalues.len()];
    if m == 0 {
        return padj;
    }

    ranked.sort_by(|&a, &b| pvalues[a].total_cmp(&pvalues[b]));

    // walk from the largest p-value down, keeping the running minimum
    let mut cummin = f64::INFINITY;
    for (pos, &i) in ranked.iter().enumerate().rev() {
        let rank = (pos + 1) as f64;
        let adj = (pvalues[i] * m as f64 / rank).min(1.0);
        cummin = cummin.min(adj);
        padj[i] = cummin;
    }

    padj
}
