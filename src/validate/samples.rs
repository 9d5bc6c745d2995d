//! Sample-name compatibility between count table and design

use std::collections::HashSet;

use crate::data::{CountMatrix, DesignMatrix};
use crate::error::{AnalysisError, Result};

/// Count table and design restricted to a shared, aligned sample set
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub counts: CountMatrix,
    /// Design rows in the column order of `counts`
    pub design: DesignMatrix,
    /// Count-table samples absent from the design, in column order
    pub removed: Vec<String>,
    pub message: String,
}

/// Reconcile sample names.
///
/// Design samples missing from the count table make the design unsatisfiable
/// and fail with `Incompatibility`. Count-table samples missing from the
/// design are dropped. The design is reordered to the count column order.
pub fn reconcile_samples(counts: &CountMatrix, design: &DesignMatrix) -> Result<Reconciled> {
    let data_samples: HashSet<&str> = counts.sample_ids().iter().map(|s| s.as_str()).collect();
    let design_samples: HashSet<&str> = design.sample_ids().iter().map(|s| s.as_str()).collect();

    let missing_in_data: Vec<String> = design
        .sample_ids()
        .iter()
        .filter(|s| !data_samples.contains(s.as_str()))
        .cloned()
        .collect();
    if !missing_in_data.is_empty() {
        return Err(AnalysisError::Incompatibility { missing_in_data });
    }

    let (keep, removed): (Vec<usize>, Vec<usize>) = (0..counts.n_samples())
        .partition(|&j| design_samples.contains(counts.sample_ids()[j].as_str()));
    let removed: Vec<String> = removed
        .iter()
        .map(|&j| counts.sample_ids()[j].clone())
        .collect();

    let counts = if removed.is_empty() {
        counts.clone()
    } else {
        counts.subset_samples(&keep)?
    };
    let design = design.aligned_to(counts.sample_ids())?;

    let message = if removed.is_empty() {
        "Sample names in data and design matrix are compatible.".to_string()
    } else {
        format!(
            "Removed {} samples present in data but not in design: {}.",
            removed.len(),
            removed.join(", ")
        )
    };

    Ok(Reconciled {
        counts,
        design,
        removed,
        message,
    })
}
