//! Sample-by-factor design matrix

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{AnalysisError, Result};

/// One categorical factor column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    pub values: Vec<String>,
}

/// Sample metadata: one row per sample, one categorical column per factor.
/// Factor columns keep the order in which they were added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignMatrix {
    sample_ids: Vec<String>,
    factors: Vec<Factor>,
}

impl DesignMatrix {
    /// Create a design with no factors; sample IDs must be unique
    pub fn new(sample_ids: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(dup) = sample_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(AnalysisError::parse(format!(
                "duplicate sample '{}' in design matrix",
                dup
            )));
        }
        Ok(Self {
            sample_ids,
            factors: Vec::new(),
        })
    }

    /// Add a factor column (categorical)
    pub fn add_factor(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.sample_ids.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: format!("{} values", self.sample_ids.len()),
                got: format!("{} values", values.len()),
            });
        }
        if self.has_factor(name) {
            return Err(AnalysisError::parse(format!(
                "duplicate factor column '{}' in design matrix",
                name
            )));
        }
        self.factors.push(Factor {
            name: name.to_string(),
            values,
        });
        Ok(())
    }

    pub fn has_factor(&self, name: &str) -> bool {
        self.factors.iter().any(|f| f.name == name)
    }

    /// Get values of a factor column
    pub fn factor(&self, name: &str) -> Option<&[String]> {
        self.factors
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.values.as_slice())
    }

    /// Factor names in column order
    pub fn factor_names(&self) -> Vec<&str> {
        self.factors.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    pub fn n_factors(&self) -> usize {
        self.factors.len()
    }

    /// Distinct levels of a factor, in the order they are first seen
    pub fn levels(&self, name: &str) -> Option<Vec<String>> {
        self.factor(name).map(|values| {
            let mut seen = HashSet::new();
            values
                .iter()
                .filter(|v| seen.insert(v.as_str()))
                .cloned()
                .collect()
        })
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample_id)
    }

    /// Subset (and reorder) to specific samples
    pub fn subset(&self, sample_indices: &[usize]) -> Result<Self> {
        if let Some(&i) = sample_indices.iter().find(|&&i| i >= self.n_samples()) {
            return Err(AnalysisError::InvalidInput {
                reason: format!("sample index {} out of range for {} samples", i, self.n_samples()),
            });
        }
        let new_ids: Vec<String> = sample_indices
            .iter()
            .map(|&i| self.sample_ids[i].clone())
            .collect();

        let mut new_design = DesignMatrix::new(new_ids)?;
        for factor in &self.factors {
            let values = sample_indices
                .iter()
                .map(|&i| factor.values[i].clone())
                .collect();
            new_design.add_factor(&factor.name, values)?;
        }
        Ok(new_design)
    }

    /// Reorder rows to follow `sample_ids`; every ID must be present
    pub fn aligned_to(&self, sample_ids: &[String]) -> Result<Self> {
        let indices = sample_ids
            .iter()
            .map(|id| {
                self.sample_index(id).ok_or_else(|| AnalysisError::InvalidInput {
                    reason: format!("sample '{}' not found in design matrix", id),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.subset(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn design() -> DesignMatrix {
        let mut design = DesignMatrix::new(strings(&["s1", "s2", "s3", "s4"])).unwrap();
        design
            .add_factor("treatment", strings(&["treated", "control", "treated", "control"]))
            .unwrap();
        design
    }

    #[test]
    fn test_levels_in_discovery_order() {
        let design = design();
        assert_eq!(design.levels("treatment").unwrap(), vec!["treated", "control"]);
    }

    #[test]
    fn test_duplicate_samples_rejected() {
        assert!(DesignMatrix::new(strings(&["s1", "s1"])).is_err());
    }

    #[test]
    fn test_aligned_to() {
        let aligned = design().aligned_to(&strings(&["s4", "s1"])).unwrap();
        assert_eq!(aligned.sample_ids(), &strings(&["s4", "s1"])[..]);
        assert_eq!(aligned.factor("treatment").unwrap(), &strings(&["control", "treated"])[..]);
    }

    #[test]
    fn test_subset_out_of_range() {
        let err = design().subset(&[0, 4]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
        assert_eq!(design().subset(&[3]).unwrap().sample_ids(), &strings(&["s4"])[..]);
    }
}
