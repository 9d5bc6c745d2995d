//! Resolution of the two-level comparison tested against control
//!
//! Automatic resolution on a single two-level factor takes the level seen
//! second in the design as *tested* and the level seen first as *control*.
//! This is a fixed convention; swapping the two levels flips the sign of every
//! log fold change, so pass an explicit contrast whenever the order matters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::DesignMatrix;
use crate::error::{AnalysisError, Result};

/// A resolved comparison: `tested` vs `control` levels of `factor`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contrast {
    /// Design column holding the levels (e.g., "condition")
    pub factor: String,
    /// Numerator level (e.g., "treated")
    pub tested: String,
    /// Denominator level (e.g., "control")
    pub control: String,
}

impl Contrast {
    pub fn new(factor: &str, tested: &str, control: &str) -> Self {
        Self {
            factor: factor.to_string(),
            tested: tested.to_string(),
            control: control.to_string(),
        }
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} vs {}", self.factor, self.tested, self.control)
    }
}

/// How the contrast should be obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContrastSpec {
    /// Caller names factor and both levels
    Explicit {
        factor: String,
        tested: String,
        control: String,
    },
    /// Derive from a single-factor, two-level design
    Automatic,
}

impl ContrastSpec {
    /// Create an explicit contrast
    pub fn explicit(factor: &str, tested: &str, control: &str) -> Self {
        ContrastSpec::Explicit {
            factor: factor.to_string(),
            tested: tested.to_string(),
            control: control.to_string(),
        }
    }
}

/// Resolve a contrast against the design
pub fn resolve_contrast(design: &DesignMatrix, spec: &ContrastSpec) -> Result<Contrast> {
    match spec {
        ContrastSpec::Explicit {
            factor,
            tested,
            control,
        } => resolve_explicit(design, factor, tested, control),
        ContrastSpec::Automatic => resolve_automatic(design),
    }
}

fn resolve_explicit(
    design: &DesignMatrix,
    factor: &str,
    tested: &str,
    control: &str,
) -> Result<Contrast> {
    let levels = design.levels(factor).ok_or_else(|| AnalysisError::InvalidContrast {
        reason: format!(
            "factor '{}' not found in design matrix (available: {})",
            factor,
            design.factor_names().join(", ")
        ),
    })?;

    if tested == control {
        return Err(AnalysisError::InvalidContrast {
            reason: format!("tested and control levels are both '{}'", tested),
        });
    }

    for level in [tested, control] {
        if !levels.iter().any(|l| l == level) {
            return Err(AnalysisError::InvalidContrast {
                reason: format!(
                    "level '{}' does not exist in factor '{}'. Available levels: {}",
                    level,
                    factor,
                    levels.join(", ")
                ),
            });
        }
    }

    Ok(Contrast::new(factor, tested, control))
}

fn resolve_automatic(design: &DesignMatrix) -> Result<Contrast> {
    let names = design.factor_names();
    if names.len() != 1 {
        return Err(AnalysisError::InvalidContrast {
            reason: format!(
                "automatic contrast needs a single-factor design, found {} factors ({})",
                names.len(),
                names.join(", ")
            ),
        });
    }

    let factor = names[0];
    let levels = design.levels(factor).unwrap_or_default();
    match levels.len() {
        2 => {
            let contrast = Contrast::new(factor, &levels[1], &levels[0]);
            log::info!(
                "Automatic contrast {} (second-seen level tested against first-seen)",
                contrast
            );
            Ok(contrast)
        }
        n if n > 2 => Err(AnalysisError::AmbiguousContrast {
            factor: factor.to_string(),
            levels,
        }),
        _ => Err(AnalysisError::InvalidContrast {
            reason: format!(
                "factor '{}' has a single level ({}); nothing to compare",
                factor,
                levels.join(", ")
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design(factors: &[(&str, &[&str])]) -> DesignMatrix {
        let n = factors[0].1.len();
        let mut design = DesignMatrix::new((1..=n).map(|i| format!("S{}", i)).collect()).unwrap();
        for (name, values) in factors {
            design
                .add_factor(name, values.iter().map(|s| s.to_string()).collect())
                .unwrap();
        }
        design
    }

    #[test]
    fn test_automatic_two_levels() {
        let d = design(&[("factor", &["control", "control", "treated", "treated"])]);
        let contrast = resolve_contrast(&d, &ContrastSpec::Automatic).unwrap();
        assert_eq!(contrast, Contrast::new("factor", "treated", "control"));
    }

    #[test]
    fn test_automatic_follows_discovery_order_not_alphabet() {
        let d = design(&[("condition", &["wt", "ko", "wt", "ko"])]);
        let contrast = resolve_contrast(&d, &ContrastSpec::Automatic).unwrap();
        assert_eq!(contrast.tested, "ko");
        assert_eq!(contrast.control, "wt");
    }

    #[test]
    fn test_automatic_three_levels_ambiguous() {
        let d = design(&[("condition", &["a", "b", "c", "a"])]);
        match resolve_contrast(&d, &ContrastSpec::Automatic).unwrap_err() {
            AnalysisError::AmbiguousContrast { factor, levels } => {
                assert_eq!(factor, "condition");
                assert_eq!(levels, vec!["a", "b", "c"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_automatic_multi_factor_rejected() {
        let d = design(&[("condition", &["a", "b"]), ("batch", &["x", "y"])]);
        assert!(matches!(
            resolve_contrast(&d, &ContrastSpec::Automatic),
            Err(AnalysisError::InvalidContrast { .. })
        ));
    }

    #[test]
    fn test_explicit_contrast() {
        let d = design(&[("condition", &["a", "b", "c"]), ("batch", &["x", "y", "x"])]);
        let spec = ContrastSpec::explicit("condition", "c", "a");
        assert_eq!(resolve_contrast(&d, &spec).unwrap(), Contrast::new("condition", "c", "a"));
    }

    #[test]
    fn test_explicit_missing_level() {
        let d = design(&[("condition", &["a", "b"])]);
        let err = resolve_contrast(&d, &ContrastSpec::explicit("condition", "z", "a")).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidContrast { .. }));
        assert!(err.to_string().contains("'z'"));
    }

    #[test]
    fn test_explicit_same_level_rejected() {
        let d = design(&[("condition", &["a", "b"])]);
        assert!(resolve_contrast(&d, &ContrastSpec::explicit("condition", "a", "a")).is_err());
    }

    #[test]
    fn test_explicit_unknown_factor() {
        let d = design(&[("condition", &["a", "b"])]);
        assert!(resolve_contrast(&d, &ContrastSpec::explicit("batch", "a", "b")).is_err());
    }
}
