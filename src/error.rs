//! Error types for rnaseq_eda

use thiserror::Error;

use crate::data::AnalysisReport;

/// Main error type for validation, contrast resolution and engine hand-off
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Parse error: {reason}")]
    Parse { reason: String },

    #[error(
        "Incompatible sample names: samples in design but not in data: {}",
        .missing_in_data.join(", ")
    )]
    Incompatibility { missing_in_data: Vec<String> },

    #[error("Invalid count matrix: {reason}")]
    InvalidCountMatrix { reason: String },

    #[error("Invalid contrast specification: {reason}")]
    InvalidContrast { reason: String },

    #[error(
        "Ambiguous contrast: factor '{factor}' has {} levels ({}); specify tested and control levels explicitly",
        .levels.len(),
        .levels.join(", ")
    )]
    AmbiguousContrast { factor: String, levels: Vec<String> },

    #[error("Empty result: {reason}")]
    EmptyResult { reason: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("{engine} engine failed: {reason}")]
    EngineFailed { engine: String, reason: String },

    #[error("Cannot {operation} while analysis is {state}")]
    InvalidState { operation: String, state: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Shorthand for a parse failure
    pub fn parse(reason: impl Into<String>) -> Self {
        AnalysisError::Parse {
            reason: reason.into(),
        }
    }

    /// Shorthand for an engine failure
    pub fn engine(engine: &str, reason: impl Into<String>) -> Self {
        AnalysisError::EngineFailed {
            engine: engine.to_string(),
            reason: reason.into(),
        }
    }
}

/// A failed run together with the diagnostics gathered before the failure
#[derive(Error, Debug)]
#[error("{error}")]
pub struct PipelineFailure {
    #[source]
    pub error: AnalysisError,
    pub report: AnalysisReport,
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_message_names_levels() {
        let err = AnalysisError::AmbiguousContrast {
            factor: "condition".to_string(),
            levels: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("3 levels"));
        assert!(msg.contains("a, b, c"));
    }

    #[test]
    fn test_incompatibility_lists_samples() {
        let err = AnalysisError::Incompatibility {
            missing_in_data: vec!["S9".to_string()],
        };
        assert!(err.to_string().contains("S9"));
    }
}
