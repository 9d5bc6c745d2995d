//! Ordered diagnostics gathered while a run validates and prepares its data

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage that produced a report entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStage {
    Ingestion,
    Orientation,
    NumericColumns,
    UnlabeledRows,
    Deduplication,
    SampleReconciliation,
    Normalization,
    Embedding,
    Contrast,
    DifferentialExpression,
    Sanitization,
}

impl fmt::Display for ReportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportStage::Ingestion => "ingestion",
            ReportStage::Orientation => "orientation",
            ReportStage::NumericColumns => "numeric columns",
            ReportStage::UnlabeledRows => "unlabeled rows",
            ReportStage::Deduplication => "deduplication",
            ReportStage::SampleReconciliation => "sample reconciliation",
            ReportStage::Normalization => "normalization",
            ReportStage::Embedding => "embedding",
            ReportStage::Contrast => "contrast",
            ReportStage::DifferentialExpression => "differential expression",
            ReportStage::Sanitization => "sanitization",
        };
        f.write_str(name)
    }
}

/// One human-readable diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub stage: ReportStage,
    pub message: String,
}

/// Messages accumulate in a `ReportBuilder` during a run and are frozen into
/// an `AnalysisReport`, which exposes no way to change them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    entries: Vec<ReportEntry>,
}

impl AnalysisReport {
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Messages in the order they were recorded
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "[{}] {}", entry.stage, entry.message)?;
        }
        Ok(())
    }
}

/// Append-only collector for report entries; every entry is also logged
#[derive(Debug, Default)]
pub struct ReportBuilder {
    entries: Vec<ReportEntry>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an informational message
    pub fn info(&mut self, stage: ReportStage, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.entries.push(ReportEntry { stage, message });
    }

    /// Record a correction or failure
    pub fn warn(&mut self, stage: ReportStage, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.entries.push(ReportEntry { stage, message });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> AnalysisReport {
        AnalysisReport {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_preserves_order() {
        let mut builder = ReportBuilder::new();
        builder.info(ReportStage::Orientation, "first");
        builder.warn(ReportStage::UnlabeledRows, "second");
        builder.info(ReportStage::Deduplication, "third");

        let report = builder.finish();
        assert_eq!(report.messages(), vec!["first", "second", "third"]);
        assert_eq!(report.entries()[1].stage, ReportStage::UnlabeledRows);
        assert!(report.to_string().starts_with("[orientation] first"));
    }

    #[test]
    fn test_report_serializes() {
        let mut builder = ReportBuilder::new();
        builder.info(ReportStage::SampleReconciliation, "compatible");
        let json = serde_json::to_string(&builder.finish()).unwrap();
        assert!(json.contains("sample_reconciliation"));
    }
}
