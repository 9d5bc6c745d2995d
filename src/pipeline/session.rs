//! Analysis session state machine

use std::fmt;

use crate::contrast::{resolve_contrast, ContrastSpec};
use crate::data::{AnalysisReport, DesignMatrix, Factor, RawTable, ReportBuilder, ReportStage};
use crate::engine::{DgeEngine, EmbeddingEngine, EmbeddingEngines};
use crate::error::{AnalysisError, PipelineFailure, Result};
use crate::sanitize::sanitize_results;
use crate::stats::column_correlation;
use crate::validate::{validate, ValidatedData, ValidationParams};

use super::artifacts::{
    DgeRun, EmbeddingArtifacts, EmbeddingParams, EmbeddingTable, LibrarySizes, NormalizedMatrix,
    SampleCorrelation,
};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Validating,
    Normalized,
    EmbeddingReady,
    DgeReady,
    Done,
    Failed,
}

impl AnalysisState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisState::Done | AnalysisState::Failed)
    }

    /// Validated and normalized data is available
    fn has_data(&self) -> bool {
        matches!(
            self,
            AnalysisState::Normalized | AnalysisState::EmbeddingReady | AnalysisState::DgeReady
        )
    }
}

impl fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisState::Idle => "idle",
            AnalysisState::Validating => "validating",
            AnalysisState::Normalized => "normalized",
            AnalysisState::EmbeddingReady => "embedding-ready",
            AnalysisState::DgeReady => "dge-ready",
            AnalysisState::Done => "done",
            AnalysisState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Configuration for one session
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub validation: ValidationParams,
    pub embedding: EmbeddingParams,
}

/// One analysis request: owns its tables, report and artifacts.
///
/// Validation and normalization run once; embeddings and differential
/// expression runs reuse the cached tables and may be repeated, e.g. with a
/// new contrast.
#[derive(Debug)]
pub struct AnalysisSession {
    config: SessionConfig,
    state: AnalysisState,
    data: Option<ValidatedData>,
    normalized: Option<NormalizedMatrix>,
    report: AnalysisReport,
    embeddings: Option<EmbeddingArtifacts>,
    dge: Option<DgeRun>,
}

impl AnalysisSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: AnalysisState::Idle,
            data: None,
            normalized: None,
            report: AnalysisReport::default(),
            embeddings: None,
            dge: None,
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    /// Validation and normalization diagnostics
    pub fn report(&self) -> &AnalysisReport {
        &self.report
    }

    pub fn data(&self) -> Option<&ValidatedData> {
        self.data.as_ref()
    }

    pub fn normalized(&self) -> Option<&NormalizedMatrix> {
        self.normalized.as_ref()
    }

    pub fn embeddings(&self) -> Option<&EmbeddingArtifacts> {
        self.embeddings.as_ref()
    }

    pub fn dge(&self) -> Option<&DgeRun> {
        self.dge.as_ref()
    }

    fn invalid_state(&self, operation: &str) -> AnalysisError {
        AnalysisError::InvalidState {
            operation: operation.to_string(),
            state: self.state.to_string(),
        }
    }

    fn fail(&mut self, error: AnalysisError) -> AnalysisError {
        log::error!("Analysis failed: {}", error);
        self.state = AnalysisState::Failed;
        error
    }

    /// Validate both tables and cache the normalized counts.
    ///
    /// On failure the session moves to `Failed` and the partial report comes
    /// back with the error.
    pub fn validate(
        &mut self,
        counts: &RawTable,
        design: &DesignMatrix,
    ) -> std::result::Result<&AnalysisReport, PipelineFailure> {
        if self.state != AnalysisState::Idle {
            let error = self.invalid_state("validate");
            return Err(abort(ReportBuilder::new(), ReportStage::Ingestion, error));
        }

        self.state = AnalysisState::Validating;
        let mut report = ReportBuilder::new();

        let outcome = validate(counts, design, &self.config.validation, &mut report).and_then(|data| {
            let normalized = normalize(&data, &mut report)?;
            Ok((data, normalized))
        });

        match outcome {
            Ok((data, normalized)) => {
                self.report = report.finish();
                self.data = Some(data);
                self.normalized = Some(normalized);
                self.state = AnalysisState::Normalized;
                Ok(&self.report)
            }
            Err(error) => {
                let error = self.fail(error);
                self.report = report.finish();
                Err(PipelineFailure {
                    error,
                    report: self.report.clone(),
                })
            }
        }
    }

    /// Library sizes, PCA, optional UMAP and sample correlation from the
    /// cached log-CPM table.
    ///
    /// An unknown colour factor leaves the session where it was; engine
    /// failures are fatal. Either way the run's report comes back with the
    /// error.
    pub fn compute_embeddings(
        &mut self,
        engines: &EmbeddingEngines,
    ) -> std::result::Result<&EmbeddingArtifacts, PipelineFailure> {
        let mut report = ReportBuilder::new();
        let (data, normalized) = match (&self.data, &self.normalized) {
            (Some(data), Some(normalized)) if self.state.has_data() => (data, normalized),
            _ => {
                let error = self.invalid_state("compute embeddings");
                return Err(abort(report, ReportStage::Embedding, error));
            }
        };

        let annotation = match color_factor(&data.design, self.config.embedding.color_by.as_deref()) {
            Ok(annotation) => annotation,
            Err(e) => return Err(abort(report, ReportStage::Embedding, e)),
        };
        let n_components = self.config.embedding.n_components;

        let library_sizes = LibrarySizes {
            sample_ids: data.counts.sample_ids().to_vec(),
            totals: data.counts.library_sizes(),
            annotation: annotation.clone(),
        };

        let pca = match embed(engines.pca.as_ref(), normalized, n_components, &annotation) {
            Ok(table) => table,
            Err(e) => {
                let error = self.fail(e);
                return Err(abort(report, ReportStage::Embedding, error));
            }
        };
        report.info(
            ReportStage::Embedding,
            format!("{} computed on {} samples.", pca.method, pca.n_samples()),
        );

        let umap = match &engines.umap {
            Some(engine) => match embed(engine.as_ref(), normalized, n_components, &annotation) {
                Ok(table) => {
                    report.info(
                        ReportStage::Embedding,
                        format!("{} computed on {} samples.", table.method, table.n_samples()),
                    );
                    Some(table)
                }
                Err(e) => {
                    let error = self.fail(e);
                    return Err(abort(report, ReportStage::Embedding, error));
                }
            },
            None => {
                report.info(ReportStage::Embedding, "UMAP engine not configured; skipped.");
                None
            }
        };

        let correlation = SampleCorrelation {
            sample_ids: normalized.sample_ids().to_vec(),
            values: column_correlation(normalized.values()),
        };

        self.state = AnalysisState::EmbeddingReady;
        Ok(self.embeddings.insert(EmbeddingArtifacts {
            library_sizes,
            pca,
            umap,
            correlation,
            report: report.finish(),
        }))
    }

    /// Resolve a contrast, hand the raw counts to `engine` and sanitize its
    /// output. A new call replaces the previous run.
    ///
    /// Contrast errors and an all-filtered result leave the session where it
    /// was so another contrast can be tried; engine failures are fatal. The
    /// failure is recorded in the run's report, which is returned with it.
    pub fn run_dge(
        &mut self,
        engine: &dyn DgeEngine,
        spec: &ContrastSpec,
    ) -> std::result::Result<&DgeRun, PipelineFailure> {
        let mut report = ReportBuilder::new();
        let data = match &self.data {
            Some(data) if self.state.has_data() => data,
            _ => {
                let error = self.invalid_state("run differential expression");
                return Err(abort(report, ReportStage::Contrast, error));
            }
        };

        let contrast = match resolve_contrast(&data.design, spec) {
            Ok(contrast) => contrast,
            Err(e) => return Err(abort(report, ReportStage::Contrast, e)),
        };
        report.info(ReportStage::Contrast, format!("Contrast resolved: {}.", contrast));

        let raw = match engine.run(&data.counts, &data.design, &contrast) {
            Ok(raw) => raw,
            Err(e) => {
                let error = self.fail(e);
                return Err(abort(report, ReportStage::DifferentialExpression, error));
            }
        };
        report.info(
            ReportStage::DifferentialExpression,
            format!("{} engine returned {} rows.", engine.name(), raw.n_rows()),
        );

        let (results, summary) = match sanitize_results(&raw, &contrast) {
            Ok(sanitized) => sanitized,
            Err(e @ AnalysisError::EmptyResult { .. }) => {
                return Err(abort(report, ReportStage::Sanitization, e))
            }
            Err(e) => {
                let error = self.fail(e);
                return Err(abort(report, ReportStage::Sanitization, error));
            }
        };
        if summary.dropped() > 0 {
            report.warn(ReportStage::Sanitization, summary.message());
        } else {
            report.info(ReportStage::Sanitization, summary.message());
        }

        self.state = AnalysisState::DgeReady;
        Ok(self.dge.insert(DgeRun {
            contrast,
            engine: engine.name().to_string(),
            results,
            sanitize: summary,
            report: report.finish(),
        }))
    }

    /// Mark the session complete; artifacts stay readable
    pub fn finish(&mut self) -> Result<()> {
        match self.state {
            AnalysisState::EmbeddingReady | AnalysisState::DgeReady => {
                self.state = AnalysisState::Done;
                Ok(())
            }
            _ => Err(self.invalid_state("finish")),
        }
    }
}

/// Record `error` at `stage` and freeze the run's report alongside it
fn abort(mut report: ReportBuilder, stage: ReportStage, error: AnalysisError) -> PipelineFailure {
    report.warn(stage, format!("{} failed: {}", stage, error));
    PipelineFailure {
        error,
        report: report.finish(),
    }
}

/// Compute log-CPM once; zero-library samples are rejected
fn normalize(data: &ValidatedData, report: &mut ReportBuilder) -> Result<NormalizedMatrix> {
    let normalized = NormalizedMatrix::from_counts(&data.counts)?;
    report.info(
        ReportStage::Normalization,
        format!(
            "Normalized {} genes x {} samples to log2(CPM + 1).",
            data.counts.n_genes(),
            data.counts.n_samples()
        ),
    );
    Ok(normalized)
}

/// The factor used to annotate embeddings, if the design has any
fn color_factor(design: &DesignMatrix, color_by: Option<&str>) -> Result<Option<Factor>> {
    let factor = match color_by {
        Some(name) => design
            .factors()
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| AnalysisError::InvalidInput {
                reason: format!("colour factor '{}' not in design matrix", name),
            })?,
        None => match design.factors().first() {
            Some(factor) => factor,
            None => return Ok(None),
        },
    };
    Ok(Some(factor.clone()))
}

fn embed(
    engine: &dyn EmbeddingEngine,
    normalized: &NormalizedMatrix,
    n_components: usize,
    annotation: &Option<Factor>,
) -> Result<EmbeddingTable> {
    let samples_by_genes = normalized.values().reversed_axes();
    let coords = engine.embed(samples_by_genes, n_components)?;
    if coords.dim() != (normalized.sample_ids().len(), n_components) {
        return Err(AnalysisError::engine(
            engine.name(),
            format!(
                "returned {:?} coordinates, expected {} x {}",
                coords.dim(),
                normalized.sample_ids().len(),
                n_components
            ),
        ));
    }

    Ok(EmbeddingTable {
        method: engine.name().to_string(),
        sample_ids: normalized.sample_ids().to_vec(),
        axis_names: (1..=n_components)
            .map(|k| format!("{}{}", engine.axis_prefix(), k))
            .collect(),
        coords,
        annotation: annotation.clone(),
    })
}
