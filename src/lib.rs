//! rnaseq_eda: validation, exploratory analysis and differential expression
//! for RNA-seq count matrices
//!
//! Uploaded count and design tables are parsed, checked and cleaned, then
//! normalized to log2(CPM + 1) for PCA, UMAP and sample correlation. On
//! request a differential expression engine is run for one contrast and its
//! output is sanitized before use.
//!
//! # Example
//!
//! ```ignore
//! use rnaseq_eda::prelude::*;
//!
//! let table = read_count_table("counts.csv", Some("gene_id"))?;
//! let design = read_design("design.csv", &DesignOptions::default())?;
//!
//! let mut session = AnalysisSession::new(SessionConfig::default());
//! session.validate(&table, &design)?;
//!
//! let artifacts = session.compute_embeddings(&EmbeddingEngines::default())?;
//! let run = session.run_dge(&TTestEngine::default(), &ContrastSpec::Automatic)?;
//! ```

pub mod cli;
pub mod contrast;
pub mod data;
pub mod engine;
pub mod error;
pub mod io;
pub mod normalization;
pub mod pipeline;
pub mod sanitize;
pub mod stats;
pub mod validate;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::contrast::{resolve_contrast, Contrast, ContrastSpec};
    pub use crate::data::{
        AnalysisReport, Cell, CountMatrix, DesignMatrix, Factor, RawTable, ReportBuilder,
        ReportStage,
    };
    pub use crate::engine::{
        benjamini_hochberg, DgeEngine, EmbeddingEngine, EmbeddingEngines, PcaEngine, TTestEngine,
        TTestParams,
    };
    pub use crate::error::{AnalysisError, PipelineFailure, Result};
    pub use crate::io::{
        parse_design, parse_table, read_count_table, read_design, write_correlation,
        write_count_matrix, write_design, write_dge_results, write_embedding, write_library_sizes,
        write_normalized, write_report, DesignOptions, DgeResults, RawDgeTable, ResultsSummary, WriteOptions,
    };
    pub use crate::normalization::{counts_per_million, library_sizes, log_counts_per_million};
    pub use crate::pipeline::{
        AnalysisSession, AnalysisState, DgeRun, EmbeddingArtifacts, EmbeddingParams,
        EmbeddingTable, NormalizedMatrix, Scale, SessionConfig,
    };
    pub use crate::sanitize::{sanitize_results, SanitizeSummary};
    pub use crate::validate::{clean_counts, validate, KeepPolicy, ValidatedData, ValidationParams};
}
