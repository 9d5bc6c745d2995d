//! Analysis orchestration
//!
//! An [`AnalysisSession`] moves through
//! `Idle -> Validating -> Normalized -> (EmbeddingReady | DgeReady) -> Done`,
//! with `Failed` reachable from any non-terminal state.

mod artifacts;
mod session;

pub use artifacts::{
    DgeRun, EmbeddingArtifacts, EmbeddingParams, EmbeddingTable, LibrarySizes, NormalizedMatrix,
    SampleCorrelation, Scale, EMBEDDING_COMPONENTS,
};
pub use session::{AnalysisSession, AnalysisState, SessionConfig};
