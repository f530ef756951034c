use std::path::PathBuf;

use thiserror::Error;

use crate::models::Stage;

/// Error taxonomy for a pipeline run.
///
/// Caller errors (`InputNotFound`, `UnsupportedMedia`, `UnsupportedLanguage`,
/// `UnknownKeywordStrategy`, `UnknownExportFormat`) and missing credentials
/// are raised before any expensive stage executes. A collaborator failure
/// carries the stage it occurred in; the orchestrator records the failed
/// stage in the run timings and propagates without retrying.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("unsupported media format: {0}")]
    UnsupportedMedia(PathBuf),

    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("unsupported language: {0} (supported: en, ru, zh)")]
    UnsupportedLanguage(String),

    #[error("unknown keyword strategy: {0} (expected tfidf or textrank)")]
    UnknownKeywordStrategy(String),

    #[error("unknown export format: {0} (expected json, csv, txt or plain)")]
    UnknownExportFormat(String),

    #[error("{stage} stage failed: {source}")]
    Collaborator {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write {format} export to {path:?}: {source}")]
    ExportWrite {
        format: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Wrap a collaborator failure with the stage it occurred in.
    pub fn collaborator(stage: Stage, source: anyhow::Error) -> Self {
        PipelineError::Collaborator { stage, source }
    }

    /// The stage a collaborator failure occurred in, if applicable.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Collaborator { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
