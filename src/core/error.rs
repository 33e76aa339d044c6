//! Errors raised by the generation pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::adapters::CompletionError;

/// Fatal pipeline errors, plus the per-file auxiliary error that is
/// collected rather than returned
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("prompt '{name}' not found at {}", .path.display())]
    PromptNotFound { name: String, path: PathBuf },

    #[error("failed to read prompt '{name}' at {}: {source}", .path.display())]
    PromptUnreadable {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stage {stage} failed: {cause}")]
    StageFailed {
        stage: String,
        #[source]
        cause: CompletionError,
    },

    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("auxiliary file {file} failed: {cause}")]
    AuxiliaryGenerationFailed { file: String, cause: AuxiliaryCause },

    /// A prompt or write failure while a primary stage was running
    #[error("stage {stage} failed: {source}")]
    StageAborted {
        stage: String,
        #[source]
        source: Box<GenerateError>,
    },
}

impl GenerateError {
    /// Attach the running stage to an error that does not name one yet
    pub fn in_stage(self, stage: &str) -> Self {
        match self {
            Self::StageFailed { .. } | Self::StageAborted { .. } => self,
            other => Self::StageAborted {
                stage: stage.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Name of the stage that failed, when the error belongs to one
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::StageFailed { stage, .. } | Self::StageAborted { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// The failure without its stage prefix
    pub fn cause_message(&self) -> String {
        match self {
            Self::StageFailed { cause, .. } => cause.to_string(),
            Self::StageAborted { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }

    /// The error underneath any stage wrapper
    pub fn root(&self) -> &GenerateError {
        match self {
            Self::StageAborted { source, .. } => source.root(),
            other => other,
        }
    }
}


/// Why an auxiliary file was not produced
#[derive(Debug, Error)]
pub enum AuxiliaryCause {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("output rejected: {0}")]
    InvalidOutput(String),

    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
}
