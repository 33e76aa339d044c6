//! Run state and the report produced by a generation run.
//!
//! A run walks a fixed sequence of states. Any state may move to
//! `Failed`, which is terminal; a rerun always starts again from `Start`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::artifact::ArtifactKind;

/// State of a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunState {
    /// Nothing executed yet
    Start,

    /// A primary stage is executing
    Stage { kind: ArtifactKind },

    /// Primary artifacts written, auxiliary files being generated
    ConfigFiles,

    /// All work finished (auxiliary failures may still be present)
    Done,

    /// A fatal error stopped the run
    Failed { stage: String, cause: String },
}

impl Default for RunState {
    fn default() -> Self {
        Self::Start
    }
}

impl RunState {
    /// The state that follows this one on success
    pub fn next(&self) -> RunState {
        match self {
            Self::Start => Self::Stage {
                kind: ArtifactKind::Html,
            },
            Self::Stage { kind } => match kind {
                ArtifactKind::Html => Self::Stage {
                    kind: ArtifactKind::Script,
                },
                ArtifactKind::Script => Self::Stage {
                    kind: ArtifactKind::Style,
                },
                ArtifactKind::Style => Self::Stage {
                    kind: ArtifactKind::Tests,
                },
                ArtifactKind::Tests => Self::ConfigFiles,
            },
            Self::ConfigFiles => Self::Done,
            Self::Done => Self::Done,
            Self::Failed { .. } => self.clone(),
        }
    }

    /// Check if the run can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }
}

/// A primary artifact that was persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrittenArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
}

/// An auxiliary file that could not be generated or written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuxiliaryFailure {
    pub file: String,
    pub error: String,
}

/// Outcome of a run that got past all four primary stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Unique identifier for this run
    pub run_id: Uuid,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    pub completed_at: Option<DateTime<Utc>>,

    /// Final state
    pub state: RunState,

    /// Primary artifacts in stage order
    pub artifacts: Vec<WrittenArtifact>,

    /// Auxiliary files that were written
    pub auxiliary_files: Vec<PathBuf>,

    /// Auxiliary files that failed
    pub auxiliary_failures: Vec<AuxiliaryFailure>,
}

impl GenerationReport {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            completed_at: None,
            state: RunState::Start,
            artifacts: Vec::new(),
            auxiliary_files: Vec::new(),
            auxiliary_failures: Vec::new(),
        }
    }

    /// True when any auxiliary file failed
    pub fn is_partial(&self) -> bool {
        !self.auxiliary_failures.is_empty()
    }

    /// Every path written by the run, primary artifacts first
    pub fn written_paths(&self) -> Vec<&PathBuf> {
        self.artifacts
            .iter()
            .map(|a| &a.path)
            .chain(self.auxiliary_files.iter())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_sequence() {
        let mut state = RunState::Start;
        let mut visited = vec![state.clone()];
        while !state.is_terminal() {
            state = state.next();
            visited.push(state.clone());
        }

        assert_eq!(
            visited,
            vec![
                RunState::Start,
                RunState::Stage { kind: ArtifactKind::Html },
                RunState::Stage { kind: ArtifactKind::Script },
                RunState::Stage { kind: ArtifactKind::Style },
                RunState::Stage { kind: ArtifactKind::Tests },
                RunState::ConfigFiles,
                RunState::Done,
            ]
        );
    }

    #[test]
    fn test_failed_is_terminal() {
        let failed = RunState::Failed {
            stage: "HTML".to_string(),
            cause: "boom".to_string(),
        };
        assert!(failed.is_terminal());
        assert_eq!(failed.next(), failed);
    }

    #[test]
    fn test_report_serialization() {
        let mut report = GenerationReport::new(Uuid::new_v4());
        report.state = RunState::Done;
        report.auxiliary_failures.push(AuxiliaryFailure {
            file: "package.json".to_string(),
            error: "invalid JSON".to_string(),
        });

        let json = serde_json::to_string(&report).unwrap();
        let parsed: GenerationReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.state, RunState::Done);
        assert!(parsed.is_partial());
    }
}
