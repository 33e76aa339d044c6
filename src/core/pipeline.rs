//! The context-chained generation pipeline.
//!
//! Runs the four primary stages in a fixed order, persisting each artifact
//! as soon as its stage succeeds, then generates the auxiliary project
//! configuration files. A primary failure aborts the run; auxiliary
//! failures are collected into the report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{CompletionClient, ModelParams};
use crate::config::Settings;
use crate::domain::{
    Artifact, AuxiliaryFailure, GenerationContext, GenerationReport, RunState, WrittenArtifact,
};

use super::error::{AuxiliaryCause, GenerateError};
use super::extract::extract_code;
use super::prompts::PromptStore;
use super::stage::PipelineStage;

pub const AUXILIARY_SYSTEM_MESSAGE: &str =
    "You are a helpful assistant that generates configuration files.";

/// How auxiliary output is checked before it is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCheck {
    /// Written as-is
    None,
    /// Must parse as JSON
    Json,
}

/// An auxiliary configuration file: a name and a one-line instruction
#[derive(Debug, Clone, Copy)]
pub struct AuxiliaryFile {
    pub name: &'static str,
    pub instruction: &'static str,
    pub check: OutputCheck,
}

impl AuxiliaryFile {
    fn validate(&self, content: &str) -> Result<(), AuxiliaryCause> {
        match self.check {
            OutputCheck::None => Ok(()),
            OutputCheck::Json => serde_json::from_str::<serde_json::Value>(content)
                .map(|_| ())
                .map_err(|e| AuxiliaryCause::InvalidOutput(format!("not valid JSON: {}", e))),
        }
    }
}

pub const AUXILIARY_FILES: [AuxiliaryFile; 3] = [
    AuxiliaryFile {
        name: "babel.config.js",
        instruction: "Generate a babel configuration file for a JavaScript project using Jest for testing.",
        check: OutputCheck::None,
    },
    AuxiliaryFile {
        name: "jest.config.js",
        instruction: "Generate a Jest configuration file for testing a vanilla JavaScript project.",
        check: OutputCheck::None,
    },
    AuxiliaryFile {
        name: "package.json",
        instruction: "Generate a package.json file with all necessary dependencies for a JavaScript project using Jest for testing.",
        check: OutputCheck::Json,
    },
];

/// Sequential HTML → Script → Style → Tests pipeline
pub struct GenerationPipeline {
    client: Arc<dyn CompletionClient>,
    prompts: PromptStore,
    params: ModelParams,
    output_dir: PathBuf,
    auxiliary_dir: PathBuf,
}

impl GenerationPipeline {
    /// Create a pipeline from resolved settings
    pub fn new(settings: &Settings, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            prompts: PromptStore::new(&settings.prompts_dir),
            params: ModelParams::from(settings),
            output_dir: settings.output_dir.clone(),
            auxiliary_dir: settings.auxiliary_dir.clone(),
        }
    }

    /// Execute the whole run
    #[instrument(skip(self), fields(model = %self.params.model))]
    pub async fn run(&self) -> Result<GenerationReport, GenerateError> {
        let mut report = GenerationReport::new(Uuid::new_v4());
        info!(
            run_id = %report.run_id,
            client = self.client.name(),
            output = %self.output_dir.display(),
            "Starting generation"
        );

        let mut context = GenerationContext::new();

        let stages = PipelineStage::all();
        for (idx, stage) in stages.iter().enumerate() {
            report.state = report.state.next();
            info!(step = idx + 1, of = stages.len(), stage = %stage.name(), "Running stage");

            let artifact = match self.run_stage(stage, &context).await {
                Ok(artifact) => artifact,
                Err(e) => return Err(fail(&mut report, stage, e)),
            };

            let written = match self.persist(&artifact).await {
                Ok(written) => written,
                Err(e) => return Err(fail(&mut report, stage, e)),
            };

            report.artifacts.push(written);
            context.push(artifact);
        }

        report.state = report.state.next();
        self.generate_auxiliary(&mut report).await;

        report.state = report.state.next();
        report.completed_at = Some(Utc::now());

        if report.is_partial() {
            warn!(
                failed = report.auxiliary_failures.len(),
                "Generation finished with auxiliary failures"
            );
        } else {
            info!(run_id = %report.run_id, "Generation completed successfully");
        }

        Ok(report)
    }

    async fn run_stage(
        &self,
        stage: &PipelineStage,
        context: &GenerationContext,
    ) -> Result<Artifact, GenerateError> {
        let prompt_name = stage.prompt_name();
        let prompt = self.prompts.load(prompt_name).await?;
        info!(path = %self.prompts.path_for(prompt_name).display(), "Read prompt");

        stage
            .run(&prompt, context, self.client.as_ref(), &self.params)
            .await
    }

    /// Write a primary artifact under the output root
    async fn persist(&self, artifact: &Artifact) -> Result<WrittenArtifact, GenerateError> {
        let path = self.output_dir.join(artifact.kind.relative_path());
        write_file(&path, &artifact.content)
            .await
            .map_err(|source| GenerateError::WriteFailed {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), bytes = artifact.size_bytes, "Saved");

        Ok(WrittenArtifact {
            kind: artifact.kind,
            path,
            size_bytes: artifact.size_bytes,
            sha256: artifact.digest(),
        })
    }

    /// Generate every auxiliary file, recording failures instead of returning them
    async fn generate_auxiliary(&self, report: &mut GenerationReport) {
        for file in AUXILIARY_FILES.iter() {
            match self.generate_auxiliary_file(file).await {
                Ok(path) => {
                    info!(path = %path.display(), "Saved auxiliary file");
                    report.auxiliary_files.push(path);
                }
                Err(cause) => {
                    let err = GenerateError::AuxiliaryGenerationFailed {
                        file: file.name.to_string(),
                        cause,
                    };
                    warn!(error = %err, "Auxiliary file skipped");
                    report.auxiliary_failures.push(AuxiliaryFailure {
                        file: file.name.to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }
    }

    async fn generate_auxiliary_file(&self, file: &AuxiliaryFile) -> Result<PathBuf, AuxiliaryCause> {
        let request = self.params.request(AUXILIARY_SYSTEM_MESSAGE, file.instruction);
        let raw = self.client.complete(&request).await?;

        let content = extract_code(&raw);
        file.validate(content)?;

        let path = self.auxiliary_dir.join(file.name);
        write_file(&path, content).await?;
        Ok(path)
    }
}

/// Tag the error with its stage and move the report to `Failed`
fn fail(report: &mut GenerationReport, stage: &PipelineStage, e: GenerateError) -> GenerateError {
    let e = e.in_stage(stage.name());
    report.state = RunState::Failed {
        stage: stage.name().to_string(),
        cause: e.cause_message(),
    };
    error!(run_id = %report.run_id, state = ?report.state, "Generation aborted");
    e
}

/// Write through a sibling `.partial` file so a failed write never leaves
/// a truncated file at `path`
async fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let staging = partial_path(path);
    let written = match tokio::fs::write(&staging, content).await {
        Ok(()) => tokio::fs::rename(&staging, path).await,
        Err(e) => Err(e),
    };
    if written.is_err() {
        let _ = tokio::fs::remove_file(&staging).await;
    }
    written
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}
