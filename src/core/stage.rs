//! A single generation stage.
//!
//! A stage turns one prompt plus the artifacts of every earlier stage into
//! one new artifact, using exactly one completion call.

use std::time::Instant;

use tracing::{error, info, instrument};

use crate::adapters::{CompletionClient, ModelParams};
use crate::domain::{Artifact, ArtifactKind, GenerationContext};

use super::error::GenerateError;
use super::extract::extract_code;
use super::prompts::PromptName;

/// One step of the pipeline, identified by the artifact kind it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStage {
    kind: ArtifactKind,
}

impl PipelineStage {
    pub fn new(kind: ArtifactKind) -> Self {
        Self { kind }
    }

    /// Stages in execution order
    pub fn all() -> [PipelineStage; 4] {
        ArtifactKind::ORDER.map(Self::new)
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.stage_name()
    }

    /// Prompt file this stage reads
    pub fn prompt_name(&self) -> PromptName {
        match self.kind {
            ArtifactKind::Html => PromptName::Ui,
            ArtifactKind::Script => PromptName::BusinessLogic,
            ArtifactKind::Style => PromptName::Styling,
            ArtifactKind::Tests => PromptName::Tests,
        }
    }

    /// System message asking for the bare artifact
    pub fn system_message(&self) -> &'static str {
        match self.kind {
            ArtifactKind::Html => "Generate only the HTML code for a calculator. Respond with ONLY the complete HTML file, no explanations or markdown.",
            ArtifactKind::Script => "Generate only the JavaScript code for a calculator. Respond with ONLY the complete JavaScript file, no explanations or markdown.",
            ArtifactKind::Style => "Generate only the CSS code for a calculator. Respond with ONLY the complete CSS file, no explanations or markdown.",
            ArtifactKind::Tests => "Generate only JavaScript test code for a calculator. Respond with ONLY the complete test file, no explanations or markdown.",
        }
    }

    fn preamble(&self) -> &'static str {
        match self.kind {
            ArtifactKind::Html => {
                "I'll provide you with requirements for the HTML structure of a calculator application. \
                 Use clear, stable IDs and classes for every interactive element so later code can reference them."
            }
            ArtifactKind::Script => {
                "I'll provide you with the HTML structure of a calculator application followed by requirements \
                 for implementing its JavaScript business logic. Make sure your JavaScript code properly \
                 interacts with the HTML elements by using the correct IDs and classes."
            }
            ArtifactKind::Style => {
                "I'll provide you with the HTML and JavaScript code for a calculator application followed by \
                 requirements for implementing its CSS styling. Make sure your CSS properly styles \
                 the HTML elements by using the correct IDs, classes, and elements."
            }
            ArtifactKind::Tests => {
                "I'll provide you with the complete implementation of a calculator application (HTML, JavaScript, and CSS) \
                 followed by requirements for implementing tests. Make sure your tests properly validate \
                 the calculator's functionality by checking all specified requirements."
            }
        }
    }

    fn closing(&self) -> &'static str {
        match self.kind {
            ArtifactKind::Html => "Here are the requirements for the HTML structure:",
            ArtifactKind::Script => "Now, here are the requirements for the JavaScript business logic:",
            ArtifactKind::Style => "Now, here are the requirements for the CSS styling:",
            ArtifactKind::Tests => "Now, here are the requirements for the tests:",
        }
    }

    /// Build the user message: preamble, prior artifacts, then the prompt
    pub fn user_message(&self, prompt: &str, context: &GenerationContext) -> String {
        let mut message = String::new();
        message.push_str(self.preamble());
        message.push_str("\n\n");
        message.push_str(&render_context(context));
        message.push_str(self.closing());
        message.push('\n');
        message.push_str(prompt);
        message
    }

    /// Run the stage: one completion call, then fence stripping
    #[instrument(skip_all, fields(stage = %self.name()))]
    pub async fn run(
        &self,
        prompt: &str,
        context: &GenerationContext,
        client: &dyn CompletionClient,
        params: &ModelParams,
    ) -> Result<Artifact, GenerateError> {
        info!(context_artifacts = context.len(), "Generating");
        let started = Instant::now();

        let request = params.request(self.system_message(), self.user_message(prompt, context));

        let raw = client.complete(&request).await.map_err(|cause| {
            error!(error = %cause, "Completion failed");
            GenerateError::StageFailed {
                stage: self.name().to_string(),
                cause,
            }
        })?;

        let artifact = Artifact::new(self.kind, extract_code(&raw).to_string());
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = artifact.size_bytes,
            "Stage complete"
        );

        Ok(artifact)
    }
}

/// Render every artifact in the context as a labelled fenced block
pub fn render_context(context: &GenerationContext) -> String {
    let mut rendered = String::new();
    for artifact in context.artifacts() {
        rendered.push_str(artifact.kind.context_label());
        rendered.push_str("\n```");
        rendered.push_str(artifact.kind.fence_tag());
        rendered.push('\n');
        rendered.push_str(&artifact.content);
        rendered.push_str("\n```\n\n");
    }
    rendered
}
