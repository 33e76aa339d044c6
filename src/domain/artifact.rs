//! Artifacts produced by generation stages.
//!
//! Each primary stage produces exactly one artifact. Artifacts are never
//! modified after creation; later stages only read them through a
//! [`GenerationContext`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An artifact produced by a pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Kind of artifact (also identifies the stage that produced it)
    pub kind: ArtifactKind,

    /// Extracted source text
    pub content: String,

    /// When the artifact was created
    pub created_at: DateTime<Utc>,

    /// Size in bytes (for tracking)
    pub size_bytes: u64,
}

impl Artifact {
    /// Create a new artifact
    pub fn new(kind: ArtifactKind, content: String) -> Self {
        let size_bytes = content.len() as u64;
        Self {
            kind,
            content,
            created_at: Utc::now(),
            size_bytes,
        }
    }

    /// Hex-encoded SHA-256 of the content
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.content.as_bytes()))
    }
}

/// The four kinds of primary artifact, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Page markup
    Html,

    /// Business logic script
    Script,

    /// Stylesheet
    Style,

    /// Test suite
    Tests,
}

impl ArtifactKind {
    /// All kinds in the order the pipeline produces them
    pub const ORDER: [ArtifactKind; 4] = [Self::Html, Self::Script, Self::Style, Self::Tests];

    /// Stage name used in progress output and errors
    pub fn stage_name(&self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Script => "JavaScript",
            Self::Style => "CSS",
            Self::Tests => "Tests",
        }
    }

    /// Language tag used when embedding this artifact in a fenced block
    pub fn fence_tag(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Script | Self::Tests => "javascript",
            Self::Style => "css",
        }
    }

    /// Label introducing this artifact when it is passed as context
    pub fn context_label(&self) -> &'static str {
        match self {
            Self::Html => "Here's the HTML structure:",
            Self::Script => "Here's the JavaScript code:",
            Self::Style => "Here's the CSS code:",
            Self::Tests => "Here's the test suite:",
        }
    }

    /// Output path relative to the output root
    pub fn relative_path(&self) -> &'static str {
        match self {
            Self::Html => "index.html",
            Self::Script => "app.js",
            Self::Style => "style.css",
            Self::Tests => "tests/calculator.test.js",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stage_name())
    }
}

/// Ordered, append-only collection of the artifacts produced so far
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    artifacts: Vec<Artifact>,
}

impl GenerationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the artifact of the stage that just completed
    pub fn push(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    /// Artifacts in creation order
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}
