//! Prompt loading.
//!
//! Prompts live as plain text files in a single directory. Each logical
//! prompt name maps to exactly one file name.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::GenerateError;

/// Logical prompt names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptName {
    Ui,
    BusinessLogic,
    Styling,
    Tests,
}

impl PromptName {
    /// Logical name as used in logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ui => "ui",
            Self::BusinessLogic => "business-logic",
            Self::Styling => "styling",
            Self::Tests => "tests",
        }
    }

    /// File name inside the prompts directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Ui => "calculator-ui.prompt",
            Self::BusinessLogic => "business-logic.prompt",
            Self::Styling => "styling.prompt",
            Self::Tests => "tests.prompt",
        }
    }
}

impl fmt::Display for PromptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads prompt files from a directory
#[derive(Debug, Clone)]
pub struct PromptStore {
    dir: PathBuf,
}

impl PromptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a logical name resolves to
    pub fn path_for(&self, name: PromptName) -> PathBuf {
        self.dir.join(name.file_name())
    }

    /// Load a prompt's trimmed text
    pub async fn load(&self, name: PromptName) -> Result<String, GenerateError> {
        let path = self.path_for(name);

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GenerateError::PromptNotFound {
                    name: name.to_string(),
                    path: path.clone(),
                }
            } else {
                GenerateError::PromptUnreadable {
                    name: name.to_string(),
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        debug!(prompt = %name, path = %path.display(), "Read prompt");
        Ok(content.trim().to_string())
    }
}
