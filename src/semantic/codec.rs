//! LLM-driven source compression and reconstruction.
//!
//! Two encodings are supported. `Structured` asks the model for a JSON
//! [`SemanticSignature`]; `Compact` asks for a terse abbreviated text
//! summary. Both are decoded back into source by another completion call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::adapters::{CompletionClient, CompletionError, ModelParams};
use crate::core::extract_code;

use super::signature::SemanticSignature;

const ANALYZE_SYSTEM: &str = "You are a code analysis assistant. Respond with a single JSON object and nothing else.";
const COMPACT_SYSTEM: &str = "You are a specialized compressor for programs. Respond with the compressed representation only.";
const RECONSTRUCT_SYSTEM: &str = "You are a code generator. Return only the implementation code without explanations.";

/// Which summary format to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Structured,
    Compact,
}

#[derive(Debug, Error)]
pub enum SemanticError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("model returned an invalid semantic signature: {0}")]
    SignatureParse(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Both halves of an in-memory compression round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrip {
    pub compressed: String,
    pub reconstructed: String,
}

/// Built-in program used by `stepgen demo`
pub const SAMPLE_PROGRAM: &str = r#"from typing import List, Optional, Dict
from dataclasses import dataclass
import heapq

@dataclass
class TaskItem:
    priority: int
    description: str
    completed: bool = False

class PriorityTaskManager:
    def __init__(self):
        self.tasks: List[TaskItem] = []
        self.task_index: Dict[str, int] = {}

    def add_task(self, priority: int, description: str) -> None:
        task = TaskItem(priority, description)
        heapq.heappush(self.tasks, (-priority, task))
        self.task_index[description] = len(self.tasks) - 1

    def get_highest_priority(self) -> Optional[TaskItem]:
        if not self.tasks:
            return None
        return self.tasks[0][1]

    def mark_completed(self, description: str) -> bool:
        if description not in self.task_index:
            return False
        idx = self.task_index[description]
        self.tasks[idx][1].completed = True
        return True
"#;

/// Compresses and reconstructs source code through a completion client
pub struct SemanticCodec {
    client: Arc<dyn CompletionClient>,
    params: ModelParams,
}

impl SemanticCodec {
    pub fn new(client: Arc<dyn CompletionClient>, params: ModelParams) -> Self {
        Self { client, params }
    }

    /// Extract a structured signature from source
    #[instrument(skip_all, fields(bytes = source.len()))]
    pub async fn compress(&self, source: &str) -> Result<SemanticSignature, SemanticError> {
        let request = self.params.request(ANALYZE_SYSTEM, analyze_prompt(source));
        let raw = self.client.complete(&request).await?;
        let signature = SemanticSignature::from_json(extract_code(&raw))?;

        info!(
            interfaces = signature.public_interfaces.len(),
            algorithms = signature.critical_algorithms.len(),
            "Compressed to semantic signature"
        );
        Ok(signature)
    }

    /// Generate source from a structured signature
    #[instrument(skip_all)]
    pub async fn reconstruct(&self, signature: &SemanticSignature) -> Result<String, SemanticError> {
        let prompt = format!(
            "Given this semantic specification, generate complete code:\n\n{}\n\
             Generate idiomatic code that implements this specification.\n\
             Return only the implementation code without explanations.",
            signature.render_sections()
        );
        let request = self.params.request(RECONSTRUCT_SYSTEM, prompt);
        let raw = self.client.complete(&request).await?;
        Ok(extract_code(&raw).to_string())
    }

    /// Produce the compact abbreviated summary
    #[instrument(skip_all, fields(bytes = source.len()))]
    pub async fn compact(&self, source: &str) -> Result<String, SemanticError> {
        let request = self.params.request(COMPACT_SYSTEM, compact_prompt(source));
        let raw = self.client.complete(&request).await?;
        let summary = raw.trim().to_string();

        info!(from = source.len(), to = summary.len(), "Compacted source");
        Ok(summary)
    }

    /// Expand a compact summary back into source
    #[instrument(skip_all)]
    pub async fn expand(&self, compressed: &str) -> Result<String, SemanticError> {
        let request = self.params.request(RECONSTRUCT_SYSTEM, expand_prompt(compressed));
        let raw = self.client.complete(&request).await?;
        Ok(extract_code(&raw).to_string())
    }

    /// Encode source in the chosen format
    pub async fn encode(&self, source: &str, encoding: Encoding) -> Result<String, SemanticError> {
        match encoding {
            Encoding::Structured => Ok(self.compress(source).await?.to_json_pretty()?),
            Encoding::Compact => self.compact(source).await,
        }
    }

    /// Decode an encoded summary back into source
    pub async fn decode(&self, encoded: &str, encoding: Encoding) -> Result<String, SemanticError> {
        match encoding {
            Encoding::Structured => {
                let signature = SemanticSignature::from_json(encoded)?;
                self.reconstruct(&signature).await
            }
            Encoding::Compact => self.expand(encoded).await,
        }
    }

    /// Encode then decode `source` without touching the filesystem
    pub async fn round_trip(&self, source: &str, encoding: Encoding) -> Result<RoundTrip, SemanticError> {
        let compressed = self.encode(source, encoding).await?;
        let reconstructed = self.decode(&compressed, encoding).await?;
        Ok(RoundTrip {
            compressed,
            reconstructed,
        })
    }

    /// Compress `path` into `<path>.compressed`
    pub async fn compress_file(&self, path: &Path, encoding: Encoding) -> Result<PathBuf, SemanticError> {
        let source = read(path).await?;
        let encoded = self.encode(&source, encoding).await?;

        let out = with_suffix(path, "compressed");
        write(&out, &encoded).await?;
        info!(path = %out.display(), "Wrote compressed file");
        Ok(out)
    }

    /// Decompress `path` into `<path>.decompressed.<ext>`
    pub async fn decompress_file(
        &self,
        path: &Path,
        encoding: Encoding,
        ext: &str,
    ) -> Result<PathBuf, SemanticError> {
        let encoded = read(path).await?;
        let code = self.decode(&encoded, encoding).await?;

        let out = with_suffix(path, &format!("decompressed.{}", ext));
        write(&out, &code).await?;
        info!(path = %out.display(), "Wrote decompressed file");
        Ok(out)
    }
}

fn analyze_prompt(source: &str) -> String {
    format!(
        r#"Analyze this code and create a semantic compression that captures:
1. Public interfaces (function and class signatures)
2. Type definitions
3. Critical algorithms and their patterns
4. Dependencies
5. Behavioral constraints (from docstrings and assertions)

Return a JSON object with these exact keys:
{{
    "public_interfaces": [],
    "type_definitions": [],
    "critical_algorithms": [{{"name": "", "pattern": "", "complexity": ""}}],
    "dependency_refs": {{}},
    "behavioral_constraints": []
}}

Source code:
{}
"#,
        source
    )
}

fn compact_prompt(source: &str) -> String {
    format!(
        r#"Create an extremely compact yet unambiguous representation of the following program. Follow these rules:

1. Focus on semantic meaning over syntax
2. Use these abbreviations: fn for function, cls for class, ret for return, arg for argument, imp for import
3. Describe algorithms using high-level patterns rather than implementation details
4. Reference standard library functions by their full paths
5. Use => to indicate function signatures
6. Use :: to separate class methods
7. Use ... to indicate standard implementation patterns
8. Preserve type hints in their original form

Original program:
```
{}
```

Create a compressed representation using the format:
IMP: <imports>
TYPES: <custom type definitions>
FN: <function signatures and core algorithms>
FLOW: <key control flow patterns>
DEPS: <critical dependencies>

Your compression should be deterministic and reversible. Be precise about function signatures and type information."#,
        source
    )
}

fn expand_prompt(compressed: &str) -> String {
    format!(
        r#"Reconstruct a complete, working program from this compressed representation. Follow these rules:

1. Generate complete, working code
2. Maintain exact function signatures and type hints
3. Implement all described algorithms and patterns
4. Use the idiomatic style of the target language
5. Include docstrings for all functions and classes
6. Expand abbreviated keywords: fn => function, cls => class, ret => return, arg => argument, imp => import
7. Interpret => as function signatures
8. Interpret :: as class method separators
9. Interpret ... as standard implementation patterns

Compressed representation:
{}

Generate a complete program that implements this specification."#,
        compressed
    )
}

/// `foo.py` + `compressed` -> `foo.py.compressed`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

async fn read(path: &Path) -> Result<String, SemanticError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SemanticError::Io {
            path: path.to_path_buf(),
            source,
        })
}

async fn write(path: &Path, content: &str) -> Result<(), SemanticError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|source| SemanticError::Io {
            path: path.to_path_buf(),
            source,
        })
}
