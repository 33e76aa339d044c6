//! stepgen - Context-chained LLM code generation
//!
//! Generates the files of a small calculator web app one stage at a time,
//! feeding every generated artifact into the prompt of the next stage.
//!
//! # Architecture
//!
//! The run is strictly linear:
//! - Each stage reads one prompt file
//! - The prompt is combined with every earlier artifact and sent to the model
//! - The reply is stripped of code fences, written to disk, and appended to
//!   the context for the next stage
//!
//! # Modules
//!
//! - `adapters`: Hosted model integration (chat completions)
//! - `core`: Prompt loading, extraction, stages and the pipeline
//! - `domain`: Data structures (Artifact, RunState, GenerationReport)
//! - `semantic`: Source compression and reconstruction experiments
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Generate the app into ./generated
//! stepgen --model gpt-4o
//!
//! # Compress a file into example.py.compressed
//! stepgen compress example.py
//!
//! # Reconstruct it
//! stepgen decompress example.py.compressed --ext py
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod semantic;

// Re-export main types at crate root for convenience
pub use adapters::{CompletionClient, CompletionError, CompletionRequest, ModelParams};
pub use config::Settings;
pub use crate::core::{extract_code, GenerateError, GenerationPipeline, PipelineStage, PromptStore};
pub use domain::{Artifact, ArtifactKind, GenerationContext, GenerationReport, RunState};
pub use semantic::{SemanticCodec, SemanticSignature};
