//! Core generation logic.
//!
//! This module contains:
//! - Prompts: named prompt loading
//! - Extract: fenced-code stripping
//! - Stage: a single context-aware generation step
//! - Pipeline: the ordered four-stage run plus auxiliary files

pub mod error;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod stage;

// Re-export commonly used types
pub use error::{AuxiliaryCause, GenerateError};
pub use extract::extract_code;
pub use pipeline::{AuxiliaryFile, GenerationPipeline, OutputCheck, AUXILIARY_FILES};
pub use prompts::{PromptName, PromptStore};
pub use stage::{render_context, PipelineStage};
