//! Domain types for the generation pipeline.
//!
//! - Artifact: stage outputs and the context that threads them forward
//! - Run: run state machine and the final report

pub mod artifact;
pub mod run;

pub use artifact::{Artifact, ArtifactKind, GenerationContext};
pub use run::{AuxiliaryFailure, GenerationReport, RunState, WrittenArtifact};
