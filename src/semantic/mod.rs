//! Semantic compression experiments.
//!
//! Source code is summarised by the model, either as a typed
//! [`SemanticSignature`] or as a compact abbreviated text, and then
//! reconstructed from that summary by a second call.

pub mod codec;
pub mod signature;

pub use codec::{Encoding, RoundTrip, SemanticCodec, SemanticError, SAMPLE_PROGRAM};
pub use signature::{Algorithm, SemanticSignature};
