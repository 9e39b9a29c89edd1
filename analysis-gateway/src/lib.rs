//! Complaint analysis gateway.
//!
//! A stateless Lambda that routes a fixed set of analysis operations to an upstream
//! language model, hides the model credential, and always answers registered
//! operations with a well-shaped body, degrading to static fallbacks when the
//! model fails or misbehaves.

pub mod operations;
pub mod router;

pub use operations::{AnalysisRequest, AnalysisResult, Operation};
pub use router::{handler, Gateway};
