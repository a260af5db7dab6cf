//! Error taxonomy shared across the pipeline
//!
//! Two layers: transport/provider failures carry a stable machine-readable
//! code plus a retryability flag consumed by the queue's retry policy, and
//! orchestration failures are bucketed into user-facing categories with a
//! suggested remedy.

mod classify;
mod taxonomy;

pub use classify::{classify_failure, FailureCategory};
pub use taxonomy::{AiError, ErrorCode};

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AiError>;
