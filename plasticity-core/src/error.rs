//! Error types for plasticity correction.

use thiserror::Error;

/// Result type alias using the crate Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised before any correction runs.
///
/// Numeric edge cases inside the correction loops (non-positive stress,
/// degenerate curve segments, temperatures outside the table) are never
/// reported here; they are absorbed by clamping and guarded denominators.
#[derive(Error, Debug)]
pub enum Error {
    /// Hardening database invariants violated.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// Required material or temperature data is absent.
    #[error("missing data: {0}")]
    MissingData(String),

    /// Input arrays disagree in length.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Correction parameters out of range.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Dedicated worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}
