//! Error type shared by the model, the HPD summarizer and the constants loader.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a model parameter is outside its physical domain.
    #[error("invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        /// The name of the offending parameter.
        name: &'static str,
        /// The first offending value.
        value: f64,
        /// What the parameter must satisfy.
        reason: &'static str,
    },

    /// Returned when the requested probability mass is not in (0, 1).
    #[error("invalid mass: {0} must be in (0.0, 1.0)")]
    InvalidMass(f64),

    /// Returned when a sample cannot support the requested mass.
    #[error("insufficient samples: {n} samples cannot span {span} intervals")]
    InsufficientSamples {
        /// Number of samples provided.
        n: usize,
        /// Number of sorted steps the interval must span, `floor(mass * n)`.
        span: usize,
    },

    /// Returned when two array shapes cannot be broadcast together.
    #[error("shape mismatch: {left:?} cannot be broadcast with {right:?}")]
    ShapeMismatch {
        /// Shape accumulated so far.
        left: Vec<usize>,
        /// Shape that failed to broadcast against it.
        right: Vec<usize>,
    },

    /// Returned when an operator name is missing from the constants.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// Returned when a strain name is missing from the constants.
    #[error("unknown strain '{0}'")]
    UnknownStrain(String),

    #[error("failed to read constants: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse constants: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
