use thiserror::Error;

/// Text that is not one of the six certificate classification codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown classification code: {0:?}")]
pub struct ParseCodeError(pub String);

/// Text that names none of the four suggestion fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field tag: {0:?}")]
pub struct ParseFieldTagError(pub String);

/// Structural validation failure for inference output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("confidence {value} outside {min}..={max}")]
    ConfidenceOutOfRange { value: f64, min: f64, max: f64 },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("disagreement verdict carries no feedback")]
    MissingFeedback,

    #[error(transparent)]
    UnknownCode(#[from] ParseCodeError),
}
