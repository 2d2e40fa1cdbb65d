use inspecta_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference service unavailable: {0}")]
    Unavailable(String),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid response: {0}")]
    Validation(#[from] ValidationError),
}

impl InferenceError {
    /// Whether a response arrived but failed structural checks, as opposed to
    /// the request not completing at all.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::Validation(_))
    }
}

impl From<serde_json::Error> for InferenceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
