use inspecta_ai::InferenceError;
use inspecta_core::{ObservationId, PhotoId};
use thiserror::Error;

use crate::Generation;
use crate::host::HostError;

#[derive(Debug, Error)]
pub enum ReviewError {
    /// The request could not complete. Recoverable via retry.
    #[error("inference request failed: {0}")]
    NetworkFailure(String),

    /// A response arrived but failed structural validation. Recoverable via retry.
    #[error("inference response malformed: {0}")]
    MalformedResponse(String),

    /// A newer request replaced this one. Never surfaced to the user.
    #[error("request generation {0} superseded")]
    Superseded(Generation),

    /// Acceptance against a bundle that is no longer current.
    #[error("stale acceptance for generation {requested} (current: {current:?})")]
    Stale {
        requested: Generation,
        current: Option<Generation>,
    },

    #[error("no previous enhancement request to retry")]
    NothingToRetry,

    #[error("observation {0} not found")]
    ObservationNotFound(ObservationId),

    #[error("photo {0} has no analysis")]
    NoAnalysis(PhotoId),

    #[error("photo {0} is not linked to an observation")]
    NoLinkedObservation(PhotoId),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl ReviewError {
    /// Whether the host should offer the user a retry action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure(_) | Self::MalformedResponse(_))
    }
}

impl From<InferenceError> for ReviewError {
    fn from(e: InferenceError) -> Self {
        if e.is_malformed() {
            Self::MalformedResponse(e.to_string())
        } else {
            Self::NetworkFailure(e.to_string())
        }
    }
}
