//! The seam through which the core reads and writes host-owned observations.

use std::sync::Arc;

use inspecta_core::{Observation, ObservationId, Patch};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("observation {0} not found")]
    NotFound(ObservationId),

    #[error("update rejected: {0}")]
    Rejected(String),
}

/// Owner of the observation list.
///
/// Both calls are synchronous: the core reads the current record and hands
/// back one [`Patch`] without suspending in between.
pub trait ObservationHost: Send + Sync {
    /// Current state of an observation.
    fn observation(&self, id: &ObservationId) -> Option<Observation>;

    /// Apply one patch atomically.
    fn apply_update(&self, id: &ObservationId, patch: Patch) -> Result<(), HostError>;
}

impl<T: ObservationHost + ?Sized> ObservationHost for Arc<T> {
    fn observation(&self, id: &ObservationId) -> Option<Observation> {
        (**self).observation(id)
    }

    fn apply_update(&self, id: &ObservationId, patch: Patch) -> Result<(), HostError> {
        (**self).apply_update(id, patch)
    }
}
