//! Review workflow for AI suggestions on inspection observations and photos.
//!
//! An [`EnhancementSession`] requests a suggestion bundle for one observation,
//! publishes progress, and writes accepted fields back through the host's
//! [`ObservationHost`] as a single [`Patch`](inspecta_core::Patch). A
//! [`PhotoQaAnalyzer`] checks an inspector's classification against the photo.

mod acceptance;
mod error;
mod generation;
pub mod host;
pub mod merge;
pub mod photo_qa;
pub mod progress;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use acceptance::{AcceptanceProgress, AcceptanceSet};
pub use error::ReviewError;
pub use generation::{Generation, GenerationCounter};
pub use host::{HostError, ObservationHost};
pub use merge::{FieldStatus, compute_delta, format_citation};
pub use photo_qa::{
    AdoptOutcome, AgreementVerdict, ConfirmedScan, PhotoQaAnalyzer, PhotoReview, ScanConfirmation,
    ScanOutcome,
};
pub use progress::{InvalidTransition, ProgressEvent, ProgressStage, ProgressTracker};
pub use session::{AcceptOutcome, AcceptSummary, EnhanceOutcome, EnhancementSession, ReviewConfig};
