//! Shared types for inspection observations, AI suggestions, and photo analyses.

mod error;
pub mod observation;
pub mod patch;
pub mod photo;
pub mod suggestion;

pub use error::{ParseCodeError, ParseFieldTagError, ValidationError};
pub use observation::{ClassificationCode, Observation, ObservationId};
pub use patch::{FieldUpdate, ObservationDelta, Patch};
pub use photo::{
    InspectorGuidance, NO_DEFECT_VISIBLE, Photo, PhotoAnalysis, PhotoFindings, PhotoId,
    PhotoQuality, is_no_defect_visible,
};
pub use suggestion::{FieldTag, RegulationReference, SuggestionBundle};
