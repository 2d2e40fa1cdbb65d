//! The inference seam: two opaque async calls returning typed results.

use async_trait::async_trait;
use inspecta_core::{ClassificationCode, Observation, Photo, PhotoAnalysis, SuggestionBundle};
use serde::{Deserialize, Serialize};

use crate::InferenceError;

/// Input for one observation enhancement call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub description: String,
    pub location: String,
    pub current_code: ClassificationCode,
}

impl From<&Observation> for EnhanceRequest {
    fn from(obs: &Observation) -> Self {
        Self {
            description: obs.description.clone(),
            location: obs.location.clone(),
            current_code: obs.defect_code,
        }
    }
}

/// Input for one photo analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoScanRequest {
    pub photo_url: String,
    pub inspector_classification: ClassificationCode,
    pub location_context: String,
}

impl From<&Photo> for PhotoScanRequest {
    fn from(photo: &Photo) -> Self {
        Self {
            photo_url: photo.url.clone(),
            inspector_classification: photo.inspector_classification,
            location_context: photo.location_context(),
        }
    }
}

/// An external inference service.
///
/// Implementations must return only validated values: a bundle or analysis
/// that fails structural checks is reported as [`InferenceError::Malformed`]
/// or [`InferenceError::Validation`].
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn enhance_observation(
        &self,
        request: &EnhanceRequest,
    ) -> Result<SuggestionBundle, InferenceError>;

    async fn analyse_photo(&self, request: &PhotoScanRequest)
    -> Result<PhotoAnalysis, InferenceError>;
}

#[async_trait]
impl<T: InferenceClient + ?Sized> InferenceClient for std::sync::Arc<T> {
    async fn enhance_observation(
        &self,
        request: &EnhanceRequest,
    ) -> Result<SuggestionBundle, InferenceError> {
        (**self).enhance_observation(request).await
    }

    async fn analyse_photo(
        &self,
        request: &PhotoScanRequest,
    ) -> Result<PhotoAnalysis, InferenceError> {
        (**self).analyse_photo(request).await
    }
}
