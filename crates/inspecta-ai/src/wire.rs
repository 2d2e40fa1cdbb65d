//! JSON shapes returned by the inference endpoints.

use inspecta_core::{
    ClassificationCode, PhotoAnalysis, RegulationReference, SuggestionBundle, ValidationError,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub suggested_code: Option<String>,
    pub confidence: Option<f64>,
    #[serde(default)]
    pub enhanced_description: String,
    pub recommendation: Option<String>,
    #[serde(default)]
    pub regulation_refs: Vec<RegulationRef>,
    pub explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegulationRef {
    pub number: String,
    #[serde(alias = "relevance")]
    pub title: String,
}

impl SuggestionResponse {
    pub fn into_bundle(self) -> Result<SuggestionBundle, ValidationError> {
        let code: ClassificationCode = self
            .suggested_code
            .ok_or(ValidationError::MissingField("suggestedCode"))?
            .parse()?;
        let confidence = self
            .confidence
            .ok_or(ValidationError::MissingField("confidence"))?;
        let regulations = self
            .regulation_refs
            .into_iter()
            .map(|r| RegulationReference::new(r.number, r.title))
            .collect();
        SuggestionBundle::new(
            code,
            confidence,
            self.enhanced_description,
            self.recommendation,
            regulations,
            self.explanation,
        )
    }
}

/// Envelope some deployments wrap the photo verdict in.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PhotoResponse {
    Wrapped { analysis: PhotoAnalysis },
    Bare(PhotoAnalysis),
}

impl PhotoResponse {
    pub fn into_analysis(self) -> Result<PhotoAnalysis, ValidationError> {
        match self {
            Self::Wrapped { analysis } | Self::Bare(analysis) => analysis.validated(),
        }
    }
}
