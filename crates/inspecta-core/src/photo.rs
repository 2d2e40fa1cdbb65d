//! Photographic evidence and its AI quality-assurance analysis.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ClassificationCode, ObservationId, ValidationError};

/// Label the inference service returns when it sees nothing wrong in a photo.
pub const NO_DEFECT_VISIBLE: &str = "NO_DEFECT_VISIBLE";

/// Whether an AI classification label is the "no defect visible" sentinel.
///
/// Tolerates case and space/underscore variations (`"No defect visible"`).
pub fn is_no_defect_visible(label: &str) -> bool {
    let normalised: String = label
        .trim()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_uppercase() })
        .collect();
    normalised == NO_DEFECT_VISIBLE
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhotoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A photo attached to an inspection, with the inspector's own classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: PhotoId,
    pub url: String,
    pub inspector_classification: ClassificationCode,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    /// Observation this photo evidences, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<ObservationId>,
}

impl Photo {
    /// Location/description context sent alongside the photo.
    pub fn location_context(&self) -> String {
        match (self.location.trim(), self.description.trim()) {
            ("", "") => String::new(),
            (loc, "") => loc.to_string(),
            ("", desc) => desc.to_string(),
            (loc, desc) => format!("{loc} - {desc}"),
        }
    }
}

/// Structured observations the AI made about the photo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhotoFindings {
    pub safety_features: Vec<String>,
    pub concerns: Vec<String>,
    /// Things the inspector must check in person.
    pub not_verifiable: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectorGuidance {
    pub summary: String,
    pub follow_up_checks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoQuality {
    pub adequate: bool,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Per-photo AI verdict on the inspector's classification.
///
/// Build through [`PhotoAnalysis::validated`]: disagreement always carries
/// feedback, and agreement never carries a suggested alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoAnalysis {
    pub ai_classification: String,
    pub agreement: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_classification: Option<String>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub findings: PhotoFindings,
    #[serde(default)]
    pub guidance: InspectorGuidance,
    /// 0–100.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_quality: Option<PhotoQuality>,
}

impl PhotoAnalysis {
    /// Check structural invariants and normalise an agreement verdict.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        if self.ai_classification.trim().is_empty() {
            return Err(ValidationError::MissingField("aiClassification"));
        }
        if !(0.0..=100.0).contains(&self.confidence) {
            return Err(ValidationError::ConfidenceOutOfRange {
                value: self.confidence,
                min: 0.0,
                max: 100.0,
            });
        }
        if self.agreement {
            self.suggested_classification = None;
        } else if self.feedback.trim().is_empty() {
            return Err(ValidationError::MissingFeedback);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(agreement: bool, feedback: &str) -> PhotoAnalysis {
        PhotoAnalysis {
            ai_classification: "C2".into(),
            agreement,
            suggested_classification: Some("C1".into()),
            feedback: feedback.into(),
            findings: PhotoFindings::default(),
            guidance: InspectorGuidance::default(),
            confidence: 82.0,
            photo_quality: None,
        }
    }

    #[test]
    fn sentinel_matching_is_lenient() {
        assert!(is_no_defect_visible("NO_DEFECT_VISIBLE"));
        assert!(is_no_defect_visible(" no defect visible "));
        assert!(is_no_defect_visible("No-Defect-Visible"));
        assert!(!is_no_defect_visible("C3"));
    }

    #[test]
    fn agreement_drops_suggestion() {
        let a = analysis(true, "").validated().unwrap();
        assert!(a.suggested_classification.is_none());
    }

    #[test]
    fn disagreement_requires_feedback() {
        assert_eq!(
            analysis(false, "  ").validated().unwrap_err(),
            ValidationError::MissingFeedback
        );
        assert!(analysis(false, "Exposed conductors visible").validated().is_ok());
    }

    #[test]
    fn confidence_scale_is_percent() {
        let mut a = analysis(true, "");
        a.confidence = 101.0;
        assert!(matches!(
            a.validated(),
            Err(ValidationError::ConfidenceOutOfRange { .. })
        ));
    }

    #[test]
    fn location_context_joins_parts() {
        let photo = Photo {
            id: "p1".into(),
            url: "https://example.test/p1.jpg".into(),
            inspector_classification: ClassificationCode::C3,
            location: "Garage".into(),
            description: "Socket outlet".into(),
            observation: None,
        };
        assert_eq!(photo.location_context(), "Garage - Socket outlet");
    }
}
