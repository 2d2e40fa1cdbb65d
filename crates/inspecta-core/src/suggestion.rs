//! AI suggestion bundles offered against a single observation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ClassificationCode, ParseFieldTagError, ValidationError};

/// Pointer to a wiring-regulations clause, e.g. `522.6.1: Mechanical damage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulationReference {
    pub number: String,
    pub title: String,
}

impl RegulationReference {
    pub fn new(number: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
        }
    }
}

impl fmt::Display for RegulationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.number, self.title)
    }
}

/// Observation fields a suggestion bundle can offer edits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldTag {
    Code,
    Description,
    Recommendation,
    Regulations,
}

impl FieldTag {
    pub const ALL: [FieldTag; 4] = [
        Self::Code,
        Self::Description,
        Self::Recommendation,
        Self::Regulations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Description => "description",
            Self::Recommendation => "recommendation",
            Self::Regulations => "regulations",
        }
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldTag {
    type Err = ParseFieldTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" | "defectcode" | "defect_code" => Ok(Self::Code),
            "description" => Ok(Self::Description),
            "recommendation" => Ok(Self::Recommendation),
            "regulations" | "regulation" => Ok(Self::Regulations),
            _ => Err(ParseFieldTagError(s.to_string())),
        }
    }
}

/// One AI-produced set of proposed edits to an observation.
///
/// Only constructed through [`SuggestionBundle::new`], so `confidence` is
/// always within `0.0..=1.0` and the enhanced description is never blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionBundle {
    suggested_code: ClassificationCode,
    confidence: f64,
    enhanced_description: String,
    recommendation: Option<String>,
    regulations: Vec<RegulationReference>,
    explanation: Option<String>,
}

impl SuggestionBundle {
    pub fn new(
        suggested_code: ClassificationCode,
        confidence: f64,
        enhanced_description: impl Into<String>,
        recommendation: Option<String>,
        regulations: Vec<RegulationReference>,
        explanation: Option<String>,
    ) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ValidationError::ConfidenceOutOfRange {
                value: confidence,
                min: 0.0,
                max: 1.0,
            });
        }
        let enhanced_description = enhanced_description.into();
        if enhanced_description.trim().is_empty() {
            return Err(ValidationError::MissingField("enhancedDescription"));
        }
        Ok(Self {
            suggested_code,
            confidence,
            enhanced_description,
            recommendation,
            regulations,
            explanation,
        })
    }

    pub fn suggested_code(&self) -> ClassificationCode {
        self.suggested_code
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Confidence as a whole percentage for display.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence * 100.0).round() as u8
    }

    pub fn enhanced_description(&self) -> &str {
        &self.enhanced_description
    }

    /// The recommendation, if the bundle offers a non-blank one.
    pub fn recommendation(&self) -> Option<&str> {
        self.recommendation
            .as_deref()
            .filter(|r| !r.trim().is_empty())
    }

    pub fn regulations(&self) -> &[RegulationReference] {
        &self.regulations
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }
}
