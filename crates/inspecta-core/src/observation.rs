//! Observation records: one defect or finding row on an inspection certificate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseCodeError;

/// Opaque, immutable observation identifier assigned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationId(String);

impl ObservationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObservationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObservationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Observation classification code used on electrical installation condition reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationCode {
    /// Danger present, risk of injury.
    #[serde(rename = "C1")]
    C1,
    /// Potentially dangerous.
    #[serde(rename = "C2")]
    C2,
    /// Improvement recommended.
    #[serde(rename = "C3")]
    C3,
    /// Further investigation required without delay.
    #[serde(rename = "FI")]
    FurtherInvestigation,
    #[serde(rename = "N/A")]
    NotApplicable,
    /// Limitation on the inspection.
    #[serde(rename = "LIM")]
    Limitation,
}

impl ClassificationCode {
    pub const ALL: [ClassificationCode; 6] = [
        Self::C1,
        Self::C2,
        Self::C3,
        Self::FurtherInvestigation,
        Self::NotApplicable,
        Self::Limitation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::C1 => "C1",
            Self::C2 => "C2",
            Self::C3 => "C3",
            Self::FurtherInvestigation => "FI",
            Self::NotApplicable => "N/A",
            Self::Limitation => "LIM",
        }
    }

    /// Short meaning shown next to the code on the certificate.
    pub fn meaning(&self) -> &'static str {
        match self {
            Self::C1 => "Danger present",
            Self::C2 => "Potentially dangerous",
            Self::C3 => "Improvement recommended",
            Self::FurtherInvestigation => "Further investigation required",
            Self::NotApplicable => "Not applicable",
            Self::Limitation => "Limitation",
        }
    }

    /// Whether the host shows a recommendation field for this code.
    ///
    /// The data model still accepts a recommendation for `N/A`; only the
    /// presentation changes.
    pub fn shows_recommendation(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }
}

impl fmt::Display for ClassificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassificationCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "C1" => Ok(Self::C1),
            "C2" => Ok(Self::C2),
            "C3" => Ok(Self::C3),
            "FI" => Ok(Self::FurtherInvestigation),
            "N/A" | "NA" => Ok(Self::NotApplicable),
            "LIM" => Ok(Self::Limitation),
            _ => Err(ParseCodeError(s.to_string())),
        }
    }
}

/// A defect/finding record owned by the host's observation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: ObservationId,
    pub defect_code: ClassificationCode,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub rectified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation: Option<String>,
    /// Checklist item that raised this observation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist_item: Option<String>,
}

impl Observation {
    /// A manually added observation with empty free-text fields.
    pub fn new(id: impl Into<ObservationId>, defect_code: ClassificationCode) -> Self {
        Self {
            id: id.into(),
            defect_code,
            location: String::new(),
            description: String::new(),
            recommendation: String::new(),
            rectified: false,
            regulation: None,
            checklist_item: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }
}
