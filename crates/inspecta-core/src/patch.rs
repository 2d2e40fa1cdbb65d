//! Typed observation updates.
//!
//! Every write to an [`Observation`] travels as one [`Patch`]: either a single
//! field or a bulk delta applied as one indivisible step. The host never sees
//! a sequence of per-field writes computed from a stale snapshot.

use serde::{Deserialize, Serialize};

use crate::{ClassificationCode, FieldTag, Observation};

/// A new value for one observation field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldUpdate {
    DefectCode(ClassificationCode),
    Description(String),
    Recommendation(String),
    Regulation(String),
}

impl FieldUpdate {
    pub fn tag(&self) -> FieldTag {
        match self {
            Self::DefectCode(_) => FieldTag::Code,
            Self::Description(_) => FieldTag::Description,
            Self::Recommendation(_) => FieldTag::Recommendation,
            Self::Regulation(_) => FieldTag::Regulations,
        }
    }
}

/// Field-level changes to apply together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defect_code: Option<ClassificationCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation: Option<String>,
}

impl ObservationDelta {
    pub fn is_empty(&self) -> bool {
        self.changed_fields() == 0
    }

    /// Number of fields this delta sets.
    pub fn changed_fields(&self) -> usize {
        [
            self.defect_code.is_some(),
            self.description.is_some(),
            self.recommendation.is_some(),
            self.regulation.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Tags of the fields this delta sets, in [`FieldTag::ALL`] order.
    pub fn tags(&self) -> Vec<FieldTag> {
        FieldTag::ALL
            .into_iter()
            .filter(|tag| self.contains(*tag))
            .collect()
    }

    pub fn contains(&self, tag: FieldTag) -> bool {
        match tag {
            FieldTag::Code => self.defect_code.is_some(),
            FieldTag::Description => self.description.is_some(),
            FieldTag::Recommendation => self.recommendation.is_some(),
            FieldTag::Regulations => self.regulation.is_some(),
        }
    }

    pub fn set(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::DefectCode(code) => self.defect_code = Some(code),
            FieldUpdate::Description(text) => self.description = Some(text),
            FieldUpdate::Recommendation(text) => self.recommendation = Some(text),
            FieldUpdate::Regulation(text) => self.regulation = Some(text),
        }
    }

    pub fn remove(&mut self, tag: FieldTag) {
        match tag {
            FieldTag::Code => self.defect_code = None,
            FieldTag::Description => self.description = None,
            FieldTag::Recommendation => self.recommendation = None,
            FieldTag::Regulations => self.regulation = None,
        }
    }
}

impl FromIterator<FieldUpdate> for ObservationDelta {
    fn from_iter<I: IntoIterator<Item = FieldUpdate>>(iter: I) -> Self {
        let mut delta = Self::default();
        for update in iter {
            delta.set(update);
        }
        delta
    }
}

/// The single unit of mutation handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Patch {
    SingleField { update: FieldUpdate },
    Bulk { delta: ObservationDelta },
}

impl Patch {
    pub fn single(update: FieldUpdate) -> Self {
        Self::SingleField { update }
    }

    pub fn bulk(delta: ObservationDelta) -> Self {
        Self::Bulk { delta }
    }

    pub fn tags(&self) -> Vec<FieldTag> {
        match self {
            Self::SingleField { update } => vec![update.tag()],
            Self::Bulk { delta } => delta.tags(),
        }
    }

    pub fn changed_fields(&self) -> usize {
        match self {
            Self::SingleField { .. } => 1,
            Self::Bulk { delta } => delta.changed_fields(),
        }
    }
}

impl Observation {
    /// Apply a patch in place. All fields of a bulk patch land together.
    pub fn apply(&mut self, patch: &Patch) {
        match patch {
            Patch::SingleField { update } => self.apply_field(update.clone()),
            Patch::Bulk { delta } => {
                if let Some(code) = delta.defect_code {
                    self.defect_code = code;
                }
                if let Some(text) = &delta.description {
                    self.description.clone_from(text);
                }
                if let Some(text) = &delta.recommendation {
                    self.recommendation.clone_from(text);
                }
                if let Some(text) = &delta.regulation {
                    self.regulation = Some(text.clone());
                }
            }
        }
    }

    fn apply_field(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::DefectCode(code) => self.defect_code = code,
            FieldUpdate::Description(text) => self.description = text,
            FieldUpdate::Recommendation(text) => self.recommendation = text,
            FieldUpdate::Regulation(text) => self.regulation = Some(text),
        }
    }
}
