//! Field-level deltas between an observation and a suggestion bundle.
//!
//! Delta rule:
//! - code changes only if the suggested code differs;
//! - description always changes (the enhanced text is new content);
//! - recommendation changes only if the bundle offers one;
//! - regulation changes only if the bundle cites at least one clause.

use inspecta_core::{
    FieldTag, FieldUpdate, Observation, ObservationDelta, RegulationReference, SuggestionBundle,
};

use crate::AcceptanceSet;

/// Render references as `"<number>: <title>"` joined by `"; "`, in input order.
pub fn format_citation(references: &[RegulationReference]) -> Option<String> {
    if references.is_empty() {
        return None;
    }
    let parts: Vec<String> = references.iter().map(|r| r.to_string()).collect();
    Some(parts.join("; "))
}

/// The update accepting `tag` would make, or `None` if it changes nothing.
pub fn field_update(
    observation: &Observation,
    bundle: &SuggestionBundle,
    tag: FieldTag,
) -> Option<FieldUpdate> {
    match tag {
        FieldTag::Code => (bundle.suggested_code() != observation.defect_code)
            .then(|| FieldUpdate::DefectCode(bundle.suggested_code())),
        FieldTag::Description => Some(FieldUpdate::Description(
            bundle.enhanced_description().to_string(),
        )),
        FieldTag::Recommendation => bundle
            .recommendation()
            .map(|r| FieldUpdate::Recommendation(r.to_string())),
        FieldTag::Regulations => format_citation(bundle.regulations()).map(FieldUpdate::Regulation),
    }
}

/// Every field that would change if the bundle were accepted in full.
pub fn compute_delta(observation: &Observation, bundle: &SuggestionBundle) -> ObservationDelta {
    FieldTag::ALL
        .into_iter()
        .filter_map(|tag| field_update(observation, bundle, tag))
        .collect()
}

/// Review state of one suggested field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// The suggested code equals the current one.
    Matches,
    /// The bundle offers nothing for this field.
    NotOffered,
    /// Offered and not yet applied.
    Pending,
    Accepted,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matches => "matches",
            Self::NotOffered => "not offered",
            Self::Pending => "pending",
            Self::Accepted => "accepted",
        }
    }

    /// Whether this field counts towards "N of M applied".
    pub fn is_applicable(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }
}

pub fn field_status(
    observation: &Observation,
    bundle: &SuggestionBundle,
    accepted: &AcceptanceSet,
    tag: FieldTag,
) -> FieldStatus {
    if accepted.is_accepted(tag) {
        return FieldStatus::Accepted;
    }
    match (field_update(observation, bundle, tag), tag) {
        (Some(_), _) => FieldStatus::Pending,
        (None, FieldTag::Code) => FieldStatus::Matches,
        (None, _) => FieldStatus::NotOffered,
    }
}
