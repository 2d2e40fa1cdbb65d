//! In-memory observation host: owns the observation list, applies patches,
//! and keeps an audit trail of every write.

mod elapsed;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use inspecta_core::{FieldTag, Observation, ObservationId, Patch};
use inspecta_review::{HostError, ObservationHost};

pub use elapsed::ElapsedTicker;

/// One applied patch, timestamped by the host.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub observation: ObservationId,
    pub fields: Vec<FieldTag>,
    pub bulk: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Default)]
struct HostState {
    observations: BTreeMap<ObservationId, Observation>,
    audit_entries: Vec<AuditRecord>,
    read_only: bool,
}

/// Observation store kept in process memory.
#[derive(Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace an observation.
    pub fn insert(&self, observation: Observation) {
        self.lock()
            .observations
            .insert(observation.id.clone(), observation);
    }

    pub fn get(&self, id: &ObservationId) -> Option<Observation> {
        self.lock().observations.get(id).cloned()
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.lock().observations.values().cloned().collect()
    }

    pub fn audit_entries(&self) -> Vec<AuditRecord> {
        self.lock().audit_entries.clone()
    }

    /// Refuse every update, as for a certificate that has been issued.
    pub fn set_read_only(&self, read_only: bool) {
        self.lock().read_only = read_only;
    }
}

impl FromIterator<Observation> for MemoryHost {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        let host = Self::new();
        for observation in iter {
            host.insert(observation);
        }
        host
    }
}

impl ObservationHost for MemoryHost {
    fn observation(&self, id: &ObservationId) -> Option<Observation> {
        self.get(id)
    }

    fn apply_update(&self, id: &ObservationId, patch: Patch) -> Result<(), HostError> {
        let mut state = self.lock();
        if state.read_only {
            return Err(HostError::Rejected("observations are read-only".into()));
        }
        let observation = state
            .observations
            .get_mut(id)
            .ok_or_else(|| HostError::NotFound(id.clone()))?;
        observation.apply(&patch);

        let record = AuditRecord {
            observation: id.clone(),
            fields: patch.tags(),
            bulk: matches!(patch, Patch::Bulk { .. }),
            timestamp: chrono::Utc::now(),
        };
        tracing::info!(
            observation = %record.observation,
            fields = record.fields.len(),
            bulk = record.bulk,
            "observation updated"
        );
        state.audit_entries.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspecta_core::{ClassificationCode, FieldUpdate, ObservationDelta};

    fn host() -> MemoryHost {
        [Observation::new("obs-1", ClassificationCode::C3).with_description("Loose connection")]
            .into_iter()
            .collect()
    }

    #[test]
    fn single_field_patch_is_audited() {
        let host = host();
        let id = ObservationId::from("obs-1");
        host.apply_update(
            &id,
            Patch::single(FieldUpdate::DefectCode(ClassificationCode::C2)),
        )
        .unwrap();

        assert_eq!(host.get(&id).unwrap().defect_code, ClassificationCode::C2);
        let audit = host.audit_entries();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].fields, vec![FieldTag::Code]);
        assert!(!audit[0].bulk);
    }

    #[test]
    fn bulk_patch_is_one_entry() {
        let host = host();
        let id = ObservationId::from("obs-1");
        let delta: ObservationDelta = [
            FieldUpdate::Description("Loose terminal".into()),
            FieldUpdate::Recommendation("Re-terminate".into()),
        ]
        .into_iter()
        .collect();
        host.apply_update(&id, Patch::bulk(delta)).unwrap();

        let obs = host.get(&id).unwrap();
        assert_eq!(obs.description, "Loose terminal");
        assert_eq!(obs.recommendation, "Re-terminate");
        let audit = host.audit_entries();
        assert_eq!(audit.len(), 1);
        assert!(audit[0].bulk);
        assert_eq!(audit[0].fields.len(), 2);
    }

    #[test]
    fn unknown_observation_is_not_found() {
        let host = host();
        let err = host
            .apply_update(
                &ObservationId::from("missing"),
                Patch::single(FieldUpdate::Description("x".into())),
            )
            .unwrap_err();
        assert!(matches!(err, HostError::NotFound(_)));
        assert!(host.audit_entries().is_empty());
    }

    #[test]
    fn read_only_rejects_updates() {
        let host = host();
        host.set_read_only(true);
        let id = ObservationId::from("obs-1");
        let err = host
            .apply_update(&id, Patch::single(FieldUpdate::Description("x".into())))
            .unwrap_err();
        assert!(matches!(err, HostError::Rejected(_)));
        assert_eq!(host.get(&id).unwrap().description, "Loose connection");
    }
}
