//! Test doubles for the inference client and the observation host.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use inspecta_ai::{EnhanceRequest, InferenceClient, InferenceError, PhotoScanRequest};
use inspecta_core::{
    ClassificationCode, Observation, ObservationId, Patch, PhotoAnalysis, PhotoFindings,
    InspectorGuidance, RegulationReference, SuggestionBundle,
};
use tokio::sync::oneshot;

use crate::host::{HostError, ObservationHost};

pub fn scenario_observation() -> Observation {
    Observation::new("obs-1", ClassificationCode::C3)
        .with_location("Consumer unit")
        .with_description("Loose connection")
        .with_recommendation("")
}

pub fn scenario_bundle() -> SuggestionBundle {
    SuggestionBundle::new(
        ClassificationCode::C2,
        0.91,
        "Loose terminal connection at DB observed, overheating risk",
        Some("Re-terminate and torque to spec".into()),
        vec![RegulationReference::new("526.1", "Connections")],
        None,
    )
    .unwrap()
}

pub fn bundle_with_description(text: &str) -> SuggestionBundle {
    SuggestionBundle::new(ClassificationCode::C3, 0.6, text, None, vec![], None).unwrap()
}

pub fn photo_analysis(ai: &str, agreement: bool, suggested: Option<&str>) -> PhotoAnalysis {
    PhotoAnalysis {
        ai_classification: ai.to_string(),
        agreement,
        suggested_classification: suggested.map(str::to_string),
        feedback: if agreement {
            String::new()
        } else {
            "Classification not supported by the photo".to_string()
        },
        findings: PhotoFindings::default(),
        guidance: InspectorGuidance::default(),
        confidence: 75.0,
        photo_quality: None,
    }
}

type Reply<T> = oneshot::Sender<Result<T, InferenceError>>;

/// Client whose calls stay pending until the test releases them.
#[derive(Default)]
pub struct GatedClient {
    enhance: Mutex<Vec<Option<Reply<SuggestionBundle>>>>,
    photos: Mutex<Vec<Option<Reply<PhotoAnalysis>>>>,
}

impl GatedClient {
    pub fn enhance_calls(&self) -> usize {
        self.enhance.lock().unwrap().len()
    }

    pub fn photo_calls(&self) -> usize {
        self.photos.lock().unwrap().len()
    }

    pub fn resolve_enhance(&self, call: usize, result: Result<SuggestionBundle, InferenceError>) {
        let reply = self.enhance.lock().unwrap()[call].take().expect("already resolved");
        let _ = reply.send(result);
    }

    pub fn resolve_photo(&self, call: usize, result: Result<PhotoAnalysis, InferenceError>) {
        let reply = self.photos.lock().unwrap()[call].take().expect("already resolved");
        let _ = reply.send(result);
    }
}

#[async_trait]
impl InferenceClient for GatedClient {
    async fn enhance_observation(
        &self,
        _request: &EnhanceRequest,
    ) -> Result<SuggestionBundle, InferenceError> {
        let (tx, rx) = oneshot::channel();
        self.enhance.lock().unwrap().push(Some(tx));
        rx.await
            .unwrap_or_else(|_| Err(InferenceError::Unavailable("reply dropped".into())))
    }

    async fn analyse_photo(
        &self,
        _request: &PhotoScanRequest,
    ) -> Result<PhotoAnalysis, InferenceError> {
        let (tx, rx) = oneshot::channel();
        self.photos.lock().unwrap().push(Some(tx));
        rx.await
            .unwrap_or_else(|_| Err(InferenceError::Unavailable("reply dropped".into())))
    }
}

/// Client that answers immediately from a queue of canned results.
#[derive(Default)]
pub struct ScriptedClient {
    enhance: Mutex<VecDeque<Result<SuggestionBundle, InferenceError>>>,
    photos: Mutex<VecDeque<Result<PhotoAnalysis, InferenceError>>>,
    pub requests: Mutex<Vec<EnhanceRequest>>,
}

impl ScriptedClient {
    pub fn with_bundles(results: Vec<Result<SuggestionBundle, InferenceError>>) -> Self {
        Self {
            enhance: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    pub fn with_photos(results: Vec<Result<PhotoAnalysis, InferenceError>>) -> Self {
        Self {
            photos: Mutex::new(results.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn enhance_observation(
        &self,
        request: &EnhanceRequest,
    ) -> Result<SuggestionBundle, InferenceError> {
        self.requests.lock().unwrap().push(request.clone());
        self.enhance
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InferenceError::Unavailable("script exhausted".into())))
    }

    async fn analyse_photo(
        &self,
        _request: &PhotoScanRequest,
    ) -> Result<PhotoAnalysis, InferenceError> {
        self.photos
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InferenceError::Unavailable("script exhausted".into())))
    }
}

/// Host that records every patch it receives.
#[derive(Default)]
pub struct RecordingHost {
    observations: Mutex<HashMap<ObservationId, Observation>>,
    updates: Mutex<Vec<(ObservationId, Patch)>>,
    reject: AtomicBool,
}

impl RecordingHost {
    pub fn with(observations: impl IntoIterator<Item = Observation>) -> Self {
        let host = Self::default();
        {
            let mut map = host.observations.lock().unwrap();
            for obs in observations {
                map.insert(obs.id.clone(), obs);
            }
        }
        host
    }

    pub fn updates(&self) -> Vec<(ObservationId, Patch)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn get(&self, id: &str) -> Observation {
        self.observations.lock().unwrap()[&ObservationId::from(id)].clone()
    }

    /// Simulate an edit made by the user directly in the form.
    pub fn edit(&self, id: &str, f: impl FnOnce(&mut Observation)) {
        let mut map = self.observations.lock().unwrap();
        f(map.get_mut(&ObservationId::from(id)).unwrap());
    }

    pub fn reject_updates(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }
}

impl ObservationHost for RecordingHost {
    fn observation(&self, id: &ObservationId) -> Option<Observation> {
        self.observations.lock().unwrap().get(id).cloned()
    }

    fn apply_update(&self, id: &ObservationId, patch: Patch) -> Result<(), HostError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(HostError::Rejected("read-only certificate".into()));
        }
        let mut map = self.observations.lock().unwrap();
        let obs = map
            .get_mut(id)
            .ok_or_else(|| HostError::NotFound(id.clone()))?;
        obs.apply(&patch);
        self.updates.lock().unwrap().push((id.clone(), patch));
        Ok(())
    }
}

pub mod strategies {
    use inspecta_core::{ClassificationCode, Observation, RegulationReference, SuggestionBundle};
    use proptest::prelude::*;

    pub fn arb_code() -> impl Strategy<Value = ClassificationCode> {
        prop::sample::select(ClassificationCode::ALL.to_vec())
    }

    pub fn arb_reference() -> impl Strategy<Value = RegulationReference> {
        ("[0-9]{3}(\\.[0-9]{1,2}){0,2}", "[A-Za-z ]{1,20}")
            .prop_map(|(number, title)| RegulationReference::new(number, title))
    }

    prop_compose! {
        pub fn arb_observation()(
            code in arb_code(),
            description in ".{0,40}",
            recommendation in ".{0,40}",
        ) -> Observation {
            Observation::new("obs-p", code)
                .with_description(description)
                .with_recommendation(recommendation)
        }
    }

    prop_compose! {
        pub fn arb_bundle()(
            code in arb_code(),
            confidence in 0.0f64..=1.0,
            description in "[a-z]{1,40}",
            recommendation in prop::option::of("[ a-z]{0,20}"),
            refs in prop::collection::vec(arb_reference(), 0..4),
        ) -> SuggestionBundle {
            SuggestionBundle::new(code, confidence, description, recommendation, refs, None).unwrap()
        }
    }
}
