//! One observation-enhancement review: request, progress, and acceptance.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use inspecta_ai::{EnhanceRequest, InferenceClient, InferenceError};
use inspecta_core::{FieldTag, ObservationId, Patch, SuggestionBundle};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::merge::{self, FieldStatus};
use crate::progress::{ProgressEvent, ProgressStage, ProgressTracker};
use crate::{AcceptanceProgress, AcceptanceSet, Generation, GenerationCounter, ObservationHost, ReviewError};

#[derive(Debug, Clone)]
pub struct ReviewConfig {
    /// How long `Searching` is shown before switching to `Analysing`.
    /// `Duration::ZERO` switches immediately.
    pub searching_pace: Duration,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            searching_pace: Duration::from_millis(800),
        }
    }
}

impl ReviewConfig {
    /// No pacing.
    pub fn immediate() -> Self {
        Self {
            searching_pace: Duration::ZERO,
        }
    }
}

/// Result of one enhancement request.
#[derive(Debug, Clone, PartialEq)]
pub enum EnhanceOutcome {
    Ready {
        generation: Generation,
        bundle: SuggestionBundle,
    },
    /// A newer request took this one's place. The result was dropped.
    Superseded { generation: Generation },
}

impl EnhanceOutcome {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Ready { generation, .. } | Self::Superseded { generation } => *generation,
        }
    }

    pub fn bundle(&self) -> Option<&SuggestionBundle> {
        match self {
            Self::Ready { bundle, .. } => Some(bundle),
            Self::Superseded { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Applied(FieldTag),
    /// The field already holds what the bundle suggests, or nothing is offered.
    NoChange,
    AlreadyAccepted,
}

impl fmt::Display for AcceptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied(tag) => write!(f, "{tag} applied"),
            Self::NoChange => f.write_str("nothing to change"),
            Self::AlreadyAccepted => f.write_str("already applied"),
        }
    }
}

/// What `accept_all` wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptSummary {
    pub fields_updated: usize,
    pub tags: Vec<FieldTag>,
}

impl fmt::Display for AcceptSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fields_updated {
            1 => f.write_str("1 field updated"),
            n => write!(f, "{n} fields updated"),
        }
    }
}

struct Review {
    generation: Generation,
    observation: ObservationId,
    bundle: SuggestionBundle,
    accepted: AcceptanceSet,
}

#[derive(Default)]
struct SessionState {
    generations: GenerationCounter,
    last_request: Option<(ObservationId, EnhanceRequest)>,
    review: Option<Review>,
}

impl SessionState {
    fn review_mut(&mut self, generation: Generation) -> Result<&mut Review, ReviewError> {
        let current = self.review.as_ref().map(|r| r.generation);
        match self.review.as_mut() {
            Some(review) if review.generation == generation => Ok(review),
            _ => {
                warn!(requested = %generation, ?current, "acceptance against a stale bundle");
                Err(ReviewError::Stale {
                    requested: generation,
                    current,
                })
            }
        }
    }
}

/// Drives enhancement requests for a host's observations and applies accepted
/// suggestions back through [`ObservationHost`].
///
/// Only the latest request's result is ever stored. Session state is locked
/// briefly and never across an await.
pub struct EnhancementSession<C, H> {
    client: C,
    host: H,
    config: ReviewConfig,
    progress: ProgressTracker,
    state: Mutex<SessionState>,
}

impl<C: InferenceClient, H: ObservationHost> EnhancementSession<C, H> {
    pub fn new(client: C, host: H, config: ReviewConfig) -> Self {
        Self {
            client,
            host,
            config,
            progress: ProgressTracker::new(),
            state: Mutex::new(SessionState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Request a suggestion bundle for the observation's current content.
    ///
    /// Supersedes any request still in flight.
    pub async fn enhance(&self, id: &ObservationId) -> Result<EnhanceOutcome, ReviewError> {
        let observation = self
            .host
            .observation(id)
            .ok_or_else(|| ReviewError::ObservationNotFound(id.clone()))?;
        self.dispatch(id.clone(), EnhanceRequest::from(&observation))
            .await
    }

    /// Re-issue the last request under a fresh generation.
    pub async fn retry(&self) -> Result<EnhanceOutcome, ReviewError> {
        let (id, request) = self
            .lock()
            .last_request
            .clone()
            .ok_or(ReviewError::NothingToRetry)?;
        debug!(observation = %id, "retrying enhancement");
        self.dispatch(id, request).await
    }

    async fn dispatch(
        &self,
        id: ObservationId,
        request: EnhanceRequest,
    ) -> Result<EnhanceOutcome, ReviewError> {
        let generation = {
            let mut state = self.lock();
            let generation = state.generations.issue();
            state.last_request = Some((id.clone(), request.clone()));
            state.review = None;
            let _ = self.progress.apply(ProgressEvent::Begin);
            generation
        };
        info!(observation = %id, %generation, "requesting enhancement");

        let call = self.client.enhance_observation(&request);
        let result = if self.config.searching_pace.is_zero() {
            self.show_analysing(generation);
            call.await
        } else {
            tokio::pin!(call);
            tokio::select! {
                result = &mut call => result,
                _ = tokio::time::sleep(self.config.searching_pace) => {
                    self.show_analysing(generation);
                    call.await
                }
            }
        };
        self.finish(id, generation, result)
    }

    fn show_analysing(&self, generation: Generation) {
        let state = self.lock();
        if state.generations.is_current(generation)
            && self.progress.stage() == ProgressStage::Searching
        {
            let _ = self.progress.apply(ProgressEvent::Analyse);
        }
    }

    fn finish(
        &self,
        id: ObservationId,
        generation: Generation,
        result: Result<SuggestionBundle, InferenceError>,
    ) -> Result<EnhanceOutcome, ReviewError> {
        let mut state = self.lock();
        if let Err(e) = state.generations.check(generation) {
            debug!(observation = %id, error = %e, "discarding result");
            return Ok(EnhanceOutcome::Superseded { generation });
        }

        match result {
            Ok(bundle) => {
                if self.progress.stage() == ProgressStage::Searching {
                    let _ = self.progress.apply(ProgressEvent::Analyse);
                }
                let _ = self.progress.apply(ProgressEvent::Complete);
                info!(
                    observation = %id,
                    %generation,
                    code = %bundle.suggested_code(),
                    confidence = bundle.confidence_percent(),
                    "suggestion ready"
                );
                state.review = Some(Review {
                    generation,
                    observation: id,
                    bundle: bundle.clone(),
                    accepted: AcceptanceSet::new(),
                });
                Ok(EnhanceOutcome::Ready { generation, bundle })
            }
            Err(e) => {
                let _ = self.progress.apply(ProgressEvent::Fail);
                warn!(observation = %id, %generation, error = %e, "enhancement failed");
                Err(e.into())
            }
        }
    }

    /// Apply one suggested field to the observation.
    pub fn accept_field(
        &self,
        generation: Generation,
        tag: FieldTag,
    ) -> Result<AcceptOutcome, ReviewError> {
        let mut state = self.lock();
        let review = state.review_mut(generation)?;
        if review.accepted.is_accepted(tag) {
            return Ok(AcceptOutcome::AlreadyAccepted);
        }

        let observation = self
            .host
            .observation(&review.observation)
            .ok_or_else(|| ReviewError::ObservationNotFound(review.observation.clone()))?;
        let Some(update) = merge::field_update(&observation, &review.bundle, tag) else {
            debug!(observation = %review.observation, field = %tag, "nothing to apply");
            return Ok(AcceptOutcome::NoChange);
        };

        self.host
            .apply_update(&review.observation, Patch::single(update))?;
        review.accepted.accept(tag);
        info!(observation = %review.observation, field = %tag, "field accepted");
        Ok(AcceptOutcome::Applied(tag))
    }

    /// Apply every pending field in one update and close the review.
    pub fn accept_all(&self, generation: Generation) -> Result<AcceptSummary, ReviewError> {
        let mut state = self.lock();
        let review = state.review_mut(generation)?;

        let observation = self
            .host
            .observation(&review.observation)
            .ok_or_else(|| ReviewError::ObservationNotFound(review.observation.clone()))?;
        let mut delta = merge::compute_delta(&observation, &review.bundle);
        for tag in review.accepted.iter() {
            delta.remove(tag);
        }

        let tags = delta.tags();
        if !delta.is_empty() {
            self.host
                .apply_update(&review.observation, Patch::bulk(delta))?;
        }
        info!(observation = %review.observation, fields = tags.len(), "suggestion accepted");

        state.review = None;
        Ok(AcceptSummary {
            fields_updated: tags.len(),
            tags,
        })
    }

    pub fn stage(&self) -> ProgressStage {
        self.progress.stage()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressStage> {
        self.progress.subscribe()
    }

    /// Bundle under review and the generation acceptances must quote.
    pub fn current_bundle(&self) -> Option<(Generation, SuggestionBundle)> {
        self.lock()
            .review
            .as_ref()
            .map(|r| (r.generation, r.bundle.clone()))
    }

    /// Status of one field against the observation as it is now.
    pub fn field_status(&self, tag: FieldTag) -> Option<FieldStatus> {
        let state = self.lock();
        let review = state.review.as_ref()?;
        let observation = self.host.observation(&review.observation)?;
        Some(merge::field_status(
            &observation,
            &review.bundle,
            &review.accepted,
            tag,
        ))
    }

    pub fn acceptance_progress(&self) -> Option<AcceptanceProgress> {
        let state = self.lock();
        let review = state.review.as_ref()?;
        let observation = self.host.observation(&review.observation)?;
        let applicable = FieldTag::ALL
            .into_iter()
            .filter(|&tag| {
                merge::field_status(&observation, &review.bundle, &review.accepted, tag)
                    .is_applicable()
            })
            .count();
        Some(review.accepted.progress(applicable))
    }

    /// Close the review surface: drop the bundle and ignore any call in flight.
    pub fn close(&self) {
        let mut state = self.lock();
        state.generations.invalidate();
        state.review = None;
        state.last_request = None;
        let _ = self.progress.apply(ProgressEvent::Reset);
    }
}
