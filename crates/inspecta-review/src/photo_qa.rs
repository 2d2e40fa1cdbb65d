//! AI quality assurance of photographic evidence.
//!
//! A scan is never started implicitly: [`PhotoQaAnalyzer::scan`] only accepts
//! a [`ConfirmedScan`], and the only way to get one is to confirm the
//! [`ScanConfirmation`] returned by [`PhotoQaAnalyzer::request_scan`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use inspecta_ai::{InferenceClient, InferenceError, PhotoScanRequest};
use inspecta_core::{
    ClassificationCode, FieldUpdate, Patch, Photo, PhotoAnalysis, PhotoId, is_no_defect_visible,
};
use tracing::{debug, info, warn};

use crate::{Generation, GenerationCounter, ObservationHost, ReviewError};

/// The AI's judgement on the inspector's classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgreementVerdict {
    /// The photo supports the inspector's code.
    Confirms(ClassificationCode),
    /// Nothing defective is visible; the classification is questioned.
    Queries,
    /// The AI proposes a different classification label.
    Suggests(String),
}

impl AgreementVerdict {
    pub fn from_analysis(inspector: ClassificationCode, analysis: &PhotoAnalysis) -> Self {
        if analysis.agreement {
            return Self::Confirms(inspector);
        }
        let label = analysis
            .suggested_classification
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| analysis.ai_classification.trim());
        if is_no_defect_visible(&analysis.ai_classification) || is_no_defect_visible(label) {
            Self::Queries
        } else {
            Self::Suggests(label.to_string())
        }
    }

    /// Short category: `confirms`, `query` or `suggests <label>`.
    pub fn category(&self) -> String {
        match self {
            Self::Confirms(_) => "confirms".to_string(),
            Self::Queries => "query".to_string(),
            Self::Suggests(label) => format!("suggests {label}"),
        }
    }

    pub fn headline(&self) -> String {
        match self {
            Self::Confirms(code) => format!("AI confirms {code}"),
            Self::Queries => "AI queries classification".to_string(),
            Self::Suggests(label) => format!("AI suggests {label}"),
        }
    }

    /// The proposed code, if the verdict suggests one that parses.
    pub fn suggested_code(&self) -> Option<ClassificationCode> {
        match self {
            Self::Suggests(label) => label.parse().ok(),
            _ => None,
        }
    }

    /// Whether the inspector must decide by hand. Never auto-applied.
    pub fn requires_manual_review(&self) -> bool {
        match self {
            Self::Confirms(_) => false,
            Self::Queries => true,
            Self::Suggests(_) => self.suggested_code().is_none(),
        }
    }
}

impl fmt::Display for AgreementVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.headline())
    }
}

/// A scan the user has been asked about but not yet approved.
#[derive(Debug)]
pub struct ScanConfirmation {
    photo: Photo,
}

impl ScanConfirmation {
    pub fn photo(&self) -> &Photo {
        &self.photo
    }

    /// Text to show the user before the photo is sent for analysis.
    pub fn prompt(&self) -> String {
        format!(
            "Analyse photo {} (classified {}) with AI?",
            self.photo.id, self.photo.inspector_classification
        )
    }

    pub fn confirm(self) -> ConfirmedScan {
        ConfirmedScan { photo: self.photo }
    }
}

/// Proof that the user approved a scan.
#[derive(Debug)]
pub struct ConfirmedScan {
    photo: Photo,
}

/// The latest completed analysis of one photo.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoReview {
    pub generation: Generation,
    pub photo: Photo,
    pub analysis: PhotoAnalysis,
    pub verdict: AgreementVerdict,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Completed(PhotoReview),
    /// A newer scan of the same photo was started. The result was dropped.
    Superseded { generation: Generation },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdoptOutcome {
    Applied(ClassificationCode),
    /// The observation already carries the code, or the AI agreed.
    NoChange,
    ManualReview,
}

#[derive(Default)]
struct PhotoSlot {
    generations: GenerationCounter,
    review: Option<PhotoReview>,
    scanning: bool,
}

pub struct PhotoQaAnalyzer<C> {
    client: C,
    photos: Mutex<HashMap<PhotoId, PhotoSlot>>,
}

impl<C: InferenceClient> PhotoQaAnalyzer<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            photos: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PhotoId, PhotoSlot>> {
        self.photos.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask for a scan. Nothing is sent until the confirmation is confirmed.
    pub fn request_scan(&self, photo: Photo) -> ScanConfirmation {
        debug!(photo = %photo.id, "scan requested");
        ScanConfirmation { photo }
    }

    /// Run a confirmed scan, replacing any earlier analysis of the photo.
    pub async fn scan(&self, confirmed: ConfirmedScan) -> Result<ScanOutcome, ReviewError> {
        let photo = confirmed.photo;
        let generation = {
            let mut photos = self.lock();
            let slot = photos.entry(photo.id.clone()).or_default();
            slot.scanning = true;
            slot.generations.issue()
        };
        info!(photo = %photo.id, %generation, "scanning photo");

        let result = self
            .client
            .analyse_photo(&PhotoScanRequest::from(&photo))
            .await
            .and_then(|analysis| analysis.validated().map_err(InferenceError::from));

        let mut photos = self.lock();
        let slot = photos.entry(photo.id.clone()).or_default();
        if let Err(e) = slot.generations.check(generation) {
            debug!(photo = %photo.id, error = %e, "discarding scan result");
            return Ok(ScanOutcome::Superseded { generation });
        }
        slot.scanning = false;

        match result {
            Ok(analysis) => {
                let verdict =
                    AgreementVerdict::from_analysis(photo.inspector_classification, &analysis);
                info!(
                    photo = %photo.id,
                    verdict = %verdict.category(),
                    confidence = analysis.confidence,
                    "photo analysed"
                );
                let review = PhotoReview {
                    generation,
                    photo,
                    analysis,
                    verdict,
                };
                slot.review = Some(review.clone());
                Ok(ScanOutcome::Completed(review))
            }
            Err(e) => {
                warn!(photo = %photo.id, error = %e, "photo analysis failed");
                Err(e.into())
            }
        }
    }

    pub fn analysis(&self, id: &PhotoId) -> Option<PhotoReview> {
        self.lock().get(id).and_then(|slot| slot.review.clone())
    }

    pub fn is_scanning(&self, id: &PhotoId) -> bool {
        self.lock().get(id).is_some_and(|slot| slot.scanning)
    }

    /// Apply a suggested code to the photo's linked observation.
    ///
    /// Only a `Suggests` verdict naming a valid code is applied. A query
    /// always goes to manual review.
    pub fn adopt_suggestion<H: ObservationHost>(
        &self,
        id: &PhotoId,
        host: &H,
    ) -> Result<AdoptOutcome, ReviewError> {
        let review = self
            .analysis(id)
            .ok_or_else(|| ReviewError::NoAnalysis(id.clone()))?;
        let observation_id = review
            .photo
            .observation
            .clone()
            .ok_or_else(|| ReviewError::NoLinkedObservation(id.clone()))?;

        if let AgreementVerdict::Confirms(_) = review.verdict {
            return Ok(AdoptOutcome::NoChange);
        }
        let Some(code) = review.verdict.suggested_code() else {
            info!(photo = %id, verdict = %review.verdict.category(), "left for manual review");
            return Ok(AdoptOutcome::ManualReview);
        };

        let observation = host
            .observation(&observation_id)
            .ok_or_else(|| ReviewError::ObservationNotFound(observation_id.clone()))?;
        if observation.defect_code == code {
            return Ok(AdoptOutcome::NoChange);
        }
        host.apply_update(&observation_id, Patch::single(FieldUpdate::DefectCode(code)))?;
        info!(photo = %id, observation = %observation_id, %code, "photo suggestion adopted");
        Ok(AdoptOutcome::Applied(code))
    }
}
