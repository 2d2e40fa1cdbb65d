//! Progress of an in-flight enhancement request.
//!
//! `Idle → Searching → Analysing → Done`, with `Error` reachable from either
//! in-flight stage. A new request always restarts from `Searching`.

use thiserror::Error;
use tokio::sync::watch;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressStage {
    #[default]
    Idle,
    /// Looking up relevant regulations.
    Searching,
    /// Building the suggestion bundle.
    Analysing,
    Done,
    Error,
}

impl ProgressStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Searching => "searching",
            Self::Analysing => "analysing",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Searching | Self::Analysing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Apply an event, returning the next stage or rejecting the transition.
    pub fn next(self, event: ProgressEvent) -> Result<ProgressStage, InvalidTransition> {
        use ProgressEvent as E;
        use ProgressStage as S;

        match (self, event) {
            (_, E::Begin) => Ok(S::Searching),
            (_, E::Reset) => Ok(S::Idle),
            (S::Searching, E::Analyse) => Ok(S::Analysing),
            (S::Analysing, E::Complete) => Ok(S::Done),
            (S::Searching | S::Analysing, E::Fail) => Ok(S::Error),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A new request was issued.
    Begin,
    Analyse,
    Complete,
    Fail,
    /// The review was closed.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid progress transition: {event:?} from {from:?}")]
pub struct InvalidTransition {
    pub from: ProgressStage,
    pub event: ProgressEvent,
}

/// Publishes the current [`ProgressStage`] to any number of subscribers.
#[derive(Debug)]
pub struct ProgressTracker {
    tx: watch::Sender<ProgressStage>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressStage::Idle);
        Self { tx }
    }

    pub fn stage(&self) -> ProgressStage {
        *self.tx.borrow()
    }

    /// Receiver notified on every stage change.
    pub fn subscribe(&self) -> watch::Receiver<ProgressStage> {
        self.tx.subscribe()
    }

    /// Apply an event. Invalid transitions are logged and leave the stage unchanged.
    pub fn apply(&self, event: ProgressEvent) -> Result<ProgressStage, InvalidTransition> {
        let current = self.stage();
        match current.next(event) {
            Ok(next) => {
                if event == ProgressEvent::Begin && current != ProgressStage::Idle {
                    self.tx.send_replace(ProgressStage::Idle);
                }
                self.tx.send_replace(next);
                Ok(next)
            }
            Err(e) => {
                warn!(error = %e, "ignoring progress event");
                Err(e)
            }
        }
    }
}
