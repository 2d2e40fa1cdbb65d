//! Generation tokens for discarding results of superseded requests.
//!
//! Every request takes a fresh token. On completion the result is kept only
//! if its token is still the latest; the underlying call is never cancelled.

use std::fmt;

use crate::ReviewError;

/// Monotonically increasing request tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: u64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, invalidating every earlier one.
    pub fn issue(&mut self) -> Generation {
        self.latest += 1;
        Generation(self.latest)
    }

    /// Invalidate the current generation without starting a request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn latest(&self) -> Option<Generation> {
        (self.latest > 0).then_some(Generation(self.latest))
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.latest
    }

    pub fn check(&self, generation: Generation) -> Result<(), ReviewError> {
        if self.is_current(generation) {
            Ok(())
        } else {
            Err(ReviewError::Superseded(generation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_counter_has_no_generation() {
        let counter = GenerationCounter::new();
        assert!(counter.latest().is_none());
    }

    #[test]
    fn issue_supersedes_previous() {
        let mut counter = GenerationCounter::new();
        let a = counter.issue();
        let b = counter.issue();
        assert!(b > a);
        assert!(!counter.is_current(a));
        assert!(counter.is_current(b));
        assert!(matches!(counter.check(a), Err(ReviewError::Superseded(g)) if g == a));
    }

    #[test]
    fn invalidate_retires_current() {
        let mut counter = GenerationCounter::new();
        let a = counter.issue();
        counter.invalidate();
        assert!(!counter.is_current(a));
        let b = counter.issue();
        assert_eq!(b.get(), 3);
    }
}
