//! Which suggestion fields have already been applied from the current bundle.

use std::collections::BTreeSet;
use std::fmt;

use inspecta_core::FieldTag;

/// Set of applied field tags, scoped to one suggestion bundle.
///
/// Reporting only: whether the observation changed is decided by the merge
/// engine, not by this set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptanceSet {
    tags: BTreeSet<FieldTag>,
}

impl AcceptanceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a tag accepted. Returns `false` if it already was.
    pub fn accept(&mut self, tag: FieldTag) -> bool {
        self.tags.insert(tag)
    }

    pub fn is_accepted(&self, tag: FieldTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn reset(&mut self) {
        self.tags.clear();
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FieldTag> + '_ {
        self.tags.iter().copied()
    }

    pub fn progress(&self, applicable: usize) -> AcceptanceProgress {
        AcceptanceProgress {
            accepted: self.len(),
            applicable,
        }
    }
}

/// "N of M applied".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptanceProgress {
    pub accepted: usize,
    pub applicable: usize,
}

impl AcceptanceProgress {
    pub fn is_complete(&self) -> bool {
        self.accepted >= self.applicable
    }
}

impl fmt::Display for AcceptanceProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} applied", self.accepted, self.applicable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_is_idempotent() {
        let mut set = AcceptanceSet::new();
        assert!(set.accept(FieldTag::Description));
        assert!(!set.accept(FieldTag::Description));
        assert_eq!(set.len(), 1);
        assert!(set.is_accepted(FieldTag::Description));
        assert!(!set.is_accepted(FieldTag::Code));
    }

    #[test]
    fn reset_clears_everything() {
        let mut set = AcceptanceSet::new();
        set.accept(FieldTag::Code);
        set.accept(FieldTag::Regulations);
        set.reset();
        assert!(set.is_empty());
    }

    #[test]
    fn progress_display() {
        let mut set = AcceptanceSet::new();
        set.accept(FieldTag::Code);
        let progress = set.progress(3);
        assert_eq!(progress.to_string(), "1 of 3 applied");
        assert!(!progress.is_complete());
        set.accept(FieldTag::Description);
        set.accept(FieldTag::Recommendation);
        assert!(set.progress(3).is_complete());
    }
}
