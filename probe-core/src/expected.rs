//! Expected per-key state.
//!
//! The tester only ever increments keys, and it remembers the value the
//! store returned for each of its own increments. Before the next increment
//! on that key it reads the key back and compares:
//!
//! - read lower than expected: acknowledged increments were **lost**
//! - read higher than expected: the store applied increments this tester
//!   never got an acknowledgement for (**not acknowledged**)
//!
//! The check always runs against the state left by this tester's *previous*
//! write to the key, never the write about to happen.

use std::collections::HashMap;

/// Result of comparing an observed value against the expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discrepancy {
    /// No expectation recorded for the key yet.
    Unknown,
    /// The observed value matches the expectation.
    Consistent,
    /// The store holds less than expected, by this many increments.
    Lost(u64),
    /// The store holds more than expected, by this many increments.
    NotAcknowledged(u64),
}

impl Discrepancy {
    /// Whether this result counts as a consistency violation.
    pub fn is_violation(&self) -> bool {
        matches!(self, Discrepancy::Lost(_) | Discrepancy::NotAcknowledged(_))
    }
}

/// The value each key should hold, as far as this tester knows.
///
/// Grows with the number of distinct keys written, which the key space bounds.
#[derive(Debug, Clone, Default)]
pub struct ExpectedState {
    cache: HashMap<String, i64>,
}

impl ExpectedState {
    /// Create an empty model with no opinion about any key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare a value read from the store with the expectation for `key`.
    pub fn check(&self, key: &str, observed: i64) -> Discrepancy {
        let Some(&expected) = self.cache.get(key) else {
            return Discrepancy::Unknown;
        };
        if observed < expected {
            Discrepancy::Lost(expected.abs_diff(observed))
        } else if observed > expected {
            Discrepancy::NotAcknowledged(observed.abs_diff(expected))
        } else {
            Discrepancy::Consistent
        }
    }

    /// Record the value the store returned for a successful increment.
    pub fn update(&mut self, key: &str, value: i64) {
        if let Some(slot) = self.cache.get_mut(key) {
            *slot = value;
        } else {
            self.cache.insert(key.to_string(), value);
        }
    }

    /// The current expectation for `key`, if any.
    pub fn expected(&self, key: &str) -> Option<i64> {
        self.cache.get(key).copied()
    }

    /// Number of keys with an expectation.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if no key has an expectation yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_is_not_judged() {
        let model = ExpectedState::new();
        assert_eq!(model.check("k", 0), Discrepancy::Unknown);
        assert_eq!(model.check("k", 12345), Discrepancy::Unknown);
        assert!(!model.check("k", -3).is_violation());
    }

    #[test]
    fn matching_read_is_consistent() {
        let mut model = ExpectedState::new();
        model.update("k", 10);
        assert_eq!(model.check("k", 10), Discrepancy::Consistent);
    }

    #[test]
    fn lower_read_is_lost() {
        let mut model = ExpectedState::new();
        model.update("k", 10);
        assert_eq!(model.check("k", 7), Discrepancy::Lost(3));
    }

    #[test]
    fn higher_read_is_not_acknowledged() {
        let mut model = ExpectedState::new();
        model.update("k", 5);
        assert_eq!(model.check("k", 7), Discrepancy::NotAcknowledged(2));
    }

    #[test]
    fn key_vanishing_counts_every_increment_lost() {
        // A missing key reads as 0.
        let mut model = ExpectedState::new();
        model.update("k", 4);
        assert_eq!(model.check("k", 0), Discrepancy::Lost(4));
    }

    #[test]
    fn update_overwrites() {
        let mut model = ExpectedState::new();
        model.update("k", 1);
        model.update("k", 9);
        assert_eq!(model.expected("k"), Some(9));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn keys_are_independent() {
        let mut model = ExpectedState::new();
        model.update("a", 3);
        assert_eq!(model.check("b", 100), Discrepancy::Unknown);
        assert_eq!(model.check("a", 3), Discrepancy::Consistent);
        assert!(!model.is_empty());
    }
}
