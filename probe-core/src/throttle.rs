//! Per-message, per-second error throttling.
//!
//! Under a sustained failure every iteration produces the same error. Each
//! distinct message gets through at most once per wall-clock second.
//!
//! Messages are matched on their exact text, so callers should keep them
//! stable (`"Reading: timed out"`, not a text with a per-call counter in it).

use std::collections::HashMap;

/// Remembers when each message was last emitted.
#[derive(Debug, Clone, Default)]
pub struct ErrorThrottle {
    last_emit: HashMap<String, u64>,
}

impl ErrorThrottle {
    /// Create an empty throttle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `message` should be printed at second `now`.
    ///
    /// A message is printed if it was never seen or was last seen in a
    /// different second. Either way `now` becomes its last-seen second.
    pub fn should_print(&mut self, message: &str, now: u64) -> bool {
        match self.last_emit.get_mut(message) {
            Some(last) => {
                let print = *last != now;
                *last = now;
                print
            }
            None => {
                self.last_emit.insert(message.to_string(), now);
                true
            }
        }
    }

    /// Number of distinct messages seen.
    pub fn len(&self) -> usize {
        self.last_emit.len()
    }

    /// Check if no message was seen yet.
    pub fn is_empty(&self) -> bool {
        self.last_emit.is_empty()
    }
}
