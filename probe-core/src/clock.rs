//! Wall-clock seconds for reporting and outage accounting.
//!
//! Everything in kvprobe that depends on time only cares about whole unix
//! seconds: reports happen once per second, errors are throttled per second,
//! and outage durations are measured in seconds. [`Clock`] is the seam that
//! lets tests drive those decisions without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current wall-clock second.
pub trait Clock: Send + Sync {
    /// Current time as whole seconds since the unix epoch.
    fn now_secs(&self) -> u64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// A manually advanced clock for tests.
///
/// Clones share the same underlying time, so a test can keep one handle
/// and hand another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock stopped at the given second.
    pub fn new(now_secs: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now_secs)),
        }
    }

    /// Move the clock to an absolute second.
    pub fn set(&self, now_secs: u64) {
        self.now.store(now_secs, Ordering::SeqCst);
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
