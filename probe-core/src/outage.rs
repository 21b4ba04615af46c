//! Outage accounting.
//!
//! An outage opens on the first failed operation seen while no outage is
//! open. It does not close when the next operation succeeds: it closes at the
//! first report tick that sees the failure counters unchanged since the
//! previous tick.
//!
//! The result is coarse by up to one tick in either direction, and a flapping
//! connection is reported as one long outage.

/// Tracks the open outage and the durations of closed ones.
#[derive(Debug, Clone, Default)]
pub struct OutageTracker {
    /// Second at which the open outage started.
    current_start: Option<u64>,
    /// Durations of closed outages in seconds, oldest first.
    history: Vec<u64>,
    /// Failed reads at the previous tick.
    last_failed_reads: u64,
    /// Failed writes at the previous tick.
    last_failed_writes: u64,
}

impl OutageTracker {
    /// Create a tracker with no outage open and an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Note a failed operation at `now`.
    ///
    /// Opens an outage if none is open. Returns `true` if this call opened one.
    pub fn record_failure(&mut self, now: u64) -> bool {
        if self.current_start.is_some() {
            return false;
        }
        self.current_start = Some(now);
        true
    }

    /// Run the once-per-report check.
    ///
    /// Closes the open outage if neither failure counter moved since the
    /// previous tick, then takes the counters as the baseline for the next
    /// tick. Returns the duration of the outage closed by this tick, if any.
    pub fn tick(&mut self, now: u64, failed_reads: u64, failed_writes: u64) -> Option<u64> {
        let quiet =
            failed_reads == self.last_failed_reads && failed_writes == self.last_failed_writes;

        let closed = match self.current_start {
            Some(start) if quiet => {
                let duration = now.saturating_sub(start);
                self.history.push(duration);
                self.current_start = None;
                Some(duration)
            }
            _ => None,
        };

        self.last_failed_reads = failed_reads;
        self.last_failed_writes = failed_writes;
        closed
    }

    /// Whether an outage is currently open.
    pub fn is_open(&self) -> bool {
        self.current_start.is_some()
    }

    /// Second at which the open outage started.
    pub fn current_start(&self) -> Option<u64> {
        self.current_start
    }

    /// Durations of every closed outage, oldest first.
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// Duration of the most recently closed outage.
    pub fn last(&self) -> Option<u64> {
        self.history.last().copied()
    }

    /// Duration of the longest closed outage.
    pub fn longest(&self) -> Option<u64> {
        self.history.iter().copied().max()
    }
}
