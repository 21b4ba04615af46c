//! ConsistencyTester - the probe loop.
//!
//! Each iteration picks a key, reads it, checks the read against what this
//! tester last wrote there, then increments it and remembers the value the
//! store returned. Once per wall-clock second it closes quiet outages and
//! prints a summary line.
//!
//! ```text
//! KeySpace → key → Store::get → ExpectedState::check
//!                → Store::incr → ExpectedState::update → Counters
//!                → (once per second) OutageTracker::tick → Summary
//! ```
//!
//! A failed read does not skip the write, and a failed write does not stop
//! the loop. Failures are data: they are counted, printed through the
//! [`ErrorThrottle`], and open an outage if none is open. The store is never
//! retried from here.

use std::io::{self, Write};
use std::time::Duration;

use probe_core::{
    Clock, Counters, ErrorThrottle, ExpectedState, KeySpace, KeySpaceError, OutageTracker,
    Summary, DEFAULT_KEYSPACE, DEFAULT_WORKING_SET,
};

use crate::store::Store;

/// Configuration for [`ConsistencyTester`].
#[derive(Debug, Clone)]
pub struct TesterConfig {
    /// Size of the hot key pool.
    pub working_set: u64,
    /// Size of the cold key pool.
    pub keyspace: u64,
    /// Pause after each iteration (zero = tight loop).
    pub delay: Duration,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            working_set: DEFAULT_WORKING_SET,
            keyspace: DEFAULT_KEYSPACE,
            delay: Duration::ZERO,
        }
    }
}

/// Interpret a read as a counter value.
///
/// A missing key is 0. Otherwise the leading integer is used (optional
/// sign, then digits, after leading whitespace), and text without one reads
/// as 0. Values beyond the `i64` range saturate.
pub fn parse_counter(value: Option<&str>) -> i64 {
    let Some(text) = value else {
        return 0;
    };
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut n: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        n = if negative {
            n.saturating_mul(10).saturating_sub(digit)
        } else {
            n.saturating_mul(10).saturating_add(digit)
        };
    }
    n
}

/// Drives reads and increments against a [`Store`] and accounts for the results.
///
/// Console output (throttled error lines and summary lines) goes to `out`,
/// flushed after every line.
#[derive(Debug)]
pub struct ConsistencyTester<S, C, W> {
    store: S,
    clock: C,
    out: W,
    keys: KeySpace,
    delay: Duration,
    expected: ExpectedState,
    counters: Counters,
    outages: OutageTracker,
    throttle: ErrorThrottle,
    last_report: u64,
}

impl<S, C, W> ConsistencyTester<S, C, W>
where
    S: Store,
    C: Clock,
    W: Write,
{
    /// Create a tester with a fresh, instance-unique key space.
    pub fn new(store: S, clock: C, config: TesterConfig, out: W) -> Result<Self, KeySpaceError> {
        let keys = KeySpace::new(config.working_set, config.keyspace)?;
        Ok(Self::with_keyspace(store, clock, keys, config.delay, out))
    }

    /// Create a tester over an existing key space.
    pub fn with_keyspace(store: S, clock: C, keys: KeySpace, delay: Duration, out: W) -> Self {
        let last_report = clock.now_secs();
        Self {
            store,
            clock,
            out,
            keys,
            delay,
            expected: ExpectedState::new(),
            counters: Counters::new(),
            outages: OutageTracker::new(),
            throttle: ErrorThrottle::new(),
            last_report,
        }
    }

    /// Run iterations until writing to the output fails.
    pub async fn run(&mut self) -> io::Result<()> {
        tracing::info!(
            "Probing with key prefix {:?} (working set {}, keyspace {})",
            self.keys.prefix(),
            self.keys.working_set(),
            self.keys.keyspace()
        );
        loop {
            self.step().await?;
        }
    }

    /// One full iteration: probe a fresh key, pause, report if a new second started.
    pub async fn step(&mut self) -> io::Result<()> {
        let key = self.keys.next_key();
        self.probe(&key).await?;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.report_if_due()?;
        Ok(())
    }

    /// Read-check then increment-update a single key.
    pub async fn probe(&mut self, key: &str) -> io::Result<()> {
        match self.store.get(key).await {
            Ok(value) => {
                let observed = parse_counter(value.as_deref());
                let discrepancy = self.expected.check(key, observed);
                if discrepancy.is_violation() {
                    tracing::debug!(
                        "{:?} on {} (expected {:?}, read {})",
                        discrepancy,
                        key,
                        self.expected.expected(key),
                        observed
                    );
                }
                self.counters.record_read(discrepancy);
            }
            Err(e) => {
                self.counters.record_failed_read();
                self.failure(format!("Reading: {}", e))?;
            }
        }

        match self.store.incr(key).await {
            Ok(value) => {
                self.expected.update(key, value);
                self.counters.record_write();
            }
            Err(e) => {
                self.counters.record_failed_write();
                self.failure(format!("Writing: {}", e))?;
            }
        }
        Ok(())
    }

    fn failure(&mut self, message: String) -> io::Result<()> {
        let now = self.clock.now_secs();
        if self.throttle.should_print(&message, now) {
            self.emit(&message)?;
        }
        if self.outages.record_failure(now) {
            tracing::info!("Outage started: {}", message);
        }
        Ok(())
    }

    /// Report if the wall-clock second changed since the last report.
    ///
    /// Returns whether a report was made.
    pub fn report_if_due(&mut self) -> io::Result<bool> {
        let now = self.clock.now_secs();
        if now == self.last_report {
            return Ok(false);
        }
        self.report(now)?;
        Ok(true)
    }

    /// Tick the outage tracker at `now` and print a summary line.
    pub fn report(&mut self, now: u64) -> io::Result<()> {
        if let Some(duration) = self.outages.tick(
            now,
            self.counters.failed_reads,
            self.counters.failed_writes,
        ) {
            tracing::info!("Outage ended after {}s", duration);
        }
        self.last_report = now;
        let line = self.summary().to_string();
        self.emit(&line)
    }

    fn emit(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }

    /// Snapshot of the current summary line.
    pub fn summary(&self) -> Summary {
        Summary::new(&self.counters, &self.outages)
    }

    /// Counters so far.
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Outage state so far.
    pub fn outages(&self) -> &OutageTracker {
        &self.outages
    }

    /// Expected per-key state.
    pub fn expected(&self) -> &ExpectedState {
        &self.expected
    }

    /// The key space probed by [`step`](Self::step).
    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// The output sink.
    pub fn output(&self) -> &W {
        &self.out
    }
}
