//! The once-per-second summary line.
//!
//! Format, fields separated by `" | "`, optional fields only when present:
//!
//! ```text
//! 1021 R (3 err) | 1021 W (4 err) | 7 lost | 2 noack | last outage 3s | longest outage 9s
//! ```
//!
//! Field order is fixed so the output can be scraped with text tools.

use std::fmt;

use crate::counters::Counters;
use crate::outage::OutageTracker;

/// A snapshot of everything the summary line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Counter values at snapshot time.
    pub counters: Counters,
    /// Duration of the most recently closed outage.
    pub last_outage: Option<u64>,
    /// Duration of the longest closed outage.
    pub longest_outage: Option<u64>,
}

impl Summary {
    /// Take a snapshot of the counters and outage history.
    pub fn new(counters: &Counters, outages: &OutageTracker) -> Self {
        Self {
            counters: *counters,
            last_outage: outages.last(),
            longest_outage: outages.longest(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counters;
        write!(
            f,
            "{} R ({} err) | {} W ({} err)",
            c.reads, c.failed_reads, c.writes, c.failed_writes
        )?;
        if c.lost_writes > 0 {
            write!(f, " | {} lost", c.lost_writes)?;
        }
        if c.not_ack_writes > 0 {
            write!(f, " | {} noack", c.not_ack_writes)?;
        }
        if let Some(last) = self.last_outage {
            write!(f, " | last outage {}s", last)?;
            if let Some(longest) = self.longest_outage.filter(|&l| l != last) {
                write!(f, " | longest outage {}s", longest)?;
            }
        }
        Ok(())
    }
}
