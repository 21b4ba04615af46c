//! Aggregate statistics for a tester run.

use crate::expected::Discrepancy;

/// Counters accumulated over the lifetime of a tester.
///
/// All fields only ever grow. `lost_writes` and `not_ack_writes` sum the
/// *size* of each discrepancy, not the number of discrepant reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Successful reads.
    pub reads: u64,
    /// Successful increments.
    pub writes: u64,
    /// Reads that returned an error.
    pub failed_reads: u64,
    /// Increments that returned an error.
    pub failed_writes: u64,
    /// Total increments acknowledged but later missing.
    pub lost_writes: u64,
    /// Total increments observed without an acknowledgement.
    pub not_ack_writes: u64,
}

impl Counters {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful read and its consistency verdict.
    pub fn record_read(&mut self, discrepancy: Discrepancy) {
        self.reads += 1;
        self.record_discrepancy(discrepancy);
    }

    /// Record a failed read.
    pub fn record_failed_read(&mut self) {
        self.failed_reads += 1;
    }

    /// Record a successful increment.
    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    /// Record a failed increment.
    pub fn record_failed_write(&mut self) {
        self.failed_writes += 1;
    }

    /// Fold a discrepancy into the lost / not-acknowledged totals.
    ///
    /// Totals saturate at `u64::MAX`.
    pub fn record_discrepancy(&mut self, discrepancy: Discrepancy) {
        match discrepancy {
            Discrepancy::Lost(n) => self.lost_writes = self.lost_writes.saturating_add(n),
            Discrepancy::NotAcknowledged(n) => {
                self.not_ack_writes = self.not_ack_writes.saturating_add(n)
            }
            Discrepancy::Unknown | Discrepancy::Consistent => {}
        }
    }

    /// Total read attempts, successful or not.
    pub fn read_attempts(&self) -> u64 {
        self.reads + self.failed_reads
    }

    /// Total write attempts, successful or not.
    pub fn write_attempts(&self) -> u64 {
        self.writes + self.failed_writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrepancies_accumulate_magnitudes() {
        let mut counters = Counters::new();
        counters.record_read(Discrepancy::Lost(3));
        counters.record_read(Discrepancy::Lost(2));
        counters.record_read(Discrepancy::NotAcknowledged(4));
        counters.record_read(Discrepancy::Consistent);
        counters.record_read(Discrepancy::Unknown);

        assert_eq!(counters.reads, 5);
        assert_eq!(counters.lost_writes, 5);
        assert_eq!(counters.not_ack_writes, 4);
    }

    #[test]
    fn attempts_include_failures() {
        let mut counters = Counters::new();
        counters.record_read(Discrepancy::Unknown);
        counters.record_failed_read();
        counters.record_failed_read();
        counters.record_write();
        counters.record_failed_write();

        assert_eq!(counters.read_attempts(), 3);
        assert_eq!(counters.write_attempts(), 2);
    }

    #[test]
    fn discrepancy_totals_saturate() {
        let mut counters = Counters::new();
        counters.record_read(Discrepancy::Lost(u64::MAX));
        counters.record_read(Discrepancy::Lost(1));
        counters.record_read(Discrepancy::NotAcknowledged(u64::MAX - 1));
        counters.record_read(Discrepancy::NotAcknowledged(5));

        assert_eq!(counters.lost_writes, u64::MAX);
        assert_eq!(counters.not_ack_writes, u64::MAX);
        assert_eq!(counters.reads, 4);
    }
}
