//! # probe-core
//!
//! Pure consistency and outage accounting for kvprobe (no I/O, instant tests).
//!
//! This crate holds everything the consistency tester *decides*, without
//! touching the network or the console:
//!
//! - which key to probe next ([`KeySpace`])
//! - what value each key should hold ([`ExpectedState`])
//! - how far an observation is from that expectation ([`Discrepancy`])
//! - how long the store has been failing ([`OutageTracker`])
//! - which error lines are worth printing ([`ErrorThrottle`])
//! - the per-second report line ([`Summary`])
//!
//! ## Design Philosophy
//!
//! Every type here is plain owned state. Time is passed in as whole unix
//! seconds (or read from a [`Clock`]), so the same inputs always produce the
//! same outputs. The actual store I/O lives in `probe-client`, which feeds
//! results into these types.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod counters;
pub mod expected;
pub mod keyspace;
pub mod outage;
pub mod report;
pub mod throttle;

pub use clock::{Clock, ManualClock, SystemClock};
pub use counters::Counters;
pub use expected::{Discrepancy, ExpectedState};
pub use keyspace::{
    instance_prefix, KeySpace, KeySpaceError, DEFAULT_KEYSPACE, DEFAULT_WORKING_SET,
};
pub use outage::OutageTracker;
pub use report::Summary;
pub use throttle::ErrorThrottle;
