//! Key generation for the consistency tester.
//!
//! Keys are drawn from two pools:
//! - a small **working set** of hot keys, hit often enough that reads and
//!   writes on the same key interleave under contention
//! - a large **keyspace** of cold keys, so the broader key range (and every
//!   cluster slot) still gets exercised
//!
//! Each pool is picked with probability 0.5. Every key carries a prefix that
//! is unique to this tester instance, so concurrent testers pointed at the
//! same store never touch each other's keys.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Default size of the hot key pool.
pub const DEFAULT_WORKING_SET: u64 = 1_000;

/// Default size of the cold key pool.
pub const DEFAULT_KEYSPACE: u64 = 10_000;

/// Distinguishes testers created within the same process and microsecond.
static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(0);

/// Error type for key space construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeySpaceError {
    /// A pool was configured with zero keys.
    #[error("{pool} must contain at least one key")]
    EmptyPool {
        /// Which pool was empty.
        pool: &'static str,
    },
}

/// Build a key prefix unique to this tester instance.
///
/// Combines the process id, the current time in microseconds, and a
/// process-wide instance counter, separated by `|`.
pub fn instance_prefix() -> String {
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros())
        .unwrap_or(0);
    let instance = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
    format!("{}|{}|{}|", process::id(), micros, instance)
}

/// Generator of probe keys biased toward a hot subset.
#[derive(Debug)]
pub struct KeySpace {
    prefix: String,
    working_set: u64,
    keyspace: u64,
    rng: StdRng,
}

impl KeySpace {
    /// Create a key space with a fresh instance prefix and an entropy-seeded RNG.
    pub fn new(working_set: u64, keyspace: u64) -> Result<Self, KeySpaceError> {
        Self::build(instance_prefix(), working_set, keyspace, StdRng::from_entropy())
    }

    /// Create a key space with an explicit prefix and RNG seed.
    ///
    /// Two key spaces with the same arguments produce the same key sequence.
    pub fn with_seed(
        prefix: impl Into<String>,
        working_set: u64,
        keyspace: u64,
        seed: u64,
    ) -> Result<Self, KeySpaceError> {
        Self::build(
            prefix.into(),
            working_set,
            keyspace,
            StdRng::seed_from_u64(seed),
        )
    }

    fn build(
        prefix: String,
        working_set: u64,
        keyspace: u64,
        rng: StdRng,
    ) -> Result<Self, KeySpaceError> {
        if working_set == 0 {
            return Err(KeySpaceError::EmptyPool {
                pool: "working set",
            });
        }
        if keyspace == 0 {
            return Err(KeySpaceError::EmptyPool { pool: "keyspace" });
        }
        Ok(Self {
            prefix,
            working_set,
            keyspace,
            rng,
        })
    }

    /// The per-instance prefix shared by every generated key.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Size of the hot pool.
    pub fn working_set(&self) -> u64 {
        self.working_set
    }

    /// Size of the cold pool.
    pub fn keyspace(&self) -> u64 {
        self.keyspace
    }

    /// Generate the next key to probe.
    pub fn next_key(&mut self) -> String {
        let pool = if self.rng.gen_bool(0.5) {
            self.keyspace
        } else {
            self.working_set
        };
        let index = self.rng.gen_range(0..pool);
        self.key(index)
    }

    /// The key name for a given index.
    pub fn key(&self, index: u64) -> String {
        format!("{}key_{}", self.prefix, index)
    }
}
