//! # probe-client
//!
//! Store clients and the consistency test driver for kvprobe.
//!
//! ## Architecture
//!
//! ```text
//! consistency-test → ConsistencyTester → Store → Redis / Redis Cluster
//!                          ↓
//!                   probe-core (pure accounting)
//! ```
//!
//! [`ConsistencyTester`] performs the I/O: it asks the [`Store`] for reads
//! and increments, and feeds every result into the pure types from
//! `probe-core`. The store is a trait so the same driver runs against
//! [`RespStore`] in production and [`MockStore`] in tests.
//!
//! ## Example
//!
//! ```ignore
//! use probe_client::{ConsistencyTester, RespStore, RespStoreConfig, TesterConfig};
//! use probe_core::SystemClock;
//!
//! let store = RespStore::new("127.0.0.1:7000", RespStoreConfig::default());
//! let mut tester = ConsistencyTester::new(store, SystemClock, TesterConfig::default(), std::io::stdout())?;
//! tester.run().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;
pub mod tester;

pub use store::{
    key_hash_slot, MockStore, RespStore, RespStoreConfig, Store, StoreError, DEFAULT_MAX_REDIRECTS,
    DEFAULT_TIMEOUT,
};
pub use tester::{parse_counter, ConsistencyTester, TesterConfig};
