//! Store abstraction for kvprobe.
//!
//! The tester needs exactly two operations from the system under test:
//! - `get()` reads a key, `None` if it does not exist
//! - `incr()` atomically adds one to a key (creating it at 1) and returns
//!   the resulting value
//!
//! Every failure, whether network, timeout, or an error reply the client
//! could not resolve, comes back as a [`StoreError`] value. The tester
//! counts it and moves on; it never retries.
//!
//! # Example
//!
//! ```ignore
//! let mut store = MockStore::new();
//! assert_eq!(store.incr("k").await?, 1);
//! assert_eq!(store.get("k").await?, Some("1".to_string()));
//! ```

mod codec;
mod mock;
mod resp;
mod slot;

pub use mock::MockStore;
pub use resp::{RespStore, RespStoreConfig, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT};
pub use slot::key_hash_slot;

use async_trait::async_trait;
use thiserror::Error;

/// Store errors.
///
/// Display strings carry no per-call detail beyond the cause, so repeated
/// failures of the same kind produce identical text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Could not open a connection to a node.
    #[error("connection to {addr} failed: {reason}")]
    Connect {
        /// Node address.
        addr: String,
        /// Underlying cause.
        reason: String,
    },

    /// An established connection failed mid-request.
    #[error("I/O error: {0}")]
    Io(String),

    /// The request did not complete within the configured timeout.
    #[error("timed out")]
    Timeout,

    /// The store answered with an error reply.
    #[error("{0}")]
    Server(String),

    /// The reply could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Redirections did not settle on a node.
    #[error("too many cluster redirections (limit: {limit})")]
    TooManyRedirects {
        /// Configured redirect limit.
        limit: usize,
    },
}

/// Store trait for the read and increment operations under test.
///
/// Implementations own their connections; the tester drives one call at a
/// time, so methods take `&mut self`.
#[async_trait]
pub trait Store: Send {
    /// Read the current value of `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    async fn get(&mut self, key: &str) -> Result<Option<String>, StoreError>;

    /// Atomically increment `key` by one and return the new value.
    async fn incr(&mut self, key: &str) -> Result<i64, StoreError>;
}
