//! Mock store for testing.
//!
//! Behaves like a correct single-node store by default. Tests can rewrite
//! values behind the tester's back (rollback, phantom writes) and inject
//! failures.

use super::{Store, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock store for testing.
///
/// Clones share the same data, so a test keeps one handle to script the
/// store while the tester owns another.
#[derive(Debug, Default)]
pub struct MockStore {
    inner: Arc<Mutex<MockStoreInner>>,
}

#[derive(Debug, Default)]
struct MockStoreInner {
    data: HashMap<String, i64>,
    gets: u64,
    incrs: u64,
    fail_next_get: Option<String>,
    fail_next_incr: Option<String>,
    fail_all: Option<String>,
}

impl MockStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a key's value directly, bypassing `incr()`.
    pub fn set(&self, key: &str, value: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.data.insert(key.to_string(), value);
    }

    /// Remove a key, as if the store lost it.
    pub fn remove(&self, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.data.remove(key);
    }

    /// Current value of a key.
    pub fn value(&self, key: &str) -> Option<i64> {
        let inner = self.inner.lock().unwrap();
        inner.data.get(key).copied()
    }

    /// Cause the next `get()` to fail with the given error.
    pub fn fail_next_get(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_get = Some(error.to_string());
    }

    /// Cause the next `incr()` to fail with the given error.
    pub fn fail_next_incr(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_incr = Some(error.to_string());
    }

    /// Fail every call with the given error until cleared with `None`.
    pub fn fail_all(&self, error: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_all = error.map(str::to_string);
    }

    /// Number of `get()` calls made, including failed ones.
    pub fn get_calls(&self) -> u64 {
        self.inner.lock().unwrap().gets
    }

    /// Number of `incr()` calls made, including failed ones.
    pub fn incr_calls(&self) -> u64 {
        self.inner.lock().unwrap().incrs
    }
}

impl Clone for MockStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Store for MockStore {
    async fn get(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.gets += 1;

        // Check for forced failure
        if let Some(error) = inner.fail_next_get.take() {
            return Err(StoreError::Server(error));
        }
        if let Some(error) = &inner.fail_all {
            return Err(StoreError::Server(error.clone()));
        }

        Ok(inner.data.get(key).map(|v| v.to_string()))
    }

    async fn incr(&mut self, key: &str) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.incrs += 1;

        // Check for forced failure
        if let Some(error) = inner.fail_next_incr.take() {
            return Err(StoreError::Server(error));
        }
        if let Some(error) = &inner.fail_all {
            return Err(StoreError::Server(error.clone()));
        }

        let value = inner.data.entry(key.to_string()).or_insert(0);
        *value = value.checked_add(1).ok_or_else(|| {
            StoreError::Server("ERR increment or decrement would overflow".to_string())
        })?;
        Ok(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn incr_at_max_is_an_error() {
        let mut store = MockStore::new();
        store.set("k", i64::MAX);
        assert!(matches!(store.incr("k").await, Err(StoreError::Server(_))));
        assert_eq!(store.value("k"), Some(i64::MAX));
    }

    #[tokio::test]
    async fn missing_key_reads_none() {
        let mut store = MockStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn incr_creates_then_increments() {
        let mut store = MockStore::new();
        assert_eq!(store.incr("k").await.unwrap(), 1);
        assert_eq!(store.incr("k").await.unwrap(), 2);
        assert_eq!(store.get("k").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn set_rewrites_behind_the_client() {
        let mut store = MockStore::new();
        store.incr("k").await.unwrap();
        store.set("k", 10);
        assert_eq!(store.incr("k").await.unwrap(), 11);

        store.remove("k");
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn forced_failures_apply_once() {
        let mut store = MockStore::new();
        store.fail_next_get("CLUSTERDOWN");
        store.fail_next_incr("timeout");

        assert!(matches!(store.get("k").await, Err(StoreError::Server(_))));
        assert!(matches!(store.incr("k").await, Err(StoreError::Server(_))));

        assert!(store.get("k").await.is_ok());
        assert_eq!(store.incr("k").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn fail_all_until_cleared() {
        let mut store = MockStore::new();
        store.fail_all(Some("down"));

        assert!(store.get("k").await.is_err());
        assert!(store.incr("k").await.is_err());
        assert_eq!(store.value("k"), None);

        store.fail_all(None);
        assert_eq!(store.incr("k").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clone_shares_state_and_call_counts() {
        let mut store = MockStore::new();
        let handle = store.clone();

        store.incr("k").await.unwrap();
        store.get("k").await.unwrap();

        assert_eq!(handle.value("k"), Some(1));
        assert_eq!(handle.get_calls(), 1);
        assert_eq!(handle.incr_calls(), 1);
    }
}
