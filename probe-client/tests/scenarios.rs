//! End-to-end consistency scenarios against a scripted store.

use std::time::Duration;

use kvprobe_client::{ConsistencyTester, MockStore};
use probe_core::{KeySpace, ManualClock};

const KEY: &str = "scenario|key_0";

fn tester(store: &MockStore) -> ConsistencyTester<MockStore, ManualClock, Vec<u8>> {
    let keys = KeySpace::with_seed("scenario|", 1, 1, 0).unwrap();
    ConsistencyTester::with_keyspace(
        store.clone(),
        ManualClock::new(1_000),
        keys,
        Duration::ZERO,
        Vec::new(),
    )
}

#[tokio::test]
async fn rollback_is_reported_as_lost_write() {
    let store = MockStore::new();
    let mut t = tester(&store);

    // write -> 1
    t.probe(KEY).await.unwrap();
    // read -> 1, write -> 2
    t.probe(KEY).await.unwrap();
    assert_eq!(t.counters().lost_writes, 0);

    // The store rolls back to 1: read -> 1 against an expectation of 2,
    // then write -> 2.
    store.set(KEY, 1);
    t.probe(KEY).await.unwrap();

    assert_eq!(t.counters().lost_writes, 1);
    assert_eq!(t.counters().not_ack_writes, 0);
    assert_eq!(t.expected().expected(KEY), Some(2));
}

#[tokio::test]
async fn phantom_write_is_reported_as_not_acknowledged() {
    let store = MockStore::new();
    let mut t = tester(&store);

    // write -> 5
    store.set(KEY, 4);
    t.probe(KEY).await.unwrap();
    assert_eq!(t.expected().expected(KEY), Some(5));

    // Someone else bumps the key twice: read -> 7.
    store.set(KEY, 7);
    t.probe(KEY).await.unwrap();

    assert_eq!(t.counters().not_ack_writes, 2);
    assert_eq!(t.counters().lost_writes, 0);
}

#[tokio::test]
async fn extreme_swings_saturate_totals() {
    let store = MockStore::new();
    let mut t = tester(&store);

    for _ in 0..2 {
        // write -> i64::MAX
        store.set(KEY, i64::MAX - 1);
        t.probe(KEY).await.unwrap();
        // read -> i64::MIN against i64::MAX
        store.set(KEY, i64::MIN);
        t.probe(KEY).await.unwrap();
    }

    assert_eq!(t.counters().lost_writes, u64::MAX);
    // The climb from i64::MIN + 1 back to i64::MAX - 1.
    assert_eq!(t.counters().not_ack_writes, u64::MAX - 2);
    assert_eq!(t.counters().failed_writes, 0);
}

#[tokio::test]
async fn reads_reflecting_latest_write_stay_clean() {
    let store = MockStore::new();
    let mut t = tester(&store);

    for _ in 0..1_000 {
        t.step().await.unwrap();
    }

    assert_eq!(t.counters().reads, 1_000);
    assert_eq!(t.counters().writes, 1_000);
    assert_eq!(t.counters().lost_writes, 0);
    assert_eq!(t.counters().not_ack_writes, 0);
    assert_eq!(store.value(KEY), Some(1_000));
}

#[tokio::test]
async fn outage_spanning_several_seconds() {
    let store = MockStore::new();
    let clock = ManualClock::new(1_000);
    let keys = KeySpace::with_seed("scenario|", 1, 1, 0).unwrap();
    let mut t = ConsistencyTester::with_keyspace(
        store.clone(),
        clock.clone(),
        keys,
        Duration::ZERO,
        Vec::new(),
    );

    t.step().await.unwrap();

    // Store down from second 1001 through 1003.
    store.fail_all(Some("CLUSTERDOWN The cluster is down"));
    for second in 1_001..=1_003 {
        clock.set(second);
        for _ in 0..5 {
            t.step().await.unwrap();
        }
    }

    // Back up at 1004; one quiet second later the outage closes.
    store.fail_all(None);
    for second in 1_004..=1_005 {
        clock.set(second);
        for _ in 0..5 {
            t.step().await.unwrap();
        }
    }

    assert!(!t.outages().is_open());
    assert_eq!(t.outages().history(), &[4]);
    assert_eq!(t.counters().failed_reads, 15);
    assert_eq!(t.counters().failed_writes, 15);

    let output = String::from_utf8(t.output().clone()).unwrap();
    // One error line per kind per second.
    assert_eq!(
        output
            .lines()
            .filter(|l| l.starts_with("Reading: "))
            .count(),
        3
    );
    assert!(output
        .lines()
        .any(|l| l == "7 R (15 err) | 7 W (15 err) | last outage 4s"));
}
