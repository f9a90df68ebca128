use std::sync::Arc;
use std::time::Duration;

use vedrfolnir::{CacheConfig, RequestDescriptor, ResponseCache};

fn descriptor(city: &str) -> RequestDescriptor {
    let mut d = RequestDescriptor::new("https://api.example.test/data/2.5").with_api_key("k");
    d.append_path("/weather");
    d.set_param("q", city);
    d
}

fn cache(max_entries: usize, ttl: Duration) -> ResponseCache {
    ResponseCache::new(&CacheConfig::new().max_entries(max_entries).ttl(ttl)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn fresh_within_ttl_absent_after() {
    let ttl = Duration::from_secs(600);
    let cache = cache(10, ttl);
    cache.put("a", "payload-a", descriptor("a"));

    tokio::time::advance(ttl - Duration::from_millis(1)).await;
    assert_eq!(cache.get("a").as_deref(), Some("payload-a"));

    tokio::time::advance(Duration::from_millis(2)).await;
    assert_eq!(cache.get("a"), None);
    assert!(!cache.contains("a"), "expired entry removed on read");
}

#[tokio::test(start_paused = true)]
async fn refresh_restarts_ttl() {
    let ttl = Duration::from_secs(10);
    let cache = cache(10, ttl);
    cache.put("a", "v1", descriptor("a"));

    tokio::time::advance(Duration::from_secs(8)).await;
    cache.put("a", "v2", descriptor("a"));

    tokio::time::advance(Duration::from_secs(8)).await;
    assert_eq!(cache.get("a").as_deref(), Some("v2"));
}

#[tokio::test(start_paused = true)]
async fn new_key_at_capacity_evicts_oldest() {
    let cache = cache(2, Duration::from_secs(600));
    cache.put("a", "1", descriptor("a"));
    tokio::time::advance(Duration::from_millis(1)).await;
    cache.put("b", "2", descriptor("b"));
    tokio::time::advance(Duration::from_millis(1)).await;
    cache.put("c", "3", descriptor("c"));

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains("a"));
    assert!(cache.contains("b"));
    assert!(cache.contains("c"));
}

#[tokio::test(start_paused = true)]
async fn replacing_existing_key_never_evicts() {
    let cache = cache(2, Duration::from_secs(600));
    cache.put("a", "1", descriptor("a"));
    tokio::time::advance(Duration::from_millis(1)).await;
    cache.put("b", "2", descriptor("b"));
    tokio::time::advance(Duration::from_millis(1)).await;

    cache.put("a", "1b", descriptor("a"));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("a").as_deref(), Some("1b"));
    assert_eq!(cache.get("b").as_deref(), Some("2"));

    // "a" was refreshed after "b", so "b" is now the oldest.
    tokio::time::advance(Duration::from_millis(1)).await;
    cache.put("c", "3", descriptor("c"));
    assert!(cache.contains("a"));
    assert!(!cache.contains("b"));
    assert!(cache.contains("c"));
}

#[tokio::test(start_paused = true)]
async fn reads_do_not_renew_entries() {
    let cache = cache(2, Duration::from_secs(600));
    cache.put("a", "1", descriptor("a"));
    tokio::time::advance(Duration::from_millis(1)).await;
    cache.put("b", "2", descriptor("b"));

    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(cache.get("a").is_some());
    cache.put("c", "3", descriptor("c"));

    assert!(!cache.contains("a"), "eviction is by fetch time, not access");
}

#[tokio::test(start_paused = true)]
async fn same_instant_inserts_evict_in_insertion_order() {
    let cache = cache(2, Duration::from_secs(600));
    cache.put("a", "1", descriptor("a"));
    cache.put("b", "2", descriptor("b"));
    cache.put("c", "3", descriptor("c"));

    assert!(!cache.contains("a"));
    assert!(cache.contains("b"));
    assert!(cache.contains("c"));
}

#[test]
fn snapshot_is_independent_copy() {
    let cache = cache(10, Duration::from_secs(600));
    cache.put("q=Oslo", "1", descriptor("Oslo"));
    cache.put("q=Bergen", "2", descriptor("Bergen"));

    let snapshot = cache.snapshot();
    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["q=Oslo"].param("q"), Some("Oslo"));
}

#[test]
fn stored_descriptor_unaffected_by_caller_mutation() {
    let cache = cache(10, Duration::from_secs(600));
    let mut d = descriptor("Oslo");
    cache.put(d.fingerprint(), "1", d.clone());
    let fingerprint = d.fingerprint();

    d.set_param("q", "Bergen");

    assert_eq!(cache.snapshot()[&fingerprint].param("q"), Some("Oslo"));
}

#[test]
fn remove_and_clear() {
    let cache = cache(10, Duration::from_secs(600));
    cache.put("a", "1", descriptor("a"));
    cache.put("b", "2", descriptor("b"));

    cache.remove("a");
    assert_eq!(cache.keys(), vec!["b".to_string()]);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.get("b"), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_converge() {
    let cache = Arc::new(cache(1_000, Duration::from_secs(600)));

    let mut handles = Vec::new();
    for task in 0..8 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..50 {
                let key = format!("k{task}-{i}");
                cache.put(key.clone(), format!("v{task}-{i}"), descriptor(&key));
                // Shared key hammered by every task.
                cache.put("shared", format!("{task}"), descriptor("shared"));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(cache.len(), 8 * 50 + 1);
    for task in 0..8 {
        for i in 0..50 {
            let expected = format!("v{task}-{i}");
            assert_eq!(cache.get(&format!("k{task}-{i}")), Some(expected));
        }
    }
    let shared = cache.get("shared").unwrap();
    assert!(shared.parse::<u32>().unwrap() < 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_stay_near_capacity() {
    let capacity = 16;
    let cache = Arc::new(cache(capacity, Duration::from_secs(600)));

    let mut handles = Vec::new();
    for task in 0..4 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..100 {
                let key = format!("k{task}-{i}");
                cache.put(key.clone(), "v", descriptor(&key));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Overshoot is bounded by the number of racing writers.
    assert!(cache.len() <= capacity + 4, "len = {}", cache.len());

    // The next uncontended insert trims back to capacity.
    cache.put("tail", "v", descriptor("tail"));
    assert!(cache.contains("tail"));
    assert!(cache.len() <= capacity);
}
