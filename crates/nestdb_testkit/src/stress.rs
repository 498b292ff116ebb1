//! Stress helpers for the resource store.
//!
//! These drive a shared [`ResourceStore`] from several threads and report
//! how many operations succeeded.

use nestdb_core::{Resource, ResourceStore, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Number of distinct namespaces touched by mixed runs.
    pub namespace_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 4,
            namespace_count: 16,
        }
    }
}

fn single_key(key: String, value: i64) -> Resource {
    let mut doc = Resource::new();
    doc.insert(key, Value::from(value));
    doc
}

/// Every thread merges its own keys into one shared namespace.
///
/// Afterwards the namespace must hold exactly `threads * operations` keys;
/// a lost update shows up as a missing key.
pub fn stress_concurrent_merges(
    store: Arc<ResourceStore>,
    namespace: &str,
    config: &StressConfig,
) -> StressTestResult {
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let namespace = namespace.to_string();
            let operations = config.operations;

            thread::spawn(move || {
                for i in 0..operations {
                    store.merge(
                        namespace.clone(),
                        single_key(format!("t{}_{}", t, i), i as i64),
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let expected = config.threads * config.operations;
    let found = store.get(namespace).map(|doc| doc.len()).unwrap_or(0);
    StressTestResult::new(found, expected.saturating_sub(found), start.elapsed())
}

/// All threads race to create the same namespaces.
///
/// Exactly one create per namespace may succeed; the rest must fail.
pub fn stress_create_races(store: Arc<ResourceStore>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let namespace_count = config.namespace_count;

            thread::spawn(move || {
                for n in 0..namespace_count {
                    match store.create(format!("race_{}", n), single_key("owner".into(), t as i64)) {
                        Ok(()) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Mixed merge/read/delete traffic over a set of namespaces.
///
/// Only store panics or poisoned state would count as failures: missing
/// namespaces on read or delete are expected outcomes.
pub fn stress_mixed_operations(
    store: Arc<ResourceStore>,
    config: &StressConfig,
) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let successful = Arc::clone(&successful);
            let operations = config.operations;
            let namespace_count = config.namespace_count.max(1);

            thread::spawn(move || {
                for i in 0..operations {
                    let namespace = format!("mixed_{}", (t + i) % namespace_count);
                    match i % 3 {
                        0 => {
                            store.merge(namespace, single_key(format!("k{}", i), i as i64));
                        }
                        1 => {
                            let _ = store.get(&namespace);
                        }
                        _ => {
                            let _ = store.remove(&namespace);
                        }
                    }
                    successful.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    let mut failed = 0usize;
    for handle in handles {
        if handle.join().is_err() {
            failed += 1;
        }
    }

    StressTestResult::new(successful.load(Ordering::Relaxed), failed, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_merges_lose_nothing() {
        let store = Arc::new(ResourceStore::new());
        let config = StressConfig {
            operations: 500,
            threads: 8,
            ..Default::default()
        };

        let result = stress_concurrent_merges(Arc::clone(&store), "shared", &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 4_000);
    }

    #[test]
    fn create_races_have_one_winner() {
        let store = Arc::new(ResourceStore::new());
        let config = StressConfig {
            threads: 8,
            namespace_count: 32,
            ..Default::default()
        };

        let result = stress_create_races(Arc::clone(&store), &config);
        assert_eq!(result.successful_ops, 32);
        assert_eq!(result.failed_ops, 7 * 32);
        assert_eq!(store.len(), 32);
    }

    #[test]
    fn mixed_operations_complete() {
        let store = Arc::new(ResourceStore::new());
        let config = StressConfig {
            operations: 300,
            threads: 4,
            namespace_count: 5,
        };

        let result = stress_mixed_operations(store, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 1_200);
    }
}
