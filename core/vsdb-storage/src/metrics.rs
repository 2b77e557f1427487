// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Metrics-collecting wrapper for vsdb ordered map backends.
//
// Wraps any `OrderedMapBackend` and transparently collects operation
// counts, latency sums, and byte transfer totals.

use std::sync::Mutex;
use std::time::Instant;

use crate::backend::{Entry, OrderedMapBackend};
use crate::error::StorageError;

/// Accumulated statistics for a backend.
#[derive(Debug, Clone, Default)]
pub struct BackendStats {
    /// Number of `get` operations performed.
    pub get_count: u64,
    /// Number of `put` operations performed.
    pub put_count: u64,
    /// Number of `delete` operations performed.
    pub delete_count: u64,
    /// Number of cursor walks opened via `range_from`.
    pub range_count: u64,
    /// Cumulative wall-clock latency of all `get` calls, in milliseconds.
    pub get_latency_sum_ms: f64,
    /// Cumulative wall-clock latency of all `put` calls, in milliseconds.
    pub put_latency_sum_ms: f64,
    /// Total bytes read across all `get` calls that found a value.
    pub total_bytes_read: u64,
    /// Total bytes written across all `put` calls.
    pub total_bytes_written: u64,
}

/// An `OrderedMapBackend` wrapper that collects operation metrics.
pub struct MetricsBackend<B: OrderedMapBackend> {
    inner: B,
    stats: Mutex<BackendStats>,
}

impl<B: OrderedMapBackend> MetricsBackend<B> {
    /// Wrap `inner` with metrics collection.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            stats: Mutex::new(BackendStats::default()),
        }
    }

    /// Return a snapshot of the current statistics.
    pub fn stats(&self) -> BackendStats {
        self.stats.lock().unwrap().clone()
    }

    /// Reset all statistics to zero.
    pub fn reset_stats(&self) {
        *self.stats.lock().unwrap() = BackendStats::default();
    }

    /// Return a reference to the inner backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: OrderedMapBackend> OrderedMapBackend for MetricsBackend<B> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let start = Instant::now();
        let result = self.inner.get(key);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let mut s = self.stats.lock().unwrap();
        s.get_count += 1;
        s.get_latency_sum_ms += elapsed_ms;
        if let Ok(Some(ref val)) = result {
            s.total_bytes_read += val.len() as u64;
        }

        result
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let start = Instant::now();
        let result = self.inner.put(key, value);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let mut s = self.stats.lock().unwrap();
        s.put_count += 1;
        s.put_latency_sum_ms += elapsed_ms;
        if result.is_ok() {
            s.total_bytes_written += value.len() as u64;
        }

        result
    }

    fn delete(&self, key: &[u8]) -> Result<bool, StorageError> {
        self.stats.lock().unwrap().delete_count += 1;
        self.inner.delete(key)
    }

    fn range_from<'a>(
        &'a self,
        start: Option<&[u8]>,
    ) -> Result<Box<dyn Iterator<Item = Result<Entry, StorageError>> + 'a>, StorageError> {
        self.stats.lock().unwrap().range_count += 1;
        self.inner.range_from(start)
    }

    fn sync(&self) -> Result<(), StorageError> {
        self.inner.sync()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
