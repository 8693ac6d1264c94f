//! Timing instrumentation
//!
//! Wraps a backend and accumulates wall-clock time spent inside put/get
//! calls over the backend's lifetime; the total is reported at teardown.
//! Purely observational: it never influences control flow or results.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::info;

use super::{GetCallback, GetRequest, PutCallback, PutRequest, StorageBackend};
use crate::error::TransferError;

/// Accumulates transfer wall-clock time around an inner backend
pub struct TimedBackend<B> {
    inner: B,
    elapsed: Mutex<Duration>,
}

impl<B> TimedBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Total wall-clock time spent in put/get so far
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, start: Instant) {
        let elapsed = start.elapsed();
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner()) += elapsed;
    }
}

impl<B: StorageBackend> StorageBackend for TimedBackend<B> {
    fn put(&self, requests: &[PutRequest], on_success: &PutCallback) -> Result<(), TransferError> {
        let start = Instant::now();
        let result = self.inner.put(requests, on_success);
        self.record(start);
        result
    }

    fn get(&self, requests: &[GetRequest], on_success: &GetCallback) -> Result<(), TransferError> {
        let start = Instant::now();
        let result = self.inner.get(requests, on_success);
        self.record(start);
        result
    }
}

impl<B> Drop for TimedBackend<B> {
    fn drop(&mut self) {
        let elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        info!(elapsed_us = elapsed.as_micros() as u64, "storage backend transfer time");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct SlowBackend;

    impl StorageBackend for SlowBackend {
        fn put(&self, requests: &[PutRequest], on_success: &PutCallback) -> Result<(), TransferError> {
            thread::sleep(Duration::from_millis(10));
            for req in requests {
                on_success(req);
            }
            Ok(())
        }

        fn get(&self, _: &[GetRequest], _: &GetCallback) -> Result<(), TransferError> {
            thread::sleep(Duration::from_millis(10));
            Ok(())
        }
    }

    #[test]
    fn test_elapsed_accumulates_across_calls() {
        let backend = TimedBackend::new(SlowBackend);
        backend.put(&[], &|_| {}).unwrap();
        backend.get(&[], &|_| {}).unwrap();
        assert!(backend.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_wrapper_is_transparent() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let backend = TimedBackend::new(SlowBackend);
        let requests = vec![PutRequest::new("/tmp/x", "k")];
        let fired = AtomicUsize::new(0);
        backend
            .put(&requests, &|_| {
                fired.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
