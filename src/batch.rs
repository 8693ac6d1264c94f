//! Window/stride batch partitioning
//!
//! Both backends fan a batch out the same way: requests are cut into
//! *windows* of `worker_count * batch_size`, and within a window request
//! `i` belongs to worker `i % worker_count`. A worker opens one connection
//! per window, so a single connection never carries more than `batch_size`
//! pipelined requests and a connection failure costs at most one window.

use std::thread;

use crate::error::TransferError;

/// Request indices assigned to `worker`, grouped per window.
///
/// Each inner vector is processed over one connection lifetime, in
/// ascending original-index order.
pub(crate) fn windows_for_worker(
    total: usize,
    worker: usize,
    worker_count: usize,
    batch_size: usize,
) -> Vec<Vec<usize>> {
    let span = (worker_count * batch_size).max(1);
    (worker..total)
        .step_by(span)
        .map(|first| {
            (first..total.min(first + span))
                .step_by(worker_count.max(1))
                .collect()
        })
        .collect()
}

/// Run `work` once per (worker, window) pair across a fresh set of scoped
/// worker threads, joining all of them before returning.
///
/// Each worker reports its outcome through its join handle; the first
/// error observed at join time fails the whole call. Workers that already
/// completed their windows are unaffected, so callbacks fired by them
/// stand even when the call fails. A batch smaller than `worker_count`
/// only spins up as many workers as there are requests; a worker count of
/// zero is treated as one.
pub(crate) fn run_windows<F>(
    total: usize,
    worker_count: usize,
    batch_size: usize,
    work: F,
) -> Result<(), TransferError>
where
    F: Fn(usize, &[usize]) -> Result<(), TransferError> + Send + Sync,
{
    if total == 0 {
        return Ok(());
    }
    let worker_count = worker_count.max(1);
    let workers = worker_count.min(total);

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let work = &work;
            handles.push(scope.spawn(move || -> Result<(), TransferError> {
                for window in windows_for_worker(total, worker, worker_count, batch_size) {
                    work(worker, &window)?;
                }
                Ok(())
            }));
        }

        let mut first_error = None;
        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }

        first_error.map_or(Ok(()), Err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_partition_five_requests_two_workers() {
        // Window size is 4; worker 0 takes {0, 2} then {4} over two
        // connections, worker 1 takes {1, 3} over one.
        assert_eq!(windows_for_worker(5, 0, 2, 2), vec![vec![0, 2], vec![4]]);
        assert_eq!(windows_for_worker(5, 1, 2, 2), vec![vec![1, 3]]);
    }

    #[test]
    fn test_partition_covers_every_index_once() {
        let total = 101;
        let (workers, batch) = (7, 3);
        let mut seen = vec![0usize; total];
        for worker in 0..workers {
            for window in windows_for_worker(total, worker, workers, batch) {
                assert!(window.len() <= batch);
                for idx in window {
                    seen[idx] += 1;
                }
            }
        }
        assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn test_partition_single_worker() {
        assert_eq!(
            windows_for_worker(5, 0, 1, 2),
            vec![vec![0, 1], vec![2, 3], vec![4]]
        );
    }

    #[test]
    fn test_run_windows_visits_everything() {
        let visited = Mutex::new(Vec::new());
        run_windows(10, 3, 2, |_, window| {
            visited.lock().unwrap().extend_from_slice(window);
            Ok(())
        })
        .unwrap();

        let mut visited = visited.into_inner().unwrap();
        visited.sort_unstable();
        assert_eq!(visited, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_run_windows_zero_workers_still_transfers() {
        let visited = Mutex::new(Vec::new());
        run_windows(3, 0, 2, |_, window| {
            visited.lock().unwrap().extend_from_slice(window);
            Ok(())
        })
        .unwrap();

        let mut visited = visited.into_inner().unwrap();
        visited.sort_unstable();
        assert_eq!(visited, vec![0, 1, 2]);
    }

    #[test]
    fn test_run_windows_empty_batch() {
        let calls = AtomicUsize::new(0);
        run_windows(0, 4, 4, |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_run_windows_propagates_worker_error() {
        let result = run_windows(8, 2, 2, |worker, _| {
            if worker == 1 {
                Err(TransferError::Transfer {
                    key: "deadbeef".into(),
                    status: "HTTP/1.1 403 Forbidden".into(),
                })
            } else {
                Ok(())
            }
        });

        match result {
            Err(TransferError::Transfer { key, .. }) => assert_eq!(key, "deadbeef"),
            other => panic!("expected transfer error, got {other:?}"),
        }
    }

    #[test]
    fn test_run_windows_worker_stops_after_error() {
        // A failing worker abandons its remaining windows; the other
        // worker still finishes all of its own.
        let worker0_windows = AtomicUsize::new(0);
        let _ = run_windows(12, 2, 2, |worker, _| {
            if worker == 1 {
                Err(TransferError::Signing("boom".into()))
            } else {
                worker0_windows.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
        assert_eq!(worker0_windows.load(Ordering::SeqCst), 3);
    }
}
