//! Integration tests for the local-filesystem backend and the
//! backend-agnostic façade.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use shuttlr::config::{BackendKind, Config, LocalConfig, TransferConfig};
use shuttlr::storage::{self, LocalStorageBackend, StorageBackend, TimedBackend};
use shuttlr::{GetRequest, PutRequest, TransferError};

fn write_sources(dir: &std::path::Path, count: usize) -> Vec<PutRequest> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("src-{i}"));
            fs::write(&path, format!("payload {i}")).unwrap();
            PutRequest::new(path, format!("key-{i}"))
        })
        .collect()
}

#[test]
fn test_round_trip_many_objects() {
    let store = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let backend = LocalStorageBackend::new(store.path(), 4, 3);

    let puts = write_sources(scratch.path(), 50);
    let uploaded = AtomicUsize::new(0);
    backend
        .put(&puts, &|_| {
            uploaded.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(uploaded.load(Ordering::SeqCst), 50);

    let gets: Vec<_> = (0..50)
        .map(|i| GetRequest::new(format!("key-{i}"), scratch.path().join(format!("out-{i}"))))
        .collect();
    let downloaded = AtomicUsize::new(0);
    backend
        .get(&gets, &|_| {
            downloaded.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(downloaded.load(Ordering::SeqCst), 50);

    for i in 0..50 {
        let out = fs::read(scratch.path().join(format!("out-{i}"))).unwrap();
        assert_eq!(out, format!("payload {i}").into_bytes());
    }
}

#[test]
fn test_callback_sees_each_request_once() {
    let store = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let backend = LocalStorageBackend::new(store.path(), 8, 2);

    let puts = write_sources(scratch.path(), 23);
    let seen = Mutex::new(Vec::new());
    backend
        .put(&puts, &|req| {
            seen.lock().unwrap().push(req.object_key.clone());
        })
        .unwrap();

    let mut seen = seen.into_inner().unwrap();
    seen.sort();
    let mut expected: Vec<_> = (0..23).map(|i| format!("key-{i}")).collect();
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn test_duplicate_keys_each_transferred() {
    let store = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let backend = LocalStorageBackend::new(store.path(), 2, 2);

    let src = scratch.path().join("src");
    fs::write(&src, b"dup").unwrap();
    let puts = vec![
        PutRequest::new(&src, "same-key"),
        PutRequest::new(&src, "same-key"),
        PutRequest::new(&src, "same-key"),
    ];
    let uploaded = AtomicUsize::new(0);
    backend
        .put(&puts, &|_| {
            uploaded.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(uploaded.load(Ordering::SeqCst), 3);
}

#[test]
fn test_missing_source_fails_batch() {
    let store = tempfile::tempdir().unwrap();
    let backend = LocalStorageBackend::new(store.path(), 2, 2);

    let puts = vec![PutRequest::new("/no/such/file", "key")];
    let result = backend.put(&puts, &|_| {});
    assert!(matches!(result, Err(TransferError::Io { .. })));
}

#[test]
fn test_timed_wrapper_preserves_contract() {
    let store = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let backend = TimedBackend::new(LocalStorageBackend::new(store.path(), 2, 2));

    let puts = write_sources(scratch.path(), 5);
    let uploaded = AtomicUsize::new(0);
    backend
        .put(&puts, &|_| {
            uploaded.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(uploaded.load(Ordering::SeqCst), 5);
    assert!(backend.elapsed() > std::time::Duration::ZERO);
}

#[test]
fn test_facade_builds_local_backend_from_config() {
    let store = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();

    let config = Config {
        backend: BackendKind::Local,
        s3: None,
        local: Some(LocalConfig {
            root: store.path().to_path_buf(),
        }),
        transfer: TransferConfig {
            worker_count: 2,
            batch_size: 4,
        },
    };
    let backend = storage::from_config(&config).unwrap();

    let puts = write_sources(scratch.path(), 3);
    backend.put(&puts, &|_| {}).unwrap();

    let dest = scratch.path().join("back");
    backend.get(&[GetRequest::new("key-1", &dest)], &|_| {}).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), b"payload 1");
}
