// Integration tests for the single-writer exclusivity flag

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::thread;

use common::{ids, new_host, setup_repo, SAMPLE_CONFIG};
use wzhosts_core::ExErrorKind;

#[test]
fn test_mutations_fail_fast_while_flag_is_held() {
    // Given: A store whose flag is held by another mutation
    let (repo, _dir) = setup_repo(SAMPLE_CONFIG);
    let before = repo.store().digest().unwrap();
    let guard = repo.store().acquire_exclusive().unwrap();

    // When: We attempt every kind of mutation
    let add = repo.add(new_host("new1")).unwrap_err();
    let update = repo.update("internal", &new_host("internal")).unwrap_err();
    let delete = repo.delete("internal").unwrap_err();

    // Then: All fail with a retryable Busy
    for err in [&add, &update, &delete] {
        assert_eq!(err.kind(), ExErrorKind::Busy);
        assert!(err.is_retryable());
    }
    assert_eq!(
        delete.message(),
        "Another process is updating the configuration file"
    );

    // And: Nothing was written
    assert_eq!(repo.store().digest().unwrap(), before);

    // And: Reads are not gated
    assert_eq!(ids(&repo).len(), 3);

    // When: The flag is released
    drop(guard);

    // Then: Mutations go through again
    repo.add(new_host("new1")).unwrap();
    assert_eq!(ids(&repo).len(), 4);
}

#[test]
fn test_add_many_propagates_busy() {
    let (repo, _dir) = setup_repo(SAMPLE_CONFIG);
    let _guard = repo.store().acquire_exclusive().unwrap();

    let err = repo.add_many(vec![new_host("new1")]).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Busy);
}

#[test]
fn test_concurrent_callers_never_corrupt_the_file() {
    // Given: A repository shared across threads
    let (repo, _dir) = setup_repo(SAMPLE_CONFIG);
    let repo = Arc::new(repo);

    // When: Several threads add distinct hosts, retrying on Busy
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                let host = new_host(&format!("worker{}", i));
                loop {
                    match repo.add(host.clone()) {
                        Ok(id) => return id,
                        Err(e) if e.is_retryable() => thread::yield_now(),
                        Err(e) => panic!("unexpected failure: {}", e),
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Then: Every host landed exactly once
    let listed = ids(&repo);
    assert_eq!(listed.len(), 11);
    for i in 0..8 {
        let id = format!("worker{}", i);
        assert_eq!(listed.iter().filter(|l| **l == id).count(), 1);
    }
    assert!(!repo.store().is_busy());
}
