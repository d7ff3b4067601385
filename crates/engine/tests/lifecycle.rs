#![forbid(unsafe_code)]

mod support;

use jobtrack_core::{JobId, JobInput, JobPatch, JobStatus};
use jobtrack_engine::{EngineError, ErrorKind, UpdateOutcome};
use jobtrack_storage::{JobStore, ListingCache, StoreError, listing_key};
use support::{engine, input, owner};

#[test]
fn rejected_pair_can_be_reopened_but_active_pair_cannot() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");

    let first = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect("first create");

    let err = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect_err("duplicate active");
    match err {
        EngineError::DuplicateActiveApplication { existing, status } => {
            assert_eq!(existing, first.id);
            assert_eq!(status, JobStatus::Wishlist);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let rejected = engine
        .update_job(
            &u1,
            &first.id,
            JobPatch {
                status: Some(JobStatus::Rejected),
                ..JobPatch::default()
            },
        )
        .expect("reject");
    assert_eq!(rejected.job().status, JobStatus::Rejected);

    let second = engine
        .create_job(&u1, input("engineer", "ACME", JobStatus::Wishlist))
        .expect("new round after rejection");
    assert_ne!(second.id, first.id);

    let stored = engine.store().find_by_owner(&u1).expect("list store");
    assert_eq!(stored.len(), 2);
    let mut statuses = stored.iter().map(|job| job.status).collect::<Vec<_>>();
    statuses.sort_by_key(|status| status.as_str());
    assert_eq!(statuses, vec![JobStatus::Rejected, JobStatus::Wishlist]);
}

#[test]
fn new_round_may_start_in_any_status() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");

    engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Rejected))
        .expect("rejected history");
    let reopened = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Interviewing))
        .expect("reopen");
    assert_eq!(reopened.status, JobStatus::Interviewing);
}

#[test]
fn illegal_transition_leaves_record_untouched() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let job = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect("create");
    let writes_before = engine.store().writes();

    let err = engine
        .update_job(
            &u1,
            &job.id,
            JobPatch {
                status: Some(JobStatus::Offer),
                notes: Some("skip ahead".to_string()),
                ..JobPatch::default()
            },
        )
        .expect_err("wishlist cannot jump to offer");
    match err {
        EngineError::IllegalStatusTransition { current, requested } => {
            assert_eq!(current, JobStatus::Wishlist);
            assert_eq!(requested, JobStatus::Offer);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(engine.store().writes(), writes_before);
    let stored = engine
        .store()
        .find_by_id(&job.id)
        .expect("find")
        .expect("exists");
    assert_eq!(stored, job);
}

#[test]
fn rejected_record_cannot_be_revived_by_update() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let job = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Rejected))
        .expect("create");

    let err = engine
        .update_job(
            &u1,
            &job.id,
            JobPatch {
                status: Some(JobStatus::Applied),
                ..JobPatch::default()
            },
        )
        .expect_err("no way out of rejected");
    assert_eq!(err.kind(), ErrorKind::IllegalStatusTransition);
}

#[test]
fn full_pipeline_walk_is_allowed() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let job = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect("create");

    for next in [
        JobStatus::Applied,
        JobStatus::Interviewing,
        JobStatus::Offer,
        JobStatus::Rejected,
    ] {
        let outcome = engine
            .update_job(
                &u1,
                &job.id,
                JobPatch {
                    status: Some(next),
                    ..JobPatch::default()
                },
            )
            .expect("legal step");
        assert_eq!(outcome.job().status, next);
    }
}

#[test]
fn identical_update_is_a_noop_without_write_or_invalidation() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let job = engine
        .create_job(
            &u1,
            JobInput {
                salary: Some("100k".to_string()),
                ..input("Engineer", "Acme", JobStatus::Applied)
            },
        )
        .expect("create");
    let writes_before = engine.store().writes();
    let invalidations_before = engine.cache().invalidations.get();

    let outcome = engine
        .update_job(
            &u1,
            &job.id,
            JobPatch {
                title: Some("Engineer".to_string()),
                company: Some("Acme".to_string()),
                status: Some(JobStatus::Applied),
                salary: Some("100k".to_string()),
                ..JobPatch::default()
            },
        )
        .expect("no-op update");

    assert!(outcome.is_noop());
    assert_eq!(outcome, UpdateOutcome::Unchanged(job));
    assert_eq!(engine.store().writes(), writes_before);
    assert_eq!(engine.cache().invalidations.get(), invalidations_before);
}

#[test]
fn empty_update_is_rejected_after_ownership() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let u2 = owner("U2");
    let job = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect("create");

    let err = engine
        .update_job(&u1, &job.id, JobPatch::default())
        .expect_err("empty");
    assert_eq!(err.kind(), ErrorKind::EmptyUpdate);

    let err = engine
        .update_job(&u2, &job.id, JobPatch::default())
        .expect_err("foreign owner");
    assert_eq!(err.kind(), ErrorKind::NotAuthorized);

    let err = engine
        .update_job(&u1, &JobId::generate(), JobPatch::default())
        .expect_err("unknown");
    assert_eq!(err.kind(), ErrorKind::JobNotFound);
}

#[test]
fn rename_onto_active_pair_is_a_duplicate() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let acme = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Applied))
        .expect("acme");
    let globex = engine
        .create_job(&u1, input("Engineer", "Globex", JobStatus::Wishlist))
        .expect("globex");

    let err = engine
        .update_job(
            &u1,
            &globex.id,
            JobPatch {
                title: Some("ENGINEER".to_string()),
                company: Some("acme".to_string()),
                ..JobPatch::default()
            },
        )
        .expect_err("rename collides");
    match err {
        EngineError::DuplicateActiveApplication { existing, status } => {
            assert_eq!(existing, acme.id);
            assert_eq!(status, JobStatus::Applied);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = engine
        .update_job(
            &u1,
            &globex.id,
            JobPatch {
                company: Some("ACME".to_string()),
                ..JobPatch::default()
            },
        )
        .expect_err("company-only rename collides too");
    assert_eq!(err.kind(), ErrorKind::DuplicateActiveApplication);
}

#[test]
fn rejected_record_cannot_be_renamed_onto_active_pair() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let acme = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Applied))
        .expect("acme");
    let globex = engine
        .create_job(&u1, input("Designer", "Globex", JobStatus::Rejected))
        .expect("globex");

    let err = engine
        .update_job(
            &u1,
            &globex.id,
            JobPatch {
                title: Some("Engineer".to_string()),
                company: Some("Acme".to_string()),
                ..JobPatch::default()
            },
        )
        .expect_err("rejected record moved onto an active pair");
    match err {
        EngineError::DuplicateActiveApplication { existing, status } => {
            assert_eq!(existing, acme.id);
            assert_eq!(status, JobStatus::Applied);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let stored = engine
        .store()
        .find_by_id(&globex.id)
        .expect("find")
        .expect("exists");
    assert_eq!(stored, globex);
}

#[test]
fn rejecting_while_renaming_onto_active_pair_is_a_duplicate() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let acme = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Applied))
        .expect("acme");
    let globex = engine
        .create_job(&u1, input("Designer", "Globex", JobStatus::Wishlist))
        .expect("globex");
    let writes_before = engine.store().writes();

    let err = engine
        .update_job(
            &u1,
            &globex.id,
            JobPatch {
                title: Some("Engineer".to_string()),
                company: Some("Acme".to_string()),
                status: Some(JobStatus::Rejected),
                ..JobPatch::default()
            },
        )
        .expect_err("rename onto an active pair");
    match err {
        EngineError::DuplicateActiveApplication { existing, .. } => assert_eq!(existing, acme.id),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(engine.store().writes(), writes_before);

    // With the pair held only by a rejected record the same move goes through.
    engine
        .update_job(
            &u1,
            &acme.id,
            JobPatch {
                status: Some(JobStatus::Rejected),
                ..JobPatch::default()
            },
        )
        .expect("reject acme");
    let moved = engine
        .update_job(
            &u1,
            &globex.id,
            JobPatch {
                title: Some("Engineer".to_string()),
                company: Some("Acme".to_string()),
                status: Some(JobStatus::Rejected),
                ..JobPatch::default()
            },
        )
        .expect("rename after rejection");
    assert_eq!(moved.job().status, JobStatus::Rejected);
    assert_eq!(moved.job().company, "Acme");
}

#[test]
fn store_guard_names_the_holder_when_create_check_is_stale() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let acme = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Interviewing))
        .expect("acme");
    let invalidations_before = engine.cache().invalidations.get();

    engine.store().stale_lookups.set(1);
    let err = engine
        .create_job(&u1, input("engineer", "ACME", JobStatus::Wishlist))
        .expect_err("unique index fires");
    match err {
        EngineError::DuplicateActiveApplication { existing, status } => {
            assert_eq!(existing, acme.id);
            assert_eq!(status, JobStatus::Interviewing);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(engine.cache().invalidations.get(), invalidations_before);
    let stored = engine.store().find_by_owner(&u1).expect("list store");
    assert_eq!(stored.len(), 1);
}

#[test]
fn store_guard_names_the_holder_when_update_check_is_stale() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let acme = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Offer))
        .expect("acme");
    let globex = engine
        .create_job(&u1, input("Engineer", "Globex", JobStatus::Applied))
        .expect("globex");

    engine.store().stale_lookups.set(1);
    let err = engine
        .update_job(
            &u1,
            &globex.id,
            JobPatch {
                company: Some("Acme".to_string()),
                ..JobPatch::default()
            },
        )
        .expect_err("unique index fires");
    match err {
        EngineError::DuplicateActiveApplication { existing, status } => {
            assert_eq!(existing, acme.id);
            assert_eq!(status, JobStatus::Offer);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let stored = engine
        .store()
        .find_by_id(&globex.id)
        .expect("find")
        .expect("exists");
    assert_eq!(stored, globex);
}

#[test]
fn store_guard_without_visible_holder_is_a_store_failure() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Applied))
        .expect("acme");

    engine.store().stale_lookups.set(2);
    let err = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Applied))
        .expect_err("unique index fires");
    assert!(matches!(err, EngineError::Store(StoreError::ActivePairTaken)));
    assert_eq!(err.kind(), ErrorKind::StoreFailure);
    assert!(!err.kind().is_retryable());
}

#[test]
fn case_only_rename_of_own_record_is_allowed() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let job = engine
        .create_job(&u1, input("engineer", "acme", JobStatus::Wishlist))
        .expect("create");

    let outcome = engine
        .update_job(
            &u1,
            &job.id,
            JobPatch {
                title: Some("Engineer".to_string()),
                company: Some("Acme".to_string()),
                ..JobPatch::default()
            },
        )
        .expect("case fix");
    assert!(!outcome.is_noop());
    assert_eq!(outcome.job().title, "Engineer");
}

#[test]
fn foreign_delete_is_refused_and_record_kept() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let u2 = owner("U2");
    let job = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect("create");

    let err = engine.delete_job(&u2, &job.id).expect_err("not owner");
    match err {
        EngineError::NotAuthorized { job_id } => assert_eq!(job_id, job.id),
        other => panic!("unexpected error: {other:?}"),
    }

    let listing = engine.get_jobs(&u1).expect("still listed");
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].id, job.id);
}

#[test]
fn delete_removes_record_and_missing_target_is_not_found() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let job = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect("create");

    engine.delete_job(&u1, &job.id).expect("delete");
    assert!(engine.store().find_by_id(&job.id).expect("find").is_none());

    let err = engine.delete_job(&u1, &job.id).expect_err("already gone");
    assert_eq!(err.kind(), ErrorKind::JobNotFound);
}

#[test]
fn owner_without_jobs_gets_no_jobs_found() {
    let (_dir, engine) = engine();
    let err = engine.get_jobs(&owner("U1")).expect_err("no jobs");
    assert!(matches!(err, EngineError::NoJobsFound));
    assert_eq!(engine.cache().sets.get(), 0);
}

#[test]
fn listing_is_served_from_cache_until_a_mutation() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect("create");

    let first = engine.get_jobs(&u1).expect("miss then populate");
    assert_eq!(engine.store().owner_scans.get(), 1);
    assert_eq!(engine.cache().sets.get(), 1);

    let second = engine.get_jobs(&u1).expect("hit");
    assert_eq!(second, first);
    assert_eq!(engine.store().owner_scans.get(), 1);

    let created = engine
        .create_job(&u1, input("Designer", "Acme", JobStatus::Applied))
        .expect("second create");
    let key = listing_key(&u1);
    assert_eq!(engine.cache().inner.get(&key).expect("peek"), None);

    let third = engine.get_jobs(&u1).expect("miss after create");
    assert_eq!(engine.store().owner_scans.get(), 2);
    assert!(third.iter().any(|job| job.id == created.id));

    engine
        .update_job(
            &u1,
            &created.id,
            JobPatch {
                status: Some(JobStatus::Interviewing),
                ..JobPatch::default()
            },
        )
        .expect("update");
    let fourth = engine.get_jobs(&u1).expect("miss after update");
    assert_eq!(engine.store().owner_scans.get(), 3);
    let updated = fourth
        .iter()
        .find(|job| job.id == created.id)
        .expect("updated job listed");
    assert_eq!(updated.status, JobStatus::Interviewing);

    engine.delete_job(&u1, &created.id).expect("delete");
    let fifth = engine.get_jobs(&u1).expect("miss after delete");
    assert_eq!(engine.store().owner_scans.get(), 4);
    assert!(fifth.iter().all(|job| job.id != created.id));
}

#[test]
fn listing_deduplicates_pairs_keeping_latest_activity() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let old = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Rejected))
        .expect("old round");
    std::thread::sleep(std::time::Duration::from_millis(3));
    let current = engine
        .create_job(&u1, input("ENGINEER", "acme", JobStatus::Applied))
        .expect("current round");
    engine
        .create_job(&u1, input("Designer", "Acme", JobStatus::Wishlist))
        .expect("other pair");

    let listing = engine.get_jobs(&u1).expect("listing");
    assert_eq!(listing.len(), 2);
    assert!(listing.iter().any(|job| job.id == current.id));
    assert!(listing.iter().all(|job| job.id != old.id));
}

#[test]
fn listings_are_isolated_per_owner() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let u2 = owner("U2");
    engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect("u1 create");
    engine
        .create_job(&u2, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect("same pair for another owner");

    engine.get_jobs(&u1).expect("warm u1");
    engine
        .create_job(&u2, input("Designer", "Acme", JobStatus::Wishlist))
        .expect("u2 create");

    let key = listing_key(&u1);
    assert!(engine.cache().inner.get(&key).expect("peek").is_some());
    assert_eq!(engine.get_jobs(&u2).expect("u2 listing").len(), 2);
    assert_eq!(engine.get_jobs(&u1).expect("u1 listing").len(), 1);
}

#[test]
fn cache_read_failure_falls_back_to_store() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect("create");

    engine.cache().failing.set(true);
    let listing = engine.get_jobs(&u1).expect("served from store");
    assert_eq!(listing.len(), 1);
    assert_eq!(engine.store().owner_scans.get(), 1);
}

#[test]
fn failed_invalidation_is_retried_then_reported() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");

    engine.cache().failing.set(true);
    let invalidations_before = engine.cache().invalidations.get();
    let err = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect_err("invalidation never succeeds");
    match &err {
        EngineError::CacheUnavailable { attempts, .. } => assert_eq!(*attempts, 3),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.kind().is_retryable());
    assert_eq!(engine.cache().invalidations.get() - invalidations_before, 3);

    engine.cache().failing.set(false);
    assert_eq!(engine.get_jobs(&u1).expect("write committed").len(), 1);
}

#[test]
fn unreachable_store_is_never_reported_as_absent() {
    let (_dir, mut engine) = engine();
    let u1 = owner("U1");
    let job = engine
        .create_job(&u1, input("Engineer", "Acme", JobStatus::Wishlist))
        .expect("create");

    engine.store().offline.set(true);

    let err = engine.get_jobs(&u1).expect_err("store down");
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);

    let err = engine.delete_job(&u1, &job.id).expect_err("store down");
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);

    let err = engine
        .create_job(&u1, input("Designer", "Acme", JobStatus::Wishlist))
        .expect_err("store down");
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
}
