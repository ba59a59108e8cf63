#![forbid(unsafe_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use grievance_contracts::complaint::{
    ComplaintId, ComplaintRecord, ComplaintStatus, Department, Priority,
};
use grievance_contracts::intake::{ComplaintDraft, ValidComplaint};
use grievance_engines::query::{ComplaintQuery, Selector, SortKey};
use grievance_engines::tracking_id;
use grievance_os::clock::ManualClock;
use grievance_os::config::PortalConfig;
use grievance_os::error::PortalError;
use grievance_os::notify::{titles, RecordingNotifier};
use grievance_os::portal::{ComplaintPortal, TrackOutcome};
use grievance_storage::repo::ComplaintRepo;
use grievance_storage::store::{ComplaintStore, StorageError};
use grievance_storage::surface::{FileSurface, MemorySurface};
use rand::rngs::StdRng;
use rand::SeedableRng;

type MemPortal = ComplaintPortal<ComplaintStore<MemorySurface>, ManualClock, RecordingNotifier>;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
}

fn mem_portal(config: PortalConfig, seed: u64) -> MemPortal {
    let store = ComplaintStore::open(MemorySurface::new()).unwrap();
    ComplaintPortal::new(
        config,
        store,
        ManualClock::stepping(t0(), Duration::seconds(1)),
        RecordingNotifier::new(),
    )
    .with_rng(StdRng::seed_from_u64(seed))
}

fn broken_ac() -> ComplaintDraft {
    ComplaintDraft {
        title: "Broken AC".to_string(),
        description: "x".repeat(60),
        department: "Facilities & Maintenance".to_string(),
        priority: Priority::High,
        agree_terms: true,
        ..ComplaintDraft::default()
    }
}

fn found(outcome: TrackOutcome) -> grievance_os::portal::TrackView {
    match outcome {
        TrackOutcome::Found(view) => view,
        other => panic!("expected a hit, got {other:?}"),
    }
}

#[test]
fn at_portal_flow_01_submit_resolve_track() {
    let mut p = mem_portal(PortalConfig::default(), 1);
    let id = p.submit(&broken_ac()).unwrap();

    let view = found(p.track(id.as_str()).unwrap());
    assert_eq!(view.record.status, ComplaintStatus::Submitted);
    assert_eq!(view.record.created_at, view.record.updated_at);

    let session = p.login("admin", "admin123").unwrap();
    p.set_status(&session, &id, ComplaintStatus::Resolved).unwrap();

    let view = found(p.track(id.as_str()).unwrap());
    assert_eq!(view.record.status, ComplaintStatus::Resolved);
    let completed: Vec<bool> = view.timeline.iter().map(|s| s.completed).collect();
    let current: Vec<bool> = view.timeline.iter().map(|s| s.current).collect();
    assert_eq!(completed, vec![true, true, true, true]);
    assert_eq!(current, vec![false, false, false, true]);
    assert_eq!(
        p.notifier().titles(),
        vec![titles::SUBMITTED, titles::LOGIN_SUCCESSFUL, titles::STATUS_UPDATED]
    );
}

#[test]
fn at_portal_flow_02_tracking_codes_are_eight_upper_alnum() {
    let mut p = mem_portal(PortalConfig::default(), 2);
    for _ in 0..20 {
        let id = p.submit(&broken_ac()).unwrap();
        assert_eq!(id.as_str().len(), 8);
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
    assert_eq!(p.repo().complaint_rows().len(), 20);
}

#[test]
fn at_portal_flow_03_failed_save_keeps_prior_state() {
    let mut p = mem_portal(PortalConfig::default(), 3);
    let id = p.submit(&broken_ac()).unwrap();
    let session = p.login("admin", "admin123").unwrap();
    let before = p.repo().complaint_row(&id).cloned().unwrap();
    let persisted_before = p.repo().surface().bytes().map(<[u8]>::to_vec);

    p.repo_mut().surface_mut().set_fail_saves(true);
    let err = p
        .save_changes(
            &session,
            &id,
            Some(ComplaintStatus::Closed),
            Some("Handed to facilities".to_string()),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Storage(StorageError::SurfaceUnavailable { .. })
    ));
    assert_eq!(p.repo().complaint_row(&id), Some(&before));
    assert_eq!(
        p.repo().surface().bytes().map(<[u8]>::to_vec),
        persisted_before
    );
    assert_eq!(p.notifier().last().map(|t| t.title.as_str()), Some(titles::SAVE_FAILED));

    let submit_err = p.submit(&broken_ac()).unwrap_err();
    assert!(matches!(submit_err, PortalError::Storage(_)));
    assert_eq!(p.repo().complaint_rows().len(), 1);
    assert_eq!(
        p.notifier().last().map(|t| t.title.as_str()),
        Some(titles::SUBMISSION_FAILED)
    );
}

#[test]
fn at_portal_flow_04_repeated_status_is_idempotent_on_status() {
    let mut p = mem_portal(PortalConfig::default(), 4);
    let id = p.submit(&broken_ac()).unwrap();
    let session = p.login("admin", "admin123").unwrap();

    let first = p
        .set_status(&session, &id, ComplaintStatus::InProgress)
        .unwrap();
    let second = p
        .set_status(&session, &id, ComplaintStatus::InProgress)
        .unwrap();
    assert_eq!(first.status, second.status);
    assert!(second.updated_at >= first.updated_at);
    assert!(first.updated_at > first.created_at);
}

#[test]
fn at_portal_flow_05_save_changes_applies_status_and_note_together() {
    let mut p = mem_portal(PortalConfig::default(), 5);
    let id = p.submit(&broken_ac()).unwrap();
    let session = p.login("admin", "admin123").unwrap();

    p.set_note(&session, &id, "first look").unwrap();
    let saved = p
        .save_changes(
            &session,
            &id,
            Some(ComplaintStatus::UnderReview),
            Some("Technician booked".to_string()),
        )
        .unwrap();
    assert_eq!(saved.status, ComplaintStatus::UnderReview);
    assert_eq!(saved.admin_notes.as_deref(), Some("Technician booked"));
    assert_eq!(p.complaint(&session, &id), Some(&saved));
}

#[test]
fn at_portal_flow_06_code_collision_draws_again() {
    let seed = 6;
    let taken = tracking_id::generate_with(&mut StdRng::seed_from_u64(seed));

    let mut store = ComplaintStore::open(MemorySurface::new()).unwrap();
    let existing = ComplaintRecord::v1(
        taken.clone(),
        ValidComplaint::v1(
            "Already here".to_string(),
            "y".repeat(55),
            Department::LibraryServices,
            Priority::Low,
            vec![],
            None,
            None,
        )
        .unwrap(),
        t0(),
    )
    .unwrap();
    store.insert_complaint_row(existing).unwrap();

    let mut p = ComplaintPortal::new(
        PortalConfig::default(),
        store,
        ManualClock::fixed(t0()),
        RecordingNotifier::new(),
    )
    .with_rng(StdRng::seed_from_u64(seed));
    let id = p.submit(&broken_ac()).unwrap();
    assert_ne!(id, taken);
    assert_eq!(p.repo().complaint_rows().len(), 2);
}

#[test]
fn at_portal_flow_07_collision_budget_exhausted() {
    let seed = 7;
    let taken = tracking_id::generate_with(&mut StdRng::seed_from_u64(seed));
    let config = PortalConfig {
        id_generation_attempts: 1,
        ..PortalConfig::default()
    };
    let mut p = mem_portal(config, seed);
    let session = p.login("admin", "admin123").unwrap();
    let mut draft = broken_ac();
    draft.title = "Occupies the code".to_string();
    let first = p.submit(&draft).unwrap();
    assert_eq!(first, taken);

    let mut p = {
        let (store, notifier) = p.into_parts();
        ComplaintPortal::new(
            PortalConfig {
                id_generation_attempts: 1,
                ..PortalConfig::default()
            },
            store,
            ManualClock::fixed(t0()),
            notifier,
        )
        .with_rng(StdRng::seed_from_u64(seed))
    };
    assert!(matches!(
        p.submit(&broken_ac()),
        Err(PortalError::IdSpaceExhausted { attempts: 1 })
    ));
    assert_eq!(p.list(&session, &ComplaintQuery::default()).total, 1);
}

#[test]
fn at_portal_flow_08_empty_store_dashboard_is_zero() {
    let mut p = mem_portal(PortalConfig::default(), 8);
    let session = p.login("admin", "admin123").unwrap();
    let stats = p.dashboard(&session);
    assert_eq!(stats.total, 0);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.resolved_or_closed, 0);
    assert_eq!(stats.today, 0);
    assert_eq!(stats.this_month, 0);
    assert!(stats.recent.is_empty());
    assert!(p.status_counts(&session).values().all(|n| *n == 0));
}

#[test]
fn at_portal_flow_09_list_reports_shown_of_total() {
    let mut p = mem_portal(PortalConfig::default(), 9);
    let session = p.login("admin", "admin123").unwrap();
    let mut low = broken_ac();
    low.title = "Dim corridor lights".to_string();
    low.priority = Priority::Low;
    p.submit(&low).unwrap();
    let urgent_id = {
        let mut d = broken_ac();
        d.priority = Priority::Urgent;
        p.submit(&d).unwrap()
    };
    p.submit(&broken_ac()).unwrap();

    let all = p.list(
        &session,
        &ComplaintQuery {
            sort_key: SortKey::Priority,
            ..ComplaintQuery::default()
        },
    );
    assert_eq!((all.shown, all.total, all.is_filtered), (3, 3, false));
    assert_eq!(all.items[0].id, urgent_id);

    let narrowed = p.list(
        &session,
        &ComplaintQuery {
            search_text: "corridor".to_string(),
            priority: Selector::Only(Priority::Low),
            ..ComplaintQuery::default()
        },
    );
    assert_eq!((narrowed.shown, narrowed.total, narrowed.is_filtered), (1, 3, true));

    let stats = p.dashboard(&session);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.today, 3);
    assert_eq!(stats.pending, 3);
    assert_eq!(stats.high_priority_recent, 2);
}

#[test]
fn at_portal_flow_10_file_store_shared_between_portals() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        ComplaintPortal::new(
            PortalConfig::default(),
            ComplaintStore::open(FileSurface::in_dir(dir.path())).unwrap(),
            ManualClock::fixed(t0()),
            RecordingNotifier::new(),
        )
    };
    let mut writer = open();
    let mut reader = open();
    let id = writer.submit(&broken_ac()).unwrap();

    assert!(matches!(
        reader.track(id.as_str()).unwrap(),
        TrackOutcome::NotFound { .. }
    ));
    reader.reload().unwrap();
    assert_eq!(found(reader.track(id.as_str()).unwrap()).record.id, id);
    assert_eq!(
        ComplaintId::normalize_code(&format!(" {} ", id.as_str().to_lowercase())),
        id.as_str()
    );
}

#[test]
fn at_portal_flow_11_set_note_stores_text_verbatim() {
    let mut p = mem_portal(PortalConfig::default(), 11);
    let id = p.submit(&broken_ac()).unwrap();
    let session = p.login("admin", "admin123").unwrap();

    let first = p.set_note(&session, &id, "first").unwrap();
    assert_eq!(first.admin_notes.as_deref(), Some("first"));

    let cleared = p.set_note(&session, &id, "").unwrap();
    assert_eq!(cleared.admin_notes.as_deref(), Some(""));
    assert!(cleared.updated_at > first.updated_at);

    let padded = p.set_note(&session, &id, "  call back Friday ").unwrap();
    assert_eq!(padded.admin_notes.as_deref(), Some("  call back Friday "));
    assert_eq!(p.complaint(&session, &id), Some(&padded));
    assert_eq!(p.notifier().last().map(|t| t.title.as_str()), Some(titles::CHANGES_SAVED));
}
