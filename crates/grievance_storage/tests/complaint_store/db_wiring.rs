#![forbid(unsafe_code)]

use std::fs;

use chrono::{DateTime, Duration, TimeZone, Utc};
use grievance_contracts::complaint::{
    ComplaintId, ComplaintRecord, ComplaintStatus, ContactMethod, Department, Priority,
};
use grievance_contracts::intake::ValidComplaint;
use grievance_storage::repo::ComplaintRepo;
use grievance_storage::store::{ComplaintStore, StorageError};
use grievance_storage::surface::{FileSurface, MemorySurface, RecordSurface};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 12, 8, 15, 0).unwrap()
}

fn complaint(title: &str) -> ValidComplaint {
    ValidComplaint::v1(
        title.to_string(),
        "The shuttle from the north gate has not shown up on three mornings this week."
            .to_string(),
        Department::Transportation,
        Priority::High,
        vec!["timetable.pdf".to_string()],
        Some(ContactMethod::Email),
        Some("student@example.edu".to_string()),
    )
    .unwrap()
}

fn record(id: &str, title: &str) -> ComplaintRecord {
    ComplaintRecord::v1(ComplaintId::new(id).unwrap(), complaint(title), t0()).unwrap()
}

#[test]
fn at_store_db_01_rows_survive_reopen_of_file_surface() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ComplaintStore::open(FileSurface::in_dir(dir.path())).unwrap();
    store
        .insert_complaint_row(record("SHUTTLE1", "Shuttle missing"))
        .unwrap();
    store
        .insert_complaint_row(record("SHUTTLE2", "Shuttle late"))
        .unwrap();

    let reopened = ComplaintStore::open(FileSurface::in_dir(dir.path())).unwrap();
    let ids: Vec<&str> = reopened
        .complaint_rows()
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["SHUTTLE1", "SHUTTLE2"]);
    assert_eq!(reopened.complaint_rows()[0], store.complaint_rows()[0]);
}

#[test]
fn at_store_db_02_persisted_layout_is_a_plain_array_of_records() {
    let dir = tempfile::tempdir().unwrap();
    let surface = FileSurface::in_dir(dir.path());
    let path = surface.path().to_path_buf();
    let mut store = ComplaintStore::open(surface).unwrap();
    store
        .insert_complaint_row(record("LAYOUT01", "Layout"))
        .unwrap();

    let raw = fs::read_to_string(path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "LAYOUT01");
    assert_eq!(rows[0]["status"], "submitted");
    assert_eq!(rows[0]["department"], "Transportation");
    assert_eq!(rows[0]["files"][0], "timetable.pdf");
    assert_eq!(rows[0]["contactMethod"], "email");
    assert_eq!(rows[0]["createdAt"], rows[0]["updatedAt"]);
}

#[test]
fn at_store_db_03_duplicate_insert_is_rejected_without_write() {
    let mut store = ComplaintStore::open(MemorySurface::new()).unwrap();
    store
        .insert_complaint_row(record("SAMEID01", "First"))
        .unwrap();
    let before = store.surface().bytes().map(|b| b.to_vec());

    let err = store
        .insert_complaint_row(record("SAMEID01", "Second"))
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::DuplicateKey {
            table: "complaints",
            ..
        }
    ));
    assert_eq!(store.complaint_rows().len(), 1);
    assert_eq!(store.complaint_rows()[0].title, "First");
    assert_eq!(store.surface().bytes().map(|b| b.to_vec()), before);
}

#[test]
fn at_store_db_04_update_persists_and_returns_new_row() {
    let mut store = ComplaintStore::open(MemorySurface::new()).unwrap();
    store
        .insert_complaint_row(record("UPDATE01", "Update me"))
        .unwrap();
    let id = ComplaintId::new("UPDATE01").unwrap();
    let later = t0() + Duration::hours(3);

    let updated = store
        .update_complaint_row(&id, |r| {
            r.status = ComplaintStatus::InProgress;
            r.touch(later);
        })
        .unwrap();
    assert_eq!(updated.status, ComplaintStatus::InProgress);
    assert_eq!(updated.updated_at, later);

    let bytes = store.surface().load().unwrap().unwrap();
    let reread = ComplaintStore::open(MemorySurface::with_bytes(bytes)).unwrap();
    assert_eq!(reread.complaint_row(&id), Some(&updated));
}

#[test]
fn at_store_db_05_update_of_unknown_id_is_not_found() {
    let mut store = ComplaintStore::open(MemorySurface::new()).unwrap();
    let id = ComplaintId::new("MISSING1").unwrap();
    let err = store.update_complaint_row(&id, |_| {}).unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[test]
fn at_store_db_06_failed_insert_keeps_prior_persisted_state() {
    let mut store = ComplaintStore::open(MemorySurface::new()).unwrap();
    store
        .insert_complaint_row(record("KEPT0001", "Kept"))
        .unwrap();
    let before = store.surface().bytes().map(|b| b.to_vec());

    store.surface_mut().set_fail_saves(true);
    let err = store
        .insert_complaint_row(record("LOST0001", "Lost"))
        .unwrap_err();
    assert!(matches!(err, StorageError::SurfaceUnavailable { .. }));
    assert_eq!(store.complaint_rows().len(), 1);
    assert_eq!(store.surface().bytes().map(|b| b.to_vec()), before);

    store.refresh_complaint_rows().unwrap();
    assert_eq!(store.complaint_rows().len(), 1);
}

#[test]
fn at_store_db_07_invalid_json_surfaces_codec_error() {
    let err = ComplaintStore::open(MemorySurface::with_bytes(b"{not json".to_vec())).unwrap_err();
    assert!(matches!(err, StorageError::Json(_)));
}

#[test]
fn at_store_db_08_unwritable_location_fails_the_insert() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();

    let mut store = ComplaintStore::open(FileSurface::in_dir(blocker.join("data"))).unwrap();
    let err = store
        .insert_complaint_row(record("NOWRITE1", "No write"))
        .unwrap_err();
    assert!(matches!(err, StorageError::Io(_)));
    assert!(store.complaint_rows().is_empty());
}

#[test]
fn at_store_db_09_rows_below_current_length_rules_still_open() {
    let dir = tempfile::tempdir().unwrap();
    let surface = FileSurface::in_dir(dir.path());
    fs::write(
        surface.path(),
        r#"[{"id":"LEGACY01","title":"Tap","description":"leaking tap!","department":"Other",
            "priority":"low","status":"submitted","createdAt":"2026-04-01T08:00:00Z",
            "updatedAt":"2026-04-01T08:00:00Z","files":[],"agreeTerms":true}]"#,
    )
    .unwrap();

    let mut store = ComplaintStore::open(surface).unwrap();
    let id = ComplaintId::new("LEGACY01").unwrap();
    assert_eq!(store.complaint_row(&id).unwrap().description, "leaking tap!");

    let updated = store
        .update_complaint_row(&id, |r| {
            r.status = ComplaintStatus::InProgress;
            r.touch(t0());
        })
        .unwrap();
    assert_eq!(updated.status, ComplaintStatus::InProgress);
    assert_eq!(updated.description, "leaking tap!");

    let reopened = ComplaintStore::open(FileSurface::in_dir(dir.path())).unwrap();
    assert_eq!(reopened.complaint_row(&id), Some(&updated));
}
