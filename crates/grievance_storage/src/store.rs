#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use grievance_contracts::complaint::{ComplaintId, ComplaintRecord};
use grievance_contracts::{ContractViolation, Validate};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::surface::{RecordSurface, COMPLAINTS_KEY};

const TABLE: &str = "complaints";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("duplicate key in {table}: {key}")]
    DuplicateKey { table: &'static str, key: String },
    #[error("no row in {table} for key {key}")]
    NotFound { table: &'static str, key: String },
    #[error("storage for `{key}` is unavailable: {reason}")]
    SurfaceUnavailable { key: &'static str, reason: String },
    #[error("stored `{key}` collection is corrupt: {reason}")]
    Corrupt { key: &'static str, reason: String },
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("complaint json codec failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("contract violation: {0}")]
    ContractViolation(#[from] ContractViolation),
}

/// The complaint collection plus the surface it persists to.
///
/// Every mutation builds the next collection, saves it, and only then
/// replaces the in-memory rows. A failed save leaves both the persisted
/// bytes and `rows()` exactly as they were.
#[derive(Debug)]
pub struct ComplaintStore<S: RecordSurface> {
    surface: S,
    rows: Vec<ComplaintRecord>,
}

impl<S: RecordSurface> ComplaintStore<S> {
    pub fn open(surface: S) -> Result<Self, StorageError> {
        let rows = read_rows(&surface)?;
        info!(key = COMPLAINTS_KEY, rows = rows.len(), "complaint store opened");
        Ok(Self { surface, rows })
    }

    /// Re-reads the persisted collection, discarding the cached rows.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        self.rows = read_rows(&self.surface)?;
        debug!(key = COMPLAINTS_KEY, rows = self.rows.len(), "complaint store reloaded");
        Ok(())
    }

    pub fn rows(&self) -> &[ComplaintRecord] {
        &self.rows
    }

    pub fn get(&self, id: &ComplaintId) -> Option<&ComplaintRecord> {
        self.rows.iter().find(|r| &r.id == id)
    }

    /// Lookup by a user-entered tracking code (trimmed, uppercased).
    pub fn find_by_code(&self, raw: &str) -> Option<&ComplaintRecord> {
        let code = ComplaintId::normalize_code(raw);
        self.rows.iter().find(|r| r.id.as_str() == code)
    }

    pub fn insert(&mut self, record: ComplaintRecord) -> Result<(), StorageError> {
        record.validate()?;
        if self.get(&record.id).is_some() {
            return Err(StorageError::DuplicateKey {
                table: TABLE,
                key: record.id.to_string(),
            });
        }
        let id = record.id.clone();
        let mut next = self.rows.clone();
        next.push(record);
        self.commit(next)?;
        info!(complaint_id = %id, "complaint row inserted");
        Ok(())
    }

    /// Applies `f` to the row for `id` and persists the result. The id is
    /// immutable: a closure that changes it is rejected.
    pub fn update<F>(&mut self, id: &ComplaintId, f: F) -> Result<ComplaintRecord, StorageError>
    where
        F: FnOnce(&mut ComplaintRecord),
    {
        let Some(idx) = self.rows.iter().position(|r| &r.id == id) else {
            return Err(StorageError::NotFound {
                table: TABLE,
                key: id.to_string(),
            });
        };
        let mut next = self.rows.clone();
        f(&mut next[idx]);
        if &next[idx].id != id {
            return Err(StorageError::ContractViolation(
                ContractViolation::InvalidValue {
                    field: "complaint_record.id",
                    reason: "must not change after creation",
                },
            ));
        }
        next[idx].validate_stored()?;
        let updated = next[idx].clone();
        self.commit(next)?;
        debug!(
            complaint_id = %id,
            status = %updated.status,
            updated_at = %updated.updated_at,
            "complaint row updated"
        );
        Ok(updated)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn commit(&mut self, next: Vec<ComplaintRecord>) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(&next)?;
        if let Err(err) = self.surface.save(&bytes) {
            warn!(key = COMPLAINTS_KEY, error = %err, "complaint save failed; keeping prior state");
            return Err(err);
        }
        self.rows = next;
        Ok(())
    }
}

fn read_rows<S: RecordSurface>(surface: &S) -> Result<Vec<ComplaintRecord>, StorageError> {
    match surface.load()? {
        None => Ok(Vec::new()),
        Some(bytes) => decode_rows(&bytes),
    }
}

fn decode_rows(bytes: &[u8]) -> Result<Vec<ComplaintRecord>, StorageError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }
    let rows: Vec<ComplaintRecord> = serde_json::from_slice(bytes)?;
    let mut seen = BTreeSet::new();
    for row in &rows {
        row.validate_stored()?;
        if !seen.insert(row.id.clone()) {
            return Err(StorageError::Corrupt {
                key: COMPLAINTS_KEY,
                reason: format!("duplicate complaint id {}", row.id),
            });
        }
    }
    Ok(rows)
}
