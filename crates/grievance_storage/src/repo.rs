#![forbid(unsafe_code)]

use grievance_contracts::complaint::{ComplaintId, ComplaintRecord};

use crate::store::{ComplaintStore, StorageError};
use crate::surface::RecordSurface;

/// Typed repository interface for complaint persistence wiring.
///
/// Callers depend on this trait instead of a concrete store so the local
/// surface can later be swapped for a real database.
pub trait ComplaintRepo {
    fn insert_complaint_row(&mut self, record: ComplaintRecord) -> Result<(), StorageError>;
    fn update_complaint_row<F>(
        &mut self,
        id: &ComplaintId,
        f: F,
    ) -> Result<ComplaintRecord, StorageError>
    where
        F: FnOnce(&mut ComplaintRecord);
    fn complaint_row(&self, id: &ComplaintId) -> Option<&ComplaintRecord>;
    fn complaint_row_by_code(&self, raw_code: &str) -> Option<&ComplaintRecord>;
    fn complaint_rows(&self) -> &[ComplaintRecord];
    fn refresh_complaint_rows(&mut self) -> Result<(), StorageError>;
}

impl<S: RecordSurface> ComplaintRepo for ComplaintStore<S> {
    fn insert_complaint_row(&mut self, record: ComplaintRecord) -> Result<(), StorageError> {
        self.insert(record)
    }

    fn update_complaint_row<F>(
        &mut self,
        id: &ComplaintId,
        f: F,
    ) -> Result<ComplaintRecord, StorageError>
    where
        F: FnOnce(&mut ComplaintRecord),
    {
        self.update(id, f)
    }

    fn complaint_row(&self, id: &ComplaintId) -> Option<&ComplaintRecord> {
        self.get(id)
    }

    fn complaint_row_by_code(&self, raw_code: &str) -> Option<&ComplaintRecord> {
        self.find_by_code(raw_code)
    }

    fn complaint_rows(&self) -> &[ComplaintRecord] {
        self.rows()
    }

    fn refresh_complaint_rows(&mut self) -> Result<(), StorageError> {
        self.reload()
    }
}
