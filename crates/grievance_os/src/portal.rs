#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use grievance_contracts::complaint::{ComplaintId, ComplaintRecord, ComplaintStatus};
use grievance_contracts::intake::{AttachmentCandidate, ComplaintDraft};
use grievance_engines::intake::{validate_draft, AttachmentBatchOutcome, AttachmentSet};
use grievance_engines::lifecycle::{apply_note, apply_status, timeline, TimelineStage};
use grievance_engines::query::{query, ComplaintQuery};
use grievance_engines::summary::{status_counts, summarize_with_limit, DashboardStats};
use grievance_engines::tracking_id;
use grievance_storage::repo::ComplaintRepo;
use grievance_storage::store::StorageError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::admin::{admin_login, AdminSession};
use crate::clock::Clock;
use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::notify::{titles, Notifier, Toast};

/// Public tracking result. A miss is an outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TrackOutcome {
    Found(TrackView),
    NotFound { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackView {
    pub record: ComplaintRecord,
    pub timeline: Vec<TimelineStage>,
}

/// One page of the admin list, with the "showing N of M" counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintListView {
    pub items: Vec<ComplaintRecord>,
    pub shown: usize,
    pub total: usize,
    pub is_filtered: bool,
}

/// Complaint portal runtime: intake, tracking and admin operations over a
/// complaint repository.
pub struct ComplaintPortal<R, C, N>
where
    R: ComplaintRepo,
    C: Clock,
    N: Notifier,
{
    config: PortalConfig,
    repo: R,
    clock: C,
    notifier: N,
    rng: StdRng,
}

impl<R, C, N> ComplaintPortal<R, C, N>
where
    R: ComplaintRepo,
    C: Clock,
    N: Notifier,
{
    pub fn new(config: PortalConfig, repo: R, clock: C, notifier: N) -> Self {
        Self {
            config,
            repo,
            clock,
            notifier,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replaces the tracking-code RNG.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn into_parts(self) -> (R, N) {
        (self.repo, self.notifier)
    }

    /// Re-reads the persisted collection.
    pub fn reload(&mut self) -> Result<(), PortalError> {
        self.repo.refresh_complaint_rows()?;
        Ok(())
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<AdminSession, PortalError> {
        match admin_login(&self.config, username, password, self.clock.now()) {
            Ok(session) => {
                self.notifier.notify(Toast::info(
                    titles::LOGIN_SUCCESSFUL,
                    "Welcome to the admin dashboard",
                ));
                Ok(session)
            }
            Err(e) => {
                self.notifier.notify(Toast::destructive(
                    titles::LOGIN_FAILED,
                    "Invalid username or password",
                ));
                Err(e)
            }
        }
    }

    /// Offers picked files to `set`, raising one destructive toast per
    /// oversize file.
    pub fn offer_attachments<I>(
        &mut self,
        set: &mut AttachmentSet,
        files: I,
    ) -> AttachmentBatchOutcome
    where
        I: IntoIterator<Item = AttachmentCandidate>,
    {
        let out = set.add(files);
        for r in &out.rejected {
            self.notifier.notify(Toast::destructive(
                titles::FILE_TOO_LARGE,
                format!("{} is larger than 5MB", r.name),
            ));
        }
        if !out.dropped_over_cap.is_empty() {
            debug!(dropped = out.dropped_over_cap.len(), "attachments over cap dropped");
        }
        out
    }

    /// Validates and stores a new complaint, returning its tracking code.
    ///
    /// On a code collision a fresh code is drawn, up to
    /// `id_generation_attempts` times. Nothing is stored on any failure.
    pub fn submit(&mut self, draft: &ComplaintDraft) -> Result<ComplaintId, PortalError> {
        let valid = match validate_draft(draft) {
            Ok(v) => v,
            Err(errors) => {
                self.notifier.notify(Toast::destructive(
                    titles::VALIDATION_ERROR,
                    "Please fix the errors before submitting",
                ));
                return Err(PortalError::Validation(errors));
            }
        };

        let now = self.clock.now();
        let attempts = self.config.id_generation_attempts.max(1);
        for attempt in 1..=attempts {
            let id = tracking_id::generate_with(&mut self.rng);
            let record = ComplaintRecord::v1(id.clone(), valid.clone(), now)?;
            match self.repo.insert_complaint_row(record) {
                Ok(()) => {
                    info!(
                        complaint_id = %id,
                        department = valid.department.as_str(),
                        "complaint submitted"
                    );
                    self.notifier.notify(Toast::info(
                        titles::SUBMITTED,
                        format!("Your complaint ID is {id}. Please save this for tracking."),
                    ));
                    return Ok(id);
                }
                Err(StorageError::DuplicateKey { .. }) => {
                    debug!(complaint_id = %id, attempt, "tracking code collision, drawing again");
                }
                Err(e) => {
                    self.submission_failed();
                    return Err(e.into());
                }
            }
        }
        warn!(attempts, "no free tracking code");
        self.submission_failed();
        Err(PortalError::IdSpaceExhausted { attempts })
    }

    fn submission_failed(&mut self) {
        self.notifier.notify(Toast::destructive(
            titles::SUBMISSION_FAILED,
            "Please try again later",
        ));
    }

    /// Public lookup. Input is trimmed and uppercased before matching.
    pub fn track(&self, raw_code: &str) -> Result<TrackOutcome, PortalError> {
        let code = ComplaintId::normalize_code(raw_code);
        if code.is_empty() {
            return Err(PortalError::EmptyTrackingCode);
        }
        let outcome = match self.repo.complaint_row_by_code(&code) {
            Some(record) => TrackOutcome::Found(TrackView {
                timeline: timeline(record.status),
                record: record.clone(),
            }),
            None => {
                debug!(code = %code, "tracking lookup missed");
                TrackOutcome::NotFound { code }
            }
        };
        Ok(outcome)
    }

    /// Quick status change from the list view.
    pub fn set_status(
        &mut self,
        _session: &AdminSession,
        id: &ComplaintId,
        status: ComplaintStatus,
    ) -> Result<ComplaintRecord, PortalError> {
        let now = self.clock.now();
        let result = self
            .repo
            .update_complaint_row(id, |r| apply_status(r, status, now));
        match result {
            Ok(record) => {
                info!(complaint_id = %id, status = status.as_str(), "complaint status changed");
                self.notifier.notify(Toast::info(
                    titles::STATUS_UPDATED,
                    format!("Complaint {id} status changed to {}", status.label().to_lowercase()),
                ));
                Ok(record)
            }
            Err(e) => {
                self.notifier.notify(Toast::destructive(
                    titles::UPDATE_FAILED,
                    "Failed to update complaint status",
                ));
                Err(map_update_error(id, e))
            }
        }
    }

    /// Stores the note exactly as typed, including an empty one.
    pub fn set_note(
        &mut self,
        _session: &AdminSession,
        id: &ComplaintId,
        note: impl Into<String>,
    ) -> Result<ComplaintRecord, PortalError> {
        let note = note.into();
        let now = self.clock.now();
        match self.repo.update_complaint_row(id, |r| apply_note(r, note, now)) {
            Ok(record) => {
                info!(complaint_id = %id, "admin note saved");
                self.notifier.notify(Toast::info(
                    titles::CHANGES_SAVED,
                    "Complaint has been updated successfully",
                ));
                Ok(record)
            }
            Err(e) => {
                self.notifier
                    .notify(Toast::destructive(titles::SAVE_FAILED, "Failed to save changes"));
                Err(map_update_error(id, e))
            }
        }
    }

    /// Detail-view save: status and note land in one write or not at all.
    /// An unchanged status or a blank note is left alone; notes are stored
    /// trimmed.
    pub fn save_changes(
        &mut self,
        _session: &AdminSession,
        id: &ComplaintId,
        status: Option<ComplaintStatus>,
        note: Option<String>,
    ) -> Result<ComplaintRecord, PortalError> {
        let now = self.clock.now();
        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let result = self.repo.update_complaint_row(id, |r| {
            if let Some(s) = status.filter(|s| *s != r.status) {
                apply_status(r, s, now);
            }
            if let Some(n) = note {
                apply_note(r, n, now);
            }
        });
        match result {
            Ok(record) => {
                info!(complaint_id = %id, status = record.status.as_str(), "complaint changes saved");
                self.notifier.notify(Toast::info(
                    titles::CHANGES_SAVED,
                    "Complaint has been updated successfully",
                ));
                Ok(record)
            }
            Err(e) => {
                self.notifier
                    .notify(Toast::destructive(titles::SAVE_FAILED, "Failed to save changes"));
                Err(map_update_error(id, e))
            }
        }
    }

    pub fn complaint(&self, _session: &AdminSession, id: &ComplaintId) -> Option<&ComplaintRecord> {
        self.repo.complaint_row(id)
    }

    pub fn list(&self, _session: &AdminSession, q: &ComplaintQuery) -> ComplaintListView {
        let rows = self.repo.complaint_rows();
        let items: Vec<ComplaintRecord> = query(rows, q).into_iter().cloned().collect();
        ComplaintListView {
            shown: items.len(),
            total: rows.len(),
            is_filtered: q.is_filtered(),
            items,
        }
    }

    /// Dashboard figures with day and month taken at the configured offset.
    pub fn dashboard(&self, _session: &AdminSession) -> DashboardStats {
        let now = self.clock.now().with_timezone(&self.config.dashboard_offset());
        summarize_with_limit(self.repo.complaint_rows(), &now, self.config.recent_limit)
    }

    pub fn status_counts(&self, _session: &AdminSession) -> BTreeMap<ComplaintStatus, usize> {
        status_counts(self.repo.complaint_rows())
    }
}

fn map_update_error(id: &ComplaintId, e: StorageError) -> PortalError {
    match e {
        StorageError::NotFound { .. } => PortalError::NotFound(id.clone()),
        other => PortalError::Storage(other),
    }
}
