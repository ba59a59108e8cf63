#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use grievance_contracts::complaint::{ComplaintRecord, ComplaintStatus};
use serde::Serialize;

/// The ordered non-terminal stages shown as progress. `closed` is not on it.
pub const TIMELINE: [TimelineEntry; 4] = [
    TimelineEntry {
        status: ComplaintStatus::Submitted,
        label: "Submitted",
        description: "Complaint received",
    },
    TimelineEntry {
        status: ComplaintStatus::UnderReview,
        label: "Under Review",
        description: "Being reviewed by department",
    },
    TimelineEntry {
        status: ComplaintStatus::InProgress,
        label: "In Progress",
        description: "Action being taken",
    },
    TimelineEntry {
        status: ComplaintStatus::Resolved,
        label: "Resolved",
        description: "Issue addressed",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEntry {
    pub status: ComplaintStatus,
    pub label: &'static str,
    pub description: &'static str,
}

/// One stage of the tracking-page progress view. The current stage is also
/// completed; a stage with neither flag is still ahead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineStage {
    pub index: usize,
    pub status: ComplaintStatus,
    pub label: &'static str,
    pub description: &'static str,
    pub completed: bool,
    pub current: bool,
}

/// Zero-based stage index, `None` for `closed`.
pub fn timeline_position(status: ComplaintStatus) -> Option<usize> {
    TIMELINE.iter().position(|e| e.status == status)
}

/// Renders every stage relative to `status`. For `closed` no stage is
/// completed or current.
pub fn timeline(status: ComplaintStatus) -> Vec<TimelineStage> {
    let current = timeline_position(status);
    TIMELINE
        .iter()
        .enumerate()
        .map(|(index, e)| TimelineStage {
            index,
            status: e.status,
            label: e.label,
            description: e.description,
            completed: current.is_some_and(|c| index <= c),
            current: current == Some(index),
        })
        .collect()
}

/// Admin status change. Any status may follow any other; there is no
/// transition table.
pub fn apply_status(record: &mut ComplaintRecord, status: ComplaintStatus, now: DateTime<Utc>) {
    record.status = status;
    record.touch(now);
}

/// Replaces the single admin note. Earlier notes are not kept.
pub fn apply_note(record: &mut ComplaintRecord, note: impl Into<String>, now: DateTime<Utc>) {
    record.admin_notes = Some(note.into());
    record.touch(now);
}
