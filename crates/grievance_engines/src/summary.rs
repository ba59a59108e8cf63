#![forbid(unsafe_code)]

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, TimeZone};
use grievance_contracts::complaint::{ComplaintRecord, ComplaintStatus, Priority};
use serde::Serialize;

/// Size of the dashboard "recent" list.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub resolved_or_closed: usize,
    pub today: usize,
    pub this_month: usize,
    pub recent: Vec<ComplaintRecord>,
    /// `urgent`/`high` complaints among `recent`.
    pub high_priority_recent: usize,
}

pub fn summarize<Tz: TimeZone>(records: &[ComplaintRecord], now: &DateTime<Tz>) -> DashboardStats {
    summarize_with_limit(records, now, RECENT_LIMIT)
}

/// Full scan on every call. Calendar day and month are taken in the time
/// zone of `now`.
pub fn summarize_with_limit<Tz: TimeZone>(
    records: &[ComplaintRecord],
    now: &DateTime<Tz>,
    recent_limit: usize,
) -> DashboardStats {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut stats = DashboardStats {
        total: records.len(),
        ..DashboardStats::default()
    };
    for r in records {
        if r.status.is_pending() {
            stats.pending += 1;
        }
        if r.status.is_resolved_or_closed() {
            stats.resolved_or_closed += 1;
        }
        let created = r.created_at.with_timezone(&tz).date_naive();
        if created == today {
            stats.today += 1;
        }
        if created.year() == today.year() && created.month() == today.month() {
            stats.this_month += 1;
        }
    }

    let mut by_newest: Vec<&ComplaintRecord> = records.iter().collect();
    by_newest.sort_by_key(|r| Reverse(r.created_at));
    stats.recent = by_newest
        .into_iter()
        .take(recent_limit)
        .cloned()
        .collect();
    stats.high_priority_recent = stats
        .recent
        .iter()
        .filter(|r| matches!(r.priority, Priority::Urgent | Priority::High))
        .count();
    stats
}

/// Count per status, every status present even when zero.
pub fn status_counts(records: &[ComplaintRecord]) -> BTreeMap<ComplaintStatus, usize> {
    let mut counts: BTreeMap<ComplaintStatus, usize> =
        ComplaintStatus::ALL.into_iter().map(|s| (s, 0)).collect();
    for r in records {
        *counts.entry(r.status).or_insert(0) += 1;
    }
    counts
}
