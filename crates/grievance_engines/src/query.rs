#![forbid(unsafe_code)]

use std::cmp::Reverse;

use grievance_contracts::complaint::{ComplaintRecord, ComplaintStatus, Department, Priority};
use serde::Serialize;

/// A categorical filter: `All` is the "no filter" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector<T> {
    All,
    Only(T),
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Selector::All
    }
}

impl<T: PartialEq + Copy> Selector<T> {
    pub fn admits(&self, value: T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(v) => *v == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }

    /// Parses `"all"` as the sentinel and anything else with `parse`.
    pub fn parse_with(raw: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Self> {
        if raw == "all" {
            return Some(Selector::All);
        }
        parse(raw).map(Selector::Only)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Priority,
    Status,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Priority => "priority",
            SortKey::Status => "status",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "newest" => Some(SortKey::Newest),
            "oldest" => Some(SortKey::Oldest),
            "priority" => Some(SortKey::Priority),
            "status" => Some(SortKey::Status),
            _ => None,
        }
    }
}

/// Admin list controls. `Default` is the cleared state: no search text,
/// every filter `All`, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplaintQuery {
    pub search_text: String,
    pub status: Selector<ComplaintStatus>,
    pub department: Selector<Department>,
    pub priority: Selector<Priority>,
    pub sort_key: SortKey,
}

impl ComplaintQuery {
    /// True when any search or filter narrows the list. The sort key does not
    /// count.
    pub fn is_filtered(&self) -> bool {
        !self.search_text.is_empty()
            || !self.status.is_all()
            || !self.department.is_all()
            || !self.priority.is_all()
    }

    pub fn matches(&self, record: &ComplaintRecord) -> bool {
        if !self.search_text.is_empty() {
            let needle = self.search_text.to_lowercase();
            let hit = record.id.as_str().to_lowercase().contains(&needle)
                || record.title.to_lowercase().contains(&needle)
                || record.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        self.status.admits(record.status)
            && self.department.admits(record.department)
            && self.priority.admits(record.priority)
    }
}

/// Filters then sorts. Sorting is stable, so ties keep collection order.
pub fn query<'a>(records: &'a [ComplaintRecord], q: &ComplaintQuery) -> Vec<&'a ComplaintRecord> {
    let mut out: Vec<&ComplaintRecord> = records.iter().filter(|r| q.matches(r)).collect();
    match q.sort_key {
        SortKey::Newest => out.sort_by_key(|r| Reverse(r.created_at)),
        SortKey::Oldest => out.sort_by_key(|r| r.created_at),
        SortKey::Priority => out.sort_by_key(|r| Reverse(r.priority.rank())),
        // Alphabetical on the stored literal, not lifecycle order.
        SortKey::Status => out.sort_by_key(|r| r.status.as_str()),
    }
    out
}
