#![forbid(unsafe_code)]

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::common::validate_text;
use crate::intake::{
    ValidComplaint, DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS, TITLE_MAX_CHARS,
};
use crate::{ContractViolation, Validate};

/// Length of a tracking code handed to submitters.
pub const COMPLAINT_ID_LEN: usize = 8;

/// Tracking code: exactly eight characters from `[A-Z0-9]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComplaintId(String);

impl ComplaintId {
    pub fn new(v: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = v.into();
        validate_complaint_id(&v)?;
        Ok(Self(v))
    }

    /// Normalizes a user-entered tracking code the way lookups do:
    /// surrounding whitespace dropped, letters uppercased.
    pub fn normalize_code(raw: &str) -> String {
        raw.trim().to_ascii_uppercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for ComplaintId {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_complaint_id(&self.0)
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ComplaintId {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ComplaintId> for String {
    fn from(value: ComplaintId) -> Self {
        value.0
    }
}

fn validate_complaint_id(value: &str) -> Result<(), ContractViolation> {
    if value.len() != COMPLAINT_ID_LEN {
        return Err(ContractViolation::InvalidValue {
            field: "complaint_id",
            reason: "must be exactly 8 characters",
        });
    }
    if !value
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    {
        return Err(ContractViolation::InvalidValue {
            field: "complaint_id",
            reason: "must contain only A-Z and 0-9",
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Academic Affairs")]
    AcademicAffairs,
    #[serde(rename = "Administration")]
    Administration,
    #[serde(rename = "Facilities & Maintenance")]
    FacilitiesMaintenance,
    #[serde(rename = "Hostel & Accommodation")]
    HostelAccommodation,
    #[serde(rename = "Library Services")]
    LibraryServices,
    #[serde(rename = "Canteen & Food Services")]
    CanteenFoodServices,
    #[serde(rename = "Transportation")]
    Transportation,
    #[serde(rename = "Student Welfare")]
    StudentWelfare,
    #[serde(rename = "IT Services")]
    ItServices,
    #[serde(rename = "Security")]
    Security,
    #[serde(rename = "Harassment/Misconduct")]
    HarassmentMisconduct,
    #[serde(rename = "Other")]
    Other,
}

impl Department {
    /// Display order used by the submission form.
    pub const ALL: [Department; 12] = [
        Department::AcademicAffairs,
        Department::Administration,
        Department::FacilitiesMaintenance,
        Department::HostelAccommodation,
        Department::LibraryServices,
        Department::CanteenFoodServices,
        Department::Transportation,
        Department::StudentWelfare,
        Department::ItServices,
        Department::Security,
        Department::HarassmentMisconduct,
        Department::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Department::AcademicAffairs => "Academic Affairs",
            Department::Administration => "Administration",
            Department::FacilitiesMaintenance => "Facilities & Maintenance",
            Department::HostelAccommodation => "Hostel & Accommodation",
            Department::LibraryServices => "Library Services",
            Department::CanteenFoodServices => "Canteen & Food Services",
            Department::Transportation => "Transportation",
            Department::StudentWelfare => "Student Welfare",
            Department::ItServices => "IT Services",
            Department::Security => "Security",
            Department::HarassmentMisconduct => "Harassment/Misconduct",
            Department::Other => "Other",
        }
    }

    /// Exact match on the display name.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == raw)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Sort rank: urgent(4) > high(3) > medium(2) > low(1).
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == raw)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five complaint statuses. Declaration order is lifecycle order; the
/// admin list's "status" sort uses [`ComplaintStatus::as_str`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Submitted,
    UnderReview,
    InProgress,
    Resolved,
    Closed,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 5] = [
        ComplaintStatus::Submitted,
        ComplaintStatus::UnderReview,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Submitted => "submitted",
            ComplaintStatus::UnderReview => "under_review",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Closed => "closed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComplaintStatus::Submitted => "Submitted",
            ComplaintStatus::UnderReview => "Under Review",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Closed => "Closed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    pub fn is_pending(self) -> bool {
        matches!(
            self,
            ComplaintStatus::Submitted | ComplaintStatus::UnderReview | ComplaintStatus::InProgress
        )
    }

    pub fn is_resolved_or_closed(self) -> bool {
        matches!(self, ComplaintStatus::Resolved | ComplaintStatus::Closed)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    Email,
    Phone,
    #[serde(rename = "none")]
    NoUpdates,
}

impl ContactMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ContactMethod::Email => "email",
            ContactMethod::Phone => "phone",
            ContactMethod::NoUpdates => "none",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "email" => Some(ContactMethod::Email),
            "phone" => Some(ContactMethod::Phone),
            "none" => Some(ContactMethod::NoUpdates),
            _ => None,
        }
    }
}

/// One persisted complaint. Serialized field names are the stored layout
/// under the `complaints` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintRecord {
    pub id: ComplaintId,
    pub title: String,
    pub description: String,
    pub department: Department,
    pub priority: Priority,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none_contact_method"
    )]
    pub contact_method: Option<ContactMethod>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none_string"
    )]
    pub contact_value: Option<String>,
}

// Older stores wrote "" for an unselected contact method and empty value.
fn blank_as_none_contact_method<'de, D>(d: D) -> Result<Option<ContactMethod>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => ContactMethod::parse(v)
            .map(Some)
            .ok_or_else(|| de::Error::unknown_variant(v, &["email", "phone", "none"])),
    }
}

fn blank_as_none_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.filter(|v| !v.trim().is_empty()))
}

impl ComplaintRecord {
    /// Builds a freshly submitted record: status `submitted`,
    /// `created_at == updated_at == now`.
    pub fn v1(
        id: ComplaintId,
        complaint: ValidComplaint,
        now: DateTime<Utc>,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            id,
            title: complaint.title,
            description: complaint.description,
            department: complaint.department,
            priority: complaint.priority,
            status: ComplaintStatus::Submitted,
            created_at: now,
            updated_at: now,
            files: complaint.files,
            admin_notes: None,
            contact_method: complaint.contact_method,
            contact_value: complaint.contact_value,
        };
        r.validate()?;
        Ok(r)
    }

    /// Moves `updated_at` forward to `now`, never backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

impl ComplaintRecord {
    /// Checks that hold for every persisted row, including rows written
    /// before the current length rules. Text lengths are left to intake.
    pub fn validate_stored(&self) -> Result<(), ContractViolation> {
        self.id.validate()?;
        if self.created_at > self.updated_at {
            return Err(ContractViolation::InvalidValue {
                field: "complaint_record.updated_at",
                reason: "must be >= created_at",
            });
        }
        if self.files.iter().any(|f| f.trim().is_empty()) {
            return Err(ContractViolation::InvalidValue {
                field: "complaint_record.files",
                reason: "file names must not be empty",
            });
        }
        Ok(())
    }
}

impl Validate for ComplaintRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.validate_stored()?;
        validate_text("complaint_record.title", &self.title, 1, TITLE_MAX_CHARS)?;
        validate_text(
            "complaint_record.description",
            &self.description,
            DESCRIPTION_MIN_CHARS,
            DESCRIPTION_MAX_CHARS,
        )
    }
}
