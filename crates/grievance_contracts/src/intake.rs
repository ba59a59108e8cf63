#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::validate_text;
use crate::complaint::{ContactMethod, Department, Priority};
use crate::{ContractViolation, Validate};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MIN_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;
pub const ATTACHMENT_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const ATTACHMENT_MAX_COUNT: usize = 5;

/// Raw form input, before validation. `department` is the selected display
/// name, empty when nothing was selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDraft {
    pub title: String,
    pub description: String,
    pub department: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub contact_method: Option<ContactMethod>,
    #[serde(default)]
    pub contact_value: String,
    #[serde(default)]
    pub agree_terms: bool,
    #[serde(default)]
    pub files: Vec<String>,
}

/// A draft that passed every field rule. Only this type can become a
/// stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidComplaint {
    pub title: String,
    pub description: String,
    pub department: Department,
    pub priority: Priority,
    pub files: Vec<String>,
    pub contact_method: Option<ContactMethod>,
    pub contact_value: Option<String>,
}

impl ValidComplaint {
    pub fn v1(
        title: String,
        description: String,
        department: Department,
        priority: Priority,
        files: Vec<String>,
        contact_method: Option<ContactMethod>,
        contact_value: Option<String>,
    ) -> Result<Self, ContractViolation> {
        let contact_value = contact_value.filter(|v| !v.trim().is_empty());
        let v = Self {
            title,
            description,
            department,
            priority,
            files,
            contact_method,
            contact_value,
        };
        v.validate()?;
        Ok(v)
    }
}

impl Validate for ValidComplaint {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_text("valid_complaint.title", &self.title, 1, TITLE_MAX_CHARS)?;
        validate_text(
            "valid_complaint.description",
            &self.description,
            DESCRIPTION_MIN_CHARS,
            DESCRIPTION_MAX_CHARS,
        )?;
        if self.files.len() > ATTACHMENT_MAX_COUNT {
            return Err(ContractViolation::InvalidLength {
                field: "valid_complaint.files",
                min: 0,
                max: ATTACHMENT_MAX_COUNT,
                got: self.files.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    Title,
    Description,
    Department,
    AgreeTerms,
}

impl DraftField {
    pub fn as_str(self) -> &'static str {
        match self {
            DraftField::Title => "title",
            DraftField::Description => "description",
            DraftField::Department => "department",
            DraftField::AgreeTerms => "agreeTerms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Title is required")]
    TitleRequired,
    #[error("Title must be less than 200 characters")]
    TitleTooLong,
    #[error("Description is required")]
    DescriptionRequired,
    #[error("Description must be at least 50 characters")]
    DescriptionTooShort,
    #[error("Description must be less than 2000 characters")]
    DescriptionTooLong,
    #[error("Please select a department")]
    DepartmentRequired,
    #[error("Unknown department")]
    DepartmentUnknown,
    #[error("You must agree to the terms")]
    TermsNotAccepted,
}

impl FieldError {
    pub fn field(self) -> DraftField {
        match self {
            FieldError::TitleRequired | FieldError::TitleTooLong => DraftField::Title,
            FieldError::DescriptionRequired
            | FieldError::DescriptionTooShort
            | FieldError::DescriptionTooLong => DraftField::Description,
            FieldError::DepartmentRequired | FieldError::DepartmentUnknown => {
                DraftField::Department
            }
            FieldError::TermsNotAccepted => DraftField::AgreeTerms,
        }
    }
}

/// Every field rule that fired for one draft, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", render_field_errors(.0))]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `err` unless its field already has an error.
    pub fn push(&mut self, err: FieldError) {
        if self.get(err.field()).is_none() {
            self.0.push(err);
        }
    }

    pub fn get(&self, field: DraftField) -> Option<FieldError> {
        self.0.iter().copied().find(|e| e.field() == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn render_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {e}", e.field().as_str()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A file picked for upload. Only the name is ever stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentCandidate {
    pub name: String,
    pub size_bytes: u64,
}

impl AttachmentCandidate {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentRejectReason {
    TooLarge,
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedAttachment {
    pub name: String,
    pub size_bytes: u64,
    pub reason: AttachmentRejectReason,
}
