#![forbid(unsafe_code)]

use grievance_contracts::common::char_len;
use grievance_contracts::complaint::Department;
use grievance_contracts::intake::{
    AttachmentCandidate, AttachmentRejectReason, ComplaintDraft, FieldError, FieldErrors,
    RejectedAttachment, ValidComplaint, ATTACHMENT_MAX_BYTES, ATTACHMENT_MAX_COUNT,
    DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS, TITLE_MAX_CHARS,
};
use tracing::debug;

/// Runs every field rule against `draft`. All failing fields are reported
/// together; each field reports only its first failing rule.
pub fn validate_draft(draft: &ComplaintDraft) -> Result<ValidComplaint, FieldErrors> {
    let mut errors = FieldErrors::new();

    if draft.title.trim().is_empty() {
        errors.push(FieldError::TitleRequired);
    } else if char_len(&draft.title) > TITLE_MAX_CHARS {
        errors.push(FieldError::TitleTooLong);
    }

    if draft.description.trim().is_empty() {
        errors.push(FieldError::DescriptionRequired);
    } else {
        let len = char_len(&draft.description);
        if len < DESCRIPTION_MIN_CHARS {
            errors.push(FieldError::DescriptionTooShort);
        } else if len > DESCRIPTION_MAX_CHARS {
            errors.push(FieldError::DescriptionTooLong);
        }
    }

    let department = if draft.department.trim().is_empty() {
        errors.push(FieldError::DepartmentRequired);
        None
    } else {
        let parsed = Department::parse(&draft.department);
        if parsed.is_none() {
            errors.push(FieldError::DepartmentUnknown);
        }
        parsed
    };

    if !draft.agree_terms {
        errors.push(FieldError::TermsNotAccepted);
    }

    let Some(department) = department.filter(|_| errors.is_empty()) else {
        debug!(failed_fields = errors.len(), "complaint draft rejected");
        return Err(errors);
    };

    let files: Vec<String> = draft
        .files
        .iter()
        .filter(|f| !f.trim().is_empty())
        .take(ATTACHMENT_MAX_COUNT)
        .cloned()
        .collect();

    let valid = ValidComplaint::v1(
        draft.title.clone(),
        draft.description.clone(),
        department,
        draft.priority,
        files,
        draft.contact_method,
        Some(draft.contact_value.clone()),
    )
    .expect("draft passing field rules must satisfy ValidComplaint contract");
    Ok(valid)
}

/// Result of offering one batch of files to an [`AttachmentSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentBatchOutcome {
    pub accepted: Vec<String>,
    pub rejected: Vec<RejectedAttachment>,
    pub dropped_over_cap: Vec<String>,
}

/// Filenames picked for a submission. Oversize files are rejected one by
/// one; the rest are appended and the list is cut at the cap, so files
/// already held win over later ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentSet {
    names: Vec<String>,
}

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<I>(&mut self, candidates: I) -> AttachmentBatchOutcome
    where
        I: IntoIterator<Item = AttachmentCandidate>,
    {
        let mut out = AttachmentBatchOutcome::default();
        for c in candidates {
            let reason = if c.name.trim().is_empty() {
                Some(AttachmentRejectReason::EmptyName)
            } else if c.size_bytes > ATTACHMENT_MAX_BYTES {
                Some(AttachmentRejectReason::TooLarge)
            } else {
                None
            };
            if let Some(reason) = reason {
                out.rejected.push(RejectedAttachment {
                    name: c.name,
                    size_bytes: c.size_bytes,
                    reason,
                });
                continue;
            }
            if self.names.len() < ATTACHMENT_MAX_COUNT {
                self.names.push(c.name.clone());
                out.accepted.push(c.name);
            } else {
                out.dropped_over_cap.push(c.name);
            }
        }
        out
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.names.len() {
            Some(self.names.remove(index))
        } else {
            None
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}
