#![forbid(unsafe_code)]

use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// A user-facing notification. Titles are fixed strings per outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }
}

pub mod titles {
    pub const SUBMITTED: &str = "Complaint Submitted Successfully";
    pub const VALIDATION_ERROR: &str = "Validation Error";
    pub const SUBMISSION_FAILED: &str = "Submission Failed";
    pub const FILE_TOO_LARGE: &str = "File too large";
    pub const STATUS_UPDATED: &str = "Status Updated";
    pub const UPDATE_FAILED: &str = "Update Failed";
    pub const CHANGES_SAVED: &str = "Changes Saved";
    pub const SAVE_FAILED: &str = "Save Failed";
    pub const LOGIN_SUCCESSFUL: &str = "Login Successful";
    pub const LOGIN_FAILED: &str = "Login Failed";
}

pub trait Notifier {
    fn notify(&mut self, toast: Toast);
}

/// Emits toasts as log events. Destructive toasts go out at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, toast: Toast) {
        match toast.variant {
            ToastVariant::Default => info!(title = %toast.title, "{}", toast.description),
            ToastVariant::Destructive => warn!(title = %toast.title, "{}", toast.description),
        }
    }
}

/// Keeps every toast in order. Used by tests and by the CLI to echo toasts.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    pub toasts: Vec<Toast>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.toasts.iter().map(|t| t.title.as_str()).collect()
    }

    pub fn last(&self) -> Option<&Toast> {
        self.toasts.last()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn notify(&mut self, toast: Toast) {
        (**self).notify(toast);
    }
}
