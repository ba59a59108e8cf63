#![forbid(unsafe_code)]

use grievance_contracts::complaint::ComplaintId;
use grievance_contracts::intake::FieldErrors;
use grievance_contracts::ContractViolation;
use grievance_storage::store::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Please correct the errors in the form: {0}")]
    Validation(FieldErrors),
    #[error("Please enter a complaint ID")]
    EmptyTrackingCode,
    #[error("complaint {0} not found")]
    NotFound(ComplaintId),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("no free complaint ID after {attempts} attempts")]
    IdSpaceExhausted { attempts: u32 },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Contract(#[from] ContractViolation),
}

impl From<FieldErrors> for PortalError {
    fn from(errors: FieldErrors) -> Self {
        PortalError::Validation(errors)
    }
}
