#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("{field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    #[error("{field}: length {got} outside {min}..={max}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        got: usize,
    },
}

pub trait Validate {
    fn validate(&self) -> Result<(), ContractViolation>;
}

/// Length as the form counters report it: UTF-16 code units, so an emoji
/// outside the BMP counts as two.
pub fn char_len(value: &str) -> usize {
    value.encode_utf16().count()
}

pub(crate) fn validate_text(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ContractViolation> {
    if value.trim().is_empty() {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must not be empty",
        });
    }
    let got = char_len(value);
    if got < min || got > max {
        return Err(ContractViolation::InvalidLength {
            field,
            min,
            max,
            got,
        });
    }
    Ok(())
}
