#![forbid(unsafe_code)]

pub mod common;
pub mod complaint;
pub mod intake;

pub use common::{ContractViolation, Validate};
