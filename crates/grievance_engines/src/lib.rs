#![forbid(unsafe_code)]

pub mod intake;
pub mod lifecycle;
pub mod query;
pub mod summary;
pub mod tracking_id;
