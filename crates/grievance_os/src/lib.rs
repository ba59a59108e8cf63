#![forbid(unsafe_code)]

pub mod admin;
pub mod clock;
pub mod config;
pub mod error;
pub mod notify;
pub mod portal;
