#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::PortalConfig;
use crate::error::PortalError;

/// Proof of a passed admin gate. Admin portal operations take one of these.
///
/// The gate is a demo: a plain comparison against configured values, with
/// nothing hashed and no expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub username: String,
    pub login_time: DateTime<Utc>,
}

pub fn admin_login(
    config: &PortalConfig,
    username: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<AdminSession, PortalError> {
    if username != config.admin_username || password != config.admin_password {
        warn!(username, "admin login rejected");
        return Err(PortalError::InvalidCredentials);
    }
    info!(username, "admin login accepted");
    Ok(AdminSession {
        username: username.to_string(),
        login_time: now,
    })
}
