//! Portal configuration.

#![forbid(unsafe_code)]

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};
use tracing::{debug, warn};

/// Configuration for the complaint portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Where the file-backed store keeps the `complaints` collection.
    pub store_path: PathBuf,
    /// Demo admin username (plain comparison, not a credential system).
    pub admin_username: String,
    /// Demo admin password.
    pub admin_password: String,
    /// Tracking codes tried per submission before giving up on collisions.
    pub id_generation_attempts: u32,
    /// Offset used for the dashboard "today"/"this month" buckets.
    pub dashboard_utc_offset_minutes: i32,
    /// Length of the dashboard "recent" list.
    pub recent_limit: usize,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            admin_username: "admin".into(),
            admin_password: "admin123".into(),
            id_generation_attempts: 8,
            dashboard_utc_offset_minutes: 0,
            recent_limit: 5,
        }
    }
}

impl PortalConfig {
    /// Defaults overlaid with `GRIEVANCE_*` environment variables. Bad values
    /// are logged and ignored.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            store_path: env::var("GRIEVANCE_STORE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(d.store_path),
            admin_username: env::var("GRIEVANCE_ADMIN_USERNAME").unwrap_or(d.admin_username),
            admin_password: env::var("GRIEVANCE_ADMIN_PASSWORD").unwrap_or(d.admin_password),
            id_generation_attempts: try_load("GRIEVANCE_ID_ATTEMPTS", d.id_generation_attempts)
                .max(1),
            dashboard_utc_offset_minutes: try_load(
                "GRIEVANCE_UTC_OFFSET_MINUTES",
                d.dashboard_utc_offset_minutes,
            ),
            recent_limit: d.recent_limit,
        }
    }

    /// Dashboard offset, falling back to UTC when out of range.
    pub fn dashboard_offset(&self) -> FixedOffset {
        self.dashboard_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!(
                    minutes = self.dashboard_utc_offset_minutes,
                    "dashboard offset out of range, using UTC"
                );
                Utc.fix()
            })
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Ok(raw) = env::var(key) else {
        debug!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value: {e}; using default: {default}");
        default
    })
}

fn default_store_path() -> PathBuf {
    if let Ok(xdg_data_home) = env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data_home)
            .join("grievance")
            .join("complaints.json");
    }
    if let Ok(home) = env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("grievance")
            .join("complaints.json");
    }
    PathBuf::from(".grievance").join("complaints.json")
}
