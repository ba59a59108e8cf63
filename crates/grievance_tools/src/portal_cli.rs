#![forbid(unsafe_code)]

use grievance_contracts::complaint::{
    ComplaintId, ComplaintStatus, ContactMethod, Department, Priority,
};
use grievance_contracts::intake::{AttachmentCandidate, ComplaintDraft};
use grievance_engines::intake::AttachmentSet;
use grievance_engines::query::{ComplaintQuery, Selector, SortKey};
use grievance_os::admin::AdminSession;
use grievance_os::clock::Clock;
use grievance_os::config::PortalConfig;
use grievance_os::error::PortalError;
use grievance_os::notify::Notifier;
use grievance_os::portal::ComplaintPortal;
use grievance_storage::repo::ComplaintRepo;
use serde::Serialize;
use serde_json::json;

pub const USAGE: &str = "usage: grievance submit --title T --description D --department NAME [--priority P] [--contact-method M --contact-value V] [--file NAME:BYTES]... --agree
       grievance track <ID>
       grievance admin list [--search S] [--status S|all] [--department D|all] [--priority P|all] [--sort newest|oldest|priority|status]
       grievance admin dashboard
       grievance admin counts
       grievance admin status <ID> <STATUS>
       grievance admin note <ID> <TEXT>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalCommand {
    Submit {
        draft: ComplaintDraft,
        files: Vec<AttachmentCandidate>,
    },
    Track {
        code: String,
    },
    List(ComplaintQuery),
    Dashboard,
    Counts,
    SetStatus {
        id: ComplaintId,
        status: ComplaintStatus,
    },
    SetNote {
        id: ComplaintId,
        note: String,
    },
}

impl PortalCommand {
    pub fn needs_admin(&self) -> bool {
        !matches!(
            self,
            PortalCommand::Submit { .. } | PortalCommand::Track { .. }
        )
    }
}

pub fn parse_portal_command(args: &[String]) -> Result<PortalCommand, String> {
    let (head, rest) = args.split_first().ok_or_else(|| USAGE.to_string())?;
    match head.as_str() {
        "submit" => parse_submit(rest),
        "track" => {
            let code = rest
                .first()
                .ok_or_else(|| "usage: grievance track <ID>".to_string())?;
            Ok(PortalCommand::Track { code: code.clone() })
        }
        "admin" => parse_admin(rest),
        other => Err(format!(
            "unknown command: {other}. expected one of: submit, track, admin"
        )),
    }
}

fn parse_submit(args: &[String]) -> Result<PortalCommand, String> {
    let mut draft = ComplaintDraft::default();
    let mut files = Vec::new();
    let mut it = args.iter();
    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--agree" => draft.agree_terms = true,
            "--title" => draft.title = flag_value(flag, it.next())?,
            "--description" => draft.description = flag_value(flag, it.next())?,
            "--department" => draft.department = flag_value(flag, it.next())?,
            "--priority" => {
                let raw = flag_value(flag, it.next())?;
                draft.priority = Priority::parse(&raw).ok_or_else(|| {
                    format!(
                        "unknown priority '{raw}'. allowed: {}",
                        allowed(Priority::ALL.map(Priority::as_str))
                    )
                })?;
            }
            "--contact-method" => {
                let raw = flag_value(flag, it.next())?;
                draft.contact_method = Some(ContactMethod::parse(&raw).ok_or_else(|| {
                    format!("unknown contact method '{raw}'. allowed: email, phone, none")
                })?);
            }
            "--contact-value" => draft.contact_value = flag_value(flag, it.next())?,
            "--file" => files.push(parse_file(&flag_value(flag, it.next())?)?),
            other => return Err(format!("unknown submit option: {other}")),
        }
    }
    Ok(PortalCommand::Submit { draft, files })
}

fn parse_admin(args: &[String]) -> Result<PortalCommand, String> {
    let (sub, rest) = args
        .split_first()
        .ok_or_else(|| "usage: grievance admin <list|dashboard|counts|status|note>".to_string())?;
    match sub.as_str() {
        "list" => parse_list(rest).map(PortalCommand::List),
        "dashboard" => Ok(PortalCommand::Dashboard),
        "counts" => Ok(PortalCommand::Counts),
        "status" => {
            let [raw_id, raw_status] = rest else {
                return Err("usage: grievance admin status <ID> <STATUS>".to_string());
            };
            let status = ComplaintStatus::parse(raw_status).ok_or_else(|| {
                format!(
                    "unknown status '{raw_status}'. allowed: {}",
                    allowed(ComplaintStatus::ALL.map(ComplaintStatus::as_str))
                )
            })?;
            Ok(PortalCommand::SetStatus {
                id: parse_id(raw_id)?,
                status,
            })
        }
        "note" => {
            let (raw_id, words) = rest
                .split_first()
                .filter(|(_, words)| !words.is_empty())
                .ok_or_else(|| "usage: grievance admin note <ID> <TEXT>".to_string())?;
            Ok(PortalCommand::SetNote {
                id: parse_id(raw_id)?,
                note: words.join(" "),
            })
        }
        other => Err(format!(
            "unknown admin subcommand: {other}. expected one of: list, dashboard, counts, status, note"
        )),
    }
}

fn parse_list(args: &[String]) -> Result<ComplaintQuery, String> {
    let mut q = ComplaintQuery::default();
    let mut it = args.iter();
    while let Some(flag) = it.next() {
        let raw = flag_value(flag, it.next())?;
        match flag.as_str() {
            "--search" => q.search_text = raw,
            "--status" => {
                q.status = Selector::parse_with(&raw, ComplaintStatus::parse)
                    .ok_or_else(|| format!("unknown status filter '{raw}'"))?
            }
            "--department" => {
                q.department = Selector::parse_with(&raw, Department::parse)
                    .ok_or_else(|| format!("unknown department filter '{raw}'"))?
            }
            "--priority" => {
                q.priority = Selector::parse_with(&raw, Priority::parse)
                    .ok_or_else(|| format!("unknown priority filter '{raw}'"))?
            }
            "--sort" => {
                q.sort_key = SortKey::parse(&raw).ok_or_else(|| {
                    format!("unknown sort key '{raw}'. allowed: newest, oldest, priority, status")
                })?
            }
            other => return Err(format!("unknown list option: {other}")),
        }
    }
    Ok(q)
}

fn flag_value(flag: &str, value: Option<&String>) -> Result<String, String> {
    value
        .cloned()
        .ok_or_else(|| format!("missing value for {flag}"))
}

/// `NAME:BYTES`, split at the last colon so names may contain one.
fn parse_file(raw: &str) -> Result<AttachmentCandidate, String> {
    let (name, size) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("file must be NAME:BYTES, got '{raw}'"))?;
    let size_bytes = size
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid byte size in '{raw}': {e}"))?;
    Ok(AttachmentCandidate::new(name, size_bytes))
}

fn parse_id(raw: &str) -> Result<ComplaintId, String> {
    ComplaintId::new(ComplaintId::normalize_code(raw)).map_err(|e| e.to_string())
}

fn allowed<const N: usize>(names: [&str; N]) -> String {
    names.join(", ")
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode output: {e}"))
}

fn admin_session(session: Option<&AdminSession>) -> Result<&AdminSession, String> {
    session.ok_or_else(|| "admin login required".to_string())
}

/// Username for the admin login: a non-blank override, else the configured
/// admin account.
pub fn admin_login_username(config: &PortalConfig, override_user: Option<String>) -> String {
    override_user
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| config.admin_username.clone())
}

pub fn execute_portal_command<R, C, N>(
    portal: &mut ComplaintPortal<R, C, N>,
    session: Option<&AdminSession>,
    command: PortalCommand,
) -> Result<String, String>
where
    R: ComplaintRepo,
    C: Clock,
    N: Notifier,
{
    match command {
        PortalCommand::Submit { mut draft, files } => {
            let mut set = AttachmentSet::new();
            let outcome = portal.offer_attachments(&mut set, files);
            draft.files = set.into_names();
            let id = portal.submit(&draft).map_err(|e| e.to_string())?;
            let rejected: Vec<&str> = outcome.rejected.iter().map(|r| r.name.as_str()).collect();
            to_json(&json!({
                "complaintId": id,
                "files": draft.files,
                "rejectedFiles": rejected,
                "droppedFiles": outcome.dropped_over_cap,
            }))
        }
        PortalCommand::Track { code } => {
            let outcome = portal.track(&code).map_err(|e| e.to_string())?;
            to_json(&outcome)
        }
        PortalCommand::List(q) => {
            let view = portal.list(admin_session(session)?, &q);
            to_json(&view)
        }
        PortalCommand::Dashboard => to_json(&portal.dashboard(admin_session(session)?)),
        PortalCommand::Counts => {
            let counts = portal.status_counts(admin_session(session)?);
            let by_name: serde_json::Map<String, serde_json::Value> = counts
                .into_iter()
                .map(|(s, n)| (s.as_str().to_string(), json!(n)))
                .collect();
            to_json(&by_name)
        }
        PortalCommand::SetStatus { id, status } => {
            let record = portal
                .set_status(admin_session(session)?, &id, status)
                .map_err(update_error)?;
            to_json(&record)
        }
        PortalCommand::SetNote { id, note } => {
            let record = portal
                .set_note(admin_session(session)?, &id, note)
                .map_err(update_error)?;
            to_json(&record)
        }
    }
}

fn update_error(e: PortalError) -> String {
    match e {
        PortalError::NotFound(id) => format!("Complaint ID {id} not found"),
        other => other.to_string(),
    }
}
