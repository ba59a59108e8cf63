#![forbid(unsafe_code)]

use std::env;
use std::io::{self, IsTerminal, Read};

use grievance_os::clock::SystemClock;
use grievance_os::config::PortalConfig;
use grievance_os::notify::TracingNotifier;
use grievance_os::portal::ComplaintPortal;
use grievance_storage::store::ComplaintStore;
use grievance_storage::surface::FileSurface;
use grievance_tools::portal_cli::{
    admin_login_username, execute_portal_command, parse_portal_command,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = parse_portal_command(&args)?;

    let config = PortalConfig::from_env();
    let store = ComplaintStore::open(FileSurface::for_path(config.store_path.clone()))
        .map_err(|e| format!("failed to open complaint store: {e}"))?;
    let mut portal = ComplaintPortal::new(config, store, SystemClock, TracingNotifier);

    let session = if command.needs_admin() {
        let username =
            admin_login_username(portal.config(), env::var("GRIEVANCE_ADMIN_USER").ok());
        let password = read_password(&username)?;
        Some(
            portal
                .login(&username, &password)
                .map_err(|e| e.to_string())?,
        )
    } else {
        None
    };

    let output = execute_portal_command(&mut portal, session.as_ref(), command)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn read_password(username: &str) -> Result<String, String> {
    if io::stdin().is_terminal() {
        let prompt = format!("Password for {username}:");
        rpassword::prompt_password(prompt).map_err(|e| e.to_string())
    } else {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| e.to_string())?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }
}
