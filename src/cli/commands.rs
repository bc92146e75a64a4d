//! CLI command implementations
//!
//! `init` writes a default config and empty tables, `start` boots the HTTP
//! server, `roster` prints a shift's hold list, `seed` fills a shift with
//! demo members.

use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::coordinator::{Coordinator, NewFirefighter};
use crate::http_server::HttpServer;
use crate::realtime::Notifier;
use crate::roster::{Firefighter, Shift};
use crate::rotation;
use crate::store::Store;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Dispatch a parsed command
pub fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Init { config } => init_command(&config),
        Command::Start { config } => start_command(&config),
        Command::Roster { config, shift } => roster_command(&config, shift),
        Command::Seed {
            config,
            shift,
            count,
        } => seed_command(&config, shift, count),
    }
}

fn init_command(config_path: &Path) -> CliResult<()> {
    if config_path.exists() {
        return Err(CliError::AlreadyInitialized(
            config_path.display().to_string(),
        ));
    }

    let config = AppConfig::default();
    config.save(config_path)?;
    Store::init(Path::new(&config.data_dir))?;

    println!("Wrote config to {}", config_path.display());
    println!("Initialized data directory at {}", config.data_dir);
    Ok(())
}

fn start_command(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let store = Arc::new(Store::open(Path::new(&config.data_dir))?);
    let notifier = Arc::new(Notifier::new());
    let coordinator = Arc::new(Coordinator::new(store, notifier.clone()));
    let server = HttpServer::with_config(config.http, coordinator, notifier);

    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| CliError::Runtime(e.to_string()))?;
    runtime
        .block_on(server.start())
        .map_err(|e| CliError::Server(e.to_string()))
}

fn roster_command(config_path: &Path, shift: Shift) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let store = Store::open(Path::new(&config.data_dir))?;

    let snapshot = store.roster().load(shift)?;
    let active: Vec<Firefighter> = snapshot
        .members
        .into_iter()
        .filter(|ff| ff.is_active)
        .collect();

    println!("{}", format_hold_list(shift, &active));
    Ok(())
}

/// Renders the hold list the way it gets read out at shift change: rotation
/// order, last hold date, station.
fn format_hold_list(shift: Shift, active: &[Firefighter]) -> String {
    let ordered = rotation::sort_rotation(active);

    if ordered.is_empty() {
        return format!(
            "Shift {} hold list:\n\nNo firefighters currently in rotation.",
            shift
        );
    }

    let lines: Vec<String> = ordered
        .iter()
        .enumerate()
        .map(|(i, ff)| {
            use chrono::Datelike;
            let date = match ff.last_hold_date {
                Some(d) => format!("{}/{}", d.month(), d.day()),
                None => "not yet".to_string(),
            };
            let station = match &ff.fire_station {
                Some(s) => format!("Station #{}", s),
                None => "Station #?".to_string(),
            };
            let note = if ff.is_available { "" } else { " (unavailable)" };
            format!("{:>3}. {} - last hold {} - {}{}", i + 1, ff.name, date, station, note)
        })
        .collect();

    format!("Shift {} hold list:\n\n{}", shift, lines.join("\n"))
}

fn seed_command(config_path: &Path, shift: Shift, count: usize) -> CliResult<()> {
    const NAMES: [&str; 12] = [
        "Alvarez", "Brooks", "Chen", "Diaz", "Ellis", "Foster", "Garcia", "Huang", "Iverson",
        "Jensen", "Kowalski", "Lopez",
    ];

    let config = AppConfig::load(config_path)?;
    let store = Arc::new(Store::open(Path::new(&config.data_dir))?);
    let notifier = Arc::new(Notifier::new());
    let coordinator = Coordinator::new(store, notifier);

    for i in 0..count {
        let base = NAMES[i % NAMES.len()];
        let name = if i < NAMES.len() {
            base.to_string()
        } else {
            format!("{} {}", base, i / NAMES.len() + 1)
        };
        coordinator.add_firefighter(NewFirefighter {
            name,
            shift,
            fire_station: Some(((i % 4) + 1).to_string()),
            certification_level: None,
        })?;
    }

    println!("Seeded {} members on Shift {}", count, shift);
    Ok(())
}
