//! signon-monitor entrypoint.
//!
//! Loads the config, then polls the presence API until interrupted, messaging
//! users as they sign on. All tracking state lives in memory and is dropped on
//! exit.

mod http;
mod logging;

use clap::Parser;
use std::env;
use std::path::PathBuf;
use tracing::{error, info};

use http::PresenceClient;
use monitor_core::{load_config, ConfigError, Monitor, MonitorConfig, ShutdownSignal};

const CONFIG_ENV: &str = "SIGNON_MONITOR_CONFIG";
const CONFIG_DIR: &str = ".signon-monitor";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Parser)]
#[command(name = "signon-monitor")]
#[command(about = "Messages users of a presence server when they sign on")]
#[command(version)]
struct Cli {
    /// Config file (.yaml, .yml or .toml)
    #[arg(long, short, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also write daily rolling log files into this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Run the baseline (if enabled) and a single poll cycle, then exit
    #[arg(long)]
    once: bool,
}

fn main() {
    let cli = Cli::parse();
    let _logging_guard = logging::init(cli.log_dir.as_deref());

    let config_path = match resolve_config_path(cli.config) {
        Ok(path) => path,
        Err(err) => {
            error!(error = %err, "Failed to resolve config path");
            std::process::exit(1);
        }
    };

    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load config");
            std::process::exit(1);
        }
    };
    log_startup(&config, &config_path);

    let client = match PresenceClient::new(&config) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };

    let mut monitor = Monitor::new(&config, &client, &client);

    if cli.once {
        let report = monitor.run_once();
        info!(
            online = report.online,
            sent = report.sent,
            failed = report.failed,
            "Single poll cycle complete"
        );
        return;
    }

    let shutdown = ShutdownSignal::new();
    let handler_signal = shutdown.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_signal.trigger()) {
        error!(error = %err, "Failed to install interrupt handler");
        std::process::exit(1);
    }

    monitor.run(&shutdown);
    info!("Interrupt received. Goodbye!");
}

fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(value) = env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoDefaultPath)?;
    Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
}

fn log_startup(config: &MonitorConfig, config_path: &std::path::Path) {
    info!(
        base_url = %config.api.base_url,
        config = %config_path.display(),
        poll_interval_secs = config.monitoring.poll_interval_seconds,
        baseline_on_startup = config.monitoring.baseline_on_startup,
        "Monitoring presence server"
    );
    let ignored = &config.message.ignored_users;
    if ignored.is_empty() {
        info!("No users configured to be ignored");
    } else {
        info!(users = %ignored.join(", "), "Configured to ignore users");
    }
    info!(
        cooldown_minutes = config.message.cooldown_minutes,
        "Message cooldown period"
    );
}
