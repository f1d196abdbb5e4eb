//! TaskTray console entry point.
//!
//! # Responsibility
//! - Wire config, logging, the store actor, the reminder scanner, the tray
//!   controller, and the console shell together.
//! - Tear them down in order on exit.

mod command;
mod input;
mod render;
mod shell;
mod tray;

use crossbeam_channel::unbounded;
use log::{error, info, warn};
use shell::Shell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tasktray_core::config::default_data_dir;
use tasktray_core::{
    core_version, default_notifier, init_logging, register_autostart, AppConfig, JsonTaskStore,
    ReminderScanner, StoreActor,
};
use tray::TrayController;

fn main() -> ExitCode {
    let config = load_config();

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
    info!(
        "event=app_start module=cli status=ok version={} data_dir={} scan_interval_secs={} autostart={}",
        core_version(),
        config.data_dir.display(),
        config.scan_interval.as_secs(),
        config.autostart
    );

    if config.autostart {
        enable_autostart(&config.app_name);
    }

    match run(&config) {
        Ok(()) => {
            info!("event=app_exit module=cli status=ok");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=app_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig) -> std::io::Result<()> {
    let actor = StoreActor::spawn(JsonTaskStore::new(config.store_path()))?;
    let scanner = ReminderScanner::new(
        actor.handle(),
        default_notifier(),
        config.scanner_settings(),
    )
    .spawn()?;

    let (events_tx, events_rx) = unbounded();
    let tray = TrayController::spawn(events_tx.clone())?;
    input::spawn_console_reader(events_tx, tray.menu())?;

    let mut shell = Shell::new(actor.handle(), std::io::stdout(), config.app_name.clone());
    let result = shell.run(&events_rx);

    tray.stop();
    scanner.stop();
    actor.shutdown();
    result
}

fn load_config() -> AppConfig {
    let config = AppConfig::load_default().unwrap_or_else(|err| {
        eprintln!("warning: {err}; using defaults");
        AppConfig::with_data_dir(default_data_dir())
    });
    absolutize(config)
}

/// Logging requires absolute paths; resolve relative ones against the cwd.
fn absolutize(mut config: AppConfig) -> AppConfig {
    let Ok(cwd) = std::env::current_dir() else {
        return config;
    };
    config.data_dir = resolve(&cwd, config.data_dir);
    config.log_dir = resolve(&cwd, config.log_dir);
    config
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn enable_autostart(app_name: &str) {
    let executable = match std::env::current_exe() {
        Ok(path) => path,
        Err(err) => {
            warn!("event=autostart_register module=cli status=error error_code=no_exe_path error={err}");
            return;
        }
    };
    if let Err(err) = register_autostart(app_name, &executable) {
        warn!("event=autostart_register module=cli status=error error={err}");
    }
}
