use std::{
    io::{self, IsTerminal},
    process::ExitCode,
};

use book_inventory::{
    Config, LogFormat, Shell,
    observers::{AvailabilityNotifier, TransitionLogger},
    persistence,
};
use clap::Parser;
use colored::Colorize;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(&config);
    if config.no_color {
        colored::control::set_override(false);
    }

    let mut inventory = config.inventory();
    inventory.register_observer(Box::new(TransitionLogger));
    inventory.register_observer(Box::new(AvailabilityNotifier));

    let mut shell = Shell::new(inventory, config.prompt.clone())
        .with_color(!config.no_color && io::stdout().is_terminal());

    if let Some(path) = &config.data {
        if path.exists() {
            match persistence::load_from_file(shell.inventory_mut(), path) {
                Ok(report) => {
                    for rejected in &report.rejected {
                        eprintln!("{} {rejected}", "Skipped:".yellow());
                    }
                }
                Err(err) => {
                    eprintln!("{} {err}", "Error:".red().bold());
                    return ExitCode::FAILURE;
                }
            }
        } else {
            info!(path = %path.display(), "data file does not exist yet; starting empty");
        }
    }

    let stdin = io::stdin();
    if let Err(err) = shell.run(stdin.lock(), io::stdout().lock()) {
        error!(%err, "shell terminated");
        return ExitCode::FAILURE;
    }

    if let (true, Some(path)) = (config.autosave, &config.data) {
        if let Err(err) = persistence::save_to_file(shell.inventory(), path) {
            eprintln!("{} {err}", "Error:".red().bold());
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

/// Initializes the logging system based on configuration.
///
/// Logs go to stderr so shell output on stdout stays clean. `RUST_LOG`
/// overrides `--log-level`.
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let use_json = match config.log_format {
        LogFormat::Json => true,
        LogFormat::Text => false,
        LogFormat::Auto => !io::stderr().is_terminal(),
    };

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().flatten_event(true).with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(io::stderr))
            .init();
    }
}
