//! herakles-hoststat - version 0.1.0
//!
//! Host status probe with tracing logging.
//! This is the main entry point that resolves configuration and runs subcommands.

mod cli;
mod commands;
mod config;

use clap::Parser;
use herakles_hoststat::{RealHost, Status};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

use cli::{Args, Commands};
use commands::{command_check, command_config, command_status};
use config::{resolve_config, show_config, validate_effective_config, Config};

/// Initializes tracing logging subsystem with configured log level.
/// Logs go to stderr so stdout only carries the rendered status.
fn setup_logging(config: &Config) {
    let log_level = match config.log_level().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::OFF,
        "error" => LevelFilter::ERROR,
        "info" => LevelFilter::INFO,
        "debug" => LevelFilter::DEBUG,
        "trace" => LevelFilter::TRACE,
        _ => LevelFilter::WARN,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    info!("Logging initialized with level: {}", log_level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Main application entry point.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.format);
    }

    let command = args.command.clone().unwrap_or(Commands::All);

    // Config generation does not need a valid existing config
    if let Commands::Config { output, commented } = &command {
        return command_config(output.clone(), args.format, *commented);
    }

    let config = load_validated_config(&args)?;
    setup_logging(&config);

    let grains = config.grains()?;
    debug!("Grains: os={}, ps='{}'", grains.os, grains.ps);

    let status = Status::new(Box::new(RealHost::new()), grains, config.status_options());

    match &command {
        Commands::Check => command_check(&status, &config),
        _ => command_status(
            &command,
            &status,
            config.diskusage.as_deref().unwrap_or_default(),
            args.format,
        ),
    }
}
