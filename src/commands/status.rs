//! Status command implementation.
//!
//! Runs one status category and prints it in the selected format.

use herakles_hoststat::Status;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::cli::{Commands, OutputFormat};

/// Serializes a category result. TOML output is wrapped in a table keyed by
/// the category name since a TOML document must be a table.
pub fn render<T: Serialize>(
    category: &str,
    value: &T,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Toml => {
            let wrapped = BTreeMap::from([(category, toml::Value::try_from(value)?)]);
            toml::to_string_pretty(&wrapped)?
        }
    };
    Ok(output)
}

/// Runs the status category selected by `command`.
///
/// `default_filters` apply to `diskusage` when no filter is given.
pub fn command_status(
    command: &Commands,
    status: &Status,
    default_filters: &[String],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let category = command.category();
    debug!("Collecting {}", category);

    let output = match command {
        Commands::All => render(category, &status.all_status(), format)?,
        Commands::Procs => render(category, &status.procs()?, format)?,
        Commands::Loadavg => render(category, &status.loadavg()?, format)?,
        Commands::Cpustats => render(category, &status.cpustats()?, format)?,
        Commands::Diskstats => render(category, &status.diskstats()?, format)?,
        Commands::Diskusage { filters } => {
            let filters = if filters.is_empty() {
                default_filters
            } else {
                filters.as_slice()
            };
            render(category, &status.diskusage(filters)?, format)?
        }
        Commands::Vmstats => render(category, &status.vmstats()?, format)?,
        Commands::Meminfo => render(category, &status.meminfo()?, format)?,
        Commands::Netstats => render(category, &status.netstats()?, format)?,
        Commands::Netdev => render(category, &status.netdev()?, format)?,
        Commands::Uptime => render(category, &status.uptime()?, format)?,
        Commands::W => render(category, &status.w()?, format)?,
        Commands::Pid { signature } => render(category, &status.pid(signature)?, format)?,
        Commands::Custom => render(category, &status.custom()?, format)?,
        Commands::Check | Commands::Config { .. } => {
            return Err(format!("'{}' is not a status category", category).into());
        }
    };

    println!("{}", output.trim_end());
    Ok(())
}
