//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: OutputFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| default_output_path(format));

    let mut content = render_config(&config, format)?;
    if commented && format == OutputFormat::Yaml {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// File name used when no output path is given.
fn default_output_path(format: OutputFormat) -> PathBuf {
    PathBuf::from(match format {
        OutputFormat::Yaml => "herakles-hoststat.yaml",
        OutputFormat::Json => "herakles-hoststat.json",
        OutputFormat::Toml => "herakles-hoststat.toml",
    })
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles Host Status Configuration
# ===================================
#
# Logging
# -------
# log_level: "warn"            # off, error, warn, info, debug, trace
#
# Host Facts
# ----------
# os: null                     # "FreeBSD" or "Linux" (null = detect)
# ps: null                     # Process listing command (null = "ps auxwww")
#
# Disk Usage
# ----------
# diskusage: null              # Default filters, e.g. ["/", "/var", "ext?", "zfs"]
#
# Custom Selection
# ----------------
# custom:                      # Category -> keys returned by 'custom'
#   cpustats: [btime, processes, procs_running]
#   loadavg: ["1-min"]
"#;

    format!("{comments}\n{yaml}")
}
