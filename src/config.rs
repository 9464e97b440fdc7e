//! Configuration management for herakles-hoststat.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use anyhow::Context;
use herakles_hoststat::status::{category_names, StatusOptions};
use herakles_hoststat::{Grains, OsFamily, ProbeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::{Args, LogLevel, OutputFormat};

// Default configuration constants
pub const DEFAULT_LOG_LEVEL: &str = "warn";

const VALID_LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Probe configuration. Unset fields fall back to built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // Logging
    pub log_level: Option<String>,

    // Host facts
    /// OS family ("FreeBSD" or "Linux"); detected when unset
    pub os: Option<String>,
    /// Process listing command
    pub ps: Option<String>,

    /// Default filters for `diskusage` when none are given on the command line
    pub diskusage: Option<Vec<String>>,

    /// Category name to the keys `custom` returns from it
    pub custom: Option<BTreeMap<String, Vec<String>>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
            os: None,
            ps: None,
            diskusage: None,
            custom: None,
        }
    }
}

impl Config {
    /// Host facts for this configuration. Without an `os` override the
    /// family of the running system is used.
    pub fn grains(&self) -> Result<Grains, ProbeError> {
        let mut grains = match self.os.as_deref() {
            Some(os) => Grains::from_os_name(os, None)?,
            None => Grains::detect()?,
        };
        if let Some(ps) = &self.ps {
            grains.ps = ps.clone();
        }
        Ok(grains)
    }

    pub fn status_options(&self) -> StatusOptions {
        StatusOptions {
            custom: self.custom.clone().unwrap_or_default(),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let level = cfg.log_level().to_ascii_lowercase();
    if !VALID_LOG_LEVELS.contains(&level.as_str()) {
        return Err(format!(
            "Invalid log_level '{}', expected one of {}",
            level,
            VALID_LOG_LEVELS.join(", ")
        )
        .into());
    }

    if let Some(os) = cfg.os.as_deref() {
        os.parse::<OsFamily>()?;
    }

    if let Some(ps) = cfg.ps.as_deref() {
        if ps.trim().is_empty() {
            return Err("ps must not be empty".into());
        }
    }

    if let Some(custom) = &cfg.custom {
        let known = category_names();
        for category in custom.keys() {
            if !known.contains(&category.as_str()) {
                return Err(format!(
                    "Unknown category '{}' in custom, expected one of {}",
                    category,
                    known.join(", ")
                )
                .into());
            }
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(level) = args.log_level {
        config.log_level = Some(log_level_name(level).to_string());
    }
    if let Some(os) = &args.os {
        config.os = Some(os.clone());
    }
    if let Some(ps) = &args.ps {
        config.ps = Some(ps.clone());
    }

    Ok(config)
}

fn log_level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Off => "off",
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => {
            // Try default locations
            let defaults = [
                "/etc/herakles/hoststat.yaml",
                "/etc/herakles/hoststat.yml",
                "/etc/herakles/hoststat.json",
                "./herakles-hoststat.yaml",
                "./herakles-hoststat.yml",
                "./herakles-hoststat.json",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(found) => PathBuf::from(found),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", path.display()))?,
        // Default to YAML
        _ => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?,
    };

    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Serializes the configuration in the requested format.
pub fn render_config(config: &Config, format: OutputFormat) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(config)?,
        OutputFormat::Toml => toml::to_string_pretty(config)?,
        OutputFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, format)?);
    Ok(())
}
