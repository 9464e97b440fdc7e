//! CLI arguments and subcommands for herakles-hoststat.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Serialization format for status output and configuration dumps
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-hoststat",
    about = "Host status probe for FreeBSD and Linux",
    long_about = "Host status probe for FreeBSD and Linux.\n\n\
                  Reads process tables, load average, CPU times, interrupts, disk and \
                  network counters and disk usage, and prints them as YAML, JSON or TOML.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true,
    after_help = "More info: https://www.herakles.now"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (overrides config file)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long, global = true)]
    pub no_config: bool,

    /// OS family override (FreeBSD, Linux)
    #[arg(long, global = true)]
    pub os: Option<String>,

    /// Process listing command override
    #[arg(long, global = true)]
    pub ps: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "yaml", global = true)]
    pub format: OutputFormat,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Status categories and maintenance commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Every status category in one snapshot
    All,

    /// Process table keyed by PID
    Procs,

    /// 1, 5 and 15 minute load averages
    Loadavg,

    /// CPU times, boot time, interrupts and process counts
    Cpustats,

    /// Block device counters
    Diskstats,

    /// Disk usage for mount points or fstype globs
    Diskusage {
        /// Absolute paths or fstype globs such as 'ext?' (default: all mounts)
        filters: Vec<String>,
    },

    /// Virtual memory counters
    Vmstats,

    /// Memory summary
    Meminfo,

    /// Network protocol counters
    Netstats,

    /// Network interface counters
    Netdev,

    /// Output of uptime
    Uptime,

    /// Logged-in user sessions
    W,

    /// PIDs of processes matching a signature
    Pid {
        /// Text to look for in the process listing
        signature: String,
    },

    /// Keys selected through the `custom` config section
    Custom,

    /// Report which data sources are available on this host
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ('-' for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}

impl Commands {
    /// Name used as the TOML table key for this command's output.
    pub fn category(&self) -> &'static str {
        match self {
            Commands::All => "all",
            Commands::Procs => "procs",
            Commands::Loadavg => "loadavg",
            Commands::Cpustats => "cpustats",
            Commands::Diskstats => "diskstats",
            Commands::Diskusage { .. } => "diskusage",
            Commands::Vmstats => "vmstats",
            Commands::Meminfo => "meminfo",
            Commands::Netstats => "netstats",
            Commands::Netdev => "netdev",
            Commands::Uptime => "uptime",
            Commands::W => "w",
            Commands::Pid { .. } => "pid",
            Commands::Custom => "custom",
            Commands::Check => "check",
            Commands::Config { .. } => "config",
        }
    }
}
