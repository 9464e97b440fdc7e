//! CLI command implementations for herakles-hoststat.
//!
//! This module provides implementations for all CLI subcommands:
//! - status categories (`all`, `procs`, `cpustats`, ...): collect and print
//! - `check`: Data source availability
//! - `config`: Configuration file generation

pub mod check;
pub mod config;
pub mod status;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use status::command_status;
