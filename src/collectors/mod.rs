//! Collectors module for host status data.
//!
//! Each collector turns one raw text source (pseudo-file, command output or
//! sysctl value) into typed records. The parsers are pure functions of their
//! input; reading the source goes through the `Host` trait.

pub mod cpustats;
pub mod diskstats;
pub mod filesystem;
pub mod netdev;
pub mod netstat;
pub mod procs;
pub mod sessions;
pub mod vmstat;

use std::path::Path;

use crate::error::ProbeError;
use crate::host::Host;

/// Reads a pseudo-file, reporting absence as `ProbeError::Unavailable`.
pub fn read_source(host: &dyn Host, path: &str) -> Result<String, ProbeError> {
    host.read_pseudo_file(Path::new(path))?
        .ok_or_else(|| ProbeError::Unavailable(path.to_string()))
}
