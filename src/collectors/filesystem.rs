//! Disk usage for selected mount points.
//!
//! Filters are either absolute paths (used as-is) or fstype globs such as
//! `ext?`, which are matched against the mount table.

use ahash::AHashSet as HashSet;
use globset::Glob;
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::host::Host;

pub const MOUNTS_PATH: &str = "/proc/mounts";

/// One mount table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mount_point: String,
    pub fstype: String,
}

/// Available and total bytes of one mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountUsage {
    pub available: u64,
    pub total: u64,
}

/// Parses /proc/mounts (or `mount -p`) content: device, mount point, fstype.
pub fn parse_mount_table(content: &str) -> Vec<MountEntry> {
    content
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return None;
            }
            Some(MountEntry {
                device: parts[0].to_string(),
                mount_point: parts[1].to_string(),
                fstype: parts[2].to_string(),
            })
        })
        .collect()
}

/// Translates one shell glob into an anchored regex.
///
/// Patterns globset rejects (such as an unclosed `[`) are logged and yield
/// `None`, so they match nothing.
pub fn glob_to_regex(pattern: &str) -> Option<String> {
    match Glob::new(pattern) {
        Ok(glob) => Some(glob.regex().to_string()),
        Err(e) => {
            warn!("Invalid fstype filter {}: {}", pattern, e);
            None
        }
    }
}

/// Compiles the valid fstype globs into a single alternation.
pub fn compile_fstype_patterns<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Option<Regex> {
    let parts: Vec<String> = patterns
        .into_iter()
        .filter_map(glob_to_regex)
        .map(|re| format!("(?:{})", re))
        .collect();
    if parts.is_empty() {
        return None;
    }

    let source = parts.join("|");
    match Regex::new(&source) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Cannot compile fstype filters {}: {}", source, e);
            None
        }
    }
}

/// Filters split into explicit paths and fstype globs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountSelection {
    pub paths: HashSet<String>,
    pub fstypes: HashSet<String>,
}

impl MountSelection {
    /// No filters selects every mounted filesystem.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let mut selection = Self::default();
        if args.is_empty() {
            selection.fstypes.insert("*".to_string());
            return selection;
        }

        for arg in args {
            let arg = arg.as_ref();
            if arg.starts_with('/') {
                selection.paths.insert(arg.to_string());
            } else {
                selection.fstypes.insert(arg.to_string());
            }
        }
        selection
    }

    /// Explicit paths plus every mount point whose fstype matches a glob.
    pub fn resolve(&self, mounts: &[MountEntry]) -> HashSet<String> {
        let mut selected = self.paths.clone();

        if let Some(re) = compile_fstype_patterns(self.fstypes.iter().map(String::as_str)) {
            for entry in mounts {
                if re.is_match(entry.fstype.as_bytes()) {
                    selected.insert(entry.mount_point.clone());
                }
            }
        }

        selected
    }
}

/// Queries usage for each selected path; paths that cannot be stat'ed are skipped.
pub fn query_usage(host: &dyn Host, selected: &HashSet<String>) -> BTreeMap<String, MountUsage> {
    let mut usage = BTreeMap::new();

    for path in selected {
        match host.filesystem_stats(Path::new(path)) {
            Ok(stats) => {
                usage.insert(
                    path.clone(),
                    MountUsage {
                        available: stats.available_blocks.saturating_mul(stats.block_size),
                        total: stats.total_blocks.saturating_mul(stats.block_size),
                    },
                );
            }
            Err(e) => {
                warn!("Skipping disk usage for {}: {}", path, e);
            }
        }
    }

    debug!("Collected disk usage for {} mount points", usage.len());
    usage
}
