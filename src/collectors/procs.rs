//! Process table parsing.
//!
//! Three views of the same `ps` output:
//! - a listing keyed by PID, with columns resolved from the header line
//! - aggregate counts (total, blocked, running) for the CPU statistics
//! - PID lookup by a signature substring

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One row of the process listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub user: String,
    pub cmd: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state: Option<String>,
}

/// Column indices resolved from a `ps` header line.
///
/// Columns missing from the header stay at index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessColumns {
    pub user: usize,
    pub pid: usize,
    pub command: usize,
    pub state: Option<usize>,
}

impl ProcessColumns {
    pub fn from_header(header: &str) -> Self {
        let guide: Vec<&str> = header.split_whitespace().collect();
        let find = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| guide.iter().position(|col| col == name))
        };

        Self {
            user: find(&["USER", "UID"]).unwrap_or(0),
            pid: find(&["PID"]).unwrap_or(0),
            command: find(&["COMMAND", "CMD"]).unwrap_or(0),
            state: find(&["STAT", "S"]),
        }
    }
}

/// Parses a process listing whose first line is the column header.
///
/// Fields from the command column onward are rejoined with single spaces.
pub fn parse_process_listing(content: &str) -> BTreeMap<String, ProcessRecord> {
    let mut lines = content.lines();
    let columns = match lines.next() {
        Some(header) => ProcessColumns::from_header(header),
        None => return BTreeMap::new(),
    };

    let mut records = BTreeMap::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let comps: Vec<&str> = line.split_whitespace().collect();
        let (Some(pid), Some(user)) = (comps.get(columns.pid), comps.get(columns.user)) else {
            debug!("Skipping short process row: {}", line);
            continue;
        };

        let cmd = comps
            .get(columns.command..)
            .map(|rest| rest.join(" "))
            .unwrap_or_default();
        let state = columns
            .state
            .and_then(|idx| comps.get(idx))
            .map(|s| s.to_string());

        if records.contains_key(*pid) {
            warn!("Duplicate PID {} in process listing, keeping first row", pid);
            continue;
        }

        records.insert(
            pid.to_string(),
            ProcessRecord {
                user: user.to_string(),
                cmd,
                state,
            },
        );
    }

    records
}

/// Column and flag conventions used for process statistics.
///
/// Column positions come from the listing header, so custom `ps` commands
/// work as long as they keep the named columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessTableLayout {
    /// Header of the column holding the kernel-thread sentinel.
    pub kernel_thread_column: &'static str,
    pub kernel_thread_sentinel: &'static str,
    pub blocked_flag: char,
    pub running_flag: char,
}

/// Layout of `ps aux` style output on both BSD and procps: kernel threads
/// have a VSZ of 0.
pub const PS_AUX_LAYOUT: ProcessTableLayout = ProcessTableLayout {
    kernel_thread_column: "VSZ",
    kernel_thread_sentinel: "0",
    blocked_flag: 'D',
    running_flag: 'R',
};

/// Process counters derived from the process table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCounts {
    pub processes: u64,
    pub procs_blocked: u64,
    pub procs_running: u64,
}

/// Counts processes, skipping kernel threads.
///
/// The first line is the header. Without a VSZ column every row counts;
/// without a state column running and blocked stay at zero.
pub fn count_processes(content: &str, layout: &ProcessTableLayout) -> ProcessCounts {
    let mut counts = ProcessCounts::default();
    let mut lines = content.lines();
    let Some(header) = lines.next() else {
        return counts;
    };

    let kernel_thread = header
        .split_whitespace()
        .position(|col| col == layout.kernel_thread_column);
    let state = ProcessColumns::from_header(header).state;
    if kernel_thread.is_none() {
        debug!(
            "No {} column in process listing, kernel threads are counted",
            layout.kernel_thread_column
        );
    }
    if state.is_none() {
        warn!("No state column in process listing, running and blocked counts stay 0");
    }
    let min_fields = kernel_thread.max(state).map_or(1, |idx| idx + 1);

    for line in lines {
        let pss: Vec<&str> = line.split_whitespace().collect();
        if pss.is_empty() {
            continue;
        }
        if pss.len() < min_fields {
            debug!("Skipping short process row: {}", line);
            continue;
        }
        if kernel_thread.is_some_and(|idx| pss[idx] == layout.kernel_thread_sentinel) {
            continue;
        }

        if let Some(idx) = state {
            if pss[idx].contains(layout.blocked_flag) {
                counts.procs_blocked += 1;
            }
            if pss[idx].contains(layout.running_flag) {
                counts.procs_running += 1;
            }
        }
        counts.processes += 1;
    }

    counts
}

/// Returns the PIDs of every row whose text contains `signature`.
pub fn find_pids(content: &str, signature: &str) -> Vec<u32> {
    let mut lines = content.lines();
    let columns = match lines.next() {
        Some(header) => ProcessColumns::from_header(header),
        None => return Vec::new(),
    };

    lines
        .filter(|line| line.contains(signature))
        .filter_map(|line| line.split_whitespace().nth(columns.pid))
        .filter_map(|pid| pid.parse::<u32>().ok())
        .collect()
}
