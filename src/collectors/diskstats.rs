//! Disk I/O statistics collector.
//!
//! Parses /proc/diskstats into one record per block device.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::value::NumericValue;

/// Pseudo-file holding per-device I/O counters.
pub const DISKSTATS_PATH: &str = "/proc/diskstats";

/// Field layout of a /proc/diskstats line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskstatsSchema {
    /// Kernel documentation revision the offsets follow.
    pub version: &'static str,
    /// Fields every line must carry; newer kernels append more.
    pub min_fields: usize,
}

/// major minor name, then the 11 classic I/O counters.
pub const DISKSTATS_SCHEMA: DiskstatsSchema = DiskstatsSchema {
    version: "iostats-2.6",
    min_fields: 14,
};

/// I/O counters for a single block device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskDeviceRecord {
    pub major: NumericValue,
    pub minor: NumericValue,
    pub device: String,
    pub reads_issued: NumericValue,
    pub reads_merged: NumericValue,
    pub sectors_read: NumericValue,
    pub ms_spent_reading: NumericValue,
    pub writes_completed: NumericValue,
    pub writes_merged: NumericValue,
    pub sectors_written: NumericValue,
    pub ms_spent_writing: NumericValue,
    pub io_in_progress: NumericValue,
    pub ms_spent_in_io: NumericValue,
    pub weighted_ms_spent_in_io: NumericValue,
}

impl DiskDeviceRecord {
    /// Builds a record from the whitespace-split fields of one line.
    pub fn from_fields(parts: &[&str]) -> Option<Self> {
        if parts.len() < DISKSTATS_SCHEMA.min_fields {
            return None;
        }
        let n = |idx: usize| NumericValue::coerce(parts[idx]);

        Some(Self {
            major: n(0),
            minor: n(1),
            device: parts[2].to_string(),
            reads_issued: n(3),
            reads_merged: n(4),
            sectors_read: n(5),
            ms_spent_reading: n(6),
            writes_completed: n(7),
            writes_merged: n(8),
            sectors_written: n(9),
            ms_spent_writing: n(10),
            io_in_progress: n(11),
            ms_spent_in_io: n(12),
            weighted_ms_spent_in_io: n(13),
        })
    }

    /// The 14 fields in /proc/diskstats order.
    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.major.to_string(),
            self.minor.to_string(),
            self.device.clone(),
            self.reads_issued.to_string(),
            self.reads_merged.to_string(),
            self.sectors_read.to_string(),
            self.ms_spent_reading.to_string(),
            self.writes_completed.to_string(),
            self.writes_merged.to_string(),
            self.sectors_written.to_string(),
            self.ms_spent_writing.to_string(),
            self.io_in_progress.to_string(),
            self.ms_spent_in_io.to_string(),
            self.weighted_ms_spent_in_io.to_string(),
        ]
    }
}

/// Parses /proc/diskstats content into records keyed by device name.
///
/// The first line for a device name wins; later duplicates are logged.
pub fn parse_diskstats(content: &str) -> BTreeMap<String, DiskDeviceRecord> {
    let mut stats = BTreeMap::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        let Some(record) = DiskDeviceRecord::from_fields(&parts) else {
            warn!(
                "Skipping diskstats line with {} fields (need {}): {}",
                parts.len(),
                DISKSTATS_SCHEMA.min_fields,
                line
            );
            continue;
        };

        if stats.contains_key(&record.device) {
            warn!("Duplicate device {} in diskstats, keeping first", record.device);
            continue;
        }
        debug!("Parsed diskstats for {}", record.device);
        stats.insert(record.device.clone(), record);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISKSTATS: &str = "\
   8       0 sda 4518 1203 301234 2210 9871 5432 456789 12000 0 8000 14210
   8       1 sda1 4400 1200 300000 2200 9800 5400 456000 11900 0 7900 14100
 259       0 nvme0n1 100 0 2000 50 200 10 4000 90 0 120 140 0 0 0 0 0 0
";

    #[test]
    fn test_parse_diskstats() {
        let stats = parse_diskstats(DISKSTATS);
        assert_eq!(stats.len(), 3);

        let sda = &stats["sda"];
        assert_eq!(sda.major, NumericValue::Integer(8));
        assert_eq!(sda.minor, NumericValue::Integer(0));
        assert_eq!(sda.reads_issued, NumericValue::Integer(4518));
        assert_eq!(sda.sectors_written, NumericValue::Integer(456789));
        assert_eq!(sda.weighted_ms_spent_in_io, NumericValue::Integer(14210));
    }

    #[test]
    fn test_parse_diskstats_newer_kernel_extra_fields() {
        let stats = parse_diskstats(DISKSTATS);
        let nvme = &stats["nvme0n1"];
        assert_eq!(nvme.major, NumericValue::Integer(259));
        assert_eq!(nvme.weighted_ms_spent_in_io, NumericValue::Integer(140));
    }

    #[test]
    fn test_parse_diskstats_skips_short_lines() {
        let stats = parse_diskstats("8 0 sda 1 2 3\n\n8 16 sdb 1 2 3 4 5 6 7 8 9 10 11\n");
        assert_eq!(stats.len(), 1);
        assert!(stats.contains_key("sdb"));
    }

    #[test]
    fn test_parse_diskstats_first_duplicate_wins() {
        let content = "8 0 sda 1 1 1 1 1 1 1 1 1 1 1\n8 0 sda 2 2 2 2 2 2 2 2 2 2 2\n";
        let stats = parse_diskstats(content);
        assert_eq!(stats["sda"].reads_issued, NumericValue::Integer(1));
    }

    #[test]
    fn test_fields_preserve_order() {
        for line in DISKSTATS.lines().take(2) {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let record = DiskDeviceRecord::from_fields(&parts).unwrap();
            assert_eq!(record.to_fields(), parts);
        }
    }
}
