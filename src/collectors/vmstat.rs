//! Virtual memory counters (/proc/vmstat) and memory summary (/proc/meminfo).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::value::NumericValue;

pub const VMSTAT_PATH: &str = "/proc/vmstat";
pub const MEMINFO_PATH: &str = "/proc/meminfo";

/// Parses `name value` lines into a counter map.
pub fn parse_vmstat(content: &str) -> BTreeMap<String, NumericValue> {
    let mut stats = BTreeMap::new();

    for line in content.lines() {
        let comps: Vec<&str> = line.split_whitespace().collect();
        match comps.as_slice() {
            [] => continue,
            [name, value, ..] => {
                stats.insert(name.to_string(), NumericValue::coerce(value));
            }
            [name] => debug!("Skipping vmstat counter {} without value", name),
        }
    }

    stats
}

/// One /proc/meminfo entry, e.g. `MemTotal: 16303480 kB`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemInfoEntry {
    pub value: NumericValue,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub unit: Option<String>,
}

/// Parses /proc/meminfo into entries keyed by field name (colon stripped).
pub fn parse_meminfo(content: &str) -> BTreeMap<String, MemInfoEntry> {
    let mut info = BTreeMap::new();

    for line in content.lines() {
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        let mut parts = rest.split_whitespace();
        let Some(value) = parts.next() else {
            debug!("Skipping meminfo field {} without value", name);
            continue;
        };

        info.insert(
            name.trim().to_string(),
            MemInfoEntry {
                value: NumericValue::coerce(value),
                unit: parts.next().map(str::to_string),
            },
        );
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vmstat() {
        let stats = parse_vmstat("nr_free_pages 123456\npgfault 987\n\nbroken\n");
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["nr_free_pages"], NumericValue::Integer(123456));
        assert_eq!(stats["pgfault"], NumericValue::Integer(987));
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16303480 kB
MemFree:         1234567 kB
HugePages_Total:       0
";
        let info = parse_meminfo(content);
        assert_eq!(info.len(), 3);
        assert_eq!(info["MemTotal"].value, NumericValue::Integer(16303480));
        assert_eq!(info["MemTotal"].unit.as_deref(), Some("kB"));
        assert_eq!(info["HugePages_Total"].unit, None);
    }
}
