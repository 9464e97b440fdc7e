//! Network interface statistics collector.
//!
//! Parses /proc/net/dev into one record per interface.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::value::NumericValue;

/// Pseudo-file holding per-interface counters.
pub const NETDEV_PATH: &str = "/proc/net/dev";

/// Counters after the interface name: 8 receive, then 8 transmit.
pub const NETDEV_COUNTERS: usize = 16;

/// Receive and transmit counters for one interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterfaceRecord {
    pub iface: String,
    pub rx_bytes: NumericValue,
    pub rx_packets: NumericValue,
    pub rx_errs: NumericValue,
    pub rx_drop: NumericValue,
    pub rx_fifo: NumericValue,
    pub rx_frame: NumericValue,
    pub rx_compressed: NumericValue,
    pub rx_multicast: NumericValue,
    pub tx_bytes: NumericValue,
    pub tx_packets: NumericValue,
    pub tx_errs: NumericValue,
    pub tx_drop: NumericValue,
    pub tx_fifo: NumericValue,
    pub tx_colls: NumericValue,
    pub tx_carrier: NumericValue,
    pub tx_compressed: NumericValue,
}

/// Parses one `name: n1 ... n16` line.
///
/// The name is split off at the colon, so `eth0:1000` and `eth0: 1000`
/// parse the same.
pub fn parse_netdev_line(line: &str) -> Option<NetworkInterfaceRecord> {
    let (name, counters) = line.split_once(':')?;
    let values: Vec<&str> = counters.split_whitespace().collect();
    if values.len() < NETDEV_COUNTERS {
        return None;
    }
    let n = |idx: usize| NumericValue::coerce(values[idx]);

    Some(NetworkInterfaceRecord {
        iface: name.trim().to_string(),
        rx_bytes: n(0),
        rx_packets: n(1),
        rx_errs: n(2),
        rx_drop: n(3),
        rx_fifo: n(4),
        rx_frame: n(5),
        rx_compressed: n(6),
        rx_multicast: n(7),
        tx_bytes: n(8),
        tx_packets: n(9),
        tx_errs: n(10),
        tx_drop: n(11),
        tx_fifo: n(12),
        tx_colls: n(13),
        tx_carrier: n(14),
        tx_compressed: n(15),
    })
}

/// Parses /proc/net/dev content into records keyed by interface name.
///
/// Header lines carry no colon and are skipped.
pub fn parse_netdev(content: &str) -> BTreeMap<String, NetworkInterfaceRecord> {
    let mut stats = BTreeMap::new();

    for line in content.lines() {
        if line.trim().is_empty() || !line.contains(':') {
            continue;
        }

        let Some(record) = parse_netdev_line(line) else {
            warn!("Skipping malformed /proc/net/dev line: {}", line);
            continue;
        };

        if stats.contains_key(&record.iface) {
            warn!("Duplicate interface {} in /proc/net/dev, keeping first", record.iface);
            continue;
        }
        stats.insert(record.iface.clone(), record);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    const NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 123456    1000    0    0    0     0          0         0   123456    1000    0    0    0     0       0          0
  eth0:98765432  54321    1    2    3     4          5         6 12345678   43210    7    8    9    10      11         12
";

    #[test]
    fn test_parse_netdev() {
        let stats = parse_netdev(NET_DEV);
        assert_eq!(stats.len(), 2);

        let eth0 = &stats["eth0"];
        assert_eq!(eth0.iface, "eth0");
        assert_eq!(eth0.rx_bytes, NumericValue::Integer(98765432));
        assert_eq!(eth0.rx_packets, NumericValue::Integer(54321));
        assert_eq!(eth0.rx_errs, NumericValue::Integer(1));
        assert_eq!(eth0.rx_drop, NumericValue::Integer(2));
        assert_eq!(eth0.rx_fifo, NumericValue::Integer(3));
        assert_eq!(eth0.rx_frame, NumericValue::Integer(4));
        assert_eq!(eth0.rx_compressed, NumericValue::Integer(5));
        assert_eq!(eth0.rx_multicast, NumericValue::Integer(6));
        assert_eq!(eth0.tx_bytes, NumericValue::Integer(12345678));
        assert_eq!(eth0.tx_packets, NumericValue::Integer(43210));
        assert_eq!(eth0.tx_errs, NumericValue::Integer(7));
        assert_eq!(eth0.tx_drop, NumericValue::Integer(8));
        assert_eq!(eth0.tx_fifo, NumericValue::Integer(9));
        assert_eq!(eth0.tx_colls, NumericValue::Integer(10));
        assert_eq!(eth0.tx_carrier, NumericValue::Integer(11));
        assert_eq!(eth0.tx_compressed, NumericValue::Integer(12));
    }

    #[test]
    fn test_parse_netdev_line_colon_spacing() {
        let tight = parse_netdev_line("eth0:1000 10 0 0 0 0 0 0 2000 20 0 0 0 0 0 0").unwrap();
        let spaced = parse_netdev_line("eth0: 1000 10 0 0 0 0 0 0 2000 20 0 0 0 0 0 0").unwrap();
        assert_eq!(tight, spaced);
        assert_eq!(tight.rx_bytes, NumericValue::Integer(1000));
        assert_eq!(tight.rx_packets, NumericValue::Integer(10));
        assert_eq!(tight.tx_bytes, NumericValue::Integer(2000));
        assert_eq!(tight.tx_packets, NumericValue::Integer(20));
    }

    #[test]
    fn test_parse_netdev_skips_truncated_line() {
        let stats = parse_netdev("eth0: 1 2 3\n  lo: 1 1 0 0 0 0 0 0 1 1 0 0 0 0 0 0\n");
        assert_eq!(stats.len(), 1);
        assert!(stats.contains_key("lo"));
    }

    #[test]
    fn test_parse_netdev_first_duplicate_wins() {
        let content = "eth0: 1 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0\neth0: 2 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n";
        let stats = parse_netdev(content);
        assert_eq!(stats["eth0"].rx_bytes, NumericValue::Integer(1));
    }
}
