//! Network protocol counters from /proc/net/netstat.
//!
//! The file is a sequence of two-line blocks, a header naming the fields and a
//! data line starting with the same token:
//!
//! ```text
//! TcpExt: SyncookiesSent SyncookiesRecv
//! TcpExt: 0 12
//! ```

use std::collections::BTreeMap;
use tracing::debug;

use crate::value::NumericValue;

pub const NETSTAT_PATH: &str = "/proc/net/netstat";

/// Field name to value for one protocol block, e.g. "TcpExt".
pub type ProtocolCounterBlock = BTreeMap<String, NumericValue>;

/// Parses header/data blocks into one mapping per block name.
///
/// A line whose first token matches the current header's first token is a
/// data line; any other line becomes the new header.
pub fn parse_protocol_blocks(content: &str) -> BTreeMap<String, ProtocolCounterBlock> {
    let mut blocks = BTreeMap::new();
    let mut headers: Vec<&str> = vec![""];

    for line in content.lines() {
        let comps: Vec<&str> = line.split_whitespace().collect();
        let Some(&first) = comps.first() else {
            continue;
        };

        if first != headers[0] {
            headers = comps;
            continue;
        }

        if comps.len() != headers.len() {
            debug!(
                "{} data line has {} fields, header has {}",
                first,
                comps.len(),
                headers.len()
            );
        }

        let row: ProtocolCounterBlock = headers
            .iter()
            .zip(comps.iter())
            .skip(1)
            .map(|(name, value)| (name.to_string(), NumericValue::coerce(value)))
            .collect();

        blocks.insert(headers[0].trim_end_matches(':').to_string(), row);
    }

    blocks
}
