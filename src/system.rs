//! System-wide scalar sources: load average and uptime.
//!
//! FreeBSD reports load through the `vm.loadavg` sysctl, Linux through
//! /proc/loadavg. Both are reduced to the same `LoadAverage` record.

use serde::{Deserialize, Serialize};

use crate::error::ProbeError;
use crate::value::NumericValue;

pub const LOADAVG_PATH: &str = "/proc/loadavg";
pub const UPTIME_COMMAND: &str = "uptime";

/// System load averages for 1, 5, and 15 minute intervals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    #[serde(rename = "1-min")]
    pub one_min: NumericValue,
    #[serde(rename = "5-min")]
    pub five_min: NumericValue,
    #[serde(rename = "15-min")]
    pub fifteen_min: NumericValue,
}

/// Parses the `vm.loadavg` sysctl value.
///
/// Format: "{ 0.52 0.58 0.59 }". Locales with a decimal comma print
/// "{ 0,52 0,58 0,59 }", so commas are read as decimal points.
pub fn parse_sysctl_loadavg(value: &str) -> Result<LoadAverage, ProbeError> {
    let normalized = value.replace(',', ".");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(ProbeError::malformed(
            "vm.loadavg",
            format!("expected at least 4 fields, got {}", parts.len()),
        ));
    }

    Ok(LoadAverage {
        one_min: NumericValue::coerce(parts[1]),
        five_min: NumericValue::coerce(parts[2]),
        fifteen_min: NumericValue::coerce(parts[3]),
    })
}

/// Parses /proc/loadavg.
///
/// Format: "0.00 0.01 0.05 1/234 5678"
pub fn parse_proc_loadavg(content: &str) -> Result<LoadAverage, ProbeError> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(ProbeError::malformed(
            LOADAVG_PATH,
            format!("expected at least 3 fields, got {}", parts.len()),
        ));
    }

    Ok(LoadAverage {
        one_min: NumericValue::coerce(parts[0]),
        five_min: NumericValue::coerce(parts[1]),
        fifteen_min: NumericValue::coerce(parts[2]),
    })
}
