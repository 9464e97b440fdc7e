//! Static host facts supplied by the hosting agent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProbeError;

/// Process listing command used when the agent does not supply one.
pub const DEFAULT_PS_COMMAND: &str = "ps auxwww";

/// Operating system families this probe knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OsFamily {
    #[serde(rename = "FreeBSD")]
    FreeBsd,
    Linux,
}

impl FromStr for OsFamily {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "freebsd" => Ok(OsFamily::FreeBsd),
            "linux" => Ok(OsFamily::Linux),
            _ => Err(ProbeError::UnsupportedOs(s.to_string())),
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::FreeBsd => f.write_str("FreeBSD"),
            OsFamily::Linux => f.write_str("Linux"),
        }
    }
}

/// Host facts: OS family and the OS-appropriate process listing command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grains {
    pub os: OsFamily,
    pub ps: String,
}

impl Grains {
    pub fn new(os: OsFamily) -> Self {
        Self {
            os,
            ps: DEFAULT_PS_COMMAND.to_string(),
        }
    }

    /// Builds grains from the agent's OS string, e.g. "FreeBSD".
    pub fn from_os_name(os: &str, ps: Option<&str>) -> Result<Self, ProbeError> {
        let os = os.parse::<OsFamily>()?;
        Ok(Self {
            os,
            ps: ps.unwrap_or(DEFAULT_PS_COMMAND).to_string(),
        })
    }

    /// Grains for the OS this binary was compiled for.
    pub fn detect() -> Result<Self, ProbeError> {
        Self::from_os_name(std::env::consts::OS, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_family_parse() {
        assert_eq!("FreeBSD".parse::<OsFamily>().unwrap(), OsFamily::FreeBsd);
        assert_eq!("freebsd".parse::<OsFamily>().unwrap(), OsFamily::FreeBsd);
        assert_eq!("Linux".parse::<OsFamily>().unwrap(), OsFamily::Linux);
    }

    #[test]
    fn test_os_family_unsupported() {
        let err = "Windows".parse::<OsFamily>().unwrap_err();
        assert!(matches!(err, ProbeError::UnsupportedOs(ref s) if s == "Windows"));
    }

    #[test]
    fn test_grains_default_ps() {
        let grains = Grains::from_os_name("FreeBSD", None).unwrap();
        assert_eq!(grains.ps, DEFAULT_PS_COMMAND);

        let grains = Grains::from_os_name("Linux", Some("ps -eo user,pid,vsz")).unwrap();
        assert_eq!(grains.os, OsFamily::Linux);
        assert_eq!(grains.ps, "ps -eo user,pid,vsz");
    }
}
