//! OS-family specific data sources.
//!
//! Load average, CPU times, boot time and interrupts come from different
//! places on FreeBSD (sysctl, `vmstat -i`) and Linux (/proc). The matching
//! `Platform` is chosen once by [`platform_for`] when a `Status` is built.

use serde::Serialize;
use tracing::debug;

use crate::collectors::cpustats::{
    parse_boottime, parse_cpu_times, parse_proc_stat, parse_vmstat_interrupts, KernelCpuStats,
};
use crate::collectors::read_source;
use crate::error::{or_default, ProbeError};
use crate::grains::OsFamily;
use crate::host::Host;
use crate::system::{parse_proc_loadavg, parse_sysctl_loadavg, LoadAverage, LOADAVG_PATH};

pub const PROC_STAT_PATH: &str = "/proc/stat";

/// A raw source the probe reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DataSource {
    PseudoFile(String),
    Command(String),
    Sysctl(String),
}

impl DataSource {
    /// Whether the source can be read on `host`.
    pub fn probe(&self, host: &dyn Host) -> Result<(), ProbeError> {
        match self {
            DataSource::PseudoFile(path) => read_source(host, path).map(|_| ()),
            DataSource::Command(command) => host.run_command(command).map(|_| ()),
            DataSource::Sysctl(name) => host.sysctl(name).map(|_| ()),
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::PseudoFile(path) => write!(f, "file {}", path),
            DataSource::Command(command) => write!(f, "command '{}'", command),
            DataSource::Sysctl(name) => write!(f, "sysctl {}", name),
        }
    }
}

/// Data sources that differ between OS families.
pub trait Platform: Send + Sync {
    fn family(&self) -> OsFamily;

    fn loadavg(&self, host: &dyn Host) -> Result<LoadAverage, ProbeError>;

    /// Aggregate and per-core CPU times, boot time and interrupt counts.
    fn kernel_cpu(&self, host: &dyn Host) -> Result<KernelCpuStats, ProbeError>;

    /// Command listing mounts when /proc/mounts is absent.
    fn mount_table_fallback(&self) -> Option<&'static str> {
        None
    }

    /// Sources read by `loadavg`, `kernel_cpu` and the mount fallback.
    fn sources(&self) -> Vec<DataSource>;
}

/// Builds the platform for an OS family.
pub fn platform_for(family: OsFamily) -> Box<dyn Platform> {
    match family {
        OsFamily::FreeBsd => Box::new(FreeBsd),
        OsFamily::Linux => Box::new(Linux),
    }
}

/// FreeBSD: sysctl counters and `vmstat -i`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeBsd;

impl FreeBsd {
    pub const LOADAVG_SYSCTL: &'static str = "vm.loadavg";
    pub const CP_TIME_SYSCTL: &'static str = "kern.cp_time";
    pub const CP_TIMES_SYSCTL: &'static str = "kern.cp_times";
    pub const BOOTTIME_SYSCTL: &'static str = "kern.boottime";
    pub const INTERRUPTS_COMMAND: &'static str = "vmstat -i";
    pub const MOUNT_COMMAND: &'static str = "mount -p";
}

impl Platform for FreeBsd {
    fn family(&self) -> OsFamily {
        OsFamily::FreeBsd
    }

    fn loadavg(&self, host: &dyn Host) -> Result<LoadAverage, ProbeError> {
        parse_sysctl_loadavg(&host.sysctl(Self::LOADAVG_SYSCTL)?)
    }

    fn kernel_cpu(&self, host: &dyn Host) -> Result<KernelCpuStats, ProbeError> {
        let cp_time = host.sysctl(Self::CP_TIME_SYSCTL)?;
        // Absent on kernels built without SMP
        let cp_times = host.sysctl(Self::CP_TIMES_SYSCTL).unwrap_or_else(|e| {
            debug!("No per-core CPU times: {}", e);
            String::new()
        });

        let btime = match host.sysctl(Self::BOOTTIME_SYSCTL) {
            Ok(value) => parse_boottime(&value),
            Err(e) => {
                debug!("No boot time: {}", e);
                None
            }
        };

        let intr = or_default(host.run_command(Self::INTERRUPTS_COMMAND))?;

        Ok(KernelCpuStats {
            cpu: parse_cpu_times(&cp_time, &cp_times),
            btime,
            intr: parse_vmstat_interrupts(&intr),
        })
    }

    fn mount_table_fallback(&self) -> Option<&'static str> {
        Some(Self::MOUNT_COMMAND)
    }

    fn sources(&self) -> Vec<DataSource> {
        let mut sources: Vec<DataSource> = [
            Self::LOADAVG_SYSCTL,
            Self::CP_TIME_SYSCTL,
            Self::CP_TIMES_SYSCTL,
            Self::BOOTTIME_SYSCTL,
        ]
        .iter()
        .map(|name| DataSource::Sysctl(name.to_string()))
        .collect();
        sources.push(DataSource::Command(Self::INTERRUPTS_COMMAND.to_string()));
        sources.push(DataSource::Command(Self::MOUNT_COMMAND.to_string()));
        sources
    }
}

/// Linux: everything comes from /proc.
#[derive(Debug, Default, Clone, Copy)]
pub struct Linux;

impl Platform for Linux {
    fn family(&self) -> OsFamily {
        OsFamily::Linux
    }

    fn loadavg(&self, host: &dyn Host) -> Result<LoadAverage, ProbeError> {
        parse_proc_loadavg(&read_source(host, LOADAVG_PATH)?)
    }

    fn kernel_cpu(&self, host: &dyn Host) -> Result<KernelCpuStats, ProbeError> {
        Ok(parse_proc_stat(&read_source(host, PROC_STAT_PATH)?))
    }

    fn sources(&self) -> Vec<DataSource> {
        vec![
            DataSource::PseudoFile(LOADAVG_PATH.to_string()),
            DataSource::PseudoFile(PROC_STAT_PATH.to_string()),
        ]
    }
}
