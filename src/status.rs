//! Status snapshot assembly.
//!
//! `Status` exposes one operation per category. Each operation reads fresh
//! data through the `Host`, and a category whose source does not exist on
//! this host yields its empty value instead of an error. `all_status` runs
//! every category and keeps going when one of them fails.

use ahash::AHashMap as HashMap;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::collectors::cpustats::CpuStats;
use crate::collectors::diskstats::{parse_diskstats, DiskDeviceRecord, DISKSTATS_PATH};
use crate::collectors::filesystem::{
    parse_mount_table, query_usage, MountEntry, MountSelection, MountUsage, MOUNTS_PATH,
};
use crate::collectors::netdev::{parse_netdev, NetworkInterfaceRecord, NETDEV_PATH};
use crate::collectors::netstat::{parse_protocol_blocks, ProtocolCounterBlock, NETSTAT_PATH};
use crate::collectors::procs::{
    count_processes, find_pids, parse_process_listing, ProcessRecord, PS_AUX_LAYOUT,
};
use crate::collectors::read_source;
use crate::collectors::sessions::{parse_w, LoginSession, W_COMMAND};
use crate::collectors::vmstat::{parse_meminfo, parse_vmstat, MemInfoEntry, MEMINFO_PATH, VMSTAT_PATH};
use crate::error::{or_default, ProbeError};
use crate::grains::{Grains, OsFamily};
use crate::host::Host;
use crate::platform::{platform_for, DataSource, Platform};
use crate::system::{LoadAverage, UPTIME_COMMAND};
use crate::value::NumericValue;

/// Evaluates one category and encodes it as JSON.
pub type CategoryFn = fn(&Status) -> Result<Value, ProbeError>;

/// Name to operation table used by `custom`.
pub static CATEGORIES: Lazy<HashMap<&'static str, CategoryFn>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, CategoryFn> = HashMap::new();
    table.insert("procs", |s| encode(s.procs()?));
    table.insert("loadavg", |s| encode(s.loadavg()?));
    table.insert("cpustats", |s| encode(s.cpustats()?));
    table.insert("diskstats", |s| encode(s.diskstats()?));
    table.insert("diskusage", |s| encode(s.diskusage::<&str>(&[])?));
    table.insert("vmstats", |s| encode(s.vmstats()?));
    table.insert("meminfo", |s| encode(s.meminfo()?));
    table.insert("netstats", |s| encode(s.netstats()?));
    table.insert("netdev", |s| encode(s.netdev()?));
    table.insert("uptime", |s| encode(s.uptime()?));
    table.insert("w", |s| encode(s.w()?));
    table
});

/// Category names accepted by `custom`, sorted.
pub fn category_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CATEGORIES.keys().copied().collect();
    names.sort_unstable();
    names
}

fn encode<T: Serialize>(value: T) -> Result<Value, ProbeError> {
    Ok(serde_json::to_value(value)?)
}

/// Per-call options threaded in by the hosting agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusOptions {
    /// Category name to the keys `custom` copies out of it.
    pub custom: BTreeMap<String, Vec<String>>,
}

/// Composite record produced by `Status::all_status`.
#[derive(Debug, Clone, Serialize)]
pub struct AllStatus {
    pub collected_at: DateTime<Utc>,
    pub os: OsFamily,
    pub cpustats: CpuStats,
    pub diskstats: BTreeMap<String, DiskDeviceRecord>,
    pub diskusage: BTreeMap<String, MountUsage>,
    pub loadavg: LoadAverage,
    pub meminfo: BTreeMap<String, MemInfoEntry>,
    pub netdev: BTreeMap<String, NetworkInterfaceRecord>,
    pub netstats: BTreeMap<String, ProtocolCounterBlock>,
    pub procs: BTreeMap<String, ProcessRecord>,
    pub uptime: String,
    pub vmstats: BTreeMap<String, NumericValue>,
    pub w: Vec<LoginSession>,
}

/// Availability of one data source on the probed host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCheck {
    pub source: DataSource,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Status probe bound to one host.
pub struct Status {
    host: Box<dyn Host>,
    grains: Grains,
    options: StatusOptions,
    platform: Box<dyn Platform>,
}

impl Status {
    pub fn new(host: Box<dyn Host>, grains: Grains, options: StatusOptions) -> Self {
        let platform = platform_for(grains.os);
        debug!("Status probe for {} using '{}'", grains.os, grains.ps);
        Self {
            host,
            grains,
            options,
            platform,
        }
    }

    pub fn grains(&self) -> &Grains {
        &self.grains
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    fn process_listing(&self) -> Result<String, ProbeError> {
        self.host.run_command(&self.grains.ps)
    }

    /// Process table keyed by PID.
    pub fn procs(&self) -> Result<BTreeMap<String, ProcessRecord>, ProbeError> {
        or_default(self.process_listing().map(|out| parse_process_listing(&out)))
    }

    pub fn loadavg(&self) -> Result<LoadAverage, ProbeError> {
        or_default(self.platform.loadavg(self.host()))
    }

    /// CPU times, boot time, interrupts and process counts.
    pub fn cpustats(&self) -> Result<CpuStats, ProbeError> {
        let kernel = match self.platform.kernel_cpu(self.host()) {
            Err(ProbeError::Unavailable(what)) => {
                debug!("{} not available, CPU times left empty", what);
                Default::default()
            }
            other => other?,
        };
        let listing = or_default(self.process_listing())?;

        Ok(CpuStats {
            btime: kernel.btime,
            cpu: kernel.cpu,
            intr: kernel.intr,
            counts: count_processes(&listing, &PS_AUX_LAYOUT),
        })
    }

    pub fn diskstats(&self) -> Result<BTreeMap<String, DiskDeviceRecord>, ProbeError> {
        or_default(read_source(self.host(), DISKSTATS_PATH).map(|c| parse_diskstats(&c)))
    }

    /// Usage of the mounts selected by `filters` (paths or fstype globs).
    /// No filters selects every mount.
    pub fn diskusage<S: AsRef<str>>(
        &self,
        filters: &[S],
    ) -> Result<BTreeMap<String, MountUsage>, ProbeError> {
        let selection = MountSelection::from_args(filters);
        let mounts = self.mount_table()?;
        let selected = selection.resolve(&mounts);
        Ok(query_usage(self.host(), &selected))
    }

    fn mount_table(&self) -> Result<Vec<MountEntry>, ProbeError> {
        if let Some(content) = self.host.read_pseudo_file(Path::new(MOUNTS_PATH))? {
            return Ok(parse_mount_table(&content));
        }
        match self.platform.mount_table_fallback() {
            Some(command) => {
                or_default(self.host.run_command(command)).map(|out| parse_mount_table(&out))
            }
            None => {
                debug!("No mount table on this host");
                Ok(Vec::new())
            }
        }
    }

    pub fn vmstats(&self) -> Result<BTreeMap<String, NumericValue>, ProbeError> {
        or_default(read_source(self.host(), VMSTAT_PATH).map(|c| parse_vmstat(&c)))
    }

    pub fn meminfo(&self) -> Result<BTreeMap<String, MemInfoEntry>, ProbeError> {
        or_default(read_source(self.host(), MEMINFO_PATH).map(|c| parse_meminfo(&c)))
    }

    pub fn netstats(&self) -> Result<BTreeMap<String, ProtocolCounterBlock>, ProbeError> {
        or_default(read_source(self.host(), NETSTAT_PATH).map(|c| parse_protocol_blocks(&c)))
    }

    pub fn netdev(&self) -> Result<BTreeMap<String, NetworkInterfaceRecord>, ProbeError> {
        or_default(read_source(self.host(), NETDEV_PATH).map(|c| parse_netdev(&c)))
    }

    pub fn uptime(&self) -> Result<String, ProbeError> {
        or_default(
            self.host
                .run_command(UPTIME_COMMAND)
                .map(|out| out.trim().to_string()),
        )
    }

    pub fn w(&self) -> Result<Vec<LoginSession>, ProbeError> {
        or_default(self.host.run_command(W_COMMAND).map(|out| parse_w(&out)))
    }

    /// PIDs of processes whose listing row contains `signature`.
    pub fn pid(&self, signature: &str) -> Result<Vec<u32>, ProbeError> {
        or_default(self.process_listing().map(|out| find_pids(&out, signature)))
    }

    /// Every source the categories read on this OS family.
    pub fn data_sources(&self) -> Vec<DataSource> {
        let mut sources = vec![
            DataSource::Command(self.grains.ps.clone()),
            DataSource::Command(UPTIME_COMMAND.to_string()),
            DataSource::Command(W_COMMAND.to_string()),
        ];
        sources.extend(self.platform.sources());
        sources.extend(
            [
                DISKSTATS_PATH,
                MOUNTS_PATH,
                VMSTAT_PATH,
                MEMINFO_PATH,
                NETSTAT_PATH,
                NETDEV_PATH,
            ]
            .iter()
            .map(|path| DataSource::PseudoFile(path.to_string())),
        );
        sources
    }

    /// Probes every data source. Missing pseudo-files are expected on
    /// FreeBSD and only mean the matching category stays empty.
    pub fn check_sources(&self) -> Vec<SourceCheck> {
        self.data_sources()
            .into_iter()
            .map(|source| match source.probe(self.host()) {
                Ok(()) => SourceCheck {
                    source,
                    available: true,
                    detail: None,
                },
                Err(e) => {
                    debug!("{} not readable: {}", source, e);
                    SourceCheck {
                        source,
                        available: false,
                        detail: Some(e.to_string()),
                    }
                }
            })
            .collect()
    }

    /// Every category except `pid` and `custom`.
    pub fn all_status(&self) -> AllStatus {
        AllStatus {
            collected_at: Utc::now(),
            os: self.grains.os,
            cpustats: best_effort("cpustats", self.cpustats()),
            diskstats: best_effort("diskstats", self.diskstats()),
            diskusage: best_effort("diskusage", self.diskusage::<&str>(&[])),
            loadavg: best_effort("loadavg", self.loadavg()),
            meminfo: best_effort("meminfo", self.meminfo()),
            netdev: best_effort("netdev", self.netdev()),
            netstats: best_effort("netstats", self.netstats()),
            procs: best_effort("procs", self.procs()),
            uptime: best_effort("uptime", self.uptime()),
            vmstats: best_effort("vmstats", self.vmstats()),
            w: best_effort("w", self.w()),
        }
    }

    /// Evaluates one category by name.
    pub fn category(&self, name: &str) -> Result<Value, ProbeError> {
        let op = CATEGORIES
            .get(name)
            .ok_or_else(|| ProbeError::UnknownCategory(name.to_string()))?;
        op(self)
    }

    /// Keys picked from the categories configured in `StatusOptions::custom`.
    pub fn custom(&self) -> Result<BTreeMap<String, Value>, ProbeError> {
        let mut ret = BTreeMap::new();

        for (category, keys) in &self.options.custom {
            let value = self.category(category)?;
            for key in keys {
                match value.get(key) {
                    Some(v) => {
                        ret.insert(key.clone(), v.clone());
                    }
                    None => warn!("Key '{}' not present in {} status", key, category),
                }
            }
        }

        Ok(ret)
    }
}

fn best_effort<T: Default>(category: &str, result: Result<T, ProbeError>) -> T {
    result.unwrap_or_else(|e| {
        warn!("Failed to collect {}: {}", category, e);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FsStats;
    use crate::mock::MockHost;

    fn freebsd_status() -> Status {
        Status::new(
            Box::new(MockHost::freebsd_system()),
            Grains::new(OsFamily::FreeBsd),
            StatusOptions::default(),
        )
    }

    #[test]
    fn test_cpustats_freebsd() {
        let stats = freebsd_status().cpustats().unwrap();
        assert_eq!(stats.counts.processes, 4);
        assert_eq!(stats.counts.procs_running, 1);
        assert_eq!(stats.counts.procs_blocked, 1);
        assert_eq!(stats.btime, Some(1700000000));
        assert_eq!(stats.cpu.cores.len(), 2);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["cpu"]["user"], 1000);
        assert_eq!(json["cpu1"]["user"], 400);
        assert_eq!(json["processes"], 4);
    }

    #[test]
    fn test_pseudo_file_categories_empty_on_freebsd() {
        let status = freebsd_status();
        assert!(status.diskstats().unwrap().is_empty());
        assert!(status.vmstats().unwrap().is_empty());
        assert!(status.meminfo().unwrap().is_empty());
        assert!(status.netstats().unwrap().is_empty());
        assert!(status.netdev().unwrap().is_empty());
    }

    #[test]
    fn test_diskusage_uses_mount_fallback() {
        let usage = freebsd_status().diskusage::<&str>(&[]).unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage["/"].available, 4096 * 1000);
        assert_eq!(usage["/"].total, 4096 * 5000);
    }

    #[test]
    fn test_diskusage_fstype_filter() {
        let mut host = MockHost::new();
        host.add_file(
            MOUNTS_PATH,
            "/dev/sda1 / ext4 rw 0 0\n/dev/sdb1 /data xfs rw 0 0\nproc /proc proc rw 0 0\n",
        )
        .add_filesystem(
            "/",
            FsStats {
                block_size: 1024,
                available_blocks: 10,
                total_blocks: 20,
            },
        )
        .add_filesystem(
            "/data",
            FsStats {
                block_size: 4096,
                available_blocks: 1,
                total_blocks: 2,
            },
        );
        let status = Status::new(
            Box::new(host),
            Grains::new(OsFamily::Linux),
            StatusOptions::default(),
        );

        let usage = status.diskusage(&["ext?"]).unwrap();
        assert_eq!(usage.keys().collect::<Vec<_>>(), vec!["/"]);

        let usage = status.diskusage(&["/data"]).unwrap();
        assert_eq!(usage["/data"].total, 8192);
    }

    #[test]
    fn test_uptime_and_sessions() {
        let status = freebsd_status();
        assert_eq!(
            status.uptime().unwrap(),
            "10:42AM  up 3 days, 2 users, load averages: 0.52, 0.58, 0.59"
        );
        let sessions = status.w().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].user, "bob");
    }

    #[test]
    fn test_pid_lookup() {
        let status = freebsd_status();
        assert_eq!(status.pid("nginx").unwrap(), vec![777]);
        assert!(status.pid("postgres").unwrap().is_empty());
    }

    #[test]
    fn test_all_status_is_best_effort() {
        let all = freebsd_status().all_status();
        assert_eq!(all.os, OsFamily::FreeBsd);
        assert_eq!(all.loadavg.one_min, NumericValue::Float(0.52));
        assert_eq!(all.procs.len(), 5);
        assert!(all.netdev.is_empty());

        let json = serde_json::to_value(&all).unwrap();
        assert_eq!(json["os"], "FreeBSD");
        assert!(json["collected_at"].is_string());
    }

    #[test]
    fn test_all_status_on_empty_host() {
        let status = Status::new(
            Box::new(MockHost::new()),
            Grains::new(OsFamily::Linux),
            StatusOptions::default(),
        );
        let all = status.all_status();
        assert!(all.procs.is_empty());
        assert_eq!(all.uptime, "");
        assert_eq!(all.cpustats.counts.processes, 0);
    }

    #[test]
    fn test_custom_picks_configured_keys() {
        let mut options = StatusOptions::default();
        options.custom.insert(
            "cpustats".to_string(),
            vec!["btime".to_string(), "processes".to_string(), "ctxt".to_string()],
        );
        options
            .custom
            .insert("loadavg".to_string(), vec!["1-min".to_string()]);

        let status = Status::new(
            Box::new(MockHost::freebsd_system()),
            Grains::new(OsFamily::FreeBsd),
            options,
        );
        let ret = status.custom().unwrap();
        assert_eq!(ret.len(), 3);
        assert_eq!(ret["btime"], 1700000000);
        assert_eq!(ret["processes"], 4);
        assert_eq!(ret["1-min"], 0.52);
    }

    #[test]
    fn test_custom_unknown_category() {
        let mut options = StatusOptions::default();
        options.custom.insert("eval".to_string(), vec![]);
        let status = Status::new(
            Box::new(MockHost::new()),
            Grains::new(OsFamily::Linux),
            options,
        );
        assert!(matches!(
            status.custom(),
            Err(ProbeError::UnknownCategory(name)) if name == "eval"
        ));
    }

    #[test]
    fn test_check_sources_freebsd() {
        let checks = freebsd_status().check_sources();
        assert_eq!(checks.len(), 15);

        let available: Vec<&SourceCheck> = checks.iter().filter(|c| c.available).collect();
        assert_eq!(available.len(), 9);
        assert!(checks
            .iter()
            .filter(|c| matches!(c.source, DataSource::PseudoFile(_)))
            .all(|c| !c.available && c.detail.is_some()));
    }

    #[test]
    fn test_category_names_sorted() {
        let names = category_names();
        assert_eq!(names.len(), 11);
        assert_eq!(names.first(), Some(&"cpustats"));
        assert!(!names.contains(&"pid"));
        assert!(!names.contains(&"custom"));
    }
}
