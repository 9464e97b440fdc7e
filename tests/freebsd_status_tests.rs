//! Integration tests for `Status` on a FreeBSD host.
//!
//! FreeBSD has no /proc, so these cover the sysctl and command backed
//! sources and the categories that must come back empty.

use herakles_hoststat::host::FsStats;
use herakles_hoststat::{
    Grains, MockHost, NumericValue, OsFamily, ProbeError, RealHost, Status, StatusOptions,
};

fn freebsd_status(host: MockHost) -> Status {
    Status::new(
        Box::new(host),
        Grains::new(OsFamily::FreeBsd),
        StatusOptions::default(),
    )
}

#[test]
fn test_freebsd_snapshot() {
    let all = freebsd_status(MockHost::freebsd_system()).all_status();

    assert_eq!(all.os, OsFamily::FreeBsd);
    assert_eq!(all.loadavg.five_min, NumericValue::Float(0.58));
    assert_eq!(all.cpustats.counts.processes, 4);
    assert_eq!(all.cpustats.intr.irqs[1], NumericValue::Integer(3));
    assert_eq!(all.w.len(), 2);
    assert_eq!(all.diskusage.len(), 1);

    assert!(all.diskstats.is_empty());
    assert!(all.vmstats.is_empty());
    assert!(all.netstats.is_empty());
    assert!(all.netdev.is_empty());
    assert!(all.meminfo.is_empty());
}

#[test]
fn test_freebsd_custom_ps_command() {
    let mut host = MockHost::freebsd_system();
    host.add_command(
        "ps -axo user,pid,stat,command",
        "USER PID STAT COMMAND\nroot 1 ILs /sbin/init --\nwww 777 R nginx: worker\n",
    );
    let grains = Grains::from_os_name("freebsd", Some("ps -axo user,pid,stat,command")).unwrap();
    let status = Status::new(Box::new(host), grains, StatusOptions::default());

    let procs = status.procs().unwrap();
    assert_eq!(procs.len(), 2);
    assert_eq!(procs["777"].cmd, "nginx: worker");
    assert_eq!(procs["777"].state.as_deref(), Some("R"));
    assert_eq!(status.pid("nginx").unwrap(), vec![777]);

    // Columns come from the custom header; no VSZ column means nothing is a kernel thread
    let counts = status.cpustats().unwrap().counts;
    assert_eq!(counts.processes, 2);
    assert_eq!(counts.procs_running, 1);
    assert_eq!(counts.procs_blocked, 0);
}

#[test]
fn test_freebsd_single_core_without_boottime() {
    let mut host = MockHost::new();
    host.add_sysctl("vm.loadavg", "{ 0.01 0.02 0.03 }")
        .add_sysctl("kern.cp_time", "10 0 5 1 100");
    let status = freebsd_status(host);

    let stats = status.cpustats().unwrap();
    assert!(stats.cpu.cores.is_empty());
    assert_eq!(stats.btime, None);
    assert_eq!(stats.counts.processes, 0);

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["cpu"]["idle"], 100);
    assert!(json.get("cpu0").is_none());
}

#[test]
fn test_freebsd_diskusage_zfs_glob() {
    let mut host = MockHost::new();
    host.add_command(
        "mount -p",
        "zroot/ROOT/default / zfs rw 0 0\ndevfs /dev devfs rw 0 0\nzroot/home /home zfs rw 0 0\n",
    )
    .add_filesystem(
        "/",
        FsStats {
            block_size: 131072,
            available_blocks: 100,
            total_blocks: 400,
        },
    )
    .add_filesystem(
        "/home",
        FsStats {
            block_size: 131072,
            available_blocks: 50,
            total_blocks: 400,
        },
    );
    let status = freebsd_status(host);

    let usage = status.diskusage(&["zfs"]).unwrap();
    assert_eq!(usage.len(), 2);
    assert_eq!(usage["/home"].available, 131072 * 50);

    assert!(status.diskusage(&["ufs"]).unwrap().is_empty());
}

#[test]
fn test_freebsd_empty_host_is_best_effort() {
    let status = freebsd_status(MockHost::new());

    // Loadavg has a sysctl failure, not a missing source
    assert!(matches!(status.loadavg(), Err(ProbeError::Sysctl { .. })));
    assert!(status.uptime().unwrap().is_empty());
    assert!(status.w().unwrap().is_empty());
    assert!(status.diskusage::<&str>(&[]).unwrap().is_empty());

    let all = status.all_status();
    assert_eq!(all.loadavg.one_min, NumericValue::Integer(0));
    assert!(all.procs.is_empty());
}

#[cfg(target_os = "linux")]
#[test]
fn test_real_host_linux_smoke() {
    let status = Status::new(
        Box::new(RealHost::new()),
        Grains::new(OsFamily::Linux),
        StatusOptions::default(),
    );

    let stats = status.cpustats().unwrap();
    assert!(stats.cpu.aggregate.is_some());
    assert!(stats.btime.is_some());
    assert!(status.loadavg().is_ok());
}
