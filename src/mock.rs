//! In-memory host for testing collectors without a live system.
//!
//! `MockHost` holds canned pseudo-file contents, command outputs, sysctl
//! values and filesystem statistics. Anything not registered behaves like a
//! missing data source.

use ahash::AHashMap as HashMap;
use std::path::{Path, PathBuf};

use crate::error::ProbeError;
use crate::host::{FsStats, Host};

#[derive(Debug, Clone, Default)]
pub struct MockHost {
    files: HashMap<PathBuf, String>,
    commands: HashMap<String, String>,
    sysctls: HashMap<String, String>,
    filesystems: HashMap<PathBuf, FsStats>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> &mut Self {
        self.files
            .insert(path.as_ref().to_path_buf(), content.into());
        self
    }

    pub fn add_command(
        &mut self,
        command_line: impl Into<String>,
        stdout: impl Into<String>,
    ) -> &mut Self {
        self.commands.insert(command_line.into(), stdout.into());
        self
    }

    pub fn add_sysctl(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.sysctls.insert(name.into(), value.into());
        self
    }

    pub fn add_filesystem(&mut self, path: impl AsRef<Path>, stats: FsStats) -> &mut Self {
        self.filesystems.insert(path.as_ref().to_path_buf(), stats);
        self
    }

    /// A FreeBSD host with every source the probe reads populated.
    pub fn freebsd_system() -> Self {
        let mut host = Self::new();
        host.add_sysctl("vm.loadavg", "{ 0,52 0,58 0,59 }")
            .add_sysctl("kern.cp_time", "1000 10 500 20 8000")
            .add_sysctl("kern.cp_times", "600 5 300 10 4000 400 5 200 10 4000")
            .add_sysctl(
                "kern.boottime",
                "{ sec = 1700000000, usec = 123456 } Tue Nov 14 22:13:20 2023",
            )
            .add_command(
                "vmstat -i",
                "interrupt                          total       rate\n\
                 irq1: atkbd0                           3          0\n\
                 irq4: uart0                          120          1\n\
                 cpu0:timer                       900000       1000\n\
                 Total                            900123       1001\n",
            )
            .add_command(
                "ps auxwww",
                "USER   PID %CPU %MEM   VSZ  RSS TT  STAT STARTED    TIME COMMAND\n\
                 root     0  0.0  0.0     0  256  -  DLs  10:00   0:01.00 [kernel]\n\
                 root     1  0.0  0.1 11604 1024  -  ILs  10:00   0:00.02 /sbin/init --\n\
                 root   512  0.0  0.2 12900 2300  -  Ss   10:00   0:00.10 /usr/sbin/syslogd -s\n\
                 www    777  1.5  0.9 45000 9000  -  R    10:01   0:03.00 nginx: worker process\n\
                 root   901  0.0  0.1  9000 1000  -  D    10:02   0:00.01 /sbin/fsck -p\n",
            )
            .add_command("uptime", "10:42AM  up 3 days, 2 users, load averages: 0.52, 0.58, 0.59\n")
            .add_command(
                "w -h",
                "alice    pts/0    10:00    0.00s  0.10s  0.01s -bash\n\
                 bob      pts/1    10:05    5:00   1.00s  0.50s vim notes.txt\n",
            )
            .add_command("mount -p", "/dev/ada0p2 / ufs rw 1 1\ndevfs /dev devfs rw 0 0\n")
            .add_filesystem(
                "/",
                FsStats {
                    block_size: 4096,
                    available_blocks: 1000,
                    total_blocks: 5000,
                },
            );
        host
    }
}

impl Host for MockHost {
    fn run_command(&self, command_line: &str) -> Result<String, ProbeError> {
        self.commands
            .get(command_line)
            .cloned()
            .ok_or_else(|| ProbeError::Unavailable(command_line.to_string()))
    }

    fn read_pseudo_file(&self, path: &Path) -> Result<Option<String>, ProbeError> {
        Ok(self.files.get(path).cloned())
    }

    fn filesystem_stats(&self, path: &Path) -> Result<FsStats, ProbeError> {
        self.filesystems
            .get(path)
            .copied()
            .ok_or_else(|| ProbeError::Statvfs {
                path: path.to_path_buf(),
                message: "No such file or directory".to_string(),
            })
    }

    fn sysctl(&self, name: &str) -> Result<String, ProbeError> {
        self.sysctls
            .get(name)
            .cloned()
            .ok_or_else(|| ProbeError::Sysctl {
                name: name.to_string(),
                message: "unknown oid".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_sources() {
        let host = MockHost::new();
        assert!(host.read_pseudo_file(Path::new("/proc/vmstat")).unwrap().is_none());
        assert!(host.run_command("uptime").unwrap_err().is_unavailable());
        assert!(host.sysctl("vm.loadavg").is_err());
        assert!(host.filesystem_stats(Path::new("/")).is_err());
    }

    #[test]
    fn test_registered_sources() {
        let mut host = MockHost::new();
        host.add_file("/proc/vmstat", "pgfault 10\n")
            .add_command("uptime", "up 1 day");
        assert_eq!(
            host.read_pseudo_file(Path::new("/proc/vmstat")).unwrap().as_deref(),
            Some("pgfault 10\n")
        );
        assert_eq!(host.run_command("uptime").unwrap(), "up 1 day");
    }
}
