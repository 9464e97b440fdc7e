//! Collaborator capabilities the collectors read raw text through.
//!
//! The `Host` trait lets the collectors run against the live system
//! (`RealHost`) or against canned outputs (`MockHost`) in tests.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::error::ProbeError;

/// Filesystem statistics for one mount point, in blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    pub block_size: u64,
    pub available_blocks: u64,
    pub total_blocks: u64,
}

/// Capabilities supplied by the hosting agent.
pub trait Host: Send + Sync {
    /// Runs a shell command line and returns its standard output.
    ///
    /// A missing binary must be reported as `ProbeError::Unavailable`.
    fn run_command(&self, command_line: &str) -> Result<String, ProbeError>;

    /// Reads a pseudo-file. `Ok(None)` means the file does not exist on this host.
    fn read_pseudo_file(&self, path: &Path) -> Result<Option<String>, ProbeError>;

    /// Returns block size and block counts for the filesystem holding `path`.
    fn filesystem_stats(&self, path: &Path) -> Result<FsStats, ProbeError>;

    /// Looks up a kernel tunable or counter by dotted name.
    fn sysctl(&self, name: &str) -> Result<String, ProbeError>;
}

/// Exit status `sh` uses when the command itself was not found.
const SHELL_COMMAND_NOT_FOUND: i32 = 127;

/// Host implementation backed by the running system.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealHost;

impl RealHost {
    pub fn new() -> Self {
        Self
    }
}

impl Host for RealHost {
    fn run_command(&self, command_line: &str) -> Result<String, ProbeError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ProbeError::Unavailable("sh".to_string()),
                _ => ProbeError::Command {
                    command: command_line.to_string(),
                    message: e.to_string(),
                },
            })?;

        if output.status.code() == Some(SHELL_COMMAND_NOT_FOUND) {
            return Err(ProbeError::Unavailable(command_line.to_string()));
        }
        if !output.status.success() {
            // Keep whatever the tool printed, the parsers cope with partial output
            debug!(
                "Command '{}' exited with {}: {}",
                command_line,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn read_pseudo_file(&self, path: &Path) -> Result<Option<String>, ProbeError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProbeError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn filesystem_stats(&self, path: &Path) -> Result<FsStats, ProbeError> {
        get_statvfs_stats(path)
    }

    fn sysctl(&self, name: &str) -> Result<String, ProbeError> {
        let binary = which::which("sysctl")
            .map_err(|_| ProbeError::Unavailable(format!("sysctl {}", name)))?;

        let output = Command::new(&binary)
            .arg("-n")
            .arg(name)
            .output()
            .map_err(|e| ProbeError::Sysctl {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ProbeError::Sysctl {
                name: name.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Gets filesystem block counts using libc statvfs.
fn get_statvfs_stats(path: &Path) -> Result<FsStats, ProbeError> {
    use std::ffi::CString;
    use std::mem;
    use std::os::unix::ffi::OsStrExt;

    let statvfs_error = |message: String| ProbeError::Statvfs {
        path: PathBuf::from(path),
        message,
    };

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| statvfs_error(format!("Invalid path: {}", e)))?;

    // SAFETY: c_path is a valid NUL-terminated string and stat is a plain C
    // struct that statvfs fully initialises on success.
    let stat = unsafe {
        let mut stat: libc::statvfs = mem::zeroed();
        if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
            return Err(statvfs_error(io::Error::last_os_error().to_string()));
        }
        stat
    };

    // f_blocks and f_bavail are counted in fragment-size units
    let block_size = if stat.f_frsize > 0 {
        stat.f_frsize as u64
    } else {
        stat.f_bsize as u64
    };

    Ok(FsStats {
        block_size,
        available_blocks: stat.f_bavail as u64,
        total_blocks: stat.f_blocks as u64,
    })
}
