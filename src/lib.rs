//! Herakles Host Status Library
//!
//! This library turns the raw text a host exposes (pseudo-files, command
//! output, sysctl values) into typed status records. Reading the host goes
//! through the `Host` trait so every category can be exercised against an
//! in-memory `MockHost`.
//!
//! # Features
//!
//! - **Typed parsers**: process tables, CPU times, interrupts, disk and network counters
//! - **Platform factory**: FreeBSD or Linux sources chosen once from the OS grain
//! - **Best-effort snapshots**: categories missing on a host come back empty
//! - **Custom selections**: pick individual keys out of any category by name
//!
//! # Usage
//!
//! ```rust
//! use herakles_hoststat::{Grains, MockHost, OsFamily, Status, StatusOptions};
//!
//! let status = Status::new(
//!     Box::new(MockHost::freebsd_system()),
//!     Grains::new(OsFamily::FreeBsd),
//!     StatusOptions::default(),
//! );
//!
//! let stats = status.cpustats().unwrap();
//! println!("{} processes, {} running", stats.counts.processes, stats.counts.procs_running);
//!
//! let snapshot = status.all_status();
//! println!("collected at {}", snapshot.collected_at);
//! ```

pub mod collectors;
pub mod error;
pub mod grains;
pub mod host;
pub mod mock;
pub mod platform;
pub mod status;
pub mod system;
pub mod value;

// Re-export main types for convenience
pub use error::ProbeError;
pub use grains::{Grains, OsFamily};
pub use host::{FsStats, Host, RealHost};
pub use mock::MockHost;
pub use status::{AllStatus, Status, StatusOptions};
pub use value::NumericValue;
