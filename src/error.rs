//! Error types for the status probe.
//!
//! Only whole-source failures surface as errors. Row-level problems (short
//! lines, duplicate device names) are logged and skipped by the collectors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The tool or pseudo-file backing a category does not exist on this host.
    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    #[error("Command '{command}' failed: {message}")]
    Command { command: String, message: String },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sysctl {name} failed: {message}")]
    Sysctl { name: String, message: String },

    #[error("statvfs failed for {}: {message}", path.display())]
    Statvfs { path: PathBuf, message: String },

    #[error("Malformed {source_name}: {detail}")]
    Malformed {
        source_name: &'static str,
        detail: String,
    },

    #[error("Unsupported OS family '{0}'")]
    UnsupportedOs(String),

    #[error("Unknown status category '{0}'")]
    UnknownCategory(String),

    #[error("Failed to encode status: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ProbeError {
    pub fn malformed(source_name: &'static str, detail: impl Into<String>) -> Self {
        ProbeError::Malformed {
            source_name,
            detail: detail.into(),
        }
    }

    /// True for errors meaning "this host does not expose the data".
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ProbeError::Unavailable(_))
    }
}

/// Converts an unavailable data source into the default (empty) result.
pub fn or_default<T: Default>(result: Result<T, ProbeError>) -> Result<T, ProbeError> {
    match result {
        Err(ProbeError::Unavailable(what)) => {
            tracing::debug!("{} not available on this host, returning empty result", what);
            Ok(T::default())
        }
        other => other,
    }
}
