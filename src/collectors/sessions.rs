//! Logged-in user sessions from `w -h`.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const W_COMMAND: &str = "w -h";

/// One active login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    pub user: String,
    pub tty: String,
    pub login: String,
    pub idle: String,
    pub jcpu: String,
    pub pcpu: String,
    pub what: String,
}

/// Parses `w -h` rows: user tty login idle jcpu pcpu what...
pub fn parse_w(content: &str) -> Vec<LoginSession> {
    content
        .lines()
        .filter(|row| !row.trim().is_empty())
        .filter_map(|row| {
            let comps: Vec<&str> = row.split_whitespace().collect();
            if comps.len() < 6 {
                debug!("Skipping short w row: {}", row);
                return None;
            }
            Some(LoginSession {
                user: comps[0].to_string(),
                tty: comps[1].to_string(),
                login: comps[2].to_string(),
                idle: comps[3].to_string(),
                jcpu: comps[4].to_string(),
                pcpu: comps[5].to_string(),
                what: comps[6..].join(" "),
            })
        })
        .collect()
}
