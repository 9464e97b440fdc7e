//! Check command implementation.
//!
//! Reports which data sources are readable on this host and validates the
//! configuration.

use herakles_hoststat::platform::DataSource;
use herakles_hoststat::status::SourceCheck;
use herakles_hoststat::Status;

use crate::config::{validate_effective_config, Config};

/// Report line for one source and whether it counts as passing.
///
/// Missing pseudo-files only leave their category empty, so they pass.
fn describe_source(check: &SourceCheck) -> (String, bool) {
    let optional = matches!(check.source, DataSource::PseudoFile(_));
    match (check.available, optional) {
        (true, _) => (format!("✅ {}", check.source), true),
        (false, true) => (
            format!("⚠️  {} not present (category stays empty)", check.source),
            true,
        ),
        (false, false) => (
            format!(
                "❌ {}: {}",
                check.source,
                check.detail.as_deref().unwrap_or("unavailable")
            ),
            false,
        ),
    }
}

/// Probes every data source and validates the configuration.
///
/// Missing pseudo-files are reported as warnings, everything else the
/// platform needs is required.
pub fn command_check(status: &Status, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Herakles Host Status - System Check");
    println!("======================================");
    println!("\n🖥️  OS family: {}", status.grains().os);
    println!("   Process listing: {}", status.grains().ps);

    let mut all_ok = true;

    println!("\n📁 Checking data sources...");
    for check in status.check_sources() {
        let (line, ok) = describe_source(&check);
        println!("   {}", line);
        all_ok &= ok;
    }

    // Check configuration
    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => {
            println!("   ✅ Configuration is valid");
        }
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - host is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herakles_hoststat::{Grains, MockHost, OsFamily, StatusOptions};

    #[test]
    fn test_missing_pseudo_file_passes() {
        let check = SourceCheck {
            source: DataSource::PseudoFile("/proc/diskstats".to_string()),
            available: false,
            detail: Some("not found".to_string()),
        };
        let (line, ok) = describe_source(&check);
        assert!(ok);
        assert!(line.contains("not present"));
    }

    #[test]
    fn test_missing_sysctl_fails_with_detail() {
        let check = SourceCheck {
            source: DataSource::Sysctl("kern.cp_time".to_string()),
            available: false,
            detail: Some("unknown oid".to_string()),
        };
        let (line, ok) = describe_source(&check);
        assert!(!ok);
        assert!(line.contains("unknown oid"));
    }

    #[test]
    fn test_freebsd_fixture_sources_pass() {
        let status = Status::new(
            Box::new(MockHost::freebsd_system()),
            Grains::new(OsFamily::FreeBsd),
            StatusOptions::default(),
        );
        let failing: Vec<String> = status
            .check_sources()
            .iter()
            .map(describe_source)
            .filter(|(_, ok)| !ok)
            .map(|(line, _)| line)
            .collect();
        assert!(failing.is_empty(), "{:?}", failing);
    }
}
