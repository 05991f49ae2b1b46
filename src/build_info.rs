//! Build stamp
//!
//! `build.rs` stamps every compilation with a build number and a UTC time.
//! Builds made without the script (e.g. by an IDE's analyzer) carry no stamp.

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const STAMPED_NUMBER: Option<&str> = option_env!("MEALPLAN_BUILD_NUMBER");
const STAMPED_AT: Option<&str> = option_env!("MEALPLAN_BUILD_TIMESTAMP");

/// Version and build stamp of the running binary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_number: Option<u64>,
    pub compiled_at: Option<&'static str>,
}

impl BuildInfo {
    /// Stamp of this binary
    pub fn current() -> Self {
        Self::from_stamp(STAMPED_NUMBER, STAMPED_AT)
    }

    fn from_stamp(number: Option<&str>, compiled_at: Option<&'static str>) -> Self {
        Self {
            version: VERSION,
            build_number: number.and_then(|n| n.trim().parse().ok()),
            compiled_at: compiled_at.map(str::trim).filter(|t| !t.is_empty()),
        }
    }

    /// `0.1.0+build.12`, or just the version when unstamped
    pub fn label(&self) -> String {
        match self.build_number {
            Some(n) => format!("{}+build.{}", self.version, n),
            None => self.version.to_string(),
        }
    }

    /// Lines of the startup banner
    pub fn banner(&self) -> Vec<String> {
        vec![
            "Weekly Meal Planner".to_string(),
            format!("mealplan {}", self.label()),
            format!("compiled {}", self.compiled_at.unwrap_or("at an unknown time")),
        ]
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    let lines = BuildInfo::current().banner();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    let rule = "=".repeat(width);

    eprintln!("{}", rule);
    for line in &lines {
        eprintln!("  {}", line);
    }
    eprintln!("{}", rule);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamped_build() {
        let info = BuildInfo::from_stamp(Some("42"), Some("2024-06-03T09:30:00Z"));
        assert_eq!(info.build_number, Some(42));
        assert_eq!(info.label(), format!("{}+build.42", VERSION));
        assert_eq!(info.banner()[2], "compiled 2024-06-03T09:30:00Z");
    }

    #[test]
    fn test_unstamped_or_garbled_build() {
        let info = BuildInfo::from_stamp(Some("4x2"), Some("  "));
        assert_eq!(info.build_number, None);
        assert_eq!(info.compiled_at, None);
        assert_eq!(info.label(), VERSION);
        assert_eq!(info.banner()[2], "compiled at an unknown time");

        assert_eq!(BuildInfo::from_stamp(None, None), info);
    }

    #[test]
    fn test_current_carries_package_version() {
        assert_eq!(BuildInfo::current().version, env!("CARGO_PKG_VERSION"));
    }
}
