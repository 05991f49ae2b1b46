//! Runtime configuration
//!
//! Settings are read from the environment once at startup and passed
//! explicitly to the service and binaries.

use std::path::PathBuf;

/// Environment variable overriding the database location
pub const DATABASE_PATH_VAR: &str = "MEALPLAN_DATABASE_PATH";

/// Default tracing directive when `RUST_LOG` is not set
pub const DEFAULT_LOG_DIRECTIVE: &str = "mealplan=info";

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
}

impl Config {
    /// Build configuration from environment variables
    pub fn from_env() -> Self {
        let database_path = std::env::var(DATABASE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        Self { database_path }
    }

    /// Create the database's parent directory if needed
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// `<project>/data/mealplan.db`, resolved relative to the executable
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("mealplan.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_path_file_name() {
        let path = default_database_path();
        assert!(path.ends_with("data/mealplan.db"));
    }

    #[test]
    fn test_ensure_data_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: dir.path().join("nested").join("mealplan.db"),
        };
        config.ensure_data_dir().unwrap();
        assert!(dir.path().join("nested").is_dir());
    }
}
