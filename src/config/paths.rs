//! Path management for splitpot
//!
//! Provides XDG-compliant path resolution for configuration and data.
//!
//! ## Path Resolution Order
//!
//! 1. `SPLITPOT_DATA_DIR` environment variable (if set)
//! 2. `$XDG_CONFIG_HOME/splitpot` (if set)
//! 3. The platform config directory (`~/.config/splitpot`, `%APPDATA%\splitpot`, ...)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::SplitpotError;
use crate::models::PeriodId;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "SPLITPOT_DATA_DIR";

/// Manages all paths used by splitpot
#[derive(Debug, Clone)]
pub struct SplitpotPaths {
    /// Base directory for all splitpot data
    base_dir: PathBuf,
}

impl SplitpotPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home/config directory can be determined.
    pub fn new() -> Result<Self, SplitpotError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (<base>/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn members_file(&self) -> PathBuf {
        self.data_dir().join("members.json")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    pub fn periods_file(&self) -> PathBuf {
        self.data_dir().join("periods.json")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    /// Lock file held by whichever process is writing
    pub fn write_lock_file(&self) -> PathBuf {
        self.data_dir().join(".write.lock")
    }

    /// Marker present while a period is being settled
    pub fn settlement_marker(&self, period_id: PeriodId) -> PathBuf {
        self.data_dir().join(format!(".settling-{}", period_id.as_uuid()))
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), SplitpotError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SplitpotError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| SplitpotError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if splitpot has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
fn resolve_default_path() -> Result<PathBuf, SplitpotError> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join("splitpot"));
    }

    ProjectDirs::from("", "", "splitpot")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| SplitpotError::Config("Could not determine a config directory".into()))
}
