//! User settings for splitpot
//!
//! Manages display preferences, the naming of new periods, and which
//! transactions count toward balances.

use serde::{Deserialize, Serialize};

use super::paths::SplitpotPaths;
use crate::error::SplitpotError;
use crate::models::BalanceInclusion;
use crate::storage::write_json_atomic;

/// User settings for splitpot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Display name of the group sharing expenses
    #[serde(default = "default_group_name")]
    pub group_name: String,

    /// Currency symbol used when formatting amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// strftime format for naming new periods
    #[serde(default = "default_period_name_format")]
    pub period_name_format: String,

    /// Which transaction statuses count toward balances
    #[serde(default)]
    pub balance_inclusion: BalanceInclusion,
}

fn default_schema_version() -> u32 {
    1
}

fn default_group_name() -> String {
    "Household".to_string()
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_period_name_format() -> String {
    "%B %Y".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            group_name: default_group_name(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            period_name_format: default_period_name_format(),
            balance_inclusion: BalanceInclusion::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &SplitpotPaths) -> Result<Self, SplitpotError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                SplitpotError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                SplitpotError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SplitpotPaths) -> Result<(), SplitpotError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.period_name_format, "%B %Y");
        assert_eq!(settings.balance_inclusion, BalanceInclusion::ApprovedOnly);
        assert_eq!(settings.currency_symbol, "$");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitpotPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.group_name = "Flat 4B".into();
        settings.balance_inclusion = BalanceInclusion::NonDraft;

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.group_name, "Flat 4B");
        assert_eq!(loaded.balance_inclusion, BalanceInclusion::NonDraft);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"currency_symbol": "€"}"#).unwrap();
        assert_eq!(settings.currency_symbol, "€");
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.period_name_format, "%B %Y");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitpotPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "not json").unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, SplitpotError::Config(_)));
    }
}
