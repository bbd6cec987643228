//! Storage initialization
//!
//! Handles first-run setup: default categories and the first open period.

use chrono::Utc;

use crate::config::paths::SplitpotPaths;
use crate::config::settings::Settings;
use crate::error::SplitpotError;
use crate::models::{period_name, Category, Period, DEFAULT_CATEGORIES};

use super::categories::CategoryData;
use super::file_io::write_json_atomic;
use super::periods::PeriodData;

/// Initialize storage for a fresh ledger
///
/// Existing files are left alone, so running this twice is harmless.
pub fn initialize_storage(paths: &SplitpotPaths, settings: &Settings) -> Result<(), SplitpotError> {
    paths.ensure_directories()?;

    if !paths.categories_file().exists() {
        let categories = DEFAULT_CATEGORIES.iter().map(|name| Category::new(*name)).collect();
        write_json_atomic(paths.categories_file(), &CategoryData { categories })?;
    }

    if !paths.periods_file().exists() {
        let first = Period::open(period_name(&settings.period_name_format, Utc::now())?);
        write_json_atomic(paths.periods_file(), &PeriodData { periods: vec![first] })?;
    }

    Ok(())
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &SplitpotPaths) -> bool {
    !paths.categories_file().exists() || !paths.periods_file().exists()
}
