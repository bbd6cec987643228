//! Period repository for JSON storage
//!
//! Manages loading and saving periods to periods.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SplitpotError;
use crate::models::{Period, PeriodId, PeriodStatus};

use super::file_io::{read_json, write_json_atomic};
use super::{read_guard, write_guard};

/// Serializable period data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PeriodData {
    pub periods: Vec<Period>,
}

/// Repository for period persistence
pub struct PeriodRepository {
    path: PathBuf,
    data: RwLock<HashMap<PeriodId, Period>>,
}

impl PeriodRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load periods from disk
    pub fn load(&self) -> Result<(), SplitpotError> {
        let file_data: PeriodData = read_json(&self.path)?;

        let mut data = write_guard(&self.data)?;
        data.clear();
        data.extend(file_data.periods.into_iter().map(|p| (p.id, p)));

        Ok(())
    }

    /// Merge the file's current records over the in-memory ones
    pub fn refresh(&self) -> Result<(), SplitpotError> {
        let file_data: PeriodData = read_json(&self.path)?;

        let mut data = write_guard(&self.data)?;
        data.extend(file_data.periods.into_iter().map(|p| (p.id, p)));

        Ok(())
    }

    /// Save periods to disk
    pub fn save(&self) -> Result<(), SplitpotError> {
        let periods = self.get_all()?;
        write_json_atomic(&self.path, &PeriodData { periods })
    }

    pub fn get(&self, id: PeriodId) -> Result<Option<Period>, SplitpotError> {
        Ok(read_guard(&self.data)?.get(&id).cloned())
    }

    /// All periods, oldest first
    pub fn get_all(&self) -> Result<Vec<Period>, SplitpotError> {
        let data = read_guard(&self.data)?;
        let mut periods: Vec<_> = data.values().cloned().collect();
        periods.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.created_at.cmp(&b.created_at)));
        Ok(periods)
    }

    /// The open period, if any
    pub fn get_open(&self) -> Result<Option<Period>, SplitpotError> {
        let data = read_guard(&self.data)?;
        Ok(data
            .values()
            .find(|p| p.status == PeriodStatus::Open)
            .cloned())
    }

    /// Get a period by name (case-insensitive); the latest wins on repeats
    pub fn get_by_name(&self, name: &str) -> Result<Option<Period>, SplitpotError> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .get_all()?
            .into_iter()
            .rev()
            .find(|p| p.name.to_lowercase() == name_lower))
    }

    pub fn upsert(&self, period: Period) -> Result<(), SplitpotError> {
        write_guard(&self.data)?.insert(period.id, period);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, SplitpotError> {
        Ok(read_guard(&self.data)?.len())
    }
}
