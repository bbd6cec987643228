//! Category repository for JSON storage
//!
//! Manages loading and saving categories to categories.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SplitpotError;
use crate::models::{Category, CategoryId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_guard, write_guard};

/// Serializable category data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    pub categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    path: PathBuf,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl CategoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            categories: RwLock::new(HashMap::new()),
        }
    }

    /// Load categories from disk
    pub fn load(&self) -> Result<(), SplitpotError> {
        let file_data: CategoryData = read_json(&self.path)?;

        let mut categories = write_guard(&self.categories)?;
        categories.clear();
        for category in file_data.categories {
            categories.insert(category.id, category);
        }

        Ok(())
    }

    /// Save categories to disk
    pub fn save(&self) -> Result<(), SplitpotError> {
        let categories = self.get_all()?;
        write_json_atomic(&self.path, &CategoryData { categories })
    }

    pub fn get(&self, id: CategoryId) -> Result<Option<Category>, SplitpotError> {
        Ok(read_guard(&self.categories)?.get(&id).cloned())
    }

    /// All categories sorted by name
    pub fn get_all(&self) -> Result<Vec<Category>, SplitpotError> {
        let categories = read_guard(&self.categories)?;
        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(list)
    }

    /// Get a category by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Category>, SplitpotError> {
        let categories = read_guard(&self.categories)?;
        let name_lower = name.trim().to_lowercase();
        Ok(categories
            .values()
            .find(|c| c.name.to_lowercase() == name_lower)
            .cloned())
    }

    pub fn upsert(&self, category: Category) -> Result<(), SplitpotError> {
        write_guard(&self.categories)?.insert(category.id, category);
        Ok(())
    }

    /// Remove a category, returning whether it existed
    pub fn delete(&self, id: CategoryId) -> Result<bool, SplitpotError> {
        Ok(write_guard(&self.categories)?.remove(&id).is_some())
    }

    pub fn count(&self) -> Result<usize, SplitpotError> {
        Ok(read_guard(&self.categories)?.len())
    }
}
