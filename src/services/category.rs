//! Category service
//!
//! Provides business logic for expense categories. A category that any
//! transaction still references cannot be deleted.

use crate::audit::EntityType;
use crate::error::{SplitpotError, SplitpotResult};
use crate::models::{Category, CategoryId};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new category
    pub fn create(&self, name: &str) -> SplitpotResult<Category> {
        let _gate = self.storage.begin_write()?;
        let name = name.trim();

        if self.storage.categories.get_by_name(name)?.is_some() {
            return Err(SplitpotError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        let category = Category::new(name);
        category
            .validate()
            .map_err(|e| SplitpotError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> SplitpotResult<Option<Category>> {
        self.storage.categories.get(id)
    }

    /// Find a category by name or ID string
    pub fn find(&self, identifier: &str) -> SplitpotResult<Option<Category>> {
        if let Some(category) = self.storage.categories.get_by_name(identifier)? {
            return Ok(Some(category));
        }

        if let Ok(id) = identifier.parse::<CategoryId>() {
            return self.storage.categories.get(id);
        }

        // Short display form, e.g. "cat-1a2b3c4d"
        let identifier = identifier.trim();
        Ok(self
            .storage
            .categories
            .get_all()?
            .into_iter()
            .find(|c| c.id.to_string() == identifier))
    }

    /// Find a category or fail with a not-found error
    pub fn require(&self, identifier: &str) -> SplitpotResult<Category> {
        self.find(identifier)?
            .ok_or_else(|| SplitpotError::category_not_found(identifier))
    }

    /// List all categories sorted by name
    pub fn list(&self) -> SplitpotResult<Vec<Category>> {
        self.storage.categories.get_all()
    }

    /// List categories with how many transactions reference each
    pub fn list_with_usage(&self) -> SplitpotResult<Vec<(Category, usize)>> {
        self.list()?
            .into_iter()
            .map(|category| {
                let used = self.storage.transactions.get_by_category(category.id)?.len();
                Ok((category, used))
            })
            .collect()
    }

    pub fn rename(&self, id: CategoryId, name: &str) -> SplitpotResult<Category> {
        let _gate = self.storage.begin_write()?;
        let name = name.trim();

        let mut category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| SplitpotError::category_not_found(id.to_string()))?;

        if let Some(existing) = self.storage.categories.get_by_name(name)? {
            if existing.id != id {
                return Err(SplitpotError::Duplicate {
                    entity_type: "Category",
                    identifier: name.to_string(),
                });
            }
        }

        let before = category.clone();
        category.rename(name);
        category
            .validate()
            .map_err(|e| SplitpotError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_update(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &before,
            &category,
            Some(format!("name: {} -> {}", before.name, category.name)),
        )?;

        Ok(category)
    }

    /// Delete a category that no transaction references
    pub fn delete(&self, id: CategoryId) -> SplitpotResult<Category> {
        let _gate = self.storage.begin_write()?;

        let category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| SplitpotError::category_not_found(id.to_string()))?;

        let references = self.storage.transactions.get_by_category(id)?.len();
        if references > 0 {
            return Err(SplitpotError::Validation(format!(
                "Category '{}' is used by {} transaction(s) and cannot be deleted",
                category.name, references
            )));
        }

        self.storage.categories.delete(id)?;
        self.storage.categories.save()?;

        self.storage.log_delete(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SplitpotPaths;
    use crate::models::{MemberId, Money, Party, PeriodId, Transaction, TransactionKind};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitpotPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_and_find() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let rent = service.create("Rent").unwrap();
        assert_eq!(service.find("rent").unwrap().unwrap().id, rent.id);
        assert_eq!(service.find(&rent.id.to_string()).unwrap().unwrap().id, rent.id);
        assert!(service.require("Travel").unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicate_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        service.create("Groceries").unwrap();

        assert!(matches!(
            service.create("groceries").unwrap_err(),
            SplitpotError::Duplicate { .. }
        ));
    }

    #[test]
    fn test_rename() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let category = service.create("Utilites").unwrap();

        let renamed = service.rename(category.id, "Utilities").unwrap();
        assert_eq!(renamed.name, "Utilities");
        assert_eq!(service.list().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_refused_while_referenced() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let rent = service.create("Rent").unwrap();
        let other = service.create("Other").unwrap();

        let mut txn = Transaction::new(
            PeriodId::new(),
            TransactionKind::Expense,
            Money::from_cents(1000),
            Party::Member(MemberId::new(1)),
        );
        txn.category_id = Some(rent.id);
        storage.transactions.upsert(txn).unwrap();

        assert!(service.delete(rent.id).unwrap_err().is_validation());

        let usage = service.list_with_usage().unwrap();
        assert_eq!(usage[0].0.name, "Other");
        assert_eq!(usage[0].1, 0);
        assert_eq!(usage[1].1, 1);

        service.delete(other.id).unwrap();
        assert!(service.get(other.id).unwrap().is_none());
    }
}
