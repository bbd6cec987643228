//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json, with
//! in-memory indexes by period and by category.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SplitpotError;
use crate::models::{CategoryId, PeriodId, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_guard, write_guard};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// In-memory state guarded by a single lock so that a period snapshot is
/// always consistent with its index
#[derive(Default)]
struct Indexed {
    data: HashMap<TransactionId, Transaction>,
    by_period: HashMap<PeriodId, Vec<TransactionId>>,
    by_category: HashMap<CategoryId, Vec<TransactionId>>,
}

impl Indexed {
    fn insert(&mut self, txn: Transaction) {
        self.remove(txn.id);
        self.by_period.entry(txn.period_id).or_default().push(txn.id);
        if let Some(category_id) = txn.category_id {
            self.by_category.entry(category_id).or_default().push(txn.id);
        }
        self.data.insert(txn.id, txn);
    }

    fn remove(&mut self, id: TransactionId) -> Option<Transaction> {
        let old = self.data.remove(&id)?;
        if let Some(ids) = self.by_period.get_mut(&old.period_id) {
            ids.retain(|&other| other != id);
        }
        if let Some(ids) = old.category_id.and_then(|c| self.by_category.get_mut(&c)) {
            ids.retain(|&other| other != id);
        }
        Some(old)
    }

    fn collect<'a>(&self, ids: impl IntoIterator<Item = &'a TransactionId>) -> Vec<Transaction> {
        let mut list: Vec<_> = ids
            .into_iter()
            .filter_map(|id| self.data.get(id).cloned())
            .collect();
        sort_chronological(&mut list);
        list
    }
}

fn sort_chronological(list: &mut [Transaction]) {
    list.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
    });
}

/// Repository for transaction persistence with indexing
pub struct TransactionRepository {
    path: PathBuf,
    state: RwLock<Indexed>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: RwLock::new(Indexed::default()),
        }
    }

    /// Load transactions from disk and build indexes
    pub fn load(&self) -> Result<(), SplitpotError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut state = write_guard(&self.state)?;
        *state = Indexed::default();
        for txn in file_data.transactions {
            state.insert(txn);
        }

        Ok(())
    }

    /// Merge the file's current records over the in-memory ones
    pub fn refresh(&self) -> Result<(), SplitpotError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut state = write_guard(&self.state)?;
        for txn in file_data.transactions {
            state.insert(txn);
        }

        Ok(())
    }

    /// Save transactions to disk, oldest first
    pub fn save(&self) -> Result<(), SplitpotError> {
        let transactions = self.get_all()?;
        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, SplitpotError> {
        Ok(read_guard(&self.state)?.data.get(&id).cloned())
    }

    /// All transactions, oldest first
    pub fn get_all(&self) -> Result<Vec<Transaction>, SplitpotError> {
        let state = read_guard(&self.state)?;
        Ok(state.collect(state.data.keys()))
    }

    /// Snapshot of a period's transactions, oldest first
    pub fn get_by_period(&self, period_id: PeriodId) -> Result<Vec<Transaction>, SplitpotError> {
        let state = read_guard(&self.state)?;
        Ok(state.by_period.get(&period_id).map_or_else(Vec::new, |ids| state.collect(ids)))
    }

    pub fn get_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Transaction>, SplitpotError> {
        let state = read_guard(&self.state)?;
        Ok(state
            .by_category
            .get(&category_id)
            .map_or_else(Vec::new, |ids| state.collect(ids)))
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), SplitpotError> {
        write_guard(&self.state)?.insert(txn);
        Ok(())
    }

    /// Remove a transaction, returning it if it existed
    pub fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, SplitpotError> {
        Ok(write_guard(&self.state)?.remove(id))
    }

    pub fn count(&self) -> Result<usize, SplitpotError> {
        Ok(read_guard(&self.state)?.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberId, Money, Party, TransactionKind};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        (temp_dir, repo)
    }

    fn deposit(period_id: PeriodId, cents: i64) -> Transaction {
        Transaction::new(
            period_id,
            TransactionKind::Deposit,
            Money::from_cents(cents),
            Party::Member(MemberId::new(1)),
        )
    }

    #[test]
    fn test_period_index() {
        let (_temp_dir, repo) = create_test_repo();
        let current = PeriodId::new();
        let previous = PeriodId::new();

        repo.upsert(deposit(current, 100)).unwrap();
        repo.upsert(deposit(current, 200)).unwrap();
        repo.upsert(deposit(previous, 300)).unwrap();

        assert_eq!(repo.get_by_period(current).unwrap().len(), 2);
        assert_eq!(repo.get_by_period(previous).unwrap().len(), 1);
        assert!(repo.get_by_period(PeriodId::new()).unwrap().is_empty());
    }

    #[test]
    fn test_category_index_follows_updates() {
        let (_temp_dir, repo) = create_test_repo();
        let period = PeriodId::new();
        let rent = CategoryId::new();
        let utilities = CategoryId::new();

        let mut txn = Transaction::new(
            period,
            TransactionKind::Expense,
            Money::from_cents(900),
            Party::Member(MemberId::new(1)),
        );
        txn.category_id = Some(rent);
        repo.upsert(txn.clone()).unwrap();
        assert_eq!(repo.get_by_category(rent).unwrap().len(), 1);

        txn.category_id = Some(utilities);
        repo.upsert(txn).unwrap();
        assert!(repo.get_by_category(rent).unwrap().is_empty());
        assert_eq!(repo.get_by_category(utilities).unwrap().len(), 1);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_clears_indexes() {
        let (_temp_dir, repo) = create_test_repo();
        let period = PeriodId::new();
        let txn = deposit(period, 100);
        let id = txn.id;
        repo.upsert(txn).unwrap();

        assert!(repo.delete(id).unwrap().is_some());
        assert!(repo.delete(id).unwrap().is_none());
        assert!(repo.get_by_period(period).unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let period = PeriodId::new();
        let txn = deposit(period, 2500);
        let id = txn.id;
        repo.upsert(txn).unwrap();
        repo.save().unwrap();

        let reloaded = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        reloaded.load().unwrap();

        let loaded = reloaded.get(id).unwrap().unwrap();
        assert_eq!(loaded.amount.cents(), 2500);
        assert_eq!(reloaded.get_by_period(period).unwrap().len(), 1);
    }
}
