//! Storage layer for splitpot
//!
//! Provides JSON file storage with atomic writes, a write gate for
//! read-modify-write sequences, and the audit log. The gate and the
//! settlement claim are backed by lock files in the data directory, so they
//! hold across separate `splitpot` processes.

pub mod categories;
pub mod file_io;
pub mod init;
pub mod lock;
pub mod members;
pub mod periods;
pub mod transactions;

pub use categories::CategoryRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::{initialize_storage, needs_initialization};
pub use lock::LockFile;
pub use members::MemberRepository;
pub use periods::PeriodRepository;
pub use transactions::TransactionRepository;

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::SplitpotPaths;
use crate::error::{SplitpotError, SplitpotResult};
use crate::models::PeriodId;

pub(crate) fn read_guard<T>(lock: &RwLock<T>) -> SplitpotResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| SplitpotError::Storage(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_guard<T>(lock: &RwLock<T>) -> SplitpotResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| SplitpotError::Storage(format!("Failed to acquire write lock: {}", e)))
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: SplitpotPaths,
    pub members: MemberRepository,
    pub categories: CategoryRepository,
    pub periods: PeriodRepository,
    pub transactions: TransactionRepository,
    audit: AuditLogger,
    write_gate: Mutex<()>,
}

/// How long a writer waits for another process to finish
const WRITE_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Holds the write gate until dropped
pub struct WriteGuard<'a> {
    // Fields drop in order: the file is released before the thread gate
    _file: LockFile,
    _local: MutexGuard<'a, ()>,
}

/// Marks a period as being settled until dropped
pub struct SettlementGuard {
    _marker: LockFile,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: SplitpotPaths) -> Result<Self, SplitpotError> {
        paths.ensure_directories()?;

        Ok(Self {
            members: MemberRepository::new(paths.members_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            periods: PeriodRepository::new(paths.periods_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            audit: AuditLogger::new(paths.audit_log()),
            write_gate: Mutex::new(()),
            paths,
        })
    }

    pub fn paths(&self) -> &SplitpotPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), SplitpotError> {
        self.members.load()?;
        self.categories.load()?;
        self.periods.load()?;
        self.transactions.load()?;
        Ok(())
    }

    /// Serialize a read-modify-write sequence against other writers
    ///
    /// Threads of this process queue on a mutex; other processes are kept out
    /// by the data directory's write lock file.
    pub fn begin_write(&self) -> SplitpotResult<WriteGuard<'_>> {
        let local = self
            .write_gate
            .lock()
            .map_err(|e| SplitpotError::Storage(format!("Failed to acquire write gate: {}", e)))?;
        let file = LockFile::acquire(self.paths.write_lock_file(), WRITE_LOCK_TIMEOUT)?;

        Ok(WriteGuard {
            _file: file,
            _local: local,
        })
    }

    /// Claim a period for settlement; fails if it is already being settled,
    /// in this process or any other
    pub fn begin_settlement(&self, period_id: PeriodId) -> SplitpotResult<SettlementGuard> {
        match LockFile::try_acquire(self.paths.settlement_marker(period_id))? {
            Some(marker) => Ok(SettlementGuard { _marker: marker }),
            None => Err(SplitpotError::ConcurrentSettlementConflict(
                period_id.to_string(),
            )),
        }
    }

    /// Record a create in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> SplitpotResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update in the audit log
    ///
    /// Without an explicit summary the diff is computed from the snapshots.
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> SplitpotResult<()> {
        let diff_summary = diff_summary.or_else(|| {
            match (serde_json::to_value(before), serde_json::to_value(after)) {
                (Ok(b), Ok(a)) => generate_diff(&b, &a),
                _ => None,
            }
        });

        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary,
        ))
    }

    /// Record a delete in the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> SplitpotResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}
