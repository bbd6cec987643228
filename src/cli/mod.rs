//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

use clap::ValueEnum;

use crate::audit::EntityType;
use crate::error::{SplitpotError, SplitpotResult};
use crate::models::{Member, Money, Party, SplitKind, TransactionKind, TransactionStatus};
use crate::services::MemberService;
use crate::storage::Storage;

pub mod category;
pub mod ledger;
pub mod member;
pub mod period;
pub mod transaction;

pub use category::{handle_category_command, CategoryCommands};
pub use ledger::{handle_audit_command, handle_balance_command, handle_plan_command, handle_status_command};
pub use member::{handle_member_command, MemberCommands};
pub use period::{handle_period_command, PeriodCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

/// How an expense is divided
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitArg {
    /// Equal split; the payer is credited
    Individual,
    /// Paid by the public fund, shared equally
    Shared,
    /// Charged to the payer alone
    Personal,
}

impl From<SplitArg> for SplitKind {
    fn from(arg: SplitArg) -> Self {
        match arg {
            SplitArg::Individual => SplitKind::Individual,
            SplitArg::Shared => SplitKind::Shared,
            SplitArg::Personal => SplitKind::Personal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl From<StatusArg> for TransactionStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Draft => TransactionStatus::Draft,
            StatusArg::Pending => TransactionStatus::Pending,
            StatusArg::Approved => TransactionStatus::Approved,
            StatusArg::Rejected => TransactionStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Expense,
    Deposit,
    Refund,
}

impl From<KindArg> for TransactionKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Expense => TransactionKind::Expense,
            KindArg::Deposit => TransactionKind::Deposit,
            KindArg::Refund => TransactionKind::Refund,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityArg {
    Member,
    Category,
    Period,
    Transaction,
}

impl From<EntityArg> for EntityType {
    fn from(arg: EntityArg) -> Self {
        match arg {
            EntityArg::Member => EntityType::Member,
            EntityArg::Category => EntityType::Category,
            EntityArg::Period => EntityType::Period,
            EntityArg::Transaction => EntityType::Transaction,
        }
    }
}

/// Parse a user-entered amount such as "12.50" or "$12"
pub(crate) fn parse_amount(input: &str) -> SplitpotResult<Money> {
    Money::parse(input).map_err(|e| {
        SplitpotError::InvalidAmount(format!(
            "'{}': {}. Use a format like '12.50' or '12'",
            input, e
        ))
    })
}

/// Resolve "fund" to the public fund, anything else to a member
pub(crate) fn resolve_party(storage: &Storage, identifier: &str) -> SplitpotResult<Party> {
    let trimmed = identifier.trim();
    if Member::is_reserved_name(trimmed) {
        return Ok(Party::PublicFund);
    }
    Ok(Party::Member(MemberService::new(storage).require(trimmed)?.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SplitpotPaths;
    use crate::models::MemberId;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitpotPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50").unwrap().cents(), 1250);
        assert!(matches!(
            parse_amount("twelve").unwrap_err(),
            SplitpotError::InvalidAmount(_)
        ));
    }

    #[test]
    fn test_resolve_party() {
        let (_temp_dir, storage) = create_test_storage();
        MemberService::new(&storage).add("Ana").unwrap();

        assert_eq!(resolve_party(&storage, "Fund").unwrap(), Party::PublicFund);
        assert_eq!(
            resolve_party(&storage, "ana").unwrap(),
            Party::Member(MemberId::new(1))
        );
        assert!(resolve_party(&storage, "Bo").unwrap_err().is_not_found());
    }
}
