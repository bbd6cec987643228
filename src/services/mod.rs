//! Service layer for splitpot
//!
//! The service layer provides business logic on top of the storage layer:
//! validation, splitting, approval workflow, balances and settlement. Every
//! mutating operation holds the storage write gate for its whole
//! read-validate-write sequence.

pub mod balance;
pub mod category;
pub mod member;
pub mod period;
pub mod transaction;

pub use balance::{BalanceService, PeriodSummary, StatusReport};
pub use category::CategoryService;
pub use member::MemberService;
pub use period::{PeriodService, SettlementOutcome};
pub use transaction::{
    CreateTransactionInput, EditTransactionInput, TransactionFilter, TransactionService,
};
