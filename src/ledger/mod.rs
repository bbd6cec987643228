//! Ledger engine for splitpot
//!
//! Pure computations over already-loaded data, with no storage access:
//!
//! - `split`: turns an expense into exact integer-cent shares
//! - `rotation`: decides who absorbs the indivisible remainder cents
//! - `balance`: folds transactions into signed per-party balances
//! - `settlement`: plans the transfers that zero those balances
//!
//! The service layer feeds these from storage and persists the results.

pub mod balance;
pub mod rotation;
pub mod settlement;
pub mod split;

pub use balance::{postings, BalanceCalculator, Balances};
pub use rotation::{allocate_remainder, FairnessRecord, RemainderAllocation};
pub use settlement::{plan_settlement, SettlementTransfer};
pub use split::{split_expense, SplitOutcome};
