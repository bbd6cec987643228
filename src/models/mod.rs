//! Core data models for splitpot
//!
//! This module contains the data structures of the shared-expense domain:
//! members, categories, periods, transactions and the parties money moves
//! between.

pub mod category;
pub mod ids;
pub mod member;
pub mod money;
pub mod party;
pub mod period;
pub mod transaction;

pub use category::{Category, DEFAULT_CATEGORIES};
pub use ids::{CategoryId, MemberId, PeriodId, TransactionId};
pub use member::Member;
pub use money::Money;
pub use party::Party;
pub use period::{period_name, Period, PeriodAction, PeriodStatus};
pub use transaction::{
    BalanceInclusion, Share, SplitKind, Transaction, TransactionAction, TransactionKind,
    TransactionStatus,
};
