//! Transaction model
//!
//! Represents money movements in a period (expenses, deposits into the
//! public fund, refunds out of it) together with the approval lifecycle that
//! decides whether they count toward balances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, MemberId, PeriodId, TransactionId};
use super::money::Money;
use super::party::Party;
use crate::error::{SplitpotError, SplitpotResult};

/// What kind of money movement a transaction records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money spent on behalf of the group (or, for personal splits, taken
    /// out of the pot for one member)
    Expense,
    /// Cash paid into the public fund by a member
    Deposit,
    /// Cash paid out of the public fund to a member
    Refund,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "expense"),
            Self::Deposit => write!(f, "deposit"),
            Self::Refund => write!(f, "refund"),
        }
    }
}

/// How an expense is divided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitKind {
    /// Equal split among active members; the payer is credited
    #[default]
    #[serde(alias = "equal")]
    Individual,
    /// Paid from the public fund, shared equally among active members
    Shared,
    /// Charged to the payer alone, with no credit
    Personal,
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual => write!(f, "individual"),
            Self::Shared => write!(f, "shared"),
            Self::Personal => write!(f, "personal"),
        }
    }
}

/// Status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Being prepared; editable and deletable
    #[default]
    Draft,
    /// Submitted for review
    Pending,
    /// Accepted; counts toward balances
    Approved,
    /// Turned down; never counts
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Approved and rejected transactions never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Whether a transaction in this status contributes to balances
    pub fn counts_toward_balance(&self, inclusion: BalanceInclusion) -> bool {
        match inclusion {
            BalanceInclusion::ApprovedOnly => *self == Self::Approved,
            BalanceInclusion::NonDraft => matches!(self, Self::Pending | Self::Approved),
        }
    }

    /// Apply a lifecycle action, validated against [`TRANSACTION_TRANSITIONS`]
    pub fn apply(self, action: TransactionAction) -> SplitpotResult<TransactionStatus> {
        TRANSACTION_TRANSITIONS
            .iter()
            .find(|(from, act, _)| *from == self && *act == action)
            .map(|(_, _, to)| *to)
            .ok_or_else(|| SplitpotError::InvalidStateTransition {
                entity_type: "transaction",
                from: self.to_string(),
                action: action.as_str(),
            })
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle actions on a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAction {
    Edit,
    Delete,
    Submit,
    Approve,
    Reject,
}

impl TransactionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// Allowed transaction transitions. Edit and delete are self-loops on draft
/// (delete removes the record once permitted).
pub const TRANSACTION_TRANSITIONS: &[(TransactionStatus, TransactionAction, TransactionStatus)] = &[
    (TransactionStatus::Draft, TransactionAction::Edit, TransactionStatus::Draft),
    (TransactionStatus::Draft, TransactionAction::Delete, TransactionStatus::Draft),
    (TransactionStatus::Draft, TransactionAction::Submit, TransactionStatus::Pending),
    (TransactionStatus::Pending, TransactionAction::Approve, TransactionStatus::Approved),
    (TransactionStatus::Pending, TransactionAction::Reject, TransactionStatus::Rejected),
];

/// Which transaction statuses contribute to balances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BalanceInclusion {
    /// Only approved transactions
    #[default]
    ApprovedOnly,
    /// Anything submitted and not rejected
    NonDraft,
}

/// One member's portion of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub member_id: MemberId,
    pub amount: Money,
}

impl Share {
    pub fn new(member_id: MemberId, amount: Money) -> Self {
        Self { member_id, amount }
    }
}

/// A ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Period the transaction belongs to
    pub period_id: PeriodId,

    pub kind: TransactionKind,

    /// Always a positive number of cents
    pub amount: Money,

    /// Who paid (expense, deposit) or received (refund)
    pub payer: Party,

    /// Category (expenses only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub split_kind: SplitKind,

    #[serde(default)]
    pub status: TransactionStatus,

    /// Per-member portions, fixed when the expense is recorded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shares: Vec<Share>,

    /// Part of a shared expense paid from the fund's cash on hand
    #[serde(default)]
    pub fund_covered: Money,

    /// Members who absorbed a remainder cent for this expense
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remainder_recipients: Vec<MemberId>,

    /// Recorded by period settlement rather than entered by a member
    #[serde(default)]
    pub settlement: bool,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new draft transaction
    pub fn new(period_id: PeriodId, kind: TransactionKind, amount: Money, payer: Party) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            period_id,
            kind,
            amount,
            payer,
            category_id: None,
            description: String::new(),
            split_kind: SplitKind::default(),
            status: TransactionStatus::Draft,
            shares: Vec::new(),
            fund_covered: Money::zero(),
            remainder_recipients: Vec::new(),
            settlement: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this is an expense shared among members
    pub fn is_split(&self) -> bool {
        self.kind == TransactionKind::Expense && self.split_kind != SplitKind::Personal
    }

    /// Part of a shared expense the fund could not cover from cash
    pub fn fronted(&self) -> Money {
        if self.kind == TransactionKind::Expense && self.split_kind == SplitKind::Shared {
            self.amount - self.fund_covered
        } else {
            Money::zero()
        }
    }

    /// The share assigned to a member (zero if none)
    pub fn share_for(&self, member_id: MemberId) -> Money {
        self.shares
            .iter()
            .filter(|s| s.member_id == member_id)
            .map(|s| s.amount)
            .sum()
    }

    /// Total of all shares
    pub fn shares_total(&self) -> Money {
        self.shares.iter().map(|s| s.amount).sum()
    }

    /// Set the status
    pub fn set_status(&mut self, status: TransactionStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Apply a lifecycle action to the status
    pub fn apply(&mut self, action: TransactionAction) -> SplitpotResult<()> {
        let next = self.status.apply(action)?;
        self.set_status(next);
        Ok(())
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }

        if self.kind != TransactionKind::Expense && self.category_id.is_some() {
            return Err(TransactionValidationError::CategoryOnNonExpense(self.kind));
        }

        match (self.kind, self.split_kind) {
            (TransactionKind::Expense, SplitKind::Shared) => {
                if !self.payer.is_fund() {
                    return Err(TransactionValidationError::SharedPaidByMember);
                }
                if self.fund_covered.is_negative() || self.fund_covered > self.amount {
                    return Err(TransactionValidationError::FundCoverageOutOfRange);
                }
            }
            (kind, _) => {
                if self.payer.is_fund() {
                    return Err(TransactionValidationError::FundAsPayer(kind));
                }
            }
        }

        if self.is_split() {
            if self.shares.is_empty() {
                return Err(TransactionValidationError::MissingShares);
            }
            let total = self.shares_total();
            if total != self.amount {
                return Err(TransactionValidationError::SharesMismatch {
                    amount: self.amount,
                    shares_total: total,
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.amount, self.payer)?;
        if !self.description.is_empty() {
            write!(f, " ({})", self.description)?;
        }
        Ok(())
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    CategoryOnNonExpense(TransactionKind),
    FundAsPayer(TransactionKind),
    SharedPaidByMember,
    FundCoverageOutOfRange,
    MissingShares,
    SharesMismatch { amount: Money, shares_total: Money },
}

impl TransactionValidationError {
    /// Convert to the crate error, keeping amount problems distinct
    pub fn into_error(self) -> SplitpotError {
        match self {
            Self::NonPositiveAmount(amount) => SplitpotError::InvalidAmount(format!(
                "{} cents (must be a positive whole number of cents)",
                amount.cents()
            )),
            other => SplitpotError::Validation(other.to_string()),
        }
    }
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be positive, got {}", amount)
            }
            Self::CategoryOnNonExpense(kind) => {
                write!(f, "Only expenses can be categorized, not a {}", kind)
            }
            Self::FundAsPayer(kind) => {
                write!(f, "The public fund cannot be the payer of this {}", kind)
            }
            Self::SharedPaidByMember => {
                write!(f, "Shared expenses are paid by the public fund")
            }
            Self::FundCoverageOutOfRange => {
                write!(f, "Fund coverage must be between zero and the amount")
            }
            Self::MissingShares => write!(f, "Split expense has no shares"),
            Self::SharesMismatch {
                amount,
                shares_total,
            } => write!(
                f,
                "Shares ({}) do not add up to the amount ({})",
                shares_total, amount
            ),
        }
    }
}

impl std::error::Error for TransactionValidationError {}
