//! Balance service
//!
//! Feeds the ledger engine from storage: balances and settlement plans for a
//! period, plus the period summary and status report shown by the CLI.

use serde::Serialize;

use crate::config::settings::Settings;
use crate::error::{SplitpotError, SplitpotResult};
use crate::ledger::{plan_settlement, BalanceCalculator, Balances, SettlementTransfer};
use crate::models::{
    Member, Money, Period, PeriodId, SplitKind, Transaction, TransactionKind, TransactionStatus,
};
use crate::storage::Storage;

/// Totals for one period
#[derive(Debug, Clone, Default, Serialize)]
pub struct PeriodSummary {
    pub period_id: Option<PeriodId>,
    pub individual_expenses: Money,
    pub shared_expenses: Money,
    pub personal_expenses: Money,
    pub deposits: Money,
    pub refunds: Money,
    /// Sum of the amounts of settlement transactions
    pub settlement_volume: Money,
    /// Part of shared expenses paid from fund cash
    pub fund_covered: Money,
    /// Part of shared expenses the fund fronted
    pub fronted: Money,
    pub draft: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl PeriodSummary {
    pub fn total_expenses(&self) -> Money {
        self.individual_expenses + self.shared_expenses + self.personal_expenses
    }

    pub fn transaction_count(&self) -> usize {
        self.draft + self.pending + self.approved + self.rejected
    }
}

/// Snapshot of the ledger for `splitpot status`
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub period: Option<Period>,
    pub members: Vec<Member>,
    pub fund_available: Money,
    pub awaiting_review: usize,
}

/// Service for balance queries and settlement planning
pub struct BalanceService<'a> {
    storage: &'a Storage,
    calculator: BalanceCalculator,
}

impl<'a> BalanceService<'a> {
    pub fn new(storage: &'a Storage, settings: &Settings) -> Self {
        Self {
            storage,
            calculator: BalanceCalculator::new(settings.balance_inclusion),
        }
    }

    /// Balances of every member (active or not) and the public fund
    pub fn compute_balances(&self, period_id: PeriodId) -> SplitpotResult<Balances> {
        self.require_period(period_id)?;

        let roster: Vec<_> = self
            .storage
            .members
            .get_all()?
            .into_iter()
            .map(|m| m.id)
            .collect();
        let transactions = self.storage.transactions.get_by_period(period_id)?;

        self.calculator.compute(&transactions, roster)
    }

    /// The transfers that would zero the period's balances
    pub fn compute_settlement_plan(
        &self,
        period_id: PeriodId,
    ) -> SplitpotResult<Vec<SettlementTransfer>> {
        let balances = self.compute_balances(period_id)?;
        plan_settlement(&balances)
    }

    /// Totals for a period. Amounts follow the balance inclusion policy;
    /// status counts cover every transaction.
    pub fn period_summary(&self, period_id: PeriodId) -> SplitpotResult<PeriodSummary> {
        self.require_period(period_id)?;
        let transactions = self.storage.transactions.get_by_period(period_id)?;

        let mut summary = PeriodSummary {
            period_id: Some(period_id),
            ..PeriodSummary::default()
        };

        for txn in &transactions {
            match txn.status {
                TransactionStatus::Draft => summary.draft += 1,
                TransactionStatus::Pending => summary.pending += 1,
                TransactionStatus::Approved => summary.approved += 1,
                TransactionStatus::Rejected => summary.rejected += 1,
            }

            if self.calculator.counts(txn) {
                add_to_totals(&mut summary, txn);
            }
        }

        Ok(summary)
    }

    /// Current period, members and fund cash
    pub fn status_report(&self) -> SplitpotResult<StatusReport> {
        let period = self.storage.periods.get_open()?;
        let members = self.storage.members.get_all()?;

        let (fund_available, awaiting_review) = match &period {
            Some(period) => {
                let awaiting = self
                    .storage
                    .transactions
                    .get_by_period(period.id)?
                    .iter()
                    .filter(|t| t.status == TransactionStatus::Pending)
                    .count();
                (self.compute_balances(period.id)?.fund_available(), awaiting)
            }
            None => (Money::zero(), 0),
        };

        Ok(StatusReport {
            period,
            members,
            fund_available,
            awaiting_review,
        })
    }

    fn require_period(&self, period_id: PeriodId) -> SplitpotResult<Period> {
        self.storage
            .periods
            .get(period_id)?
            .ok_or_else(|| SplitpotError::period_not_found(period_id.to_string()))
    }
}

fn add_to_totals(summary: &mut PeriodSummary, txn: &Transaction) {
    if txn.settlement {
        summary.settlement_volume += txn.amount;
        return;
    }

    match (txn.kind, txn.split_kind) {
        (TransactionKind::Expense, SplitKind::Individual) => {
            summary.individual_expenses += txn.amount
        }
        (TransactionKind::Expense, SplitKind::Shared) => {
            summary.shared_expenses += txn.amount;
            summary.fund_covered += txn.fund_covered;
            summary.fronted += txn.fronted();
        }
        (TransactionKind::Expense, SplitKind::Personal) => summary.personal_expenses += txn.amount,
        (TransactionKind::Deposit, _) => summary.deposits += txn.amount,
        (TransactionKind::Refund, _) => summary.refunds += txn.amount,
    }
}
