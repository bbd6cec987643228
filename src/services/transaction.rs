//! Transaction service
//!
//! Records expenses, deposits and refunds, computes expense shares at
//! creation time, and drives the draft → pending → approved/rejected
//! lifecycle. Every mutation runs under the storage write gate.

use chrono::Utc;
use tracing::debug;

use crate::audit::EntityType;
use crate::config::settings::Settings;
use crate::error::{SplitpotError, SplitpotResult};
use crate::ledger::{split_expense, FairnessRecord, SplitOutcome};
use crate::models::{
    CategoryId, MemberId, Money, Party, Period, PeriodId, SplitKind, Transaction,
    TransactionAction, TransactionId, TransactionKind, TransactionStatus,
};
use crate::storage::Storage;

use super::balance::BalanceService;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub period_id: Option<PeriodId>,
    pub status: Option<TransactionStatus>,
    pub kind: Option<TransactionKind>,
    pub payer: Option<Party>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(mut self, period_id: PeriodId) -> Self {
        self.period_id = Some(period_id);
        self
    }

    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn payer(mut self, payer: Party) -> Self {
        self.payer = Some(payer);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, txn: &Transaction) -> bool {
        self.status.map_or(true, |s| txn.status == s)
            && self.kind.map_or(true, |k| txn.kind == k)
            && self.payer.map_or(true, |p| txn.payer == p)
    }
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub kind: TransactionKind,
    pub amount: Money,
    /// Ignored for shared expenses, which the public fund pays
    pub payer: Party,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
    /// Defaults to the open period
    pub period_id: Option<PeriodId>,
    /// Only meaningful for expenses
    pub split_kind: SplitKind,
}

impl CreateTransactionInput {
    pub fn expense(amount: Money, payer: Party, split_kind: SplitKind) -> Self {
        Self::new(TransactionKind::Expense, amount, payer, split_kind)
    }

    pub fn deposit(amount: Money, depositor: Party) -> Self {
        Self::new(TransactionKind::Deposit, amount, depositor, SplitKind::default())
    }

    pub fn refund(amount: Money, recipient: Party) -> Self {
        Self::new(TransactionKind::Refund, amount, recipient, SplitKind::default())
    }

    fn new(kind: TransactionKind, amount: Money, payer: Party, split_kind: SplitKind) -> Self {
        Self {
            kind,
            amount,
            payer,
            category_id: None,
            description: None,
            period_id: None,
            split_kind,
        }
    }
}

/// Changes to a draft transaction; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct EditTransactionInput {
    pub amount: Option<Money>,
    pub payer: Option<Party>,
    /// `Some(None)` clears the category
    pub category_id: Option<Option<CategoryId>>,
    pub description: Option<String>,
    pub split_kind: Option<SplitKind>,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Compute the shares an expense would get right now, without saving
    pub fn preview_split(
        &self,
        amount: Money,
        split_kind: SplitKind,
        payer: Party,
    ) -> SplitpotResult<SplitOutcome> {
        let period = self.resolve_period(None)?;
        self.split(&period, amount, split_kind, payer, &[])
    }

    /// Record a new draft transaction
    pub fn create(&self, input: CreateTransactionInput) -> SplitpotResult<Transaction> {
        let _gate = self.storage.begin_write()?;

        let period = self.resolve_period(input.period_id)?;
        period.ensure_accepts_transactions()?;

        if !input.amount.is_positive() {
            return Err(SplitpotError::InvalidAmount(format!(
                "{} (must be a positive whole number of cents)",
                input.amount
            )));
        }

        let mut txn = Transaction::new(period.id, input.kind, input.amount, input.payer);
        txn.category_id = input.category_id;
        txn.description = input.description.unwrap_or_default().trim().to_string();
        txn.split_kind = if input.kind == TransactionKind::Expense {
            input.split_kind
        } else {
            SplitKind::default()
        };

        self.check_references(&txn)?;

        let outcome = if txn.kind == TransactionKind::Expense {
            let outcome = self.split(&period, txn.amount, txn.split_kind, txn.payer, &[])?;
            apply_outcome(&mut txn, &outcome);
            Some(outcome)
        } else {
            None
        };

        txn.validate().map_err(|e| e.into_error())?;

        self.storage.transactions.upsert(txn.clone())?;
        self.persist_rotation(outcome.as_ref())?;
        self.storage.transactions.save()?;

        self.storage.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &txn,
        )?;

        debug!(
            transaction = %txn.id,
            kind = %txn.kind,
            amount = txn.amount.cents(),
            remainder_recipients = txn.remainder_recipients.len(),
            "Recorded transaction"
        );
        Ok(txn)
    }

    pub fn get(&self, id: TransactionId) -> SplitpotResult<Option<Transaction>> {
        self.storage.transactions.get(id)
    }

    /// Find a transaction by full UUID or its short display form ("txn-1a2b3c4d")
    pub fn find(&self, identifier: &str) -> SplitpotResult<Option<Transaction>> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return self.storage.transactions.get(id);
        }

        let short = identifier.strip_prefix("txn-").unwrap_or(identifier);
        if short.is_empty() {
            return Ok(None);
        }

        let mut matches: Vec<_> = self
            .storage
            .transactions
            .get_all()?
            .into_iter()
            .filter(|t| t.id.as_uuid().to_string().starts_with(short))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(SplitpotError::Validation(format!(
                "'{}' matches {} transactions; use more characters",
                identifier, n
            ))),
        }
    }

    /// Find a transaction or fail with a not-found error
    pub fn require(&self, identifier: &str) -> SplitpotResult<Transaction> {
        self.find(identifier)?
            .ok_or_else(|| SplitpotError::transaction_not_found(identifier))
    }

    /// List transactions, oldest first
    pub fn list(&self, filter: TransactionFilter) -> SplitpotResult<Vec<Transaction>> {
        let mut transactions = match filter.period_id {
            Some(period_id) => self.storage.transactions.get_by_period(period_id)?,
            None => self.storage.transactions.get_all()?,
        };

        transactions.retain(|t| filter.matches(t));

        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }

        Ok(transactions)
    }

    /// Change a draft; expense shares are recomputed when the amount, payer
    /// or split kind changes
    pub fn edit(&self, id: TransactionId, input: EditTransactionInput) -> SplitpotResult<Transaction> {
        let _gate = self.storage.begin_write()?;

        let mut txn = self.load(id)?;
        let period = self.period_of(&txn)?;
        period.ensure_mutable()?;
        txn.status.apply(TransactionAction::Edit)?;
        period.ensure_accepts_transactions()?;

        let before = txn.clone();
        let mut resplit = false;

        if let Some(amount) = input.amount {
            resplit |= amount != txn.amount;
            txn.amount = amount;
        }
        if let Some(payer) = input.payer {
            resplit |= payer != txn.payer;
            txn.payer = payer;
        }
        if let Some(split_kind) = input.split_kind {
            if txn.kind != TransactionKind::Expense {
                return Err(SplitpotError::Validation(format!(
                    "Only expenses have a split kind, not a {}",
                    txn.kind
                )));
            }
            resplit |= split_kind != txn.split_kind;
            txn.split_kind = split_kind;
        }
        if let Some(category_id) = input.category_id {
            txn.category_id = category_id;
        }
        if let Some(description) = input.description {
            txn.description = description.trim().to_string();
        }

        if !txn.amount.is_positive() {
            return Err(SplitpotError::InvalidAmount(format!(
                "{} (must be a positive whole number of cents)",
                txn.amount
            )));
        }

        self.check_references(&txn)?;

        let outcome = if resplit && txn.kind == TransactionKind::Expense {
            // The draft's own extra cents are handed back before the new split
            let outcome = self.split(
                &period,
                txn.amount,
                txn.split_kind,
                txn.payer,
                &before.remainder_recipients,
            )?;
            apply_outcome(&mut txn, &outcome);
            Some(outcome)
        } else {
            None
        };

        txn.updated_at = Utc::now();
        txn.validate().map_err(|e| e.into_error())?;

        self.storage.transactions.upsert(txn.clone())?;
        if outcome.is_some() {
            self.release_remainders(&before.remainder_recipients)?;
        }
        self.persist_rotation(outcome.as_ref())?;
        self.storage.transactions.save()?;

        self.storage.log_update(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &before,
            &txn,
            None,
        )?;

        Ok(txn)
    }

    /// Delete a draft
    pub fn delete(&self, id: TransactionId) -> SplitpotResult<Transaction> {
        let _gate = self.storage.begin_write()?;

        let txn = self.load(id)?;
        let period = self.period_of(&txn)?;
        period.ensure_mutable()?;
        txn.status.apply(TransactionAction::Delete)?;
        period.ensure_accepts_transactions()?;

        self.storage.transactions.delete(id)?;
        self.storage.transactions.save()?;

        self.storage.log_delete(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &txn,
        )?;

        Ok(txn)
    }

    /// Send a draft for review
    pub fn submit(&self, id: TransactionId) -> SplitpotResult<Transaction> {
        self.transition(id, TransactionAction::Submit)
    }

    pub fn approve(&self, id: TransactionId) -> SplitpotResult<Transaction> {
        self.transition(id, TransactionAction::Approve)
    }

    pub fn reject(&self, id: TransactionId) -> SplitpotResult<Transaction> {
        self.transition(id, TransactionAction::Reject)
    }

    fn transition(&self, id: TransactionId, action: TransactionAction) -> SplitpotResult<Transaction> {
        let _gate = self.storage.begin_write()?;

        let mut txn = self.load(id)?;
        self.period_of(&txn)?.ensure_mutable()?;

        let before = txn.clone();
        txn.apply(action)?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_update(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &before,
            &txn,
            Some(format!("status: {} -> {}", before.status, txn.status)),
        )?;

        debug!(transaction = %txn.id, status = %txn.status, "Transaction {}", action.as_str());
        Ok(txn)
    }

    fn split(
        &self,
        period: &Period,
        amount: Money,
        split_kind: SplitKind,
        payer: Party,
        released: &[MemberId],
    ) -> SplitpotResult<SplitOutcome> {
        let roster: Vec<FairnessRecord> = self
            .storage
            .members
            .get_active()?
            .iter()
            .map(|member| {
                let mut record = FairnessRecord::from(member);
                if released.contains(&record.member_id) {
                    record.paid_remainder_in_cycle = false;
                }
                record
            })
            .collect();

        let fund_available = if split_kind == SplitKind::Shared {
            BalanceService::new(self.storage, self.settings)
                .compute_balances(period.id)?
                .fund_available()
        } else {
            Money::zero()
        };

        split_expense(amount, split_kind, payer, &roster, fund_available)
    }

    /// Clear the rotation flags of members whose extra cent is being withdrawn
    fn release_remainders(&self, recipients: &[MemberId]) -> SplitpotResult<()> {
        if recipients.is_empty() {
            return Ok(());
        }

        for &member_id in recipients {
            if let Some(mut member) = self.storage.members.get(member_id)? {
                member.set_paid_remainder(false);
                self.storage.members.upsert(member)?;
            }
        }
        self.storage.members.save()
    }

    /// Store the rotation flags produced by a split
    fn persist_rotation(&self, outcome: Option<&SplitOutcome>) -> SplitpotResult<()> {
        let Some(rotation) = outcome.and_then(|o| o.rotation.as_ref()) else {
            return Ok(());
        };

        for record in &rotation.records {
            if let Some(mut member) = self.storage.members.get(record.member_id)? {
                member.set_paid_remainder(record.paid_remainder_in_cycle);
                self.storage.members.upsert(member)?;
            }
        }

        if rotation.cycle_reset {
            debug!("Remainder rotation cycle completed");
        }
        self.storage.members.save()
    }

    /// Payer and category must exist; expense payers must be active
    fn check_references(&self, txn: &Transaction) -> SplitpotResult<()> {
        let shared = txn.kind == TransactionKind::Expense && txn.split_kind == SplitKind::Shared;

        if let (Some(member_id), false) = (txn.payer.member_id(), shared) {
            let member = self
                .storage
                .members
                .get(member_id)?
                .ok_or_else(|| SplitpotError::member_not_found(member_id.to_string()))?;

            if txn.kind == TransactionKind::Expense && !member.active {
                return Err(SplitpotError::Validation(format!(
                    "Member '{}' is inactive and cannot pay new expenses",
                    member.name
                )));
            }
        }

        if let Some(category_id) = txn.category_id {
            self.storage
                .categories
                .get(category_id)?
                .ok_or_else(|| SplitpotError::category_not_found(category_id.to_string()))?;
        }

        Ok(())
    }

    fn resolve_period(&self, period_id: Option<PeriodId>) -> SplitpotResult<Period> {
        match period_id {
            Some(id) => self
                .storage
                .periods
                .get(id)?
                .ok_or_else(|| SplitpotError::period_not_found(id.to_string())),
            None => self
                .storage
                .periods
                .get_open()?
                .ok_or_else(|| SplitpotError::period_not_found("open period")),
        }
    }

    fn period_of(&self, txn: &Transaction) -> SplitpotResult<Period> {
        self.resolve_period(Some(txn.period_id))
    }

    fn load(&self, id: TransactionId) -> SplitpotResult<Transaction> {
        self.storage
            .transactions
            .get(id)?
            .ok_or_else(|| SplitpotError::transaction_not_found(id.to_string()))
    }
}

fn apply_outcome(txn: &mut Transaction, outcome: &SplitOutcome) {
    txn.payer = outcome.payer;
    txn.shares = outcome.shares.clone();
    txn.fund_covered = outcome.fund_covered;
    txn.remainder_recipients = outcome.remainder_recipients();
}
