//! Period service
//!
//! Opens, closes, reopens and settles accounting periods. Settling plans the
//! transfers that zero every balance, records them as approved settlement
//! transactions, flips the period to settled and opens the next one. All
//! checks run before the first write, so a failed settlement leaves the
//! ledger untouched.
//!
//! The periods file is written last. If an earlier write lands and a later
//! one fails, the period is still closed and a rerun finds the settlement
//! transactions already counted, plans no transfers and completes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::audit::EntityType;
use crate::config::settings::Settings;
use crate::error::{SplitpotError, SplitpotResult};
use crate::ledger::{plan_settlement, SettlementTransfer};
use crate::models::{
    period_name, MemberId, Money, Party, Period, PeriodAction, PeriodId, Transaction,
    TransactionKind, TransactionStatus,
};
use crate::storage::Storage;

use super::balance::BalanceService;

/// What a settlement did
#[derive(Debug, Clone, Serialize)]
pub struct SettlementOutcome {
    /// The period as it was settled
    pub settled: Period,
    /// The newly opened period
    pub next: Period,
    pub transfers: Vec<SettlementTransfer>,
    /// The settlement transactions recorded in the settled period
    pub transactions: Vec<Transaction>,
}

/// Service for period lifecycle management
pub struct PeriodService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> PeriodService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// The open period, if any
    pub fn current(&self) -> SplitpotResult<Option<Period>> {
        self.storage.periods.get_open()
    }

    pub fn get(&self, id: PeriodId) -> SplitpotResult<Option<Period>> {
        self.storage.periods.get(id)
    }

    /// Find a period by name, full UUID or short id ("per-1a2b3c4d")
    pub fn find(&self, identifier: &str) -> SplitpotResult<Option<Period>> {
        if let Some(period) = self.storage.periods.get_by_name(identifier)? {
            return Ok(Some(period));
        }

        if let Ok(id) = identifier.parse::<PeriodId>() {
            return self.storage.periods.get(id);
        }

        let identifier = identifier.trim();
        Ok(self
            .storage
            .periods
            .get_all()?
            .into_iter()
            .find(|p| p.id.to_string() == identifier))
    }

    /// Resolve an optional identifier, defaulting to the open period
    pub fn resolve(&self, identifier: Option<&str>) -> SplitpotResult<Period> {
        match identifier {
            Some(identifier) => self
                .find(identifier)?
                .ok_or_else(|| SplitpotError::period_not_found(identifier)),
            None => self
                .current()?
                .ok_or_else(|| SplitpotError::period_not_found("open period")),
        }
    }

    /// All periods, oldest first
    pub fn list(&self) -> SplitpotResult<Vec<Period>> {
        self.storage.periods.get_all()
    }

    /// Stop accepting new transactions in a period
    pub fn close(&self, id: PeriodId) -> SplitpotResult<Period> {
        let _gate = self.storage.begin_write()?;

        let mut period = self.load(id)?;
        period.ensure_mutable()?;

        let before = period.clone();
        period.close()?;
        self.persist(&before, &period, status_change(&before, &period))?;

        info!(period = %period.name, "Closed period");
        Ok(period)
    }

    /// Reopen a closed period while no other period is open
    pub fn reopen(&self, id: PeriodId) -> SplitpotResult<Period> {
        let _gate = self.storage.begin_write()?;

        let mut period = self.load(id)?;
        period.ensure_mutable()?;

        if let Some(open) = self.storage.periods.get_open()? {
            if open.id != id {
                return Err(SplitpotError::Validation(format!(
                    "Period '{}' is already open",
                    open.name
                )));
            }
        }

        let before = period.clone();
        period.reopen()?;
        self.persist(&before, &period, status_change(&before, &period))?;

        info!(period = %period.name, "Reopened period");
        Ok(period)
    }

    /// Rename an open or closed period
    pub fn rename(&self, id: PeriodId, name: &str) -> SplitpotResult<Period> {
        let _gate = self.storage.begin_write()?;

        let mut period = self.load(id)?;
        period.ensure_mutable()?;
        self.ensure_name_free(name, Some(id))?;

        let before = period.clone();
        period.rename(name)?;
        self.persist(
            &before,
            &period,
            format!("name: {} -> {}", before.name, period.name),
        )?;

        info!(from = %before.name, to = %period.name, "Renamed period");
        Ok(period)
    }

    /// Settle a closed period and open the next one
    ///
    /// The next period is called `next_name` when given, otherwise it is
    /// named from `period_name_format` and the settlement time.
    pub fn settle(
        &self,
        id: PeriodId,
        next_name: Option<&str>,
    ) -> SplitpotResult<SettlementOutcome> {
        let _settling = self.storage.begin_settlement(id)?;
        let _gate = self.storage.begin_write()?;

        // Another process may have written since this one loaded
        self.storage.periods.refresh()?;
        self.storage.members.refresh()?;
        self.storage.transactions.refresh()?;

        let period = self.load(id)?;
        period.ensure_mutable()?;
        period.status.apply(PeriodAction::Settle)?;

        if let Some(open) = self.storage.periods.get_open()? {
            return Err(SplitpotError::Validation(format!(
                "Period '{}' is still open; close it before settling '{}'",
                open.name, period.name
            )));
        }

        let now = Utc::now();
        let next_name = match next_name {
            Some(name) => {
                self.ensure_name_free(name, None)?;
                name.trim().to_string()
            }
            None => period_name(&self.settings.period_name_format, now)?,
        };
        let next = Period::open(next_name);
        if next.name.is_empty() {
            return Err(SplitpotError::Validation("Period name cannot be empty".into()));
        }

        let balances = BalanceService::new(self.storage, self.settings).compute_balances(id)?;
        let transfers = plan_settlement(&balances)?;

        let names = self.member_names()?;
        let transactions: Vec<Transaction> = transfers
            .iter()
            .flat_map(|transfer| settlement_transactions(id, transfer, &names, now))
            .collect();

        // The period must net to zero once the settlement postings land
        let mut after = balances.clone();
        for txn in &transactions {
            after.fold(txn)?;
        }
        if !after.is_settled() {
            let outstanding: Money = after
                .iter()
                .map(|(_, amount)| amount)
                .filter(|amount| amount.is_positive())
                .sum();
            return Err(SplitpotError::SettlementInconsistency {
                residual: outstanding.cents(),
            });
        }

        let unreviewed = self
            .storage
            .transactions
            .get_by_period(id)?
            .iter()
            .filter(|t| matches!(t.status, TransactionStatus::Draft | TransactionStatus::Pending))
            .count();
        if unreviewed > 0 {
            warn!(
                period = %period.name,
                unreviewed,
                "Settling with transactions that never counted toward balances"
            );
        }

        // Checks done; from here on only writes
        for txn in &transactions {
            self.storage.transactions.upsert(txn.clone())?;
        }

        let before = period.clone();
        let mut settled = period;
        settled.settle(now)?;
        self.storage.periods.upsert(settled.clone())?;

        let mut reset = Vec::new();
        for mut member in self.storage.members.get_all()? {
            if member.paid_remainder_in_cycle {
                let before = member.clone();
                member.set_paid_remainder(false);
                self.storage.members.upsert(member.clone())?;
                reset.push((before, member));
            }
        }

        self.storage.periods.upsert(next.clone())?;

        // The periods file commits the settlement
        self.storage.transactions.save()?;
        self.storage.members.save()?;
        self.storage.periods.save()?;

        for txn in &transactions {
            self.storage.log_create(
                EntityType::Transaction,
                txn.id.to_string(),
                Some(txn.description.clone()),
                txn,
            )?;
        }
        self.storage.log_update(
            EntityType::Period,
            settled.id.to_string(),
            Some(settled.name.clone()),
            &before,
            &settled,
            Some(status_change(&before, &settled)),
        )?;
        for (before, member) in &reset {
            self.storage.log_update(
                EntityType::Member,
                member.id.to_string(),
                Some(member.name.clone()),
                before,
                member,
                Some("paid_remainder_in_cycle: true -> false".into()),
            )?;
        }
        self.storage.log_create(
            EntityType::Period,
            next.id.to_string(),
            Some(next.name.clone()),
            &next,
        )?;

        info!(
            period = %settled.name,
            transfers = transfers.len(),
            next = %next.name,
            "Settled period"
        );

        Ok(SettlementOutcome {
            settled,
            next,
            transfers,
            transactions,
        })
    }

    fn member_names(&self) -> SplitpotResult<HashMap<MemberId, String>> {
        Ok(self
            .storage
            .members
            .get_all()?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect())
    }

    /// Period names must be unique, ignoring case
    fn ensure_name_free(&self, name: &str, own: Option<PeriodId>) -> SplitpotResult<()> {
        match self.storage.periods.get_by_name(name)? {
            Some(existing) if Some(existing.id) != own => Err(SplitpotError::Duplicate {
                entity_type: "Period",
                identifier: name.trim().to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn load(&self, id: PeriodId) -> SplitpotResult<Period> {
        self.storage
            .periods
            .get(id)?
            .ok_or_else(|| SplitpotError::period_not_found(id.to_string()))
    }

    fn persist(&self, before: &Period, after: &Period, summary: String) -> SplitpotResult<()> {
        self.storage.periods.upsert(after.clone())?;
        self.storage.periods.save()?;
        self.storage.log_update(
            EntityType::Period,
            after.id.to_string(),
            Some(after.name.clone()),
            before,
            after,
            Some(summary),
        )
    }
}

fn status_change(before: &Period, after: &Period) -> String {
    format!("status: {} -> {}", before.status, after.status)
}

/// The transactions that carry out one transfer
///
/// A member-to-member transfer is a deposit by the debtor plus a refund to
/// the creditor; transfers touching the fund need only one side.
fn settlement_transactions(
    period_id: PeriodId,
    transfer: &SettlementTransfer,
    names: &HashMap<MemberId, String>,
    at: DateTime<Utc>,
) -> Vec<Transaction> {
    let name = |party: Party| match party {
        Party::Member(id) => names.get(&id).cloned().unwrap_or_else(|| id.to_string()),
        Party::PublicFund => party.to_string(),
    };

    let record = |kind: TransactionKind, party: Party, description: String| {
        let mut txn = Transaction::new(period_id, kind, transfer.amount, party);
        txn.description = description;
        txn.status = TransactionStatus::Approved;
        txn.settlement = true;
        txn.created_at = at;
        txn.updated_at = at;
        txn
    };

    match (transfer.from, transfer.to) {
        (Party::PublicFund, to) => vec![record(
            TransactionKind::Refund,
            to,
            "Settlement: public fund distribution".to_string(),
        )],
        (from, Party::PublicFund) => vec![record(
            TransactionKind::Deposit,
            from,
            "Settlement: payment into public fund".to_string(),
        )],
        (from, to) => vec![
            record(
                TransactionKind::Deposit,
                from,
                format!("Settlement payment to {}", name(to)),
            ),
            record(
                TransactionKind::Refund,
                to,
                format!("Settlement payment from {}", name(from)),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SplitpotPaths;
    use crate::models::{Member, PeriodStatus, SplitKind};
    use crate::services::transaction::{CreateTransactionInput, TransactionService};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitpotPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn setup_test_data(storage: &Storage) -> PeriodId {
        for (id, name) in [(1, "Ana"), (2, "Bo"), (3, "Cy")] {
            storage
                .members
                .upsert(Member::new(MemberId::new(id), name))
                .unwrap();
        }
        let period = Period::open("January 2025");
        let id = period.id;
        storage.periods.upsert(period).unwrap();
        id
    }

    /// A second handle on the same data directory, as another process has
    fn reopen_storage(temp_dir: &TempDir) -> Storage {
        let paths = SplitpotPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        storage
    }

    fn m(id: u32) -> Party {
        Party::Member(MemberId::new(id))
    }

    fn approved(service: &TransactionService<'_>, input: CreateTransactionInput) -> Transaction {
        let txn = service.create(input).unwrap();
        service.submit(txn.id).unwrap();
        service.approve(txn.id).unwrap()
    }

    #[test]
    fn test_close_and_reopen() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let service = PeriodService::new(&storage, &settings);

        let closed = service.close(period_id).unwrap();
        assert_eq!(closed.status, PeriodStatus::Closed);
        assert!(closed.closed_at.is_some());
        assert!(service.current().unwrap().is_none());

        let err = service.close(period_id).unwrap_err();
        assert!(matches!(err, SplitpotError::InvalidStateTransition { .. }));

        let reopened = service.reopen(period_id).unwrap();
        assert!(reopened.is_open());
    }

    #[test]
    fn test_reopen_refused_while_another_is_open() {
        let (_temp_dir, storage) = create_test_storage();
        let first = setup_test_data(&storage);
        let settings = Settings::default();
        let service = PeriodService::new(&storage, &settings);

        service.close(first).unwrap();
        storage.periods.upsert(Period::open("February 2025")).unwrap();

        assert!(service.reopen(first).unwrap_err().is_validation());
    }

    #[test]
    fn test_settle_requires_closed() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let service = PeriodService::new(&storage, &settings);

        let err = service.settle(period_id, None).unwrap_err();
        assert!(matches!(err, SplitpotError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_settle_member_debts() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let txns = TransactionService::new(&storage, &settings);
        let service = PeriodService::new(&storage, &settings);

        // Ana pays 1001 for everyone: Ana +667, Bo -334, Cy -333
        approved(
            &txns,
            CreateTransactionInput::expense(Money::from_cents(1001), m(1), SplitKind::Individual),
        );
        service.close(period_id).unwrap();

        let outcome = service.settle(period_id, None).unwrap();

        assert_eq!(outcome.transfers.len(), 2);
        assert_eq!(outcome.transactions.len(), 4);
        assert!(outcome
            .transactions
            .iter()
            .all(|t| t.settlement && t.status == TransactionStatus::Approved));
        assert_eq!(outcome.transactions[0].description, "Settlement payment to Ana");
        assert_eq!(outcome.transactions[1].description, "Settlement payment from Bo");

        assert_eq!(outcome.settled.status, PeriodStatus::Settled);
        assert!(outcome.settled.end_date.is_some());
        assert!(outcome.next.is_open());
        assert_eq!(service.current().unwrap().unwrap().id, outcome.next.id);

        let balances = BalanceService::new(&storage, &settings)
            .compute_balances(period_id)
            .unwrap();
        assert!(balances.is_settled());

        // Rotation starts over in the new period
        assert!(storage
            .members
            .get_all()
            .unwrap()
            .iter()
            .all(|m| !m.paid_remainder_in_cycle));
    }

    #[test]
    fn test_settle_fund_residual() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let txns = TransactionService::new(&storage, &settings);
        let service = PeriodService::new(&storage, &settings);

        // Ana deposits 150 that is never spent
        approved(&txns, CreateTransactionInput::deposit(Money::from_cents(150), m(1)));
        service.close(period_id).unwrap();

        let outcome = service.settle(period_id, None).unwrap();

        assert_eq!(
            outcome.transfers,
            vec![SettlementTransfer::new(Party::PublicFund, m(1), Money::from_cents(150))]
        );
        assert_eq!(outcome.transactions.len(), 1);
        let refund = &outcome.transactions[0];
        assert_eq!(refund.kind, TransactionKind::Refund);
        assert_eq!(refund.payer, m(1));
        assert_eq!(refund.description, "Settlement: public fund distribution");
    }

    #[test]
    fn test_settle_fronted_shared_expense() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let txns = TransactionService::new(&storage, &settings);
        let service = PeriodService::new(&storage, &settings);

        // Fund has no cash: it fronts the whole 900
        approved(
            &txns,
            CreateTransactionInput::expense(Money::from_cents(900), m(1), SplitKind::Shared),
        );
        service.close(period_id).unwrap();

        let outcome = service.settle(period_id, None).unwrap();

        assert_eq!(outcome.transfers.len(), 3);
        assert!(outcome.transfers.iter().all(|t| t.to == Party::PublicFund));
        assert!(outcome
            .transactions
            .iter()
            .all(|t| t.description == "Settlement: payment into public fund"));
    }

    #[test]
    fn test_settle_with_nothing_owed() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let service = PeriodService::new(&storage, &settings);

        service.close(period_id).unwrap();
        let outcome = service.settle(period_id, None).unwrap();

        assert!(outcome.transfers.is_empty());
        assert!(outcome.transactions.is_empty());
        assert_eq!(storage.periods.count().unwrap(), 2);
    }

    #[test]
    fn test_settled_period_is_immutable() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let service = PeriodService::new(&storage, &settings);

        service.close(period_id).unwrap();
        service.settle(period_id, None).unwrap();

        for err in [
            service.settle(period_id, None).unwrap_err(),
            service.close(period_id).unwrap_err(),
            service.reopen(period_id).unwrap_err(),
        ] {
            assert!(matches!(err, SplitpotError::PeriodImmutable(_)));
        }
    }

    #[test]
    fn test_concurrent_settlement_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let service = PeriodService::new(&storage, &settings);
        service.close(period_id).unwrap();

        let in_flight = storage.begin_settlement(period_id).unwrap();
        let err = service.settle(period_id, None).unwrap_err();
        assert!(matches!(err, SplitpotError::ConcurrentSettlementConflict(_)));
        assert!(err.is_retryable());

        drop(in_flight);
        assert!(service.settle(period_id, None).is_ok());
    }

    #[test]
    fn test_settlement_excluded_across_storage_instances() {
        let (temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let txns = TransactionService::new(&storage, &settings);
        let service = PeriodService::new(&storage, &settings);

        approved(
            &txns,
            CreateTransactionInput::expense(Money::from_cents(1001), m(1), SplitKind::Individual),
        );
        service.close(period_id).unwrap();

        // Both handles see the closed period before either settles
        let other = reopen_storage(&temp_dir);
        let other_service = PeriodService::new(&other, &settings);

        let in_flight = storage.begin_settlement(period_id).unwrap();
        assert!(matches!(
            other_service.settle(period_id, None).unwrap_err(),
            SplitpotError::ConcurrentSettlementConflict(_)
        ));
        drop(in_flight);

        service.settle(period_id, None).unwrap();

        // The stale handle re-reads the period and finds it settled
        assert!(matches!(
            other_service.settle(period_id, None).unwrap_err(),
            SplitpotError::PeriodImmutable(_)
        ));

        let settles = storage
            .audit()
            .read_all()
            .unwrap()
            .into_iter()
            .filter(|e| e.diff_summary.as_deref() == Some("status: closed -> settled"))
            .count();
        assert_eq!(settles, 1);

        let on_disk = reopen_storage(&temp_dir);
        assert_eq!(on_disk.transactions.count().unwrap(), 5);
        assert_eq!(on_disk.periods.count().unwrap(), 2);
    }

    #[test]
    fn test_rerun_after_partial_settlement_completes() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let txns = TransactionService::new(&storage, &settings);
        let service = PeriodService::new(&storage, &settings);

        approved(
            &txns,
            CreateTransactionInput::expense(Money::from_cents(1001), m(1), SplitKind::Individual),
        );
        service.close(period_id).unwrap();

        // An earlier attempt saved its settlement transactions, then failed
        // before the period was marked settled
        let balances = BalanceService::new(&storage, &settings)
            .compute_balances(period_id)
            .unwrap();
        let names = service.member_names().unwrap();
        for transfer in plan_settlement(&balances).unwrap() {
            for txn in settlement_transactions(period_id, &transfer, &names, Utc::now()) {
                storage.transactions.upsert(txn).unwrap();
            }
        }
        storage.transactions.save().unwrap();
        assert_eq!(
            storage.periods.get(period_id).unwrap().unwrap().status,
            PeriodStatus::Closed
        );

        let outcome = service.settle(period_id, None).unwrap();

        assert!(outcome.transfers.is_empty());
        assert!(outcome.transactions.is_empty());
        assert!(outcome.settled.is_settled());
        assert_eq!(storage.transactions.count().unwrap(), 5);
        assert!(BalanceService::new(&storage, &settings)
            .compute_balances(period_id)
            .unwrap()
            .is_settled());
    }

    #[test]
    fn test_settle_names_next_period() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let service = PeriodService::new(&storage, &settings);
        service.close(period_id).unwrap();

        for taken in ["  ", "JANUARY 2025"] {
            assert!(matches!(
                service.settle(period_id, Some(taken)).unwrap_err(),
                SplitpotError::Validation(_) | SplitpotError::Duplicate { .. }
            ));
        }
        assert_eq!(storage.periods.count().unwrap(), 1);

        let outcome = service.settle(period_id, Some(" Ski trip ")).unwrap();
        assert_eq!(outcome.next.name, "Ski trip");
        assert_eq!(service.current().unwrap().unwrap().name, "Ski trip");
    }

    #[test]
    fn test_rename() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let service = PeriodService::new(&storage, &settings);

        let renamed = service.rename(period_id, "Winter 2025").unwrap();
        assert_eq!(renamed.name, "Winter 2025");
        assert_eq!(service.find("winter 2025").unwrap().unwrap().id, period_id);

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(
            entries.last().unwrap().diff_summary.as_deref(),
            Some("name: January 2025 -> Winter 2025")
        );

        service.close(period_id).unwrap();
        let next = service.settle(period_id, Some("Spring 2025")).unwrap().next;

        assert!(matches!(
            service.rename(next.id, "winter 2025").unwrap_err(),
            SplitpotError::Duplicate { .. }
        ));
        assert!(matches!(
            service.rename(period_id, "Anything").unwrap_err(),
            SplitpotError::PeriodImmutable(_)
        ));
        assert_eq!(
            storage.periods.get(period_id).unwrap().unwrap().name,
            "Winter 2025"
        );
    }

    #[test]
    fn test_inconsistent_ledger_aborts_without_writes() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let service = PeriodService::new(&storage, &settings);

        // A stored expense whose shares don't cover the amount
        let mut broken = Transaction::new(
            period_id,
            TransactionKind::Expense,
            Money::from_cents(900),
            m(1),
        );
        broken.shares = vec![crate::models::Share::new(MemberId::new(2), Money::from_cents(800))];
        broken.status = TransactionStatus::Approved;
        storage.transactions.upsert(broken).unwrap();
        service.close(period_id).unwrap();

        let err = service.settle(period_id, None).unwrap_err();
        assert!(err.is_fatal());

        let period = storage.periods.get(period_id).unwrap().unwrap();
        assert_eq!(period.status, PeriodStatus::Closed);
        assert_eq!(storage.periods.count().unwrap(), 1);
        assert_eq!(storage.transactions.count().unwrap(), 1);
    }

    #[test]
    fn test_find_and_resolve() {
        let (_temp_dir, storage) = create_test_storage();
        let period_id = setup_test_data(&storage);
        let settings = Settings::default();
        let service = PeriodService::new(&storage, &settings);

        assert_eq!(service.find("january 2025").unwrap().unwrap().id, period_id);
        assert_eq!(
            service.find(&period_id.to_string()).unwrap().unwrap().id,
            period_id
        );
        assert_eq!(service.resolve(None).unwrap().id, period_id);
        assert!(service.resolve(Some("Never")).unwrap_err().is_not_found());
    }
}
