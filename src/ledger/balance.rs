//! Balance calculation
//!
//! Folds a period's counted transactions into a signed balance per party.
//! Positive means the party is owed money, negative means it owes. The
//! public fund is the counterparty of every cash movement into or out of the
//! pot, so the balances of all parties always sum to zero.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{SplitpotError, SplitpotResult};
use crate::models::{BalanceInclusion, MemberId, Money, Party, SplitKind, Transaction, TransactionKind};

use super::settlement::SettlementTransfer;

/// Signed balances keyed by party, in party order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    entries: BTreeMap<Party, Money>,
}

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from zero for every member given, plus the public fund
    pub fn for_members(members: impl IntoIterator<Item = MemberId>) -> Self {
        let mut entries: BTreeMap<Party, Money> = members
            .into_iter()
            .map(|id| (Party::Member(id), Money::zero()))
            .collect();
        entries.insert(Party::PublicFund, Money::zero());
        Self { entries }
    }

    pub fn get(&self, party: Party) -> Money {
        self.entries.get(&party).copied().unwrap_or_default()
    }

    pub fn member(&self, id: MemberId) -> Money {
        self.get(Party::Member(id))
    }

    pub fn fund(&self) -> Money {
        self.get(Party::PublicFund)
    }

    /// Cash the public fund holds on behalf of members
    pub fn fund_available(&self) -> Money {
        let fund = self.fund();
        if fund.is_negative() {
            -fund
        } else {
            Money::zero()
        }
    }

    /// Add a signed amount to a party's balance
    pub fn adjust(&mut self, party: Party, delta: Money) {
        *self.entries.entry(party).or_default() += delta;
    }

    /// Sum over every party; zero for a consistent ledger
    pub fn total(&self) -> Money {
        self.entries.values().sum()
    }

    /// Whether every balance is zero
    pub fn is_settled(&self) -> bool {
        self.entries.values().all(Money::is_zero)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Party, Money)> + '_ {
        self.entries.iter().map(|(party, amount)| (*party, *amount))
    }

    /// Member balances only, in ascending id order
    pub fn members(&self) -> impl Iterator<Item = (MemberId, Money)> + '_ {
        self.iter()
            .filter_map(|(party, amount)| party.member_id().map(|id| (id, amount)))
    }

    /// Parties with a non-zero balance
    pub fn non_zero(&self) -> Vec<(Party, Money)> {
        self.iter().filter(|(_, amount)| !amount.is_zero()).collect()
    }

    /// Apply a settlement transfer: the payer's debt shrinks and the
    /// receiver's claim shrinks by the same amount
    pub fn apply_transfer(&mut self, transfer: &SettlementTransfer) {
        self.adjust(transfer.from, transfer.amount);
        self.adjust(transfer.to, -transfer.amount);
    }

    /// Fold one transaction in, failing if it would break conservation
    pub fn fold(&mut self, txn: &Transaction) -> SplitpotResult<()> {
        let postings = postings(txn);
        let net: Money = postings.iter().map(|(_, amount)| *amount).sum();
        if !net.is_zero() {
            return Err(SplitpotError::SettlementInconsistency {
                residual: net.cents(),
            });
        }

        for (party, delta) in postings {
            self.adjust(party, delta);
        }

        let total = self.total();
        if !total.is_zero() {
            return Err(SplitpotError::SettlementInconsistency {
                residual: total.cents(),
            });
        }
        Ok(())
    }
}

impl FromIterator<(Party, Money)> for Balances {
    fn from_iter<I: IntoIterator<Item = (Party, Money)>>(iter: I) -> Self {
        let mut balances = Balances::new();
        for (party, amount) in iter {
            balances.adjust(party, amount);
        }
        balances
    }
}

/// The balance changes a transaction causes
///
/// | kind | effect |
/// |------|--------|
/// | expense (individual, shared) | payer += amount; each share member −= share |
/// | expense (personal) | payer −= amount; fund += amount |
/// | deposit | depositor += amount; fund −= amount |
/// | refund | recipient −= amount; fund += amount |
pub fn postings(txn: &Transaction) -> Vec<(Party, Money)> {
    match (txn.kind, txn.split_kind) {
        (TransactionKind::Expense, SplitKind::Personal) => {
            vec![(txn.payer, -txn.amount), (Party::PublicFund, txn.amount)]
        }
        (TransactionKind::Expense, _) => {
            let mut postings = Vec::with_capacity(txn.shares.len() + 1);
            postings.push((txn.payer, txn.amount));
            postings.extend(
                txn.shares
                    .iter()
                    .map(|share| (Party::Member(share.member_id), -share.amount)),
            );
            postings
        }
        (TransactionKind::Deposit, _) => {
            vec![(txn.payer, txn.amount), (Party::PublicFund, -txn.amount)]
        }
        (TransactionKind::Refund, _) => {
            vec![(txn.payer, -txn.amount), (Party::PublicFund, txn.amount)]
        }
    }
}

/// Folds transactions into balances under an inclusion policy
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceCalculator {
    inclusion: BalanceInclusion,
}

impl BalanceCalculator {
    pub fn new(inclusion: BalanceInclusion) -> Self {
        Self { inclusion }
    }

    /// Whether a transaction counts under this calculator's policy
    pub fn counts(&self, txn: &Transaction) -> bool {
        txn.status.counts_toward_balance(self.inclusion)
    }

    /// Compute balances for every roster member and the public fund
    pub fn compute<'t>(
        &self,
        transactions: impl IntoIterator<Item = &'t Transaction>,
        roster: impl IntoIterator<Item = MemberId>,
    ) -> SplitpotResult<Balances> {
        let mut balances = Balances::for_members(roster);
        let mut folded = 0usize;

        for txn in transactions.into_iter().filter(|t| self.counts(t)) {
            balances.fold(txn)?;
            folded += 1;
        }

        debug!(folded, total = balances.total().cents(), "Folded balances");
        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::rotation::FairnessRecord;
    use crate::ledger::split::split_expense;
    use crate::models::{PeriodId, Share, TransactionStatus};
    use proptest::prelude::*;

    fn member(id: u32) -> MemberId {
        MemberId::new(id)
    }

    fn approved(mut txn: Transaction) -> Transaction {
        txn.status = TransactionStatus::Approved;
        txn
    }

    fn expense(period: PeriodId, payer: u32, amount: i64, members: u32) -> Transaction {
        let roster: Vec<FairnessRecord> = (1..=members)
            .map(|i| FairnessRecord::new(member(i), false))
            .collect();
        let outcome = split_expense(
            Money::from_cents(amount),
            SplitKind::Individual,
            Party::Member(member(payer)),
            &roster,
            Money::zero(),
        )
        .unwrap();
        let mut txn = Transaction::new(
            period,
            TransactionKind::Expense,
            Money::from_cents(amount),
            Party::Member(member(payer)),
        );
        txn.shares = outcome.shares;
        approved(txn)
    }

    fn cash(period: PeriodId, kind: TransactionKind, who: u32, amount: i64) -> Transaction {
        approved(Transaction::new(
            period,
            kind,
            Money::from_cents(amount),
            Party::Member(member(who)),
        ))
    }

    #[test]
    fn test_individual_expense_balances() {
        let period = PeriodId::new();
        let txn = expense(period, 1, 1001, 3);

        let balances = BalanceCalculator::default()
            .compute([&txn], [member(1), member(2), member(3)])
            .unwrap();

        assert_eq!(balances.member(member(1)).cents(), 1001 - 334);
        assert_eq!(balances.member(member(2)).cents(), -334);
        assert_eq!(balances.member(member(3)).cents(), -333);
        assert_eq!(balances.fund(), Money::zero());
        assert!(balances.total().is_zero());
    }

    #[test]
    fn test_deposit_refund_and_personal_go_through_fund() {
        let period = PeriodId::new();
        let deposit = cash(period, TransactionKind::Deposit, 1, 1000);
        let refund = cash(period, TransactionKind::Refund, 2, 300);
        let mut personal = cash(period, TransactionKind::Expense, 3, 200);
        personal.split_kind = SplitKind::Personal;

        let balances = BalanceCalculator::default()
            .compute([&deposit, &refund, &personal], [member(1), member(2), member(3)])
            .unwrap();

        assert_eq!(balances.member(member(1)).cents(), 1000);
        assert_eq!(balances.member(member(2)).cents(), -300);
        assert_eq!(balances.member(member(3)).cents(), -200);
        assert_eq!(balances.fund().cents(), -500);
        assert_eq!(balances.fund_available().cents(), 500);
        assert!(balances.total().is_zero());
    }

    #[test]
    fn test_shared_expense_draws_on_fund() {
        let period = PeriodId::new();
        let deposit = cash(period, TransactionKind::Deposit, 1, 600);
        let mut shared = expense(period, 1, 900, 3);
        shared.payer = Party::PublicFund;
        shared.split_kind = SplitKind::Shared;
        shared.fund_covered = Money::from_cents(600);

        let balances = BalanceCalculator::default()
            .compute([&deposit, &shared], [member(1), member(2), member(3)])
            .unwrap();

        // The fund spent its 600 of cash and fronted 300 more
        assert_eq!(balances.fund().cents(), 300);
        assert_eq!(balances.member(member(1)).cents(), 300);
        assert_eq!(balances.member(member(2)).cents(), -300);
        assert_eq!(balances.member(member(3)).cents(), -300);
        assert!(balances.total().is_zero());
    }

    #[test]
    fn test_only_approved_counts_by_default() {
        let period = PeriodId::new();
        let mut pending = expense(period, 1, 300, 3);
        pending.status = TransactionStatus::Pending;
        let mut rejected = expense(period, 2, 300, 3);
        rejected.status = TransactionStatus::Rejected;
        let mut draft = expense(period, 3, 300, 3);
        draft.status = TransactionStatus::Draft;
        let roster = [member(1), member(2), member(3)];

        let strict = BalanceCalculator::default()
            .compute([&pending, &rejected, &draft], roster)
            .unwrap();
        assert!(strict.is_settled());

        let lenient = BalanceCalculator::new(BalanceInclusion::NonDraft)
            .compute([&pending, &rejected, &draft], roster)
            .unwrap();
        assert_eq!(lenient.member(member(1)).cents(), 200);
    }

    #[test]
    fn test_corrupt_shares_are_reported() {
        let period = PeriodId::new();
        let mut txn = expense(period, 1, 300, 3);
        txn.shares.push(Share::new(member(3), Money::from_cents(1)));

        let err = BalanceCalculator::default()
            .compute([&txn], [member(1), member(2), member(3)])
            .unwrap_err();
        assert!(matches!(
            err,
            SplitpotError::SettlementInconsistency { residual: -1 }
        ));
    }

    #[test]
    fn test_apply_transfer() {
        let mut balances: Balances = [
            (Party::Member(member(1)), Money::from_cents(500)),
            (Party::Member(member(2)), Money::from_cents(-500)),
        ]
        .into_iter()
        .collect();

        balances.apply_transfer(&SettlementTransfer::new(
            Party::Member(member(2)),
            Party::Member(member(1)),
            Money::from_cents(500),
        ));
        assert!(balances.is_settled());
    }

    /// A generated transaction: (kind selector, payer, amount)
    fn arb_ops() -> impl Strategy<Value = Vec<(u8, u32, i64)>> {
        prop::collection::vec((0u8..5, 1u32..5, 1i64..100_000), 1..40)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn prop_balances_always_sum_to_zero(ops in arb_ops()) {
            let period = PeriodId::new();
            let roster: Vec<MemberId> = (1..=4).map(member).collect();
            let mut balances = Balances::for_members(roster.iter().copied());

            for (selector, payer, amount) in ops {
                let txn = match selector {
                    0 => expense(period, payer, amount, 4),
                    1 => cash(period, TransactionKind::Deposit, payer, amount),
                    2 => cash(period, TransactionKind::Refund, payer, amount),
                    3 => {
                        let mut txn = cash(period, TransactionKind::Expense, payer, amount);
                        txn.split_kind = SplitKind::Personal;
                        txn
                    }
                    _ => {
                        let mut txn = expense(period, payer, amount, 4);
                        txn.payer = Party::PublicFund;
                        txn.split_kind = SplitKind::Shared;
                        txn
                    }
                };

                let before = balances.clone();
                balances.fold(&txn).unwrap();
                prop_assert!(balances.total().is_zero());

                if selector == 3 {
                    // Personal expenses move only the payer among members
                    for id in &roster {
                        let delta = balances.member(*id) - before.member(*id);
                        let expected = if *id == member(payer) { -amount } else { 0 };
                        prop_assert_eq!(delta.cents(), expected);
                    }
                }
            }
        }
    }
}
