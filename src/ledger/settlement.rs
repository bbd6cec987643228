//! Settlement planning
//!
//! Greedy settlement: the largest creditor is paid by the largest debtor
//! until every balance is zero, with ties going to the lower member id. Each
//! transfer zeroes at least one party, so `n` non-zero parties settle in at
//! most `n - 1` transfers. A residual in the public fund is cleared first so
//! the fund starts the next period empty.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{SplitpotError, SplitpotResult};
use crate::models::{Money, Party};

use super::balance::Balances;

/// A point-to-point payment that moves a debtor toward zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementTransfer {
    pub from: Party,
    pub to: Party,
    pub amount: Money,
}

impl SettlementTransfer {
    pub fn new(from: Party, to: Party, amount: Money) -> Self {
        Self { from, to, amount }
    }
}

/// Plan the transfers that bring every balance to zero
pub fn plan_settlement(balances: &Balances) -> SplitpotResult<Vec<SettlementTransfer>> {
    let total = balances.total();
    if !total.is_zero() {
        return Err(SplitpotError::SettlementInconsistency {
            residual: total.cents(),
        });
    }

    let mut open: BTreeMap<Party, Money> = balances.non_zero().into_iter().collect();
    let parties = open.len();
    let mut transfers = Vec::new();

    // Clear the public fund first
    loop {
        let fund = open.get(&Party::PublicFund).copied().unwrap_or_default();
        let counterpart = if fund.is_negative() {
            largest_creditor(&open, true)
        } else if fund.is_positive() {
            largest_debtor(&open, true)
        } else {
            None
        };
        let Some((party, amount)) = counterpart else {
            break;
        };

        let transfer = if fund.is_negative() {
            SettlementTransfer::new(Party::PublicFund, party, amount.min(-fund))
        } else {
            SettlementTransfer::new(party, Party::PublicFund, (-amount).min(fund))
        };
        record(&mut open, &mut transfers, transfer);
    }

    // Then members among themselves
    while let (Some((creditor, credit)), Some((debtor, debt))) =
        (largest_creditor(&open, false), largest_debtor(&open, false))
    {
        let transfer = SettlementTransfer::new(debtor, creditor, credit.min(-debt));
        record(&mut open, &mut transfers, transfer);
    }

    verify(balances, &transfers)?;

    debug!(parties, transfers = transfers.len(), "Planned settlement");
    Ok(transfers)
}

/// Replay a plan and fail unless it zeroes every balance
pub fn verify(balances: &Balances, transfers: &[SettlementTransfer]) -> SplitpotResult<()> {
    let mut replay = balances.clone();
    for transfer in transfers {
        if !transfer.amount.is_positive() {
            return Err(SplitpotError::SettlementInconsistency {
                residual: transfer.amount.cents(),
            });
        }
        replay.apply_transfer(transfer);
    }

    if replay.is_settled() {
        Ok(())
    } else {
        let outstanding: Money = replay
            .iter()
            .map(|(_, amount)| amount)
            .filter(|amount| amount.is_positive())
            .sum();
        Err(SplitpotError::SettlementInconsistency {
            residual: outstanding.cents(),
        })
    }
}

fn record(
    open: &mut BTreeMap<Party, Money>,
    transfers: &mut Vec<SettlementTransfer>,
    transfer: SettlementTransfer,
) {
    for (party, delta) in [(transfer.from, transfer.amount), (transfer.to, -transfer.amount)] {
        if let Some(balance) = open.get_mut(&party) {
            *balance += delta;
            if balance.is_zero() {
                open.remove(&party);
            }
        }
    }
    transfers.push(transfer);
}

/// Largest positive balance; the first in party order wins ties
fn largest_creditor(open: &BTreeMap<Party, Money>, skip_fund: bool) -> Option<(Party, Money)> {
    open.iter()
        .filter(|(party, amount)| amount.is_positive() && !(skip_fund && party.is_fund()))
        .fold(None, |best: Option<(Party, Money)>, (party, amount)| match best {
            Some((_, top)) if top >= *amount => best,
            _ => Some((*party, *amount)),
        })
}

/// Most negative balance; the first in party order wins ties
fn largest_debtor(open: &BTreeMap<Party, Money>, skip_fund: bool) -> Option<(Party, Money)> {
    open.iter()
        .filter(|(party, amount)| amount.is_negative() && !(skip_fund && party.is_fund()))
        .fold(None, |best: Option<(Party, Money)>, (party, amount)| match best {
            Some((_, bottom)) if bottom <= *amount => best,
            _ => Some((*party, *amount)),
        })
}
