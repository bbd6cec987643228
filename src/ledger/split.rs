//! Expense splitting
//!
//! Turns an expense into exact integer-cent shares. Equal splits give every
//! active member `amount / n` cents and hand the `amount % n` leftover cents
//! out one each through the remainder rotation.

use crate::error::{SplitpotError, SplitpotResult};
use crate::models::{MemberId, Money, Party, Share, SplitKind};

use super::rotation::{allocate_remainder, FairnessRecord, RemainderAllocation};

/// The result of splitting one expense
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Who is credited for the expense; the public fund for shared splits
    pub payer: Party,
    /// Per-member portions in ascending member id order
    pub shares: Vec<Share>,
    /// Net change to the payer's balance
    pub payer_delta: Money,
    /// Portion of a shared expense paid from the fund's cash on hand
    pub fund_covered: Money,
    /// Rotation outcome, when the split left a remainder to hand out
    pub rotation: Option<RemainderAllocation>,
}

impl SplitOutcome {
    pub fn remainder_recipients(&self) -> Vec<MemberId> {
        self.rotation
            .as_ref()
            .map(|r| r.recipients.clone())
            .unwrap_or_default()
    }

    pub fn share_for(&self, member_id: MemberId) -> Money {
        self.shares
            .iter()
            .filter(|s| s.member_id == member_id)
            .map(|s| s.amount)
            .sum()
    }
}

/// Split an expense among the active roster
///
/// `roster` holds the fairness records of the active members. `fund_available`
/// is the public fund's cash on hand and only matters for shared splits.
pub fn split_expense(
    amount: Money,
    kind: SplitKind,
    payer: Party,
    roster: &[FairnessRecord],
    fund_available: Money,
) -> SplitpotResult<SplitOutcome> {
    if !amount.is_positive() {
        return Err(SplitpotError::InvalidAmount(format!(
            "{} cents (must be a positive whole number of cents)",
            amount.cents()
        )));
    }

    match kind {
        SplitKind::Individual => {
            let payer_id = member_payer(payer, kind)?;
            let (shares, rotation) = equal_shares(amount, roster)?;
            let own_share: Money = shares
                .iter()
                .filter(|s| s.member_id == payer_id)
                .map(|s| s.amount)
                .sum();

            Ok(SplitOutcome {
                payer,
                shares,
                payer_delta: amount - own_share,
                fund_covered: Money::zero(),
                rotation,
            })
        }

        SplitKind::Personal => {
            let payer_id = member_payer(payer, kind)?;
            Ok(SplitOutcome {
                payer,
                shares: vec![Share::new(payer_id, amount)],
                payer_delta: -amount,
                fund_covered: Money::zero(),
                rotation: None,
            })
        }

        SplitKind::Shared => {
            let (shares, rotation) = equal_shares(amount, roster)?;
            let available = if fund_available.is_positive() {
                fund_available
            } else {
                Money::zero()
            };

            Ok(SplitOutcome {
                payer: Party::PublicFund,
                shares,
                payer_delta: amount,
                fund_covered: amount.min(available),
                rotation,
            })
        }
    }
}

fn member_payer(payer: Party, kind: SplitKind) -> SplitpotResult<MemberId> {
    payer.member_id().ok_or_else(|| {
        SplitpotError::Validation(format!(
            "The public fund cannot pay for a {} expense; use a shared split",
            kind
        ))
    })
}

/// Equal shares with the leftover cents rotated
fn equal_shares(
    amount: Money,
    roster: &[FairnessRecord],
) -> SplitpotResult<(Vec<Share>, Option<RemainderAllocation>)> {
    if roster.is_empty() {
        return Err(SplitpotError::NoEligibleMembers);
    }

    let n = roster.len() as i64;
    let base = amount.cents() / n;
    let remainder = (amount.cents() % n) as usize;

    let rotation = if remainder > 0 {
        Some(allocate_remainder(roster, remainder)?)
    } else {
        None
    };

    let mut members: Vec<MemberId> = roster.iter().map(|r| r.member_id).collect();
    members.sort();

    let shares = members
        .into_iter()
        .map(|id| {
            let extra = rotation
                .as_ref()
                .map_or(false, |r| r.receives_extra(id));
            Share::new(id, Money::from_cents(base + i64::from(extra)))
        })
        .collect();

    Ok((shares, rotation))
}
