//! Remainder rotation
//!
//! When an expense does not divide evenly, `amount % n` members absorb one
//! extra cent each. Members take turns: nobody absorbs a second cent until
//! everyone else in the rotation cycle has absorbed one.

use serde::{Deserialize, Serialize};

use crate::error::{SplitpotError, SplitpotResult};
use crate::models::{Member, MemberId};

/// A member's place in the remainder rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairnessRecord {
    pub member_id: MemberId,
    pub paid_remainder_in_cycle: bool,
}

impl FairnessRecord {
    pub fn new(member_id: MemberId, paid_remainder_in_cycle: bool) -> Self {
        Self {
            member_id,
            paid_remainder_in_cycle,
        }
    }
}

impl From<&Member> for FairnessRecord {
    fn from(member: &Member) -> Self {
        Self::new(member.id, member.paid_remainder_in_cycle)
    }
}

/// Result of a remainder allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainderAllocation {
    /// Members receiving an extra cent, in selection order
    pub recipients: Vec<MemberId>,
    /// Every input record with its updated flag, in ascending id order
    pub records: Vec<FairnessRecord>,
    /// Whether a rotation cycle completed during this allocation
    pub cycle_reset: bool,
}

impl RemainderAllocation {
    pub fn receives_extra(&self, member_id: MemberId) -> bool {
        self.recipients.contains(&member_id)
    }
}

/// Choose `count` members to absorb one extra cent each
///
/// Members are visited in ascending id order and the first `count` that have
/// not yet paid in this cycle are chosen. If too few remain, they are chosen
/// anyway (completing the cycle), every flag is reset, and selection resumes
/// from the start of the order, skipping members already chosen for this
/// expense.
pub fn allocate_remainder(
    records: &[FairnessRecord],
    count: usize,
) -> SplitpotResult<RemainderAllocation> {
    if count > 0 && records.is_empty() {
        return Err(SplitpotError::NoEligibleMembers);
    }
    if count >= records.len() && count > 0 {
        return Err(SplitpotError::Validation(format!(
            "Remainder of {} cents cannot be spread over {} members",
            count,
            records.len()
        )));
    }

    let mut records = records.to_vec();
    records.sort_by_key(|r| r.member_id);

    let mut recipients = Vec::with_capacity(count);
    for record in records.iter_mut() {
        if recipients.len() == count {
            break;
        }
        if !record.paid_remainder_in_cycle {
            record.paid_remainder_in_cycle = true;
            recipients.push(record.member_id);
        }
    }

    let mut cycle_reset = false;
    if recipients.len() < count {
        cycle_reset = true;
        for record in records.iter_mut() {
            record.paid_remainder_in_cycle = false;
        }
        for record in records.iter_mut() {
            if recipients.len() == count {
                break;
            }
            if !recipients.contains(&record.member_id) {
                record.paid_remainder_in_cycle = true;
                recipients.push(record.member_id);
            }
        }
    }

    Ok(RemainderAllocation {
        recipients,
        records,
        cycle_reset,
    })
}
