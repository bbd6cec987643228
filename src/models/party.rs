//! Ledger parties
//!
//! Every money movement is between parties: real members, or the group's
//! public fund (the shared pot). The fund is a variant of its own rather than
//! a reserved member id, so every match over parties stays exhaustive.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::MemberId;

/// A participant in the ledger
///
/// Orders members by ascending id, with the public fund last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum Party {
    Member(MemberId),
    PublicFund,
}

impl Party {
    pub fn member_id(&self) -> Option<MemberId> {
        match self {
            Party::Member(id) => Some(*id),
            Party::PublicFund => None,
        }
    }

    pub fn is_fund(&self) -> bool {
        matches!(self, Party::PublicFund)
    }
}

impl From<MemberId> for Party {
    fn from(id: MemberId) -> Self {
        Party::Member(id)
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Member(id) => write!(f, "{}", id),
            Party::PublicFund => write!(f, "public fund"),
        }
    }
}
