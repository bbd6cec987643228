//! Display formatting for terminal output
//!
//! Turns models and service results into text for the CLI. List views are
//! rendered as tables; detail views are aligned label/value lines.

use std::collections::HashMap;

use crate::models::{Member, MemberId, Party};

pub mod balance;
pub mod category;
pub mod member;
pub mod period;
pub mod transaction;

pub use balance::{format_balances, format_period_summary, format_settlement_plan, format_status};
pub use category::format_category_list;
pub use member::{format_member_details, format_member_list};
pub use period::{format_period_list, format_settlement_outcome};
pub use transaction::{format_split_preview, format_transaction_details, format_transaction_list};

/// Member names for labelling parties
#[derive(Debug, Clone, Default)]
pub struct PartyNames(HashMap<MemberId, String>);

impl PartyNames {
    pub fn from_members<'m>(members: impl IntoIterator<Item = &'m Member>) -> Self {
        Self(members.into_iter().map(|m| (m.id, m.name.clone())).collect())
    }

    /// "Ana", "public fund", or the bare id for an unknown member
    pub fn label(&self, party: Party) -> String {
        match party {
            Party::Member(id) => self.member(id),
            Party::PublicFund => "public fund".to_string(),
        }
    }

    pub fn member(&self, id: MemberId) -> String {
        self.0.get(&id).cloned().unwrap_or_else(|| id.to_string())
    }
}

/// Truncate a string to at most `max_len` characters
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
