//! Member model
//!
//! A person taking part in the group's shared expenses, together with the
//! rotation flag used to hand out indivisible remainder cents fairly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::MemberId;

/// A group member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,

    pub name: String,

    /// Inactive members keep their balance but no longer share new expenses
    #[serde(default = "default_active")]
    pub active: bool,

    /// Whether this member already absorbed a remainder cent in the current
    /// rotation cycle
    #[serde(default)]
    pub paid_remainder_in_cycle: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Member {
    /// Create a new active member
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            active: true,
            paid_remainder_in_cycle: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    pub fn reactivate(&mut self) {
        self.active = true;
        self.updated_at = Utc::now();
    }

    pub fn set_paid_remainder(&mut self, paid: bool) {
        if self.paid_remainder_in_cycle != paid {
            self.paid_remainder_in_cycle = paid;
            self.updated_at = Utc::now();
        }
    }

    /// Whether a name is taken by the public fund on the command line
    pub fn is_reserved_name(name: &str) -> bool {
        let name = name.trim();
        RESERVED_NAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name))
    }

    /// Validate the member
    pub fn validate(&self) -> Result<(), MemberValidationError> {
        if self.name.trim().is_empty() {
            return Err(MemberValidationError::EmptyName);
        }

        if Self::is_reserved_name(&self.name) {
            return Err(MemberValidationError::ReservedName(self.name.trim().to_string()));
        }

        if self.name.len() > 50 {
            return Err(MemberValidationError::NameTooLong(self.name.len()));
        }

        Ok(())
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Names that refer to the public fund wherever a party is expected
pub const RESERVED_NAMES: [&str; 2] = ["fund", "public-fund"];

/// Validation errors for members
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyName,
    NameTooLong(usize),
    ReservedName(String),
}

impl fmt::Display for MemberValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Member name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Member name too long ({} chars, max 50)", len)
            }
            Self::ReservedName(name) => {
                write!(f, "'{}' is reserved for the public fund", name)
            }
        }
    }
}

impl std::error::Error for MemberValidationError {}
