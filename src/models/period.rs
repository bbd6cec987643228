//! Accounting period model and lifecycle
//!
//! A period moves `open → closed → settled`. A closed period may be reopened
//! while nothing else is open; a settled period is frozen for good.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PeriodId;
use crate::error::{SplitpotError, SplitpotResult};

/// Status of an accounting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Accepting new transactions
    #[default]
    Open,
    /// Frozen for new transactions, awaiting settlement
    Closed,
    /// Settled and immutable
    Settled,
}

impl PeriodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Settled => "settled",
        }
    }

    /// Apply a lifecycle action, validated against [`PERIOD_TRANSITIONS`]
    pub fn apply(self, action: PeriodAction) -> SplitpotResult<PeriodStatus> {
        if self == Self::Settled {
            return Err(SplitpotError::PeriodImmutable(format!(
                "cannot {} a settled period",
                action.as_str()
            )));
        }

        PERIOD_TRANSITIONS
            .iter()
            .find(|(from, act, _)| *from == self && *act == action)
            .map(|(_, _, to)| *to)
            .ok_or_else(|| SplitpotError::InvalidStateTransition {
                entity_type: "period",
                from: self.to_string(),
                action: action.as_str(),
            })
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle actions on a period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodAction {
    Close,
    Reopen,
    Settle,
}

impl PeriodAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Reopen => "reopen",
            Self::Settle => "settle",
        }
    }
}

/// Allowed period transitions
pub const PERIOD_TRANSITIONS: &[(PeriodStatus, PeriodAction, PeriodStatus)] = &[
    (PeriodStatus::Open, PeriodAction::Close, PeriodStatus::Closed),
    (PeriodStatus::Closed, PeriodAction::Reopen, PeriodStatus::Open),
    (PeriodStatus::Closed, PeriodAction::Settle, PeriodStatus::Settled),
];

/// An accounting period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,

    pub name: String,

    pub start_date: DateTime<Utc>,

    /// Set when the period settles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: PeriodStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Period {
    /// Open a new period starting now
    pub fn open(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PeriodId::new(),
            name: name.into(),
            start_date: now,
            end_date: None,
            status: PeriodStatus::Open,
            closed_at: None,
            settled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }

    pub fn is_settled(&self) -> bool {
        self.status == PeriodStatus::Settled
    }

    /// Move to `closed`
    pub fn close(&mut self) -> SplitpotResult<()> {
        self.status = self.status.apply(PeriodAction::Close)?;
        let now = Utc::now();
        self.closed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Move from `closed` back to `open`
    pub fn reopen(&mut self) -> SplitpotResult<()> {
        self.status = self.status.apply(PeriodAction::Reopen)?;
        self.closed_at = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move to `settled`, stamping the settlement time as the period end
    pub fn settle(&mut self, at: DateTime<Utc>) -> SplitpotResult<()> {
        self.status = self.status.apply(PeriodAction::Settle)?;
        self.settled_at = Some(at);
        self.end_date = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Give the period a new name; settled periods keep theirs
    pub fn rename(&mut self, name: &str) -> SplitpotResult<()> {
        self.ensure_mutable()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SplitpotError::Validation("Period name cannot be empty".into()));
        }
        self.name = name.to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Fail unless transactions in this period may still change
    pub fn ensure_mutable(&self) -> SplitpotResult<()> {
        if self.is_settled() {
            return Err(SplitpotError::PeriodImmutable(self.name.clone()));
        }
        Ok(())
    }

    /// Fail unless new transactions may be recorded in this period
    pub fn ensure_accepts_transactions(&self) -> SplitpotResult<()> {
        match self.status {
            PeriodStatus::Open => Ok(()),
            PeriodStatus::Closed => Err(SplitpotError::InvalidStateTransition {
                entity_type: "period",
                from: self.status.to_string(),
                action: "record transactions in",
            }),
            PeriodStatus::Settled => Err(SplitpotError::PeriodImmutable(self.name.clone())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.status)
    }
}

/// Render a period name from a strftime format, e.g. `"%B %Y"` → "October 2025"
pub fn period_name(format: &str, at: DateTime<Utc>) -> SplitpotResult<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(SplitpotError::Config(format!(
            "Invalid period name format: {}",
            format
        )));
    }
    Ok(at.format_with_items(items.into_iter()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_happy_path() {
        let mut period = Period::open("October 2025");
        assert!(period.is_open());

        period.close().unwrap();
        assert_eq!(period.status, PeriodStatus::Closed);
        assert!(period.closed_at.is_some());

        let at = Utc::now();
        period.settle(at).unwrap();
        assert!(period.is_settled());
        assert_eq!(period.settled_at, Some(at));
        assert_eq!(period.end_date, Some(at));
    }

    #[test]
    fn test_rename() {
        let mut period = Period::open("October 2025");
        period.rename("  Ski trip ").unwrap();
        assert_eq!(period.name, "Ski trip");
        assert!(matches!(
            period.rename(" ").unwrap_err(),
            SplitpotError::Validation(_)
        ));

        period.close().unwrap();
        period.settle(Utc::now()).unwrap();
        assert!(matches!(
            period.rename("Later").unwrap_err(),
            SplitpotError::PeriodImmutable(_)
        ));
        assert_eq!(period.name, "Ski trip");
    }

    #[test]
    fn test_settle_requires_closed() {
        let mut period = Period::open("P");
        let err = period.settle(Utc::now()).unwrap_err();
        assert!(matches!(err, SplitpotError::InvalidStateTransition { .. }));
        assert!(period.is_open());
    }

    #[test]
    fn test_reopen() {
        let mut period = Period::open("P");
        assert!(period.reopen().is_err());

        period.close().unwrap();
        period.reopen().unwrap();
        assert!(period.is_open());
        assert!(period.closed_at.is_none());
    }

    #[test]
    fn test_settled_is_immutable() {
        let mut period = Period::open("P");
        period.close().unwrap();
        period.settle(Utc::now()).unwrap();

        for result in [period.clone().close(), period.clone().reopen()] {
            assert!(matches!(result, Err(SplitpotError::PeriodImmutable(_))));
        }
        assert!(matches!(
            period.ensure_mutable(),
            Err(SplitpotError::PeriodImmutable(_))
        ));
    }

    #[test]
    fn test_closed_rejects_new_transactions() {
        let mut period = Period::open("P");
        assert!(period.ensure_accepts_transactions().is_ok());

        period.close().unwrap();
        let err = period.ensure_accepts_transactions().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot record transactions in period in state 'closed'"
        );
        assert!(period.ensure_mutable().is_ok());
    }

    #[test]
    fn test_period_name() {
        let at = Utc.with_ymd_and_hms(2025, 10, 3, 12, 0, 0).unwrap();
        assert_eq!(period_name("%B %Y", at).unwrap(), "October 2025");
        assert_eq!(period_name("%Y-%m", at).unwrap(), "2025-10");
        assert!(period_name("%Q", at).is_err());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&PeriodStatus::Settled).unwrap();
        assert_eq!(json, "\"settled\"");
    }
}
