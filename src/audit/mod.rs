//! Audit logging for splitpot
//!
//! Every create, update and delete of a member, category, period or
//! transaction is appended to `audit.log` as one JSON object per line, with
//! before/after snapshots and a short diff summary.
//!
//! # Example
//!
//! ```rust,ignore
//! use splitpot::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(audit_log_path);
//! logger.log(&AuditEntry::create(
//!     EntityType::Member,
//!     member.id.to_string(),
//!     Some(member.name.clone()),
//!     &member,
//! ))?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
