//! Member service
//!
//! Adds, renames, deactivates and looks up group members. Member ids are
//! handed out sequentially so the remainder rotation has a stable order.

use tracing::debug;

use crate::audit::EntityType;
use crate::error::{SplitpotError, SplitpotResult};
use crate::models::{Member, MemberId};
use crate::storage::Storage;

/// Service for member management
pub struct MemberService<'a> {
    storage: &'a Storage,
}

impl<'a> MemberService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Add a new active member
    pub fn add(&self, name: &str) -> SplitpotResult<Member> {
        let _gate = self.storage.begin_write()?;
        let name = name.trim();

        if self.storage.members.get_by_name(name)?.is_some() {
            return Err(SplitpotError::Duplicate {
                entity_type: "Member",
                identifier: name.to_string(),
            });
        }

        let member = Member::new(self.storage.members.next_id()?, name);
        member
            .validate()
            .map_err(|e| SplitpotError::Validation(e.to_string()))?;

        self.storage.members.upsert(member.clone())?;
        self.storage.members.save()?;

        self.storage.log_create(
            EntityType::Member,
            member.id.to_string(),
            Some(member.name.clone()),
            &member,
        )?;

        debug!(member = %member.id, "Added member");
        Ok(member)
    }

    pub fn get(&self, id: MemberId) -> SplitpotResult<Option<Member>> {
        self.storage.members.get(id)
    }

    /// Find a member by name or id ("3" or "mem-3")
    pub fn find(&self, identifier: &str) -> SplitpotResult<Option<Member>> {
        if let Some(member) = self.storage.members.get_by_name(identifier)? {
            return Ok(Some(member));
        }

        match identifier.trim().parse::<MemberId>() {
            Ok(id) => self.storage.members.get(id),
            Err(_) => Ok(None),
        }
    }

    /// Find a member or fail with a not-found error
    pub fn require(&self, identifier: &str) -> SplitpotResult<Member> {
        self.find(identifier)?
            .ok_or_else(|| SplitpotError::member_not_found(identifier))
    }

    /// List members in id order, optionally including inactive ones
    pub fn list(&self, include_inactive: bool) -> SplitpotResult<Vec<Member>> {
        if include_inactive {
            self.storage.members.get_all()
        } else {
            self.storage.members.get_active()
        }
    }

    pub fn rename(&self, id: MemberId, name: &str) -> SplitpotResult<Member> {
        let _gate = self.storage.begin_write()?;
        let name = name.trim();

        let mut member = self.load(id)?;
        if let Some(existing) = self.storage.members.get_by_name(name)? {
            if existing.id != id {
                return Err(SplitpotError::Duplicate {
                    entity_type: "Member",
                    identifier: name.to_string(),
                });
            }
        }

        let before = member.clone();
        member.name = name.to_string();
        member.updated_at = chrono::Utc::now();
        member
            .validate()
            .map_err(|e| SplitpotError::Validation(e.to_string()))?;

        self.persist(&before, &member, Some(format!("name: {} -> {}", before.name, member.name)))?;
        Ok(member)
    }

    /// Stop including a member in new splits; their balance still settles
    pub fn deactivate(&self, id: MemberId) -> SplitpotResult<Member> {
        let _gate = self.storage.begin_write()?;
        let mut member = self.load(id)?;

        if !member.active {
            return Err(SplitpotError::Validation(format!(
                "Member '{}' is already inactive",
                member.name
            )));
        }

        let before = member.clone();
        member.deactivate();
        self.persist(&before, &member, Some("active: true -> false".into()))?;
        Ok(member)
    }

    pub fn reactivate(&self, id: MemberId) -> SplitpotResult<Member> {
        let _gate = self.storage.begin_write()?;
        let mut member = self.load(id)?;

        if member.active {
            return Err(SplitpotError::Validation(format!(
                "Member '{}' is already active",
                member.name
            )));
        }

        let before = member.clone();
        member.reactivate();
        self.persist(&before, &member, Some("active: false -> true".into()))?;
        Ok(member)
    }

    fn load(&self, id: MemberId) -> SplitpotResult<Member> {
        self.storage
            .members
            .get(id)?
            .ok_or_else(|| SplitpotError::member_not_found(id.to_string()))
    }

    fn persist(&self, before: &Member, after: &Member, diff: Option<String>) -> SplitpotResult<()> {
        self.storage.members.upsert(after.clone())?;
        self.storage.members.save()?;
        self.storage.log_update(
            EntityType::Member,
            after.id.to_string(),
            Some(after.name.clone()),
            before,
            after,
            diff,
        )
    }
}
