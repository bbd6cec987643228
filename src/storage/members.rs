//! Member repository for JSON storage
//!
//! Manages loading and saving members to members.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SplitpotError;
use crate::models::{Member, MemberId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_guard, write_guard};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MemberData {
    members: Vec<Member>,
}

/// Repository for member persistence
pub struct MemberRepository {
    path: PathBuf,
    data: RwLock<HashMap<MemberId, Member>>,
}

impl MemberRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load members from disk
    pub fn load(&self) -> Result<(), SplitpotError> {
        let file_data: MemberData = read_json(&self.path)?;

        let mut data = write_guard(&self.data)?;
        data.clear();
        data.extend(file_data.members.into_iter().map(|m| (m.id, m)));

        Ok(())
    }

    /// Merge the file's current records over the in-memory ones
    ///
    /// Picks up writes made by another process since `load`. Records that
    /// only exist in memory are kept.
    pub fn refresh(&self) -> Result<(), SplitpotError> {
        let file_data: MemberData = read_json(&self.path)?;

        let mut data = write_guard(&self.data)?;
        data.extend(file_data.members.into_iter().map(|m| (m.id, m)));

        Ok(())
    }

    /// Save members to disk
    pub fn save(&self) -> Result<(), SplitpotError> {
        let members = self.get_all()?;
        write_json_atomic(&self.path, &MemberData { members })
    }

    pub fn get(&self, id: MemberId) -> Result<Option<Member>, SplitpotError> {
        Ok(read_guard(&self.data)?.get(&id).cloned())
    }

    /// All members in ascending id order
    pub fn get_all(&self) -> Result<Vec<Member>, SplitpotError> {
        let data = read_guard(&self.data)?;
        let mut members: Vec<_> = data.values().cloned().collect();
        members.sort_by_key(|m| m.id);
        Ok(members)
    }

    /// Active members in ascending id order
    pub fn get_active(&self) -> Result<Vec<Member>, SplitpotError> {
        Ok(self.get_all()?.into_iter().filter(|m| m.active).collect())
    }

    /// Find a member by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Member>, SplitpotError> {
        let data = read_guard(&self.data)?;
        let name_lower = name.trim().to_lowercase();
        Ok(data
            .values()
            .find(|m| m.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// The id the next member will receive
    pub fn next_id(&self) -> Result<MemberId, SplitpotError> {
        let data = read_guard(&self.data)?;
        Ok(data
            .keys()
            .max()
            .map(|id| id.next())
            .unwrap_or_else(|| MemberId::new(1)))
    }

    pub fn upsert(&self, member: Member) -> Result<(), SplitpotError> {
        write_guard(&self.data)?.insert(member.id, member);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, SplitpotError> {
        Ok(read_guard(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, MemberRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = MemberRepository::new(temp_dir.path().join("members.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_ids_are_sequential() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        assert_eq!(repo.next_id().unwrap(), MemberId::new(1));
        repo.upsert(Member::new(MemberId::new(1), "Ana")).unwrap();
        repo.upsert(Member::new(MemberId::new(2), "Bo")).unwrap();
        assert_eq!(repo.next_id().unwrap(), MemberId::new(3));
    }

    #[test]
    fn test_active_filter_and_order() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Member::new(MemberId::new(3), "Cy")).unwrap();
        repo.upsert(Member::new(MemberId::new(1), "Ana")).unwrap();
        let mut bo = Member::new(MemberId::new(2), "Bo");
        bo.deactivate();
        repo.upsert(bo).unwrap();

        let all: Vec<_> = repo.get_all().unwrap().iter().map(|m| m.id.value()).collect();
        assert_eq!(all, vec![1, 2, 3]);

        let active: Vec<_> = repo.get_active().unwrap().iter().map(|m| m.id.value()).collect();
        assert_eq!(active, vec![1, 3]);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let mut ana = Member::new(MemberId::new(1), "Ana");
        ana.set_paid_remainder(true);
        repo.upsert(ana).unwrap();
        repo.save().unwrap();

        let reloaded = MemberRepository::new(temp_dir.path().join("members.json"));
        reloaded.load().unwrap();

        let ana = reloaded.get(MemberId::new(1)).unwrap().unwrap();
        assert!(ana.paid_remainder_in_cycle);
        assert_eq!(reloaded.count().unwrap(), 1);
    }

    #[test]
    fn test_get_by_name_ignores_case() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Member::new(MemberId::new(1), "Ana Lima")).unwrap();

        assert!(repo.get_by_name("ana lima").unwrap().is_some());
        assert!(repo.get_by_name("Ana").unwrap().is_none());
    }
}
