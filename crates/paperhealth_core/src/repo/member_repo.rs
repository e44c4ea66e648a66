//! Family member repository contract and in-memory implementation.
//!
//! # Invariants
//! - At least one member always exists.
//! - Member ids are unique; list order is display order.

use crate::model::person::{Person, PersonId};
use crate::repo::{RepoError, RepoResult};
use std::collections::HashSet;

/// Repository interface for family members.
pub trait MemberRepository {
    fn revision(&self) -> u64;
    fn members(&self) -> &[Person];
    fn get_member(&self, id: &str) -> Option<&Person>;
    fn add_member(&mut self, person: Person) -> RepoResult<PersonId>;
    /// Removes one member. Rejected when it is the last one.
    fn remove_member(&mut self, id: &str) -> RepoResult<Person>;
    /// Replaces the whole member list atomically.
    fn replace_members(&mut self, members: Vec<Person>) -> RepoResult<()>;
}

/// Vec-backed member repository.
#[derive(Debug, Clone)]
pub struct InMemoryMemberRepository {
    members: Vec<Person>,
    revision: u64,
}

impl InMemoryMemberRepository {
    /// Creates a repository from a non-empty member list.
    pub fn new(members: Vec<Person>) -> RepoResult<Self> {
        ensure_member_list(&members)?;
        Ok(Self {
            members,
            revision: 0,
        })
    }
}

impl MemberRepository for InMemoryMemberRepository {
    fn revision(&self) -> u64 {
        self.revision
    }

    fn members(&self) -> &[Person] {
        &self.members
    }

    fn get_member(&self, id: &str) -> Option<&Person> {
        self.members.iter().find(|person| person.id == id)
    }

    fn add_member(&mut self, person: Person) -> RepoResult<PersonId> {
        if self.get_member(&person.id).is_some() {
            return Err(RepoError::DuplicateId(person.id));
        }
        let id = person.id.clone();
        self.members.push(person);
        self.revision += 1;
        Ok(id)
    }

    fn remove_member(&mut self, id: &str) -> RepoResult<Person> {
        let Some(index) = self.members.iter().position(|person| person.id == id) else {
            return Err(RepoError::PersonNotFound(id.to_string()));
        };
        if self.members.len() <= 1 {
            return Err(RepoError::LastMember);
        }
        let removed = self.members.remove(index);
        self.revision += 1;
        Ok(removed)
    }

    fn replace_members(&mut self, members: Vec<Person>) -> RepoResult<()> {
        ensure_member_list(&members)?;
        self.members = members;
        self.revision += 1;
        Ok(())
    }
}

fn ensure_member_list(members: &[Person]) -> RepoResult<()> {
    if members.is_empty() {
        return Err(RepoError::LastMember);
    }
    let mut seen = HashSet::with_capacity(members.len());
    for person in members {
        if !seen.insert(person.id.as_str()) {
            return Err(RepoError::DuplicateId(person.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{InMemoryMemberRepository, MemberRepository};
    use crate::model::person::{default_avatar_palette, Person};
    use crate::repo::RepoError;

    fn person(id: &str, name: &str) -> Person {
        Person::new(id, name, default_avatar_palette()[0].clone())
    }

    #[test]
    fn empty_member_list_is_rejected() {
        let err = InMemoryMemberRepository::new(Vec::new()).unwrap_err();
        assert_eq!(err, RepoError::LastMember);
    }

    #[test]
    fn removing_the_last_member_is_rejected() {
        let mut repo =
            InMemoryMemberRepository::new(vec![person("p1", "A"), person("p2", "B")]).unwrap();

        repo.remove_member("p1").unwrap();
        assert_eq!(repo.remove_member("p2").unwrap_err(), RepoError::LastMember);
        assert_eq!(repo.members().len(), 1);
        assert_eq!(repo.members()[0].id, "p2");
    }

    #[test]
    fn replace_rejects_duplicate_ids() {
        let mut repo = InMemoryMemberRepository::new(vec![person("p1", "A")]).unwrap();
        let err = repo
            .replace_members(vec![person("p2", "B"), person("p2", "C")])
            .unwrap_err();
        assert_eq!(err, RepoError::DuplicateId("p2".to_string()));
        assert_eq!(repo.members()[0].id, "p1");
    }
}
