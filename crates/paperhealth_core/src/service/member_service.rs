//! Family member management.
//!
//! # Responsibility
//! - Provide a draft editor for add/rename/recolor/delete.
//! - Commit drafts atomically after validation.
//!
//! # Invariants
//! - A committed member list is non-empty and every name is non-blank.
//! - Deleting a member never touches records that reference it.

use crate::model::person::{
    default_avatar_color, default_avatar_palette, new_person_id, next_palette_color,
    palette_color_for, AvatarColor, Person, PersonId,
};
use crate::repo::member_repo::MemberRepository;
use crate::service::command::{CommandError, CommandOutcome, CommandResult, ValidationError};
use crate::service::confirm::{ConfirmPrompt, Confirmer, Decision};
use log::{debug, info};

/// Unsaved copy of the member list being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEditor {
    members: Vec<Person>,
    palette: Vec<AvatarColor>,
}

impl MemberEditor {
    pub fn new(members: Vec<Person>, palette: Vec<AvatarColor>) -> Self {
        let palette = if palette.is_empty() {
            default_avatar_palette()
        } else {
            palette
        };
        Self { members, palette }
    }

    pub fn members(&self) -> &[Person] {
        &self.members
    }

    /// Appends a new member with the next palette color.
    pub fn add_member(&mut self, name: &str) -> Result<PersonId, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let color = palette_color_for(&self.palette, self.members.len())
            .unwrap_or_else(|| self.palette_fallback());
        let id = new_person_id();
        self.members.push(Person::new(id.clone(), trimmed, color));
        Ok(id)
    }

    /// Renames one member in the draft. Blank names are caught on save.
    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        match self.members.iter_mut().find(|person| person.id == id) {
            Some(person) => {
                person.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Advances one member to the next palette color.
    pub fn recolor(&mut self, id: &str) -> Option<AvatarColor> {
        let fallback = self.palette_fallback();
        let person = self.members.iter_mut().find(|person| person.id == id)?;
        let next = next_palette_color(&self.palette, &person.avatar_color).unwrap_or(fallback);
        person.avatar_color = next.clone();
        Some(next)
    }

    /// Removes one member from the draft after confirmation.
    ///
    /// Returns `Applied(false)` for an unknown id. Deleting the only member
    /// left is rejected before prompting.
    pub fn delete_member(
        &mut self,
        id: &str,
        confirmer: &mut dyn Confirmer,
    ) -> CommandResult<bool> {
        let Some(index) = self.members.iter().position(|person| person.id == id) else {
            debug!("event=member_delete module=service status=skipped reason=not_found");
            return Ok(CommandOutcome::Applied(false));
        };
        if self.members.len() <= 1 {
            return Err(ValidationError::LastMember.into());
        }
        if confirmer.request_confirmation(&ConfirmPrompt::delete_member()) == Decision::Declined {
            return Ok(CommandOutcome::Declined);
        }
        self.members.remove(index);
        Ok(CommandOutcome::Applied(true))
    }

    /// Validates the draft and returns the member list to commit.
    pub fn finish(self) -> Result<Vec<Person>, ValidationError> {
        validate_members(&self.members)?;
        Ok(self.members)
    }

    fn palette_fallback(&self) -> AvatarColor {
        self.palette
            .first()
            .cloned()
            .unwrap_or_else(default_avatar_color)
    }
}

fn validate_members(members: &[Person]) -> Result<(), ValidationError> {
    if members.is_empty() {
        return Err(ValidationError::LastMember);
    }
    if members.iter().any(|person| !person.has_name()) {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

/// Member service facade over a repository implementation.
pub struct MemberService<M: MemberRepository> {
    repo: M,
    palette: Vec<AvatarColor>,
}

impl<M: MemberRepository> MemberService<M> {
    pub fn new(repo: M, palette: Vec<AvatarColor>) -> Self {
        Self { repo, palette }
    }

    pub fn members(&self) -> &[Person] {
        self.repo.members()
    }

    pub fn get_member(&self, id: &str) -> Option<&Person> {
        self.repo.get_member(id)
    }

    /// Opens a draft over the current member list.
    pub fn editor(&self) -> MemberEditor {
        MemberEditor::new(self.repo.members().to_vec(), self.palette.clone())
    }

    /// Validates and commits a full member list. Names are stored trimmed.
    pub fn save_members(&mut self, members: Vec<Person>) -> Result<(), CommandError> {
        validate_members(&members)?;
        let members = members
            .into_iter()
            .map(|mut person| {
                person.name = person.name.trim().to_string();
                person
            })
            .collect::<Vec<_>>();
        let count = members.len();
        self.repo.replace_members(members)?;
        info!("event=members_save module=service status=ok count={count}");
        Ok(())
    }
}
