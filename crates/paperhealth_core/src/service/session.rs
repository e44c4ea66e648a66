//! Timeline session: the single owner of mutable UI-facing state.
//!
//! # Responsibility
//! - Own the record and member stores, active person, search query,
//!   selection state and the open detail record.
//! - Route shell events (tap, long-press, cancel, confirmed commands) to the
//!   selection machine and command handlers.
//!
//! # Invariants
//! - The active person always refers to an existing member after a save.
//! - Events referencing unknown record ids are ignored.
//! - Selection never holds ids of records deleted through this session.

use crate::config::CoreConfig;
use crate::model::person::{Person, PersonId};
use crate::model::record::{MedicalRecord, RecordId};
use crate::repo::member_repo::{InMemoryMemberRepository, MemberRepository};
use crate::repo::record_repo::{InMemoryRecordRepository, RecordRepository};
use crate::search::timeline::{TimelineResult, TimelineView};
use crate::selection::machine::{SelectionState, SelectionSummary, TapOutcome};
use crate::service::command::{CommandError, CommandResult, ValidationError};
use crate::service::confirm::Confirmer;
use crate::service::member_service::{MemberEditor, MemberService};
use crate::service::record_service::{GroupSummary, RecordService};
use log::{debug, info};

/// Session state for one running shell.
pub struct TimelineSession<R = InMemoryRecordRepository, M = InMemoryMemberRepository>
where
    R: RecordRepository,
    M: MemberRepository,
{
    config: CoreConfig,
    records: RecordService<R>,
    members: MemberService<M>,
    active_person_id: PersonId,
    query: String,
    selection: SelectionState,
    open_record_id: Option<RecordId>,
    timeline: TimelineView,
}

impl<R: RecordRepository, M: MemberRepository> TimelineSession<R, M> {
    /// Creates a session with the first member active.
    pub fn new(records: R, members: M, config: CoreConfig) -> Self {
        let active_person_id = members
            .members()
            .first()
            .map(|person| person.id.clone())
            .unwrap_or_default();
        let palette = config.avatar_palette.clone();
        Self {
            config,
            records: RecordService::new(records),
            members: MemberService::new(members, palette),
            active_person_id,
            query: String::new(),
            selection: SelectionState::new(),
            open_record_id: None,
            timeline: TimelineView::new(),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn records(&self) -> &[MedicalRecord] {
        self.records.repo().records()
    }

    pub fn members(&self) -> &[Person] {
        self.members.members()
    }

    pub fn active_person_id(&self) -> &str {
        &self.active_person_id
    }

    /// Active member, falling back to the first member.
    pub fn active_person(&self) -> Option<&Person> {
        self.members
            .get_member(&self.active_person_id)
            .or_else(|| self.members.members().first())
    }

    /// Switches the active person. Unknown ids are ignored.
    pub fn set_active_person(&mut self, person_id: &str) -> bool {
        if self.members.get_member(person_id).is_none() {
            debug!("event=person_switch module=session status=skipped reason=not_found");
            return false;
        }
        self.active_person_id = person_id.to_string();
        true
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Records to render for the active person and query, newest first.
    pub fn visible_records(&mut self) -> TimelineResult<&[MedicalRecord]> {
        self.timeline.refresh(
            self.records.repo(),
            &self.active_person_id,
            &self.query,
            self.config.invalid_date_policy,
        )
    }

    /// How many times the visible list was recomputed.
    pub fn timeline_computations(&self) -> u64 {
        self.timeline.computations()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_summary(&self) -> SelectionSummary {
        self.selection.summary()
    }

    /// Handles a tap on a timeline card. Unknown ids yield `None`.
    pub fn tap(&mut self, record_id: &str) -> Option<TapOutcome> {
        if self.records.get_record(record_id).is_none() {
            debug!("event=record_tap module=session status=skipped reason=not_found");
            return None;
        }
        let outcome = self.selection.tap(record_id);
        if let TapOutcome::OpenDetail(id) = &outcome {
            self.open_record_id = Some(id.clone());
        }
        Some(outcome)
    }

    /// Handles a long-press. Returns `true` when selection mode was entered.
    pub fn long_press(&mut self, record_id: &str) -> bool {
        if self.records.get_record(record_id).is_none() {
            return false;
        }
        self.selection.long_press(record_id)
    }

    pub fn cancel_selection(&mut self) {
        self.selection.cancel();
    }

    /// The record shown in the detail view, if it still exists.
    pub fn open_record(&self) -> Option<&MedicalRecord> {
        self.open_record_id
            .as_deref()
            .and_then(|id| self.records.get_record(id))
    }

    pub fn close_detail(&mut self) {
        self.open_record_id = None;
    }

    pub fn add_record(&mut self, record: MedicalRecord) -> Result<RecordId, CommandError> {
        self.records.add_record(record)
    }

    /// Replaces one record. Returns `false` when it no longer exists.
    pub fn update_record(&mut self, record: MedicalRecord) -> Result<bool, CommandError> {
        self.records.update_record(record)
    }

    pub fn delete_selected(&mut self, confirmer: &mut dyn Confirmer) -> CommandResult<usize> {
        let outcome = self.records.delete_selected(&mut self.selection, confirmer)?;
        self.drop_stale_detail();
        Ok(outcome)
    }

    pub fn group_selected(&mut self, confirmer: &mut dyn Confirmer) -> CommandResult<GroupSummary> {
        self.records.group_selected(&mut self.selection, confirmer)
    }

    /// Deletes the record open in the detail view and closes the view.
    pub fn delete_open_record(&mut self, confirmer: &mut dyn Confirmer) -> CommandResult<bool> {
        let Some(record_id) = self.open_record_id.clone() else {
            return Err(ValidationError::NoOpenRecord.into());
        };
        let outcome = self.records.delete_record(&record_id, confirmer)?;
        if outcome.is_applied() {
            self.open_record_id = None;
            let records = self.records.repo();
            self.selection.prune(|id| records.get_record(id).is_some());
        }
        Ok(outcome)
    }

    /// Opens a draft of the member list for editing.
    pub fn member_editor(&self) -> MemberEditor {
        self.members.editor()
    }

    /// Validates and commits an edited member list.
    ///
    /// When the active person was removed, the first remaining member
    /// becomes active.
    pub fn save_members(&mut self, editor: MemberEditor) -> Result<(), CommandError> {
        let members = editor.finish()?;
        self.save_member_list(members)
    }

    /// Commits a member list built outside a [`MemberEditor`].
    pub fn save_member_list(&mut self, members: Vec<Person>) -> Result<(), CommandError> {
        self.members.save_members(members)?;
        if self.members.get_member(&self.active_person_id).is_none() {
            if let Some(first) = self.members.members().first() {
                info!("event=active_person_reset module=session status=ok");
                self.active_person_id = first.id.clone();
            }
        }
        Ok(())
    }

    fn drop_stale_detail(&mut self) {
        if self.open_record_id.is_some() && self.open_record().is_none() {
            self.open_record_id = None;
        }
    }
}
