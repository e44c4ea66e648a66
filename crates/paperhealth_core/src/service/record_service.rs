//! Record command handlers: delete selected, delete one, group selected.
//!
//! # Responsibility
//! - Validate preconditions before asking for confirmation.
//! - Apply mutations through the repository only after confirmation.
//!
//! # Invariants
//! - Declining a prompt leaves store and selection untouched.
//! - Ids that no longer exist in the store are skipped, never fatal.
//! - A successful bulk command always ends in normal selection mode.
//! - A group never outlives its second-to-last member, and its span always
//!   matches the records still in it.

use crate::model::date::{format_calendar_date, parse_record_date};
use crate::model::record::{GroupId, MedicalRecord, RecordId};
use crate::repo::record_repo::RecordRepository;
use crate::repo::RepoError;
use crate::selection::machine::SelectionState;
use crate::service::command::{CommandError, CommandOutcome, CommandResult, ValidationError};
use crate::service::confirm::{ConfirmPrompt, Confirmer, Decision};
use chrono::NaiveDate;
use log::{debug, info};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Calendar span covered by a set of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Earliest record; first in store order on equal dates.
    pub representative_id: RecordId,
}

/// Result of a confirmed group command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub group_id: GroupId,
    /// Grouped record ids in store order.
    pub record_ids: Vec<RecordId>,
    pub span: GroupSpan,
}

/// Computes the min/max calendar date across `records`.
///
/// Returns `Ok(None)` for an empty slice. Any malformed date fails the whole
/// computation since no span can be derived from it.
pub fn group_span(records: &[&MedicalRecord]) -> Result<Option<GroupSpan>, CommandError> {
    let mut span: Option<GroupSpan> = None;
    for record in records {
        let Some(date) = parse_record_date(&record.date) else {
            return Err(CommandError::MalformedDate {
                record_id: record.id.clone(),
                value: record.date.clone(),
            });
        };
        match span.as_mut() {
            None => {
                span = Some(GroupSpan {
                    start: date,
                    end: date,
                    representative_id: record.id.clone(),
                });
            }
            Some(current) => {
                if date < current.start {
                    current.start = date;
                    current.representative_id = record.id.clone();
                }
                if date > current.end {
                    current.end = date;
                }
            }
        }
    }
    Ok(span)
}

fn new_group_id() -> GroupId {
    format!("g-{}", Uuid::new_v4().simple())
}

/// Record command facade over a repository implementation.
pub struct RecordService<R: RecordRepository> {
    repo: R,
}

impl<R: RecordRepository> RecordService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn get_record(&self, id: &str) -> Option<&MedicalRecord> {
        self.repo.get_record(id)
    }

    /// Adds one record after validation.
    pub fn add_record(&mut self, record: MedicalRecord) -> Result<RecordId, CommandError> {
        Ok(self.repo.insert_record(record)?)
    }

    /// Replaces one record by id. Returns `false` when it no longer exists.
    pub fn update_record(&mut self, record: MedicalRecord) -> Result<bool, CommandError> {
        if self.repo.get_record(&record.id).is_none() {
            debug!(
                "event=record_update module=service status=skipped reason=not_found record_id={}",
                record.id
            );
            return Ok(false);
        }
        self.repo.update_record(record)?;
        Ok(true)
    }

    /// Deletes every selected record after confirmation, then leaves
    /// selection mode. Returns the number of removed records.
    pub fn delete_selected(
        &mut self,
        selection: &mut SelectionState,
        confirmer: &mut dyn Confirmer,
    ) -> CommandResult<usize> {
        if !selection.is_selecting() {
            return Err(ValidationError::NotSelecting.into());
        }
        let count = selection.selected_count();
        if count == 0 {
            return Err(ValidationError::NothingSelected.into());
        }

        if confirmer.request_confirmation(&ConfirmPrompt::delete_records(count))
            == Decision::Declined
        {
            return Ok(CommandOutcome::Declined);
        }

        let leaving = selection
            .selected_ids()
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>();
        let leftovers = self.regroup_leftovers(&leaving)?;
        let removed = self.repo.remove_records(selection.selected_ids());
        for record in leftovers {
            self.repo.update_record(record)?;
        }
        if removed < count {
            debug!(
                "event=records_delete module=service status=partial missing={}",
                count - removed
            );
        }
        selection.cancel();
        info!("event=records_delete module=service status=ok count={removed}");
        Ok(CommandOutcome::Applied(removed))
    }

    /// Deletes one record after confirmation.
    ///
    /// Returns `Applied(false)` when the record was already gone.
    pub fn delete_record(
        &mut self,
        record_id: &str,
        confirmer: &mut dyn Confirmer,
    ) -> CommandResult<bool> {
        if confirmer.request_confirmation(&ConfirmPrompt::delete_record()) == Decision::Declined {
            return Ok(CommandOutcome::Declined);
        }
        let leftovers = self.regroup_leftovers(&BTreeSet::from([record_id]))?;
        match self.repo.remove_record(record_id) {
            Ok(_) => {
                for record in leftovers {
                    self.repo.update_record(record)?;
                }
                info!("event=record_delete module=service status=ok record_id={record_id}");
                Ok(CommandOutcome::Applied(true))
            }
            Err(RepoError::NotFound(_)) => {
                debug!(
                    "event=record_delete module=service status=skipped reason=not_found id={}",
                    record_id
                );
                Ok(CommandOutcome::Applied(false))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Groups the selected records into one span after confirmation.
    ///
    /// Every grouped record gets the same `group_id` and `is_grouped = true`.
    /// Only the representative (earliest) record carries `end_date`. Groups
    /// the records leave are shrunk or dissolved.
    pub fn group_selected(
        &mut self,
        selection: &mut SelectionState,
        confirmer: &mut dyn Confirmer,
    ) -> CommandResult<GroupSummary> {
        if !selection.is_selecting() {
            return Err(ValidationError::NotSelecting.into());
        }
        let selected = selection.selected_count();
        if selected < 2 {
            return Err(ValidationError::TooFewForGroup { selected }.into());
        }

        let members = self
            .repo
            .records()
            .iter()
            .filter(|record| selection.is_selected(&record.id))
            .collect::<Vec<_>>();
        if members.len() < 2 {
            return Err(ValidationError::TooFewForGroup {
                selected: members.len(),
            }
            .into());
        }
        let Some(span) = group_span(&members)? else {
            return Err(ValidationError::TooFewForGroup { selected: 0 }.into());
        };

        let prompt = ConfirmPrompt::group_records(selected, span.start, span.end);
        if confirmer.request_confirmation(&prompt) == Decision::Declined {
            return Ok(CommandOutcome::Declined);
        }

        let group_id = new_group_id();
        let end_date = format_calendar_date(span.end);
        let updates = members
            .into_iter()
            .map(|record| {
                let mut grouped = record.clone();
                grouped.is_grouped = Some(true);
                grouped.group_id = Some(group_id.clone());
                grouped.end_date = if grouped.id == span.representative_id {
                    Some(end_date.clone())
                } else {
                    None
                };
                grouped
            })
            .collect::<Vec<_>>();
        let leaving = updates
            .iter()
            .map(|record| record.id.as_str())
            .collect::<BTreeSet<_>>();
        let leftovers = self.regroup_leftovers(&leaving)?;
        for record in updates.iter().chain(&leftovers) {
            record.validate().map_err(ValidationError::InvalidRecord)?;
        }

        let record_ids = updates
            .iter()
            .map(|record| record.id.clone())
            .collect::<Vec<_>>();
        for record in updates.into_iter().chain(leftovers) {
            self.repo.update_record(record)?;
        }
        selection.cancel();
        info!(
            "event=records_group module=service status=ok count={} start={} end={}",
            record_ids.len(),
            format_calendar_date(span.start),
            end_date
        );

        Ok(CommandOutcome::Applied(GroupSummary {
            group_id,
            record_ids,
            span,
        }))
    }
}

impl<R: RecordRepository> RecordService<R> {
    /// Rewrites the groups that the `leaving` records drop out of.
    ///
    /// A group left with two or more members gets its span recomputed; a
    /// single leftover member becomes an ordinary record again.
    fn regroup_leftovers(
        &self,
        leaving: &BTreeSet<&str>,
    ) -> Result<Vec<MedicalRecord>, CommandError> {
        let left_groups = leaving
            .iter()
            .filter_map(|id| self.repo.get_record(id)?.group_id.clone())
            .collect::<BTreeSet<_>>();

        let mut rewritten = Vec::new();
        for group_id in left_groups {
            let remaining = self
                .repo
                .records()
                .iter()
                .filter(|record| {
                    record.group_id.as_deref() == Some(group_id.as_str())
                        && !leaving.contains(record.id.as_str())
                })
                .collect::<Vec<_>>();

            if remaining.len() < 2 {
                rewritten.extend(remaining.into_iter().map(|record| {
                    let mut single = record.clone();
                    single.is_grouped = None;
                    single.group_id = None;
                    single.end_date = None;
                    single
                }));
                debug!("event=group_dissolve module=service status=ok group_id={group_id}");
                continue;
            }

            let Some(span) = group_span(&remaining)? else {
                continue;
            };
            let end_date = format_calendar_date(span.end);
            rewritten.extend(remaining.into_iter().map(|record| {
                let mut kept = record.clone();
                kept.end_date = (kept.id == span.representative_id).then(|| end_date.clone());
                kept
            }));
            debug!("event=group_shrink module=service status=ok group_id={group_id}");
        }
        Ok(rewritten)
    }
}
