//! Filter-sort engine behind the timeline view.
//!
//! # Invariants
//! - Only records owned by the active person are returned.
//! - The query is a literal, case-sensitive substring over hospital, OCR
//!   text and document type text. No pattern syntax is interpreted.
//! - Output is sorted by calendar date, newest first. The sort is stable:
//!   records with equal dates keep their store order.
//! - Malformed dates follow [`InvalidDatePolicy`].

use crate::config::InvalidDatePolicy;
use crate::model::date::parse_record_date;
use crate::model::record::{MedicalRecord, RecordId};
use crate::repo::record_repo::RecordRepository;
use chrono::NaiveDate;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TimelineResult<T> = Result<T, TimelineError>;

/// Timeline derivation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// A matching record has a date that cannot be parsed.
    MalformedDate { record_id: RecordId, value: String },
}

impl Display for TimelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedDate { record_id, value } => {
                write!(f, "record {record_id} has malformed date `{value}`")
            }
        }
    }
}

impl Error for TimelineError {}

/// Filters `records` to `person_id` and `query`, newest first.
///
/// Returns an empty list when nothing matches.
pub fn filter_sort<'r>(
    records: &'r [MedicalRecord],
    person_id: &str,
    query: &str,
    policy: InvalidDatePolicy,
) -> TimelineResult<Vec<&'r MedicalRecord>> {
    let mut keyed: Vec<(Option<NaiveDate>, &MedicalRecord)> = Vec::new();
    for record in records
        .iter()
        .filter(|record| record.patient_id == person_id)
        .filter(|record| record.matches_query(query))
    {
        let date = parse_record_date(&record.date);
        if date.is_none() {
            match policy {
                InvalidDatePolicy::FailFast => {
                    return Err(TimelineError::MalformedDate {
                        record_id: record.id.clone(),
                        value: record.date.clone(),
                    });
                }
                InvalidDatePolicy::SortLowest => warn!(
                    "event=timeline_malformed_date module=search status=degraded record_id={}",
                    record.id
                ),
            }
        }
        keyed.push((date, record));
    }

    // `None < Some(_)`, so malformed dates land at the tail.
    keyed.sort_by(|left, right| right.0.cmp(&left.0));
    Ok(keyed.into_iter().map(|(_, record)| record).collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TimelineKey {
    revision: u64,
    person_id: String,
    query: String,
    policy: InvalidDatePolicy,
}

/// Memoized timeline keyed on store revision, person, query and policy.
#[derive(Debug, Clone, Default)]
pub struct TimelineView {
    key: Option<TimelineKey>,
    items: Vec<MedicalRecord>,
    computations: u64,
}

impl TimelineView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the timeline, recomputing only when an input changed.
    pub fn refresh<R: RecordRepository>(
        &mut self,
        repo: &R,
        person_id: &str,
        query: &str,
        policy: InvalidDatePolicy,
    ) -> TimelineResult<&[MedicalRecord]> {
        let key = TimelineKey {
            revision: repo.revision(),
            person_id: person_id.to_string(),
            query: query.to_string(),
            policy,
        };
        if self.key.as_ref() != Some(&key) {
            let items = filter_sort(repo.records(), person_id, query, policy)?
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            self.computations += 1;
            debug!(
                "event=timeline_recompute module=search status=ok revision={} count={}",
                key.revision,
                items.len()
            );
            self.items = items;
            self.key = Some(key);
        }
        Ok(&self.items)
    }

    /// Number of times the list was actually recomputed.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
