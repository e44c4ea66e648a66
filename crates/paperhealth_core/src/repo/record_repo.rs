//! Record repository contract and in-memory implementation.
//!
//! # Invariants
//! - Insertion order is preserved; the timeline relies on it for stable ties.
//! - Record ids are unique.

use crate::model::record::{MedicalRecord, RecordId};
use crate::repo::{RepoError, RepoResult};
use std::collections::BTreeSet;

/// Repository interface for medical records.
pub trait RecordRepository {
    /// Monotonic counter bumped by every successful mutation.
    fn revision(&self) -> u64;
    /// All records in insertion order.
    fn records(&self) -> &[MedicalRecord];
    fn get_record(&self, id: &str) -> Option<&MedicalRecord>;
    fn insert_record(&mut self, record: MedicalRecord) -> RepoResult<RecordId>;
    /// Replaces an existing record with the same id.
    fn update_record(&mut self, record: MedicalRecord) -> RepoResult<()>;
    fn remove_record(&mut self, id: &str) -> RepoResult<MedicalRecord>;
    /// Removes every record whose id is in `ids`; unknown ids are ignored.
    ///
    /// Returns the number of removed records.
    fn remove_records(&mut self, ids: &BTreeSet<RecordId>) -> usize;
}

/// Vec-backed record repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordRepository {
    records: Vec<MedicalRecord>,
    revision: u64,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from seed records, validating each one.
    pub fn with_records(records: Vec<MedicalRecord>) -> RepoResult<Self> {
        let mut repo = Self::new();
        for record in records {
            repo.insert_record(record)?;
        }
        Ok(repo)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn revision(&self) -> u64 {
        self.revision
    }

    fn records(&self) -> &[MedicalRecord] {
        &self.records
    }

    fn get_record(&self, id: &str) -> Option<&MedicalRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    fn insert_record(&mut self, record: MedicalRecord) -> RepoResult<RecordId> {
        record.validate()?;
        if self.position(&record.id).is_some() {
            return Err(RepoError::DuplicateId(record.id));
        }
        let id = record.id.clone();
        self.records.push(record);
        self.revision += 1;
        Ok(id)
    }

    fn update_record(&mut self, record: MedicalRecord) -> RepoResult<()> {
        record.validate()?;
        let Some(index) = self.position(&record.id) else {
            return Err(RepoError::NotFound(record.id));
        };
        self.records[index] = record;
        self.revision += 1;
        Ok(())
    }

    fn remove_record(&mut self, id: &str) -> RepoResult<MedicalRecord> {
        let Some(index) = self.position(id) else {
            return Err(RepoError::NotFound(id.to_string()));
        };
        let removed = self.records.remove(index);
        self.revision += 1;
        Ok(removed)
    }

    fn remove_records(&mut self, ids: &BTreeSet<RecordId>) -> usize {
        let before = self.records.len();
        self.records.retain(|record| !ids.contains(&record.id));
        let removed = before - self.records.len();
        if removed > 0 {
            self.revision += 1;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryRecordRepository, RecordRepository};
    use crate::model::record::{DocType, MedicalRecord};
    use crate::repo::RepoError;
    use std::collections::BTreeSet;

    fn record(id: &str) -> MedicalRecord {
        MedicalRecord::new(id, "p1", "2025-01-01", "Hospital", DocType::Other)
    }

    #[test]
    fn insert_rejects_duplicate_ids_without_bumping_revision() {
        let mut repo = InMemoryRecordRepository::new();
        repo.insert_record(record("r1")).unwrap();
        let revision = repo.revision();

        let err = repo.insert_record(record("r1")).unwrap_err();
        assert_eq!(err, RepoError::DuplicateId("r1".to_string()));
        assert_eq!(repo.revision(), revision);
    }

    #[test]
    fn bulk_remove_ignores_unknown_ids() {
        let mut repo =
            InMemoryRecordRepository::with_records(vec![record("r1"), record("r2")]).unwrap();
        let ids: BTreeSet<String> = ["r2", "gone"].iter().map(|id| id.to_string()).collect();

        assert_eq!(repo.remove_records(&ids), 1);
        assert_eq!(repo.records().len(), 1);
        assert_eq!(repo.records()[0].id, "r1");
    }

    #[test]
    fn update_missing_record_reports_not_found() {
        let mut repo = InMemoryRecordRepository::new();
        let err = repo.update_record(record("r9")).unwrap_err();
        assert_eq!(err, RepoError::NotFound("r9".to_string()));
    }
}
