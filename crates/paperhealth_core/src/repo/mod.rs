//! Record Store: repository contracts and in-memory implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for records and members.
//! - Hold current state; business rules live in services.
//!
//! # Invariants
//! - Record writes must pass `MedicalRecord::validate()`.
//! - The member list is never empty.
//! - Every mutation bumps the repository revision used for memoization.

pub mod member_repo;
pub mod record_repo;

use crate::model::person::PersonId;
use crate::model::record::{RecordId, RecordValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record and member operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    Validation(RecordValidationError),
    NotFound(RecordId),
    PersonNotFound(PersonId),
    DuplicateId(String),
    /// Operation would leave zero family members.
    LastMember,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::DuplicateId(id) => write!(f, "duplicate id: {id}"),
            Self::LastMember => write!(f, "at least one family member must remain"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}
