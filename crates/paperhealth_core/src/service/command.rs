//! Shared result and error types for command handlers.
//!
//! # Invariants
//! - A returned error means no state was mutated.
//! - `CommandOutcome::Declined` means the user dismissed the prompt and no
//!   state was mutated.

use crate::model::person::InvalidAvatarColor;
use crate::model::record::{RecordId, RecordValidationError};
use crate::repo::RepoError;
use crate::search::timeline::TimelineError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CommandResult<T> = Result<CommandOutcome<T>, CommandError>;

/// Result of a command that went through a confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome<T> {
    Applied(T),
    Declined,
}

impl<T> CommandOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Declined => None,
        }
    }
}

/// User input failed a precondition. Recoverable; surfaced as a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    TooFewForGroup { selected: usize },
    LastMember,
    NothingSelected,
    NotSelecting,
    NoOpenRecord,
    InvalidAvatarColor(InvalidAvatarColor),
    InvalidRecord(RecordValidationError),
}

impl ValidationError {
    /// Alert text shown by the shell.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyName => "所有成员必须有姓名",
            Self::TooFewForGroup { .. } => "请至少选择2条记录进行分组",
            Self::LastMember => "至少需要保留一个成员",
            Self::NothingSelected | Self::NotSelecting => "请先选择记录",
            Self::NoOpenRecord => "记录不存在",
            Self::InvalidAvatarColor(_) => "头像颜色无效",
            Self::InvalidRecord(_) => "记录数据无效",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be blank"),
            Self::TooFewForGroup { selected } => {
                write!(f, "grouping needs at least 2 records, got {selected}")
            }
            Self::LastMember => write!(f, "at least one family member must remain"),
            Self::NothingSelected => write!(f, "no records selected"),
            Self::NotSelecting => write!(f, "selection mode is not active"),
            Self::NoOpenRecord => write!(f, "no record is open"),
            Self::InvalidAvatarColor(err) => write!(f, "{err}"),
            Self::InvalidRecord(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAvatarColor(err) => Some(err),
            Self::InvalidRecord(err) => Some(err),
            _ => None,
        }
    }
}

/// Command handler failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Validation(ValidationError),
    /// A record date needed by the command does not parse.
    MalformedDate { record_id: RecordId, value: String },
    Repo(RepoError),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::MalformedDate { record_id, value } => {
                write!(f, "record {record_id} has malformed date `{value}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::MalformedDate { .. } => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for CommandError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<InvalidAvatarColor> for CommandError {
    fn from(value: InvalidAvatarColor) -> Self {
        Self::Validation(ValidationError::InvalidAvatarColor(value))
    }
}

impl From<RepoError> for CommandError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(ValidationError::InvalidRecord(err)),
            RepoError::LastMember => Self::Validation(ValidationError::LastMember),
            other => Self::Repo(other),
        }
    }
}

impl From<TimelineError> for CommandError {
    fn from(value: TimelineError) -> Self {
        match value {
            TimelineError::MalformedDate { record_id, value } => {
                Self::MalformedDate { record_id, value }
            }
        }
    }
}
