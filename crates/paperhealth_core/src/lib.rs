//! Core domain logic for PaperHealth.
//! This crate is the single source of truth for record, member and timeline
//! invariants; the mobile shell only renders what it returns.

pub mod config;
pub mod fixtures;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod selection;
pub mod service;

pub use config::{ConfigError, CoreConfig, InvalidDatePolicy};
pub use logging::{
    default_log_level, init_logging, logging_status, LogLevel, LogTarget, LoggingError,
};
pub use model::date::{format_record_date, parse_record_date};
pub use model::person::{AvatarColor, InvalidAvatarColor, Person, PersonId};
pub use model::record::{
    DocType, GroupId, ImageAttachment, MedicalRecord, RecordId, RecordValidationError,
};
pub use repo::member_repo::{InMemoryMemberRepository, MemberRepository};
pub use repo::record_repo::{InMemoryRecordRepository, RecordRepository};
pub use repo::{RepoError, RepoResult};
pub use search::timeline::{filter_sort, TimelineError, TimelineResult, TimelineView};
pub use selection::machine::{SelectionMode, SelectionState, SelectionSummary, TapOutcome};
pub use service::command::{CommandError, CommandOutcome, CommandResult, ValidationError};
pub use service::confirm::{ConfirmPrompt, Confirmer, Decision, PresetDecision};
pub use service::member_service::{MemberEditor, MemberService};
pub use service::record_service::{group_span, GroupSpan, GroupSummary, RecordService};
pub use service::session::TimelineSession;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
