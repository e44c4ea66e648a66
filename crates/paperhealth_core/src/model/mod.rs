//! Domain model for family members and their medical records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the wire shape compatible with the mobile shell (camelCase JSON).
//!
//! # Invariants
//! - Every record and person is identified by a stable string id.
//! - Records reference persons by id only; deleting a person never cascades.

pub mod date;
pub mod person;
pub mod record;
