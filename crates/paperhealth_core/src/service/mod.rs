//! Core use-case services.
//!
//! # Responsibility
//! - Validate command preconditions and route confirmations.
//! - Keep the shell decoupled from store and selection internals.

pub mod command;
pub mod confirm;
pub mod member_service;
pub mod record_service;
pub mod session;
