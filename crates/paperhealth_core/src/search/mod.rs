//! Timeline query entry points.
//!
//! # Responsibility
//! - Derive the visible record list for one person and one search query.
//! - Memoize that list on its inputs only.

pub mod timeline;
