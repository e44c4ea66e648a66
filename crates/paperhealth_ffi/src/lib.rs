//! Flutter-facing bindings for the PaperHealth core.

pub mod api;
