//! Multi-select state for the timeline.
//!
//! # Invariants
//! - Entering selection mode always seeds exactly one record id.
//! - Leaving selection mode always clears the selected set.
//! - Toggling the last id off keeps selection mode active with an empty set.

pub mod machine;
