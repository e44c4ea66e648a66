//! Selection state machine driven by tap, long-press and cancel events.

use crate::model::record::RecordId;
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;

/// Top-level selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Normal,
    Selecting,
}

/// Result of a tap on a timeline card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// Normal mode: the shell should open the detail view.
    OpenDetail(RecordId),
    /// Selecting mode: membership of the record flipped.
    Toggled { record_id: RecordId, selected: bool },
}

/// What the selection header renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
    pub is_selection_mode: bool,
    pub selected_count: usize,
}

/// Selection mode plus selected record ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    mode: SelectionMode,
    selected: BTreeSet<RecordId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_selecting(&self) -> bool {
        self.mode == SelectionMode::Selecting
    }

    pub fn selected_ids(&self) -> &BTreeSet<RecordId> {
        &self.selected
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, record_id: &str) -> bool {
        self.selected.contains(record_id)
    }

    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary {
            is_selection_mode: self.is_selecting(),
            selected_count: self.selected.len(),
        }
    }

    /// Handles a tap on one record.
    pub fn tap(&mut self, record_id: &str) -> TapOutcome {
        match self.mode {
            SelectionMode::Normal => TapOutcome::OpenDetail(record_id.to_string()),
            SelectionMode::Selecting => {
                let selected = if self.selected.remove(record_id) {
                    false
                } else {
                    self.selected.insert(record_id.to_string());
                    true
                };
                TapOutcome::Toggled {
                    record_id: record_id.to_string(),
                    selected,
                }
            }
        }
    }

    /// Handles a long-press. Returns `true` when selection mode was entered.
    pub fn long_press(&mut self, record_id: &str) -> bool {
        if self.is_selecting() {
            return false;
        }
        self.mode = SelectionMode::Selecting;
        self.selected.clear();
        self.selected.insert(record_id.to_string());
        debug!("event=selection_enter module=selection status=ok");
        true
    }

    /// Returns to normal mode with an empty selection.
    pub fn cancel(&mut self) {
        if self.is_selecting() {
            debug!(
                "event=selection_exit module=selection status=ok count={}",
                self.selected.len()
            );
        }
        self.mode = SelectionMode::Normal;
        self.selected.clear();
    }

    /// Drops ids for which `exists` is false. Returns how many were dropped.
    pub fn prune(&mut self, exists: impl Fn(&str) -> bool) -> usize {
        let before = self.selected.len();
        self.selected.retain(|record_id| exists(record_id.as_str()));
        before - self.selected.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{SelectionMode, SelectionState, TapOutcome};

    #[test]
    fn tap_in_normal_mode_opens_detail_without_state_change() {
        let mut state = SelectionState::new();
        assert_eq!(state.tap("r1"), TapOutcome::OpenDetail("r1".to_string()));
        assert_eq!(state, SelectionState::new());
    }

    #[test]
    fn long_press_while_selecting_is_ignored() {
        let mut state = SelectionState::new();
        assert!(state.long_press("r1"));
        assert!(!state.long_press("r2"));
        assert_eq!(state.selected_count(), 1);
        assert!(state.is_selected("r1"));
    }

    #[test]
    fn cancel_from_normal_is_a_no_op() {
        let mut state = SelectionState::new();
        state.cancel();
        assert_eq!(state.mode(), SelectionMode::Normal);
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn prune_drops_missing_ids_but_keeps_mode() {
        let mut state = SelectionState::new();
        state.long_press("r1");
        state.tap("r2");
        assert_eq!(state.prune(|id| id == "r2"), 1);
        assert!(state.is_selecting());
        assert!(state.is_selected("r2"));
    }
}
