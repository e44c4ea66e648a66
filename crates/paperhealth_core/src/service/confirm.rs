//! Confirmation capability injected into destructive commands.
//!
//! Commands build a [`ConfirmPrompt`], ask the [`Confirmer`] once, and only
//! mutate state on [`Decision::Confirmed`]. The shell implements `Confirmer`
//! with a real dialog; tests and the FFI layer pass canned decisions.

use chrono::NaiveDate;

use crate::model::date::format_calendar_date;

/// Outcome of one confirmation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Declined,
}

impl From<bool> for Decision {
    fn from(value: bool) -> Self {
        if value {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

/// Dialog content for a confirm/cancel pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    /// Render the confirm button as destructive.
    pub destructive: bool,
}

impl ConfirmPrompt {
    pub fn delete_records(count: usize) -> Self {
        Self {
            title: "确认删除".to_string(),
            message: format!("确定要删除 {count} 条记录吗？"),
            confirm_label: "删除".to_string(),
            cancel_label: "取消".to_string(),
            destructive: true,
        }
    }

    pub fn delete_record() -> Self {
        Self {
            title: "确认删除".to_string(),
            message: "确定要删除这条记录吗？".to_string(),
            confirm_label: "删除".to_string(),
            cancel_label: "取消".to_string(),
            destructive: true,
        }
    }

    pub fn group_records(count: usize, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            title: "确认分组".to_string(),
            message: format!(
                "将 {count} 条记录分组？\n时间范围: {} - {}",
                format_calendar_date(start),
                format_calendar_date(end)
            ),
            confirm_label: "确认".to_string(),
            cancel_label: "取消".to_string(),
            destructive: false,
        }
    }

    pub fn delete_member() -> Self {
        Self {
            title: "确认删除".to_string(),
            message: "确定要删除这个成员吗？相关的医疗记录不会被删除。".to_string(),
            confirm_label: "删除".to_string(),
            cancel_label: "取消".to_string(),
            destructive: true,
        }
    }
}

/// Capability that asks the user to confirm or decline a prompt.
pub trait Confirmer {
    fn request_confirmation(&mut self, prompt: &ConfirmPrompt) -> Decision;
}

impl<F> Confirmer for F
where
    F: FnMut(&ConfirmPrompt) -> Decision,
{
    fn request_confirmation(&mut self, prompt: &ConfirmPrompt) -> Decision {
        self(prompt)
    }
}

/// Confirmer that returns a decision collected ahead of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetDecision(pub Decision);

impl PresetDecision {
    pub fn confirm() -> Self {
        Self(Decision::Confirmed)
    }

    pub fn decline() -> Self {
        Self(Decision::Declined)
    }

    pub fn from_bool(confirmed: bool) -> Self {
        Self(Decision::from(confirmed))
    }
}

impl Confirmer for PresetDecision {
    fn request_confirmation(&mut self, _prompt: &ConfirmPrompt) -> Decision {
        self.0
    }
}
