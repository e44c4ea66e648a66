//! FFI use-case API for the mobile shell.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the process-wide timeline session and member draft behind a mutex.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Confirmation dialogs are shown by the shell; their result arrives as a
//!   `confirmed` flag and is replayed through a preset confirmer.

use log::error;
use paperhealth_core::fixtures::demo_session;
use paperhealth_core::{
    core_version as core_version_inner, format_record_date, init_logging as init_logging_inner,
    ping as ping_inner, AvatarColor, CommandError, CommandOutcome, CoreConfig, MedicalRecord,
    MemberEditor, Person, PresetDecision, TapOutcome, TimelineSession,
};
use std::sync::{Mutex, OnceLock};

static STATE: OnceLock<Mutex<ShellState>> = OnceLock::new();

struct ShellState {
    session: TimelineSession,
    /// Unsaved member edits; opened lazily by the member functions.
    member_draft: Option<MemberEditor>,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One timeline card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineItem {
    pub record_id: String,
    /// `YYYY-MM-DD`, or `start - end` for grouped records.
    pub date_label: String,
    pub hospital: String,
    pub doc_type: String,
    pub image_count: u32,
    pub is_grouped: bool,
    pub is_selected: bool,
}

/// Timeline envelope with the selection header state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineResponse {
    pub items: Vec<TimelineItem>,
    pub is_selection_mode: bool,
    pub selected_count: u32,
    /// Empty on success; diagnostic text otherwise.
    pub message: String,
}

impl TimelineResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            is_selection_mode: false,
            selected_count: 0,
            message: message.into(),
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Affected item count, when meaningful.
    pub count: u32,
    /// Machine-readable outcome or user-facing error text.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, count: u32) -> Self {
        Self {
            ok: true,
            count,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            count: 0,
            message: message.into(),
        }
    }
}

/// Family member row for the switcher and the member editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberItem {
    pub id: String,
    pub name: String,
    pub avatar_color: String,
}

/// One image on the detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    pub id: String,
    pub url: String,
    pub label: String,
}

/// Everything the detail screen renders for the open record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDetail {
    pub record_id: String,
    pub date: String,
    pub hospital: String,
    pub doc_type: String,
    /// `start - end` when this record carries its group's span.
    pub group_span: Option<String>,
    pub images: Vec<ImageItem>,
    pub summary: Option<String>,
    pub ocr_text: String,
}

/// Member draft envelope returned by every draft edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDraftResponse {
    pub ok: bool,
    /// Outcome detail (new id, new color) or user-facing error text.
    pub message: String,
    pub members: Vec<MemberItem>,
}

/// Lists records for the active person and current query.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_list() -> TimelineResponse {
    with_session(render_timeline).unwrap_or_else(TimelineResponse::failure)
}

/// Sets the search query and returns the refreshed timeline.
#[flutter_rust_bridge::frb(sync)]
pub fn set_search_query(query: String) -> TimelineResponse {
    with_session(|session| {
        session.set_query(query);
        render_timeline(session)
    })
    .unwrap_or_else(TimelineResponse::failure)
}

/// Switches the active family member.
#[flutter_rust_bridge::frb(sync)]
pub fn set_active_person(person_id: String) -> ActionResponse {
    with_session(|session| {
        if session.set_active_person(&person_id) {
            ActionResponse::success("switched", 1)
        } else {
            ActionResponse::failure("person not found")
        }
    })
    .unwrap_or_else(ActionResponse::failure)
}

/// Handles a tap on a timeline card.
///
/// `message` is `open_detail`, `selected`, `deselected` or `ignored`.
#[flutter_rust_bridge::frb(sync)]
pub fn record_tap(record_id: String) -> ActionResponse {
    with_session(|session| {
        let count = selected_count(session);
        match session.tap(&record_id) {
            Some(TapOutcome::OpenDetail(_)) => ActionResponse::success("open_detail", count),
            Some(TapOutcome::Toggled { selected: true, .. }) => {
                ActionResponse::success("selected", selected_count(session))
            }
            Some(TapOutcome::Toggled { selected: false, .. }) => {
                ActionResponse::success("deselected", selected_count(session))
            }
            None => ActionResponse::success("ignored", count),
        }
    })
    .unwrap_or_else(ActionResponse::failure)
}

/// Handles a long-press on a timeline card.
#[flutter_rust_bridge::frb(sync)]
pub fn record_long_press(record_id: String) -> ActionResponse {
    with_session(|session| {
        let message = if session.long_press(&record_id) {
            "selection_started"
        } else {
            "ignored"
        };
        ActionResponse::success(message, selected_count(session))
    })
    .unwrap_or_else(ActionResponse::failure)
}

/// Leaves selection mode.
#[flutter_rust_bridge::frb(sync)]
pub fn selection_cancel() -> ActionResponse {
    with_session(|session| {
        session.cancel_selection();
        ActionResponse::success("cancelled", 0)
    })
    .unwrap_or_else(ActionResponse::failure)
}

/// Deletes selected records when the shell's dialog was confirmed.
#[flutter_rust_bridge::frb(sync)]
pub fn selection_delete(confirmed: bool) -> ActionResponse {
    with_session(|session| {
        let outcome = session.delete_selected(&mut PresetDecision::from_bool(confirmed));
        command_response(outcome.map(|outcome| match outcome {
            CommandOutcome::Applied(removed) => CommandOutcome::Applied(to_u32(removed)),
            CommandOutcome::Declined => CommandOutcome::Declined,
        }))
    })
    .unwrap_or_else(ActionResponse::failure)
}

/// Groups selected records when the shell's dialog was confirmed.
#[flutter_rust_bridge::frb(sync)]
pub fn selection_group(confirmed: bool) -> ActionResponse {
    with_session(|session| {
        let outcome = session.group_selected(&mut PresetDecision::from_bool(confirmed));
        command_response(outcome.map(|outcome| match outcome {
            CommandOutcome::Applied(summary) => {
                CommandOutcome::Applied(to_u32(summary.record_ids.len()))
            }
            CommandOutcome::Declined => CommandOutcome::Declined,
        }))
    })
    .unwrap_or_else(ActionResponse::failure)
}

/// Closes the detail view without changes.
#[flutter_rust_bridge::frb(sync)]
pub fn detail_close() -> ActionResponse {
    with_session(|session| {
        session.close_detail();
        ActionResponse::success("closed", 0)
    })
    .unwrap_or_else(ActionResponse::failure)
}

/// Deletes the record open in the detail view.
#[flutter_rust_bridge::frb(sync)]
pub fn detail_delete(confirmed: bool) -> ActionResponse {
    with_session(|session| {
        let outcome = session.delete_open_record(&mut PresetDecision::from_bool(confirmed));
        command_response(outcome.map(|outcome| match outcome {
            CommandOutcome::Applied(removed) => CommandOutcome::Applied(u32::from(removed)),
            CommandOutcome::Declined => CommandOutcome::Declined,
        }))
    })
    .unwrap_or_else(ActionResponse::failure)
}

/// Returns the record open in the detail view, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn detail_get() -> Option<RecordDetail> {
    with_session(|session| session.open_record().map(record_detail))
        .ok()
        .flatten()
}

/// Lists family members in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn members_list() -> Vec<MemberItem> {
    with_session(|session| session.members().iter().map(member_item).collect())
        .unwrap_or_default()
}

/// Replaces the member list with the shell's edited copy.
#[flutter_rust_bridge::frb(sync)]
pub fn members_save(members: Vec<MemberItem>) -> ActionResponse {
    let mut people = Vec::with_capacity(members.len());
    for item in members {
        let color = match AvatarColor::parse(&item.avatar_color) {
            Ok(color) => color,
            Err(err) => return ActionResponse::failure(error_message(&CommandError::from(err))),
        };
        people.push(Person::new(item.id, item.name, color));
    }
    with_session(|session| {
        let count = to_u32(people.len());
        match session.save_member_list(people) {
            Ok(()) => ActionResponse::success("saved", count),
            Err(err) => ActionResponse::failure(error_message(&err)),
        }
    })
    .unwrap_or_else(ActionResponse::failure)
}

/// Opens the member draft, or returns the one already open.
#[flutter_rust_bridge::frb(sync)]
pub fn member_draft() -> MemberDraftResponse {
    with_member_draft(|_| Ok(String::new()))
}

/// Appends a member to the draft with the next palette color.
///
/// `message` carries the new member id.
#[flutter_rust_bridge::frb(sync)]
pub fn member_add(name: String) -> MemberDraftResponse {
    with_member_draft(|draft| {
        draft
            .add_member(&name)
            .map_err(|err| err.user_message().to_string())
    })
}

/// Renames a member in the draft. Blank names are rejected on commit.
#[flutter_rust_bridge::frb(sync)]
pub fn member_rename(person_id: String, name: String) -> MemberDraftResponse {
    with_member_draft(|draft| {
        if draft.rename(&person_id, &name) {
            Ok("renamed".to_string())
        } else {
            Err("member not found".to_string())
        }
    })
}

/// Cycles a member's avatar color. `message` carries the new color.
#[flutter_rust_bridge::frb(sync)]
pub fn member_recolor(person_id: String) -> MemberDraftResponse {
    with_member_draft(|draft| {
        draft
            .recolor(&person_id)
            .map(|color| color.to_string())
            .ok_or_else(|| "member not found".to_string())
    })
}

/// Removes a member from the draft when the shell's dialog was confirmed.
#[flutter_rust_bridge::frb(sync)]
pub fn member_delete(person_id: String, confirmed: bool) -> MemberDraftResponse {
    with_member_draft(|draft| {
        match draft.delete_member(&person_id, &mut PresetDecision::from_bool(confirmed)) {
            Ok(CommandOutcome::Applied(true)) => Ok("applied".to_string()),
            Ok(CommandOutcome::Applied(false)) => Ok("ignored".to_string()),
            Ok(CommandOutcome::Declined) => Ok("declined".to_string()),
            Err(err) => Err(error_message(&err)),
        }
    })
}

/// Validates and saves the draft. A rejected draft stays open for fixes.
#[flutter_rust_bridge::frb(sync)]
pub fn member_draft_commit() -> ActionResponse {
    with_state(|state| {
        let Some(draft) = state.member_draft.clone() else {
            return ActionResponse::failure("no member draft is open");
        };
        let count = to_u32(draft.members().len());
        match state.session.save_members(draft) {
            Ok(()) => {
                state.member_draft = None;
                ActionResponse::success("saved", count)
            }
            Err(err) => ActionResponse::failure(error_message(&err)),
        }
    })
    .unwrap_or_else(ActionResponse::failure)
}

/// Drops the draft without saving.
#[flutter_rust_bridge::frb(sync)]
pub fn member_draft_discard() -> ActionResponse {
    with_state(|state| {
        let discarded = state.member_draft.take().is_some();
        ActionResponse::success(if discarded { "discarded" } else { "ignored" }, 0)
    })
    .unwrap_or_else(ActionResponse::failure)
}

fn with_state<T>(f: impl FnOnce(&mut ShellState) -> T) -> Result<T, String> {
    let state = match STATE.get() {
        Some(state) => state,
        None => {
            let session = demo_session(CoreConfig::default())
                .map_err(|err| format!("session init failed: {err}"))?;
            STATE.get_or_init(|| {
                Mutex::new(ShellState {
                    session,
                    member_draft: None,
                })
            })
        }
    };
    let mut guard = state.lock().map_err(|_| {
        error!("event=session_lock module=ffi status=error reason=poisoned");
        "session lock poisoned".to_string()
    })?;
    Ok(f(&mut guard))
}

fn with_session<T>(f: impl FnOnce(&mut TimelineSession) -> T) -> Result<T, String> {
    with_state(|state| f(&mut state.session))
}

fn with_member_draft(
    edit: impl FnOnce(&mut MemberEditor) -> Result<String, String>,
) -> MemberDraftResponse {
    with_state(|state| {
        let ShellState {
            session,
            member_draft,
        } = state;
        let draft = member_draft.get_or_insert_with(|| session.member_editor());
        let outcome = edit(draft);
        let members = draft.members().iter().map(member_item).collect();
        match outcome {
            Ok(message) => MemberDraftResponse {
                ok: true,
                message,
                members,
            },
            Err(message) => MemberDraftResponse {
                ok: false,
                message,
                members,
            },
        }
    })
    .unwrap_or_else(|message| MemberDraftResponse {
        ok: false,
        message,
        members: Vec::new(),
    })
}

fn render_timeline(session: &mut TimelineSession) -> TimelineResponse {
    let summary = session.selection_summary();
    let selected = session.selection().selected_ids().clone();
    match session.visible_records() {
        Ok(records) => TimelineResponse {
            items: records
                .iter()
                .map(|record| timeline_item(record, selected.contains(&record.id)))
                .collect(),
            is_selection_mode: summary.is_selection_mode,
            selected_count: to_u32(summary.selected_count),
            message: String::new(),
        },
        Err(err) => TimelineResponse::failure(err.to_string()),
    }
}

fn timeline_item(record: &MedicalRecord, is_selected: bool) -> TimelineItem {
    TimelineItem {
        record_id: record.id.clone(),
        date_label: record.date_label(),
        hospital: record.hospital.clone(),
        doc_type: record.doc_type.display_text().to_string(),
        image_count: to_u32(record.images.len()),
        is_grouped: record.is_grouped(),
        is_selected,
    }
}

fn record_detail(record: &MedicalRecord) -> RecordDetail {
    let group_span = (record.is_grouped() && record.end_date.is_some())
        .then(|| record.date_label());
    RecordDetail {
        record_id: record.id.clone(),
        date: format_record_date(&record.date),
        hospital: record.hospital.clone(),
        doc_type: record.doc_type.display_text().to_string(),
        group_span,
        images: record
            .images
            .iter()
            .map(|image| ImageItem {
                id: image.id.clone(),
                url: image.url.clone(),
                label: image.label.clone(),
            })
            .collect(),
        summary: record.summary.clone(),
        ocr_text: record.ocr_text.clone(),
    }
}

fn member_item(person: &Person) -> MemberItem {
    MemberItem {
        id: person.id.clone(),
        name: person.name.clone(),
        avatar_color: person.avatar_color.to_string(),
    }
}

fn command_response(result: Result<CommandOutcome<u32>, CommandError>) -> ActionResponse {
    match result {
        Ok(CommandOutcome::Applied(count)) => ActionResponse::success("applied", count),
        Ok(CommandOutcome::Declined) => ActionResponse::success("declined", 0),
        Err(err) => ActionResponse::failure(error_message(&err)),
    }
}

fn error_message(err: &CommandError) -> String {
    match err {
        CommandError::Validation(validation) => validation.user_message().to_string(),
        other => other.to_string(),
    }
}

fn selected_count(session: &TimelineSession) -> u32 {
    to_u32(session.selection().selected_count())
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        detail_close, detail_delete, detail_get, member_add, member_delete, member_draft,
        member_draft_commit, member_draft_discard, member_recolor, member_rename, members_list,
        ping, record_long_press, record_tap, selection_cancel, selection_group, set_search_query,
        timeline_list,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    // The session is process-wide, so the whole flow lives in one test.
    #[test]
    fn demo_session_flow_over_ffi() {
        let timeline = timeline_list();
        assert!(timeline.message.is_empty(), "{}", timeline.message);
        assert_eq!(timeline.items.len(), 2);
        assert_eq!(timeline.items[0].record_id, "r1");

        let filtered = set_search_query("中山".to_string());
        assert_eq!(filtered.items.len(), 1);
        assert_eq!(set_search_query(String::new()).items.len(), 2);

        assert_eq!(record_long_press("r1".to_string()).message, "selection_started");
        let rejected = selection_group(true);
        assert!(!rejected.ok);
        assert_eq!(rejected.message, "请至少选择2条记录进行分组");

        assert_eq!(record_tap("r2".to_string()).count, 2);
        assert_eq!(selection_group(false).message, "declined");
        let grouped = selection_group(true);
        assert!(grouped.ok);
        assert_eq!(grouped.count, 2);

        let after = timeline_list();
        assert!(!after.is_selection_mode);
        assert!(after.items.iter().all(|item| item.is_grouped));
        assert_eq!(selection_cancel().message, "cancelled");

        assert_eq!(record_tap("r2".to_string()).message, "open_detail");
        let detail = detail_get().expect("r2 should be open");
        assert_eq!(detail.record_id, "r2");
        assert_eq!(detail.group_span.as_deref(), Some("2025-10-15 - 2025-11-01"));
        assert_eq!(detail.images.len(), 1);
        assert_eq!(detail.images[0].label, "腹部B超");
        assert_eq!(detail.summary, None);
        assert!(detail.ocr_text.contains("肝脏"));
        assert_eq!(detail_close().message, "closed");
        assert!(detail_get().is_none());
        assert!(!detail_delete(true).ok);

        member_flow();
    }

    fn member_flow() {
        assert_eq!(member_draft().members.len(), 3);

        let added = member_add("赵六".to_string());
        assert!(added.ok);
        assert_eq!(added.members.len(), 4);
        assert_eq!(added.members[3].id, added.message);
        assert_eq!(added.members[3].avatar_color, "#ef4444");
        assert_eq!(member_recolor(added.message.clone()).message, "#14b8a6");

        let blank = member_add("  ".to_string());
        assert!(!blank.ok);
        assert_eq!(blank.message, "所有成员必须有姓名");

        assert_eq!(member_delete("p3".to_string(), false).message, "declined");
        let removed = member_delete(added.message, true);
        assert_eq!(removed.message, "applied");
        assert_eq!(removed.members.len(), 3);
        assert!(member_rename("p2".to_string(), "李四四".to_string()).ok);

        // Unsaved edits are not visible outside the draft.
        assert_eq!(members_list()[1].name, "李四");
        assert!(member_draft_commit().ok);
        assert_eq!(members_list()[1].name, "李四四");

        assert!(member_rename("p1".to_string(), " ".to_string()).ok);
        assert!(!member_draft_commit().ok);
        assert_eq!(member_draft_discard().message, "discarded");
        assert_eq!(members_list()[0].name, "张三");
    }
}
