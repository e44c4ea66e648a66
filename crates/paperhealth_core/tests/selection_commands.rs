use chrono::NaiveDate;
use paperhealth_core::{
    CommandError, CommandOutcome, ConfirmPrompt, CoreConfig, Decision, DocType,
    InMemoryMemberRepository, InMemoryRecordRepository, MedicalRecord, Person, PresetDecision,
    SelectionMode, TapOutcome, TimelineSession, ValidationError,
};

fn session_with(records: Vec<MedicalRecord>) -> TimelineSession {
    let config = CoreConfig::default();
    let members = InMemoryMemberRepository::new(vec![
        Person::new("p1", "A", config.avatar_palette[0].clone()),
        Person::new("p2", "B", config.avatar_palette[1].clone()),
    ])
    .unwrap();
    TimelineSession::new(
        InMemoryRecordRepository::with_records(records).unwrap(),
        members,
        config,
    )
}

fn record(id: &str, date: &str) -> MedicalRecord {
    MedicalRecord::new(id, "p1", date, "Hospital", DocType::LabTest)
}

fn two_records() -> TimelineSession {
    session_with(vec![record("r1", "2025-01-01"), record("r2", "2025-03-01")])
}

#[test]
fn long_press_then_tap_same_record_leaves_empty_selection_mode() {
    let mut session = two_records();

    assert!(session.long_press("r1"));
    assert_eq!(session.selection().mode(), SelectionMode::Selecting);
    assert_eq!(session.selection().selected_count(), 1);
    assert!(session.selection().is_selected("r1"));

    assert_eq!(
        session.tap("r1"),
        Some(TapOutcome::Toggled {
            record_id: "r1".to_string(),
            selected: false,
        })
    );
    assert_eq!(session.selection().mode(), SelectionMode::Selecting);
    assert_eq!(session.selection().selected_count(), 0);

    session.cancel_selection();
    assert_eq!(session.selection().mode(), SelectionMode::Normal);
    assert_eq!(session.selection().selected_count(), 0);
}

#[test]
fn tap_in_normal_mode_opens_detail() {
    let mut session = two_records();

    assert_eq!(
        session.tap("r2"),
        Some(TapOutcome::OpenDetail("r2".to_string()))
    );
    assert_eq!(session.open_record().map(|r| r.id.as_str()), Some("r2"));
    assert!(session.tap("ghost").is_none());
    assert!(!session.long_press("ghost"));
}

#[test]
fn selection_summary_tracks_mode_and_count() {
    let mut session = two_records();
    session.long_press("r1");
    session.tap("r2");

    let summary = session.selection_summary();
    assert!(summary.is_selection_mode);
    assert_eq!(summary.selected_count, 2);
}

#[test]
fn declined_delete_changes_nothing() {
    let mut session = two_records();
    session.long_press("r1");

    let outcome = session
        .delete_selected(&mut PresetDecision::decline())
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Declined);
    assert_eq!(session.records().len(), 2);
    assert!(session.selection().is_selected("r1"));
}

#[test]
fn confirmed_delete_removes_selected_and_resets_selection() {
    let mut session = two_records();
    session.long_press("r1");
    session.tap("r2");

    let mut prompts = Vec::new();
    let mut confirmer = |prompt: &ConfirmPrompt| {
        prompts.push(prompt.message.clone());
        Decision::Confirmed
    };
    let outcome = session.delete_selected(&mut confirmer).unwrap();

    assert_eq!(outcome, CommandOutcome::Applied(2));
    assert!(session.records().is_empty());
    assert_eq!(session.selection().mode(), SelectionMode::Normal);
    assert_eq!(prompts, vec!["确定要删除 2 条记录吗？".to_string()]);
}

#[test]
fn delete_with_empty_selection_is_rejected() {
    let mut session = two_records();

    let err = session
        .delete_selected(&mut PresetDecision::confirm())
        .unwrap_err();
    assert_eq!(err, CommandError::Validation(ValidationError::NotSelecting));

    session.long_press("r1");
    session.tap("r1");
    let err = session
        .delete_selected(&mut PresetDecision::confirm())
        .unwrap_err();
    assert_eq!(
        err,
        CommandError::Validation(ValidationError::NothingSelected)
    );
    assert_eq!(session.records().len(), 2);
}

#[test]
fn grouping_one_record_is_rejected_without_state_change() {
    let mut session = two_records();
    session.long_press("r1");

    let err = session
        .group_selected(&mut PresetDecision::confirm())
        .unwrap_err();
    assert_eq!(
        err,
        CommandError::Validation(ValidationError::TooFewForGroup { selected: 1 })
    );
    assert_eq!(err.to_string(), "grouping needs at least 2 records, got 1");
    assert!(session.selection().is_selecting());
    assert!(session.selection().is_selected("r1"));
    assert!(session.records().iter().all(|r| !r.is_grouped()));
}

#[test]
fn grouping_span_ignores_selection_order() {
    let mut session = two_records();
    session.long_press("r2");
    session.tap("r1");

    let summary = session
        .group_selected(&mut PresetDecision::confirm())
        .unwrap()
        .applied()
        .expect("group should be applied");

    assert_eq!(summary.span.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert_eq!(summary.span.end, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    assert_eq!(summary.span.representative_id, "r1");
    assert_eq!(summary.record_ids, vec!["r1".to_string(), "r2".to_string()]);
    assert_eq!(session.selection().mode(), SelectionMode::Normal);

    let grouped = session.records();
    assert!(grouped.iter().all(|r| r.is_grouped()));
    assert!(grouped
        .iter()
        .all(|r| r.group_id.as_deref() == Some(summary.group_id.as_str())));
    let representative = grouped.iter().find(|r| r.id == "r1").unwrap();
    assert_eq!(representative.end_date.as_deref(), Some("2025-03-01"));
    assert_eq!(representative.date_label(), "2025-01-01 - 2025-03-01");
    let member = grouped.iter().find(|r| r.id == "r2").unwrap();
    assert_eq!(member.end_date, None);
}

#[test]
fn declined_group_leaves_records_and_selection() {
    let mut session = two_records();
    session.long_press("r1");
    session.tap("r2");

    let mut seen = None;
    let mut confirmer = |prompt: &ConfirmPrompt| {
        seen = Some(prompt.message.clone());
        Decision::Declined
    };
    let outcome = session.group_selected(&mut confirmer).unwrap();

    assert_eq!(outcome, CommandOutcome::Declined);
    assert_eq!(
        seen.as_deref(),
        Some("将 2 条记录分组？\n时间范围: 2025-01-01 - 2025-03-01")
    );
    assert_eq!(session.selection().selected_count(), 2);
    assert!(session.records().iter().all(|r| !r.is_grouped()));
}

#[test]
fn grouping_a_malformed_date_fails() {
    let mut session = session_with(vec![record("r1", "2025-01-01"), record("r2", "??")]);
    session.long_press("r1");
    session.tap("r2");

    let err = session
        .group_selected(&mut PresetDecision::confirm())
        .unwrap_err();
    assert_eq!(
        err,
        CommandError::MalformedDate {
            record_id: "r2".to_string(),
            value: "??".to_string(),
        }
    );
    assert!(session.selection().is_selecting());
}

#[test]
fn deleting_open_record_closes_detail_and_prunes_selection() {
    let mut session = two_records();
    session.tap("r1");

    let outcome = session
        .delete_open_record(&mut PresetDecision::decline())
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Declined);
    assert!(session.open_record().is_some());

    let outcome = session
        .delete_open_record(&mut PresetDecision::confirm())
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Applied(true));
    assert!(session.open_record().is_none());
    assert_eq!(session.records().len(), 1);

    let err = session
        .delete_open_record(&mut PresetDecision::confirm())
        .unwrap_err();
    assert_eq!(err, CommandError::Validation(ValidationError::NoOpenRecord));
}

fn four_records() -> TimelineSession {
    session_with(vec![
        record("r1", "2025-01-01"),
        record("r2", "2025-03-01"),
        record("r3", "2025-05-01"),
        record("r4", "2025-07-01"),
    ])
}

fn group(session: &mut TimelineSession, ids: &[&str]) -> String {
    session.long_press(ids[0]);
    for id in &ids[1..] {
        session.tap(id);
    }
    session
        .group_selected(&mut PresetDecision::confirm())
        .unwrap()
        .applied()
        .expect("group should be applied")
        .group_id
}

fn stored<'s>(session: &'s TimelineSession, id: &str) -> &'s MedicalRecord {
    session.records().iter().find(|r| r.id == id).unwrap()
}

#[test]
fn regrouping_dissolves_a_group_left_with_one_record() {
    let mut session = four_records();
    group(&mut session, &["r1", "r2"]);
    let second = group(&mut session, &["r2", "r3"]);

    let left = stored(&session, "r1");
    assert!(!left.is_grouped());
    assert_eq!(left.group_id, None);
    assert_eq!(left.end_date, None);
    assert_eq!(left.date_label(), "2025-01-01");

    let representative = stored(&session, "r2");
    assert_eq!(representative.group_id.as_deref(), Some(second.as_str()));
    assert_eq!(representative.end_date.as_deref(), Some("2025-05-01"));
}

#[test]
fn regrouping_moves_the_span_to_the_remaining_members() {
    let mut session = four_records();
    let first = group(&mut session, &["r1", "r2", "r3"]);
    let second = group(&mut session, &["r1", "r4"]);

    let new_head = stored(&session, "r2");
    assert_eq!(new_head.group_id.as_deref(), Some(first.as_str()));
    assert_eq!(new_head.date_label(), "2025-03-01 - 2025-05-01");
    let tail = stored(&session, "r3");
    assert_eq!(tail.group_id.as_deref(), Some(first.as_str()));
    assert_eq!(tail.end_date, None);

    let moved = stored(&session, "r1");
    assert_eq!(moved.group_id.as_deref(), Some(second.as_str()));
    assert_eq!(moved.end_date.as_deref(), Some("2025-07-01"));
}

#[test]
fn deleting_a_group_member_shrinks_the_span() {
    let mut session = four_records();
    group(&mut session, &["r1", "r2", "r3"]);

    session.long_press("r3");
    session
        .delete_selected(&mut PresetDecision::confirm())
        .unwrap();

    let head = stored(&session, "r1");
    assert!(head.is_grouped());
    assert_eq!(head.end_date.as_deref(), Some("2025-03-01"));

    session.tap("r2");
    session
        .delete_open_record(&mut PresetDecision::confirm())
        .unwrap();
    let single = stored(&session, "r1");
    assert!(!single.is_grouped());
    assert_eq!(single.end_date, None);
}
