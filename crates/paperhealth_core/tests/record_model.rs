use paperhealth_core::fixtures::demo_records;
use paperhealth_core::{
    AvatarColor, DocType, InMemoryRecordRepository, MedicalRecord, Person, RecordRepository,
    RecordValidationError, RepoError,
};

#[test]
fn record_serialization_uses_shell_field_names() {
    let mut record = demo_records().remove(0);
    record.is_grouped = Some(true);
    record.end_date = Some("2025-12-01".to_string());
    record.group_id = Some("g-1".to_string());

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["patientId"], "p1");
    assert_eq!(json["type"], "生化检验");
    assert_eq!(json["ocrText"], record.ocr_text);
    assert_eq!(json["isGrouped"], true);
    assert_eq!(json["endDate"], "2025-12-01");
    assert_eq!(json["images"][1]["label"], "血常规");
    assert!(json.get("summary").is_none());

    let decoded: MedicalRecord = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn minimal_shell_payload_deserializes_with_defaults() {
    let value = serde_json::json!({
        "id": "r9",
        "patientId": "p3",
        "date": "2025-06-01",
        "hospital": "南方医院",
        "type": "MR"
    });

    let record: MedicalRecord = serde_json::from_value(value).unwrap();
    assert_eq!(record.doc_type, DocType::Mri);
    assert!(record.images.is_empty());
    assert!(!record.is_grouped());
    assert_eq!(record.end_date, None);
}

#[test]
fn person_rejects_invalid_avatar_color_on_decode() {
    let value = serde_json::json!({"id": "p1", "name": "A", "avatarColor": "teal"});
    let err = serde_json::from_value::<Person>(value).unwrap_err();
    assert!(err.to_string().contains("#RRGGBB"), "unexpected error: {err}");

    let ok = serde_json::json!({"id": "p1", "name": "A", "avatarColor": "#14B8A6"});
    let person: Person = serde_json::from_value(ok).unwrap();
    assert_eq!(person.avatar_color, AvatarColor::parse("#14b8a6").unwrap());
    assert_eq!(person.initial(), 'A');
}

#[test]
fn store_rejects_invalid_group_window() {
    let mut repo = InMemoryRecordRepository::new();
    let mut record = MedicalRecord::new("r1", "p1", "2025-03-01", "H", DocType::Other);
    record.is_grouped = Some(true);
    record.end_date = Some("2025-01-01".to_string());

    let err = repo.insert_record(record).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(RecordValidationError::InvalidGroupWindow { .. })
    ));
    assert!(repo.records().is_empty());
}

#[test]
fn image_order_is_preserved() {
    let record = demo_records().remove(0);
    let labels = record
        .images
        .iter()
        .map(|image| image.label.as_str())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["生化检验", "血常规"]);
}
