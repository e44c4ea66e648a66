//! Demo data seeded on first launch and used by the CLI probe.

use crate::config::CoreConfig;
use crate::model::person::{AvatarColor, InvalidAvatarColor, Person};
use crate::model::record::{DocType, ImageAttachment, MedicalRecord};
use crate::repo::member_repo::InMemoryMemberRepository;
use crate::repo::record_repo::InMemoryRecordRepository;
use crate::repo::RepoError;
use crate::service::session::TimelineSession;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure while building demo data.
#[derive(Debug)]
pub enum FixtureError {
    Color(InvalidAvatarColor),
    Repo(RepoError),
}

impl Display for FixtureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Color(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FixtureError {}

impl From<InvalidAvatarColor> for FixtureError {
    fn from(value: InvalidAvatarColor) -> Self {
        Self::Color(value)
    }
}

impl From<RepoError> for FixtureError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Three demo family members.
pub fn demo_members() -> Result<Vec<Person>, FixtureError> {
    Ok(vec![
        Person::new("p1", "张三", AvatarColor::parse("#3b82f6")?),
        Person::new("p2", "李四", AvatarColor::parse("#10b981")?),
        Person::new("p3", "王五", AvatarColor::parse("#f97316")?),
    ])
}

/// Three demo records: two for `p1`, one for `p2`.
pub fn demo_records() -> Vec<MedicalRecord> {
    let mut lab = MedicalRecord::new("r1", "p1", "2025-11-01", "广东省人民医院", DocType::LabTest);
    lab.images = vec![
        ImageAttachment::new("i1", "https://picsum.photos/400/600?random=1", "生化检验"),
        ImageAttachment::new("i2", "https://picsum.photos/400/600?random=2", "血常规"),
    ];
    lab.ocr_text = "白细胞计数 12.5... 中性粒细胞比率...".to_string();

    let mut ultrasound = MedicalRecord::new(
        "r2",
        "p1",
        "2025-10-15",
        "中山大学附属第一医院",
        DocType::Ultrasound,
    );
    ultrasound.images = vec![ImageAttachment::new(
        "i3",
        "https://picsum.photos/400/600?random=3",
        "腹部B超",
    )];
    ultrasound.ocr_text = "肝脏形态正常... 胆囊未见异常...".to_string();

    let mut prescription = MedicalRecord::new(
        "r3",
        "p2",
        "2025-09-20",
        "南方医科大学南方医院",
        DocType::Prescription,
    );
    prescription.images = vec![ImageAttachment::new(
        "i4",
        "https://picsum.photos/400/600?random=4",
        "处方单",
    )];
    prescription.ocr_text = "阿莫西林胶囊 0.5g... 每日3次...".to_string();

    vec![lab, ultrasound, prescription]
}

/// Session seeded with the demo members and records.
pub fn demo_session(config: CoreConfig) -> Result<TimelineSession, FixtureError> {
    let records = InMemoryRecordRepository::with_records(demo_records())?;
    let members = InMemoryMemberRepository::new(demo_members()?)?;
    Ok(TimelineSession::new(records, members, config))
}
