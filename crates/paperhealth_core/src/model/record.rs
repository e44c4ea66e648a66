//! Medical record model.
//!
//! # Responsibility
//! - Define the canonical record shared by timeline, detail and group views.
//! - Validate structural invariants before a record enters the store.
//!
//! # Invariants
//! - `id` and `patient_id` are non-blank.
//! - `end_date` is only set on grouped records.
//! - `end_date >= date` whenever both parse as calendar dates.
//! - `images` keep display order; they are never sorted.
//!
//! A malformed `date` is not a validation failure here. It is surfaced by the
//! timeline under the configured invalid-date policy.

use crate::model::date::{format_record_date, parse_record_date};
use crate::model::person::PersonId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of one medical record.
pub type RecordId = String;

/// Shared identity of records grouped into one date span.
pub type GroupId = String;

/// Document category. Serialized by its display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    #[serde(rename = "生化检验")]
    LabTest,
    #[serde(rename = "B超报告")]
    Ultrasound,
    #[serde(rename = "处方")]
    Prescription,
    #[serde(rename = "CT")]
    CtScan,
    #[serde(rename = "MR")]
    Mri,
    #[serde(rename = "出院报告")]
    DischargeSummary,
    #[serde(rename = "其他")]
    Other,
}

impl DocType {
    /// Text shown on cards; also the text matched by timeline search.
    pub fn display_text(self) -> &'static str {
        match self {
            Self::LabTest => "生化检验",
            Self::Ultrasound => "B超报告",
            Self::Prescription => "处方",
            Self::CtScan => "CT",
            Self::Mri => "MR",
            Self::DischargeSummary => "出院报告",
            Self::Other => "其他",
        }
    }
}

impl Display for DocType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_text())
    }
}

/// One scanned page attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub id: String,
    pub url: String,
    pub label: String,
}

impl ImageAttachment {
    pub fn new(id: impl Into<String>, url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            label: label.into(),
        }
    }
}

/// Validation errors for record invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    BlankId,
    BlankPatientId(RecordId),
    EndDateWithoutGroup(RecordId),
    InvalidGroupWindow {
        record_id: RecordId,
        date: String,
        end_date: String,
    },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "record id must not be blank"),
            Self::BlankPatientId(id) => write!(f, "record {id} has blank patient id"),
            Self::EndDateWithoutGroup(id) => {
                write!(f, "record {id} has end_date but is not grouped")
            }
            Self::InvalidGroupWindow {
                record_id,
                date,
                end_date,
            } => write!(
                f,
                "record {record_id}: end_date ({end_date}) must be >= date ({date})"
            ),
        }
    }
}

impl Error for RecordValidationError {}

/// Canonical medical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: RecordId,
    /// Owning family member. May dangle after that member is deleted.
    pub patient_id: PersonId,
    /// ISO date string as captured; see [`crate::model::date`].
    pub date: String,
    pub hospital: String,
    #[serde(rename = "type")]
    pub doc_type: DocType,
    #[serde(default)]
    pub images: Vec<ImageAttachment>,
    #[serde(default)]
    pub ocr_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_grouped: Option<bool>,
    /// Upper bound of the group span. Set on the group representative only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

impl MedicalRecord {
    /// Creates an ungrouped record without images, OCR text or summary.
    pub fn new(
        id: impl Into<RecordId>,
        patient_id: impl Into<PersonId>,
        date: impl Into<String>,
        hospital: impl Into<String>,
        doc_type: DocType,
    ) -> Self {
        Self {
            id: id.into(),
            patient_id: patient_id.into(),
            date: date.into(),
            hospital: hospital.into(),
            doc_type,
            images: Vec::new(),
            ocr_text: String::new(),
            summary: None,
            is_grouped: None,
            end_date: None,
            group_id: None,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.is_grouped.unwrap_or(false)
    }

    /// Checks structural invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id.trim().is_empty() {
            return Err(RecordValidationError::BlankId);
        }
        if self.patient_id.trim().is_empty() {
            return Err(RecordValidationError::BlankPatientId(self.id.clone()));
        }
        let Some(end_date) = self.end_date.as_deref() else {
            return Ok(());
        };
        if !self.is_grouped() {
            return Err(RecordValidationError::EndDateWithoutGroup(self.id.clone()));
        }
        let window = (parse_record_date(&self.date), parse_record_date(end_date));
        if let (Some(start), Some(end)) = window {
            if end < start {
                return Err(RecordValidationError::InvalidGroupWindow {
                    record_id: self.id.clone(),
                    date: self.date.clone(),
                    end_date: end_date.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether `query` occurs literally in hospital, OCR text or type text.
    ///
    /// Empty query matches everything. Matching is case-sensitive.
    pub fn matches_query(&self, query: &str) -> bool {
        query.is_empty()
            || self.hospital.contains(query)
            || self.ocr_text.contains(query)
            || self.doc_type.display_text().contains(query)
    }

    /// Date label for cards: `YYYY-MM-DD`, or `start - end` for a grouped span.
    pub fn date_label(&self) -> String {
        match (self.is_grouped(), self.end_date.as_deref()) {
            (true, Some(end_date)) => format!(
                "{} - {}",
                format_record_date(&self.date),
                format_record_date(end_date)
            ),
            _ => format_record_date(&self.date),
        }
    }
}
