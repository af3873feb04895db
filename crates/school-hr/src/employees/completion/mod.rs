//! Profile completion scoring.
//!
//! The percentage is a fixed base for the HR-entered basic info plus two equally weighted
//! sections: personal details (15 fields) and documents (7 single files plus 2 collections).
//! Scoring is a pure function of the profile; the employee service writes the result back
//! onto the record before every save.

mod fields;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::profile::EmployeeProfile;
use fields::{
    collection_flags, personal_fields, single_documents, TrackedField, DOCUMENT_UNIT_COUNT,
    PERSONAL_FIELD_COUNT,
};

pub const BASE_PERCENTAGE: u8 = 25;

// Arithmetic runs in ninetieths of a percent so both section weights are whole numbers:
// 37.5 / 15 fields = 225/90, 37.5 / 9 units = 375/90.
const SCALE: u32 = 90;
const SECTION_WEIGHT: u32 = 3375;
const PERSONAL_FIELD_WEIGHT: u32 = SECTION_WEIGHT / PERSONAL_FIELD_COUNT;
const DOCUMENT_UNIT_WEIGHT: u32 = SECTION_WEIGHT / DOCUMENT_UNIT_COUNT;

/// Derived completion flags stored alongside every employee record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionStatus {
    pub personal_details_complete: bool,
    pub required_documents_complete: bool,
    pub overall_percentage: u8,
}

impl Default for CompletionStatus {
    /// Placeholder until the first evaluation runs.
    fn default() -> Self {
        Self {
            personal_details_complete: false,
            required_documents_complete: false,
            overall_percentage: BASE_PERCENTAGE,
        }
    }
}

/// Filled/total counts for one scored section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionProgress {
    pub filled: u32,
    pub total: u32,
    pub missing: Vec<&'static str>,
}

impl SectionProgress {
    fn from_fields<'a>(fields: impl IntoIterator<Item = &'a TrackedField>) -> Self {
        let mut progress = Self {
            filled: 0,
            total: 0,
            missing: Vec::new(),
        };
        for field in fields {
            progress.total += 1;
            if field.filled {
                progress.filled += 1;
            } else {
                progress.missing.push(field.name);
            }
        }
        progress
    }

    pub fn is_complete(&self) -> bool {
        self.filled == self.total
    }
}

/// Per-section view used for "what is still missing" hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionBreakdown {
    pub personal_details: SectionProgress,
    pub documents: SectionProgress,
}

/// Status, breakdown and readiness in one response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionReport {
    pub status: CompletionStatus,
    pub breakdown: CompletionBreakdown,
    pub ready_for_verification: bool,
}

/// Raw profile input could not be interpreted as a profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileShapeError {
    #[error("profile must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    #[error("malformed profile: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn breakdown(profile: &EmployeeProfile) -> CompletionBreakdown {
    let personal = personal_fields(profile.personal_details.as_ref());
    let documents = profile.documents.as_ref();
    let singles = single_documents(documents);
    let collections = collection_flags(documents);

    CompletionBreakdown {
        personal_details: SectionProgress::from_fields(personal.iter()),
        documents: SectionProgress::from_fields(singles.iter().chain(collections.iter())),
    }
}

/// Score a profile snapshot. Absent sections count as entirely unfilled.
pub fn evaluate(profile: &EmployeeProfile) -> CompletionStatus {
    status_from(&breakdown(profile))
}

fn status_from(breakdown: &CompletionBreakdown) -> CompletionStatus {
    let personal = breakdown.personal_details.filled;
    let document_units = breakdown.documents.filled;

    let scaled = u32::from(BASE_PERCENTAGE) * SCALE
        + PERSONAL_FIELD_WEIGHT * personal
        + DOCUMENT_UNIT_WEIGHT * document_units;
    // round half up
    let rounded = (2 * scaled + SCALE) / (2 * SCALE);
    let overall_percentage = rounded.min(100) as u8;

    debug!(
        personal,
        document_units, overall_percentage, "profile completion evaluated"
    );

    CompletionStatus {
        personal_details_complete: breakdown.personal_details.is_complete(),
        required_documents_complete: breakdown.documents.is_complete(),
        overall_percentage,
    }
}

/// Gate for entering the verification workflow.
///
/// Under the current weights a 100% score already implies both flags, but callers inspect
/// each field independently so all three are checked.
pub fn is_ready_for_verification(profile: &EmployeeProfile) -> bool {
    status_is_ready(&evaluate(profile))
}

pub(crate) fn status_is_ready(status: &CompletionStatus) -> bool {
    status.overall_percentage == 100
        && status.personal_details_complete
        && status.required_documents_complete
}

pub fn assess(profile: &EmployeeProfile) -> CompletionReport {
    let breakdown = breakdown(profile);
    let status = status_from(&breakdown);
    CompletionReport {
        status,
        ready_for_verification: status_is_ready(&status),
        breakdown,
    }
}

/// Interpret unvalidated JSON as a profile. `null` anywhere a section or nested structure
/// is expected means "not provided"; any other type mismatch is rejected.
pub fn profile_from_json(raw: &Value) -> Result<EmployeeProfile, ProfileShapeError> {
    match raw {
        Value::Null => Ok(EmployeeProfile::default()),
        Value::Object(_) => Ok(EmployeeProfile::deserialize(raw)?),
        other => Err(ProfileShapeError::NotAnObject {
            found: json_kind(other),
        }),
    }
}

pub fn evaluate_json(raw: &Value) -> Result<CompletionStatus, ProfileShapeError> {
    profile_from_json(raw).map(|profile| evaluate(&profile))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
