use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::completion::CompletionStatus;
use super::profile::EmployeeProfile;
use crate::directory::{SchoolId, UserId};
use crate::store::Record;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// HR-entered identity and placement data, present from creation onwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub work_email: String,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub joining_date: Option<NaiveDate>,
}

impl BasicInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Intake payload used by HR operators when onboarding an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub school_id: SchoolId,
    pub basic: BasicInfo,
    #[serde(default)]
    pub profile: EmployeeProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    UnderReview,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::UnderReview => "under_review",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationState {
    pub status: VerificationStatus,
    pub remarks: Option<String>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Default for VerificationState {
    fn default() -> Self {
        Self {
            status: VerificationStatus::Pending,
            remarks: None,
            reviewed_by: None,
            reviewed_at: None,
        }
    }
}

/// Stored employee document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    pub school_id: SchoolId,
    pub basic: BasicInfo,
    pub profile: EmployeeProfile,
    pub completion: CompletionStatus,
    pub verification: VerificationState,
    pub last_profile_update: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl EmployeeRecord {
    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary {
            id: self.id.clone(),
            school_id: self.school_id.clone(),
            employee_code: self.basic.employee_code.clone(),
            name: self.basic.full_name(),
            completion_percentage: self.completion.overall_percentage,
            verification_status: self.verification.status.label(),
        }
    }
}

impl Record for EmployeeRecord {
    type Id = EmployeeId;

    fn id(&self) -> &EmployeeId {
        &self.id
    }
}

/// Listing row exposed by the collection endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeSummary {
    pub id: EmployeeId,
    pub school_id: SchoolId,
    pub employee_code: String,
    pub name: String,
    pub completion_percentage: u8,
    pub verification_status: &'static str,
}
