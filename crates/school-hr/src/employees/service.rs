use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::completion::{self, status_is_ready, CompletionReport};
use super::domain::{
    BasicInfo, EmployeeId, EmployeeRecord, NewEmployee, VerificationState, VerificationStatus,
};
use super::profile::{DocumentSlot, Documents, PersonalDetails, StoredFile};
use crate::directory::{School, SchoolId, User, UserId};
use crate::store::{IdSequence, Repository, RepositoryError};
use crate::validation::{require_email, require_text};

static EMPLOYEE_IDS: IdSequence = IdSequence::new("emp");

/// Employee persistence path plus the verification workflow.
///
/// Every profile write goes through [`EmployeeService::edit_profile`], which re-scores the
/// profile and stamps `last_profile_update` inside one repository read-modify-write, so
/// concurrent edits never overwrite each other.
pub struct EmployeeService<E, S, U> {
    employees: Arc<E>,
    schools: Arc<S>,
    users: Arc<U>,
}

impl<E, S, U> EmployeeService<E, S, U>
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    pub fn new(employees: Arc<E>, schools: Arc<S>, users: Arc<U>) -> Self {
        Self {
            employees,
            schools,
            users,
        }
    }

    /// Onboard an employee under an active school.
    pub fn create(&self, new: NewEmployee) -> Result<EmployeeRecord, EmployeeServiceError> {
        let NewEmployee {
            school_id,
            basic,
            profile,
        } = new;

        validate_basic(&basic)?;
        let code = basic.employee_code.trim().to_string();

        let now = Utc::now();
        let mut record = EmployeeRecord {
            id: EmployeeId(EMPLOYEE_IDS.next()),
            school_id: school_id.clone(),
            basic,
            profile,
            completion: Default::default(),
            verification: VerificationState::default(),
            last_profile_update: None,
            created_at: now,
        };
        stamp_completion(&mut record, now);

        // The school stays locked so it cannot be deactivated between check and insert.
        let stored = self.schools.with_record(&school_id, |school| {
            match school {
                Some(school) if school.active => {}
                Some(_) => return Err(EmployeeServiceError::InactiveSchool(school_id.clone())),
                None => return Err(EmployeeServiceError::UnknownSchool(school_id.clone())),
            }
            self.employees
                .insert_unless(record, |existing| holds_code(existing, &school_id, &code))
                .map_err(|error| duplicate_code(error, &code, &school_id))
        })?;

        info!(
            employee_id = %stored.id,
            school_id = %stored.school_id,
            completion = stored.completion.overall_percentage,
            "employee onboarded"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &EmployeeId) -> Result<EmployeeRecord, EmployeeServiceError> {
        self.employees
            .fetch(id)?
            .ok_or(EmployeeServiceError::NotFound)
    }

    /// All employees, optionally restricted to one school, ordered by id.
    pub fn list(
        &self,
        school_id: Option<&SchoolId>,
    ) -> Result<Vec<EmployeeRecord>, EmployeeServiceError> {
        let mut records: Vec<_> = self
            .employees
            .list()?
            .into_iter()
            .filter(|record| school_id.map_or(true, |school| &record.school_id == school))
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    pub fn delete(&self, id: &EmployeeId) -> Result<EmployeeRecord, EmployeeServiceError> {
        let removed = self.employees.remove(id)?;
        info!(employee_id = %removed.id, "employee removed");
        Ok(removed)
    }

    pub fn update_basic_info(
        &self,
        id: &EmployeeId,
        basic: BasicInfo,
    ) -> Result<EmployeeRecord, EmployeeServiceError> {
        validate_basic(&basic)?;
        let code = basic.employee_code.trim().to_string();
        self.edit_profile(id, Utc::now(), |record, others| {
            if others.iter().any(|other| holds_code(other, &record.school_id, &code)) {
                return Err(EmployeeServiceError::DuplicateCode {
                    code,
                    school_id: record.school_id.clone(),
                });
            }
            record.basic = basic;
            Ok(())
        })
    }

    pub fn update_personal_details(
        &self,
        id: &EmployeeId,
        details: PersonalDetails,
    ) -> Result<EmployeeRecord, EmployeeServiceError> {
        self.edit_profile(id, Utc::now(), |record, _| {
            record.profile.personal_details = Some(details);
            Ok(())
        })
    }

    pub fn update_documents(
        &self,
        id: &EmployeeId,
        documents: Documents,
    ) -> Result<EmployeeRecord, EmployeeServiceError> {
        self.edit_profile(id, Utc::now(), |record, _| {
            record.profile.documents = Some(documents);
            Ok(())
        })
    }

    /// Record an already-hosted upload against one document slot.
    pub fn attach_document(
        &self,
        id: &EmployeeId,
        slot: DocumentSlot,
        file: StoredFile,
    ) -> Result<EmployeeRecord, EmployeeServiceError> {
        require_text("file url", &file.url).map_err(EmployeeServiceError::Validation)?;

        let now = Utc::now();
        self.edit_profile(id, now, |record, _| {
            record
                .profile
                .documents
                .get_or_insert_with(Documents::default)
                .attach(slot, file, now);
            Ok(())
        })
    }

    pub fn completion(&self, id: &EmployeeId) -> Result<CompletionReport, EmployeeServiceError> {
        let record = self.get(id)?;
        Ok(completion::assess(&record.profile))
    }

    /// Submit a fully completed profile for HR review.
    pub fn request_verification(
        &self,
        id: &EmployeeId,
    ) -> Result<EmployeeRecord, EmployeeServiceError> {
        let record = self.transition(
            id,
            "request verification",
            &[VerificationStatus::Pending, VerificationStatus::Rejected],
            |record| {
                require_ready(record)?;
                record.verification = VerificationState {
                    status: VerificationStatus::UnderReview,
                    ..VerificationState::default()
                };
                Ok(())
            },
        )?;
        info!(employee_id = %record.id, "verification requested");
        Ok(record)
    }

    /// Approve the profile as it is stored at the moment of approval.
    pub fn approve(
        &self,
        id: &EmployeeId,
        reviewer: UserId,
    ) -> Result<EmployeeRecord, EmployeeServiceError> {
        let record = self.users.with_record(&reviewer, |user| {
            require_reviewer(&reviewer, user)?;
            self.transition(id, "approve", &[VerificationStatus::UnderReview], |record| {
                require_ready(record)?;
                record.verification = VerificationState {
                    status: VerificationStatus::Verified,
                    remarks: None,
                    reviewed_by: Some(reviewer.clone()),
                    reviewed_at: Some(Utc::now()),
                };
                Ok(())
            })
        })?;
        info!(employee_id = %record.id, reviewer = %reviewer, "employee verified");
        Ok(record)
    }

    pub fn reject(
        &self,
        id: &EmployeeId,
        reviewer: UserId,
        remarks: String,
    ) -> Result<EmployeeRecord, EmployeeServiceError> {
        require_text("remarks", &remarks).map_err(EmployeeServiceError::Validation)?;

        let record = self.users.with_record(&reviewer, |user| {
            require_reviewer(&reviewer, user)?;
            self.transition(id, "reject", &[VerificationStatus::UnderReview], |record| {
                record.verification = VerificationState {
                    status: VerificationStatus::Rejected,
                    remarks: Some(remarks.trim().to_string()),
                    reviewed_by: Some(reviewer.clone()),
                    reviewed_at: Some(Utc::now()),
                };
                Ok(())
            })
        })?;
        info!(employee_id = %record.id, reviewer = %reviewer, "verification rejected");
        Ok(record)
    }

    fn transition<F>(
        &self,
        id: &EmployeeId,
        action: &'static str,
        allowed: &[VerificationStatus],
        apply: F,
    ) -> Result<EmployeeRecord, EmployeeServiceError>
    where
        F: FnOnce(&mut EmployeeRecord) -> Result<(), EmployeeServiceError>,
    {
        self.employees.update_with(id, |record, _| {
            let from = record.verification.status;
            if !allowed.contains(&from) {
                warn!(
                    employee_id = %record.id,
                    status = from.label(),
                    action,
                    "verification transition refused"
                );
                return Err(EmployeeServiceError::InvalidTransition { from, action });
            }
            apply(record)
        })
    }

    fn edit_profile<F>(
        &self,
        id: &EmployeeId,
        now: DateTime<Utc>,
        edit: F,
    ) -> Result<EmployeeRecord, EmployeeServiceError>
    where
        F: FnOnce(&mut EmployeeRecord, &[&EmployeeRecord]) -> Result<(), EmployeeServiceError>,
    {
        let record = self.employees.update_with(id, |record, others| {
            edit(record, others)?;
            stamp_completion(record, now);

            if matches!(
                record.verification.status,
                VerificationStatus::UnderReview | VerificationStatus::Verified
            ) {
                info!(
                    employee_id = %record.id,
                    previous = record.verification.status.label(),
                    "profile changed, verification reset"
                );
                record.verification = VerificationState::default();
            }
            Ok::<(), EmployeeServiceError>(())
        })?;

        info!(
            employee_id = %record.id,
            completion = record.completion.overall_percentage,
            "employee profile saved"
        );
        Ok(record)
    }
}

fn holds_code(record: &EmployeeRecord, school_id: &SchoolId, code: &str) -> bool {
    &record.school_id == school_id
        && record.basic.employee_code.trim().eq_ignore_ascii_case(code)
}

fn duplicate_code(
    error: RepositoryError,
    code: &str,
    school_id: &SchoolId,
) -> EmployeeServiceError {
    match error {
        RepositoryError::Conflict => EmployeeServiceError::DuplicateCode {
            code: code.to_string(),
            school_id: school_id.clone(),
        },
        other => other.into(),
    }
}

fn require_reviewer(id: &UserId, user: Option<&User>) -> Result<(), EmployeeServiceError> {
    match user {
        Some(user) if user.active => Ok(()),
        _ => {
            warn!(reviewer = %id, "review refused for unknown or inactive user");
            Err(EmployeeServiceError::UnknownReviewer(id.clone()))
        }
    }
}

/// Assign freshly computed completion flags onto the record about to be written.
fn stamp_completion(record: &mut EmployeeRecord, now: DateTime<Utc>) {
    record.completion = completion::evaluate(&record.profile);
    record.last_profile_update = Some(now);
}

fn require_ready(record: &mut EmployeeRecord) -> Result<(), EmployeeServiceError> {
    // Stored flags could predate a scoring change, so score the profile afresh.
    record.completion = completion::evaluate(&record.profile);
    if status_is_ready(&record.completion) {
        return Ok(());
    }

    warn!(
        employee_id = %record.id,
        completion = record.completion.overall_percentage,
        "profile not ready for verification"
    );
    Err(EmployeeServiceError::ProfileIncomplete {
        percentage: record.completion.overall_percentage,
    })
}

fn validate_basic(basic: &BasicInfo) -> Result<(), EmployeeServiceError> {
    require_text("employee_code", &basic.employee_code)
        .and_then(|_| require_text("first_name", &basic.first_name))
        .and_then(|_| require_text("last_name", &basic.last_name))
        .and_then(|_| require_email("work_email", &basic.work_email))
        .map_err(EmployeeServiceError::Validation)
}

/// Error raised by the employee service.
#[derive(Debug, thiserror::Error)]
pub enum EmployeeServiceError {
    #[error("invalid employee data: {0}")]
    Validation(String),
    #[error("school {0} does not exist")]
    UnknownSchool(SchoolId),
    #[error("school {0} is inactive")]
    InactiveSchool(SchoolId),
    #[error("employee code '{code}' is already used at school {school_id}")]
    DuplicateCode { code: String, school_id: SchoolId },
    #[error("employee not found")]
    NotFound,
    #[error("reviewer {0} is not an active user")]
    UnknownReviewer(UserId),
    #[error("profile is {percentage}% complete; verification requires a complete profile")]
    ProfileIncomplete { percentage: u8 },
    #[error("cannot {action} while verification is {}", .from.label())]
    InvalidTransition {
        from: VerificationStatus,
        action: &'static str,
    },
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for EmployeeServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}
