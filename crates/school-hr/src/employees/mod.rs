//! Employee records: intake, self-service profile, completion scoring and verification.

pub mod completion;
pub mod domain;
pub mod profile;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use completion::{
    assess, evaluate, evaluate_json, is_ready_for_verification, profile_from_json,
    CompletionBreakdown, CompletionReport, CompletionStatus, ProfileShapeError, SectionProgress,
};
pub use domain::{
    BasicInfo, EmployeeId, EmployeeRecord, EmployeeSummary, NewEmployee, VerificationState,
    VerificationStatus,
};
pub use profile::{
    Address, BankAccount, CollectionDocument, DocumentSlot, Documents, EmergencyContact,
    EmployeeProfile, PersonalDetails, StoredFile,
};
pub use router::employee_router;
pub use service::{EmployeeService, EmployeeServiceError};
