use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::directory::{RoleId, School, SchoolId, User, UserId};
use crate::employees::domain::{BasicInfo, EmployeeRecord, NewEmployee};
use crate::employees::profile::{
    Address, BankAccount, CollectionDocument, Documents, EmergencyContact, EmployeeProfile,
    PersonalDetails, StoredFile,
};
use crate::employees::service::EmployeeService;
use crate::store::Repository;

pub(super) use crate::store::testing::{MemoryRepository, UnavailableRepository};

pub(super) type Employees = MemoryRepository<EmployeeRecord>;
pub(super) type Schools = MemoryRepository<School>;
pub(super) type Users = MemoryRepository<User>;

pub(super) const REVIEWER: &str = "usr-hr-lead";
pub(super) const DEPARTED_REVIEWER: &str = "usr-hr-former";

pub(super) fn school(id: &str, active: bool) -> School {
    School {
        id: SchoolId(id.to_string()),
        name: "Riverside Primary".to_string(),
        code: id.to_ascii_uppercase(),
        address: Some("12 Mill Road".to_string()),
        contact_email: Some("office@riverside.edu".to_string()),
        contact_phone: None,
        active,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    }
}

fn hr_user(id: &str, active: bool) -> User {
    User {
        id: UserId(id.to_string()),
        name: "Anita Joseph".to_string(),
        email: format!("{id}@riverside.edu"),
        role_id: RoleId("role-hr".to_string()),
        school_id: None,
        active,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    }
}

pub(super) fn reviewer() -> UserId {
    UserId(REVIEWER.to_string())
}

pub(super) fn basic_info(code: &str) -> BasicInfo {
    BasicInfo {
        employee_code: code.to_string(),
        first_name: "Meera".to_string(),
        last_name: "Nair".to_string(),
        work_email: "meera.nair@riverside.edu".to_string(),
        designation: Some("Mathematics Teacher".to_string()),
        department: Some("Mathematics".to_string()),
        joining_date: NaiveDate::from_ymd_opt(2024, 7, 1),
    }
}

pub(super) fn new_employee(code: &str) -> NewEmployee {
    NewEmployee {
        school_id: SchoolId("sch-main".to_string()),
        basic: basic_info(code),
        profile: EmployeeProfile::default(),
    }
}

pub(super) fn full_personal_details() -> PersonalDetails {
    PersonalDetails {
        date_of_birth: NaiveDate::from_ymd_opt(1991, 3, 14),
        contact_number: Some("+91 98450 11223".to_string()),
        personal_email: Some("meera.n@example.com".to_string()),
        tax_id: Some("ABCPN1234K".to_string()),
        national_id: Some("4321 8765 1209".to_string()),
        emergency_contact: Some(EmergencyContact {
            name: Some("Ravi Nair".to_string()),
            number: Some("+91 98450 99887".to_string()),
        }),
        current_address: Some(Address {
            street: Some("4 Lake View".to_string()),
            city: Some("Kochi".to_string()),
            postal_code: Some("682001".to_string()),
        }),
        bank_account: Some(BankAccount {
            holder_name: Some("Meera Nair".to_string()),
            bank_name: Some("Federal Bank".to_string()),
            account_number: Some("00110200334455".to_string()),
            routing_code: Some("FDRL0001234".to_string()),
            branch: Some("Marine Drive".to_string()),
        }),
    }
}

fn file(name: &str) -> StoredFile {
    StoredFile {
        url: format!("https://media.example.com/hr/{name}"),
        public_id: Some(format!("hr/{name}")),
    }
}

fn collection_entry(name: &str) -> CollectionDocument {
    CollectionDocument {
        file: file(name),
        uploaded_at: Utc.with_ymd_and_hms(2024, 7, 2, 10, 30, 0).unwrap(),
    }
}

pub(super) fn full_documents() -> Documents {
    Documents {
        offer_letter: Some(file("offer.pdf")),
        appointment_letter: Some(file("appointment.pdf")),
        resume: Some(file("resume.pdf")),
        photo: Some(file("photo.jpg")),
        tax_id_card: Some(file("tax-card.png")),
        national_id_card: Some(file("national-id.png")),
        address_proof: Some(file("utility-bill.pdf")),
        educational_certificates: vec![collection_entry("degree.pdf")],
        identity_proofs: vec![collection_entry("passport.pdf")],
    }
}

pub(super) fn complete_profile() -> EmployeeProfile {
    EmployeeProfile {
        personal_details: Some(full_personal_details()),
        documents: Some(full_documents()),
    }
}

pub(super) fn seeded_users() -> Arc<Users> {
    let users = Arc::new(Users::default());
    users.insert(hr_user(REVIEWER, true)).expect("seed reviewer");
    users
        .insert(hr_user(DEPARTED_REVIEWER, false))
        .expect("seed reviewer");
    users
}

pub(super) fn build_service() -> (
    EmployeeService<Employees, Schools, Users>,
    Arc<Employees>,
    Arc<Schools>,
) {
    let employees = Arc::new(Employees::default());
    let schools = Arc::new(Schools::default());
    schools
        .insert(school("sch-main", true))
        .expect("seed school");
    schools
        .insert(school("sch-closed", false))
        .expect("seed school");
    let service = EmployeeService::new(employees.clone(), schools.clone(), seeded_users());
    (service, employees, schools)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
