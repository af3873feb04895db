use std::collections::BTreeSet;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::directory::domain::{
    NewSchool, NewUser, Permission, Role, RoleDefinition, RoleId, School, SchoolId, User,
};
use crate::directory::service::{RoleService, SchoolService, UserService};

pub(super) use crate::store::testing::{MemoryRepository, UnavailableRepository};

pub(super) type Schools = MemoryRepository<School>;
pub(super) type Roles = MemoryRepository<Role>;
pub(super) type Users = MemoryRepository<User>;

pub(super) struct Directory {
    pub(super) schools: SchoolService<Schools>,
    pub(super) roles: RoleService<Roles, Users>,
    pub(super) users: UserService<Users, Roles, Schools>,
}

pub(super) fn build_directory() -> Directory {
    let schools = Arc::new(Schools::default());
    let roles = Arc::new(Roles::default());
    let users = Arc::new(Users::default());

    Directory {
        schools: SchoolService::new(schools.clone()),
        roles: RoleService::new(roles.clone(), users.clone()),
        users: UserService::new(users, roles, schools),
    }
}

pub(super) fn new_school(code: &str) -> NewSchool {
    NewSchool {
        name: "Hillcrest Secondary".to_string(),
        code: code.to_string(),
        address: Some("  8 Ridge Lane ".to_string()),
        contact_email: Some("office@hillcrest.edu".to_string()),
        contact_phone: Some(String::new()),
    }
}

pub(super) fn role_definition(name: &str) -> RoleDefinition {
    RoleDefinition {
        name: name.to_string(),
        description: Some("Reviews employee profiles".to_string()),
        permissions: BTreeSet::from([Permission::ManageEmployees, Permission::VerifyEmployees]),
    }
}

pub(super) fn new_user(email: &str, role_id: &RoleId, school_id: Option<&SchoolId>) -> NewUser {
    NewUser {
        name: "Asha Verma".to_string(),
        email: email.to_string(),
        role_id: role_id.clone(),
        school_id: school_id.cloned(),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
