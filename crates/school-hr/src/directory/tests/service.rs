use std::sync::{Arc, Barrier};
use std::thread;

use super::common::*;
use crate::directory::domain::{Permission, RoleId, School, SchoolId, SchoolUpdate, UserId};
use crate::directory::service::{DirectoryError, SchoolService};
use crate::store::RepositoryError;

#[test]
fn school_registration_normalizes_fields() {
    let directory = build_directory();

    let school = directory
        .schools
        .create(new_school(" hcs-01 "))
        .expect("school registered");

    assert!(school.id.0.starts_with("sch-"));
    assert_eq!(school.code, "HCS-01");
    assert_eq!(school.address.as_deref(), Some("8 Ridge Lane"));
    assert_eq!(school.contact_phone, None);
    assert!(school.active);
}

#[test]
fn school_codes_are_unique_ignoring_case() {
    let directory = build_directory();
    directory.schools.create(new_school("HCS-02")).unwrap();

    let error = directory
        .schools
        .create(new_school("hcs-02"))
        .expect_err("duplicate code");

    assert!(matches!(error, DirectoryError::Conflict(_)));
    assert_eq!(directory.schools.list().unwrap().len(), 1);
}

#[test]
fn school_contact_email_is_validated() {
    let directory = build_directory();
    let mut new = new_school("HCS-03");
    new.contact_email = Some("office.hillcrest".to_string());

    let error = directory.schools.create(new).expect_err("bad email");

    assert!(matches!(error, DirectoryError::Validation(_)));
}

#[test]
fn school_update_touches_only_supplied_fields() {
    let directory = build_directory();
    let school = directory.schools.create(new_school("HCS-04")).unwrap();

    let updated = directory
        .schools
        .update(
            &school.id,
            SchoolUpdate {
                name: Some("Hillcrest Senior Secondary".to_string()),
                contact_phone: Some("+91 484 2200110".to_string()),
                ..SchoolUpdate::default()
            },
        )
        .expect("updated");

    assert_eq!(updated.name, "Hillcrest Senior Secondary");
    assert_eq!(updated.contact_phone.as_deref(), Some("+91 484 2200110"));
    assert_eq!(updated.code, school.code);
    assert_eq!(updated.contact_email, school.contact_email);
    assert_eq!(directory.schools.get(&school.id).unwrap(), updated);
}

#[test]
fn deactivated_schools_refuse_new_users() {
    let directory = build_directory();
    let school = directory.schools.create(new_school("HCS-05")).unwrap();
    let role = directory.roles.create(role_definition("Principal")).unwrap();

    let closed = directory.schools.deactivate(&school.id).expect("deactivated");
    assert!(!closed.active);

    let error = directory
        .users
        .create(new_user("asha@hillcrest.edu", &role.id, Some(&school.id)))
        .expect_err("inactive school");
    assert!(matches!(error, DirectoryError::Validation(message) if message.contains("inactive")));
}

#[test]
fn missing_school_is_not_found() {
    let directory = build_directory();

    let error = directory
        .schools
        .get(&SchoolId("sch-ghost".to_string()))
        .expect_err("missing");

    assert!(matches!(error, DirectoryError::NotFound("school")));
}

#[test]
fn role_names_are_unique_but_may_be_kept_on_update() {
    let directory = build_directory();
    let role = directory.roles.create(role_definition("HR Manager")).unwrap();
    directory.roles.create(role_definition("Accountant")).unwrap();

    let error = directory
        .roles
        .create(role_definition("hr manager"))
        .expect_err("duplicate name");
    assert!(matches!(error, DirectoryError::Conflict(_)));

    let mut definition = role_definition("HR Manager");
    definition.permissions.insert(Permission::ViewReports);
    let updated = directory
        .roles
        .update(&role.id, definition)
        .expect("same name on same role");
    assert!(updated.permissions.contains(&Permission::ViewReports));

    let error = directory
        .roles
        .update(&role.id, role_definition("Accountant"))
        .expect_err("name taken by another role");
    assert!(matches!(error, DirectoryError::Conflict(_)));
}

#[test]
fn roles_held_by_users_cannot_be_deleted() {
    let directory = build_directory();
    let held = directory.roles.create(role_definition("Clerk")).unwrap();
    let spare = directory.roles.create(role_definition("Auditor")).unwrap();
    directory
        .users
        .create(new_user("clerk@hillcrest.edu", &held.id, None))
        .unwrap();

    let error = directory.roles.delete(&held.id).expect_err("role in use");
    assert!(matches!(error, DirectoryError::Conflict(message) if message.contains("1 user")));

    directory.roles.delete(&spare.id).expect("unused role removed");
    let error = directory.roles.delete(&spare.id).expect_err("already gone");
    assert!(matches!(error, DirectoryError::NotFound("role")));
}

#[test]
fn user_creation_checks_references_and_email() {
    let directory = build_directory();
    let role = directory.roles.create(role_definition("Teacher Admin")).unwrap();

    let error = directory
        .users
        .create(new_user(
            "asha@hillcrest.edu",
            &RoleId("role-ghost".to_string()),
            None,
        ))
        .expect_err("unknown role");
    assert!(matches!(error, DirectoryError::UnknownReference { kind: "role", .. }));

    let error = directory
        .users
        .create(new_user(
            "asha@hillcrest.edu",
            &role.id,
            Some(&SchoolId("sch-ghost".to_string())),
        ))
        .expect_err("unknown school");
    assert!(matches!(error, DirectoryError::UnknownReference { kind: "school", .. }));

    let user = directory
        .users
        .create(new_user(" Asha@Hillcrest.EDU ", &role.id, None))
        .expect("user created");
    assert_eq!(user.email, "asha@hillcrest.edu");

    let error = directory
        .users
        .create(new_user("ASHA@hillcrest.edu", &role.id, None))
        .expect_err("duplicate email");
    assert!(matches!(error, DirectoryError::Conflict(_)));
}

#[test]
fn users_can_be_filtered_by_school() {
    let directory = build_directory();
    let north = directory.schools.create(new_school("NORTH")).unwrap();
    let south = directory.schools.create(new_school("SOUTH")).unwrap();
    let role = directory.roles.create(role_definition("Office Staff")).unwrap();

    directory
        .users
        .create(new_user("a@north.edu", &role.id, Some(&north.id)))
        .unwrap();
    directory
        .users
        .create(new_user("b@south.edu", &role.id, Some(&south.id)))
        .unwrap();
    directory
        .users
        .create(new_user("c@district.edu", &role.id, None))
        .unwrap();

    assert_eq!(directory.users.list(None).unwrap().len(), 3);
    let north_users = directory.users.list(Some(&north.id)).unwrap();
    assert_eq!(north_users.len(), 1);
    assert_eq!(north_users[0].email, "a@north.edu");
}

#[test]
fn role_assignment_and_deactivation() {
    let directory = build_directory();
    let clerk = directory.roles.create(role_definition("Records Clerk")).unwrap();
    let lead = directory.roles.create(role_definition("HR Lead")).unwrap();
    let user = directory
        .users
        .create(new_user("lead@hillcrest.edu", &clerk.id, None))
        .unwrap();

    let promoted = directory
        .users
        .assign_role(&user.id, lead.id.clone())
        .expect("role assigned");
    assert_eq!(promoted.role_id, lead.id);

    let error = directory
        .users
        .assign_role(&user.id, RoleId("role-ghost".to_string()))
        .expect_err("unknown role");
    assert!(matches!(error, DirectoryError::UnknownReference { .. }));

    let inactive = directory.users.deactivate(&user.id).expect("deactivated");
    assert!(!inactive.active);

    let error = directory
        .users
        .deactivate(&UserId("usr-ghost".to_string()))
        .expect_err("missing user");
    assert!(matches!(error, DirectoryError::NotFound("user")));
}

#[test]
fn repository_outage_surfaces_as_repository_error() {
    let service = SchoolService::new(Arc::new(UnavailableRepository::<School>::default()));

    let error = service.list().expect_err("storage offline");

    assert!(matches!(
        error,
        DirectoryError::Repository(RepositoryError::Unavailable(_))
    ));
}

#[test]
fn concurrent_registrations_keep_school_codes_and_emails_unique() {
    let directory = build_directory();
    let role = directory.roles.create(role_definition("Registrar")).unwrap();
    let start = Barrier::new(8);

    thread::scope(|scope| {
        for n in 0..8 {
            let (directory, start, role_id) = (&directory, &start, &role.id);
            scope.spawn(move || {
                start.wait();
                if n % 2 == 0 {
                    let _ = directory.schools.create(new_school("RACE"));
                } else {
                    let _ = directory
                        .users
                        .create(new_user("registrar@hillcrest.edu", role_id, None));
                }
            });
        }
    });

    assert_eq!(directory.schools.list().unwrap().len(), 1);
    assert_eq!(directory.users.list(None).unwrap().len(), 1);
}

#[test]
fn role_deletion_never_races_past_a_new_holder() {
    let directory = build_directory();

    for round in 0..20 {
        let role = directory
            .roles
            .create(role_definition(&format!("Temp {round}")))
            .unwrap();
        let start = Barrier::new(2);

        let (deleted, created) = thread::scope(|scope| {
            let delete = scope.spawn(|| {
                start.wait();
                directory.roles.delete(&role.id).is_ok()
            });
            let create = scope.spawn(|| {
                start.wait();
                directory
                    .users
                    .create(new_user(&format!("temp{round}@hillcrest.edu"), &role.id, None))
                    .is_ok()
            });
            (
                delete.join().expect("delete thread"),
                create.join().expect("create thread"),
            )
        });

        assert!(deleted != created, "exactly one of delete and create wins");
        let holders = directory
            .users
            .list(None)
            .unwrap()
            .into_iter()
            .filter(|user| user.role_id == role.id)
            .count();
        assert_eq!(holders, usize::from(created));
        assert_eq!(directory.roles.get(&role.id).is_ok(), !deleted);
    }
}
