use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    NewSchool, NewUser, Role, RoleDefinition, RoleId, School, SchoolId, SchoolUpdate, User,
    UserId,
};
use crate::store::{IdSequence, Record, Repository, RepositoryError};
use crate::validation::{normalize_optional, require_email, require_text};

static SCHOOL_IDS: IdSequence = IdSequence::new("sch");
static ROLE_IDS: IdSequence = IdSequence::new("role");
static USER_IDS: IdSequence = IdSequence::new("usr");

/// Error raised by the directory services.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("invalid data: {0}")]
    Validation(String),
    #[error("{kind} {id} does not exist")]
    UnknownReference { kind: &'static str, id: String },
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn fetch_required<T, R>(repository: &R, id: &T::Id, kind: &'static str) -> Result<T, DirectoryError>
where
    T: Record,
    R: Repository<T> + ?Sized,
{
    repository.fetch(id)?.ok_or(DirectoryError::NotFound(kind))
}

fn sorted<T: Record>(mut records: Vec<T>) -> Vec<T> {
    records.sort_by(|a, b| a.id().cmp(b.id()));
    records
}

fn validation(message: String) -> DirectoryError {
    DirectoryError::Validation(message)
}

/// Names the missing record when a repository reports `NotFound`.
fn missing(kind: &'static str) -> impl Fn(DirectoryError) -> DirectoryError {
    move |error| match error {
        DirectoryError::Repository(RepositoryError::NotFound) => DirectoryError::NotFound(kind),
        other => other,
    }
}

/// Turns a refused conditional insert into a domain conflict.
fn taken(message: String) -> impl FnOnce(RepositoryError) -> DirectoryError {
    move |error| match error {
        RepositoryError::Conflict => DirectoryError::Conflict(message),
        other => other.into(),
    }
}

pub struct SchoolService<S> {
    schools: Arc<S>,
}

impl<S> SchoolService<S>
where
    S: Repository<School> + 'static,
{
    pub fn new(schools: Arc<S>) -> Self {
        Self { schools }
    }

    pub fn create(&self, new: NewSchool) -> Result<School, DirectoryError> {
        require_text("name", &new.name).map_err(validation)?;
        require_text("code", &new.code).map_err(validation)?;
        let contact_email = normalize_optional(new.contact_email);
        if let Some(email) = &contact_email {
            require_email("contact_email", email).map_err(validation)?;
        }

        let code = new.code.trim().to_ascii_uppercase();
        let school = School {
            id: SchoolId(SCHOOL_IDS.next()),
            name: new.name.trim().to_string(),
            code: code.clone(),
            address: normalize_optional(new.address),
            contact_email,
            contact_phone: normalize_optional(new.contact_phone),
            active: true,
            created_at: Utc::now(),
        };
        let stored = self
            .schools
            .insert_unless(school, |existing| existing.code.eq_ignore_ascii_case(&code))
            .map_err(taken(format!("school code '{code}' is already registered")))?;
        info!(school_id = %stored.id, code = %stored.code, "school registered");
        Ok(stored)
    }

    pub fn get(&self, id: &SchoolId) -> Result<School, DirectoryError> {
        fetch_required(&*self.schools, id, "school")
    }

    pub fn list(&self) -> Result<Vec<School>, DirectoryError> {
        Ok(sorted(self.schools.list()?))
    }

    pub fn update(&self, id: &SchoolId, update: SchoolUpdate) -> Result<School, DirectoryError> {
        let school = self
            .schools
            .update_with(id, |school, _| {
                if let Some(name) = update.name {
                    require_text("name", &name).map_err(validation)?;
                    school.name = name.trim().to_string();
                }
                if let Some(address) = update.address {
                    school.address = normalize_optional(Some(address));
                }
                if let Some(email) = update.contact_email {
                    let email = normalize_optional(Some(email));
                    if let Some(email) = &email {
                        require_email("contact_email", email).map_err(validation)?;
                    }
                    school.contact_email = email;
                }
                if let Some(phone) = update.contact_phone {
                    school.contact_phone = normalize_optional(Some(phone));
                }
                Ok::<_, DirectoryError>(())
            })
            .map_err(missing("school"))?;

        info!(school_id = %school.id, "school updated");
        Ok(school)
    }

    /// Schools are never hard-deleted; inactive schools refuse new employees.
    pub fn deactivate(&self, id: &SchoolId) -> Result<School, DirectoryError> {
        let school = self
            .schools
            .update_with(id, |school, _| {
                school.active = false;
                Ok::<_, DirectoryError>(())
            })
            .map_err(missing("school"))?;
        info!(school_id = %school.id, "school deactivated");
        Ok(school)
    }
}

pub struct RoleService<R, U> {
    roles: Arc<R>,
    users: Arc<U>,
}

impl<R, U> RoleService<R, U>
where
    R: Repository<Role> + 'static,
    U: Repository<User> + 'static,
{
    pub fn new(roles: Arc<R>, users: Arc<U>) -> Self {
        Self { roles, users }
    }

    pub fn create(&self, definition: RoleDefinition) -> Result<Role, DirectoryError> {
        let name = role_name(&definition.name)?;
        let role = Role {
            id: RoleId(ROLE_IDS.next()),
            name: name.clone(),
            description: normalize_optional(definition.description),
            permissions: definition.permissions,
        };
        let stored = self
            .roles
            .insert_unless(role, |existing| existing.name.eq_ignore_ascii_case(&name))
            .map_err(taken(format!("role '{name}' already exists")))?;
        info!(role_id = %stored.id, name = %stored.name, "role created");
        Ok(stored)
    }

    pub fn get(&self, id: &RoleId) -> Result<Role, DirectoryError> {
        fetch_required(&*self.roles, id, "role")
    }

    pub fn list(&self) -> Result<Vec<Role>, DirectoryError> {
        Ok(sorted(self.roles.list()?))
    }

    pub fn update(&self, id: &RoleId, definition: RoleDefinition) -> Result<Role, DirectoryError> {
        let name = role_name(&definition.name)?;
        let role = self
            .roles
            .update_with(id, |role, others| {
                if others
                    .iter()
                    .any(|other| other.name.eq_ignore_ascii_case(&name))
                {
                    return Err(DirectoryError::Conflict(format!(
                        "role '{name}' already exists"
                    )));
                }
                role.name = name;
                role.description = normalize_optional(definition.description);
                role.permissions = definition.permissions;
                Ok(())
            })
            .map_err(missing("role"))?;

        info!(role_id = %role.id, "role updated");
        Ok(role)
    }

    /// Remove a role nobody holds. The role stays locked while holders are counted, so a
    /// concurrent assignment either lands first and blocks the delete or fails afterwards.
    pub fn delete(&self, id: &RoleId) -> Result<Role, DirectoryError> {
        let removed = self
            .roles
            .remove_if(id, |_| {
                let holders = self
                    .users
                    .list()?
                    .iter()
                    .filter(|user| &user.role_id == id)
                    .count();
                if holders > 0 {
                    return Err(DirectoryError::Conflict(format!(
                        "role {id} is assigned to {holders} user(s)"
                    )));
                }
                Ok(())
            })
            .map_err(missing("role"))?;
        info!(role_id = %removed.id, "role deleted");
        Ok(removed)
    }
}

fn role_name(name: &str) -> Result<String, DirectoryError> {
    require_text("name", name).map_err(validation)?;
    Ok(name.trim().to_string())
}

pub struct UserService<U, R, S> {
    users: Arc<U>,
    roles: Arc<R>,
    schools: Arc<S>,
}

impl<U, R, S> UserService<U, R, S>
where
    U: Repository<User> + 'static,
    R: Repository<Role> + 'static,
    S: Repository<School> + 'static,
{
    pub fn new(users: Arc<U>, roles: Arc<R>, schools: Arc<S>) -> Self {
        Self {
            users,
            roles,
            schools,
        }
    }

    pub fn create(&self, new: NewUser) -> Result<User, DirectoryError> {
        require_text("name", &new.name).map_err(validation)?;
        require_email("email", &new.email).map_err(validation)?;

        let email = new.email.trim().to_ascii_lowercase();
        let user = User {
            id: UserId(USER_IDS.next()),
            name: new.name.trim().to_string(),
            email: email.clone(),
            role_id: new.role_id.clone(),
            school_id: new.school_id.clone(),
            active: true,
            created_at: Utc::now(),
        };
        let insert = || {
            self.users
                .insert_unless(user, |existing| existing.email == email)
                .map_err(taken(format!("a user with e-mail {email} already exists")))
        };

        // Role and school stay locked until the user is stored.
        let stored = self.roles.with_record(&new.role_id, |role| {
            require_role(&new.role_id, role)?;
            match &new.school_id {
                Some(school_id) => self.schools.with_record(school_id, |school| {
                    require_active_school(school_id, school)?;
                    insert()
                }),
                None => insert(),
            }
        })?;
        info!(user_id = %stored.id, role_id = %stored.role_id, "user created");
        Ok(stored)
    }

    pub fn get(&self, id: &UserId) -> Result<User, DirectoryError> {
        fetch_required(&*self.users, id, "user")
    }

    pub fn list(&self, school_id: Option<&SchoolId>) -> Result<Vec<User>, DirectoryError> {
        let users = self
            .users
            .list()?
            .into_iter()
            .filter(|user| school_id.map_or(true, |school| user.school_id.as_ref() == Some(school)))
            .collect();
        Ok(sorted(users))
    }

    pub fn assign_role(&self, id: &UserId, role_id: RoleId) -> Result<User, DirectoryError> {
        let user = self
            .roles
            .with_record(&role_id, |role| {
                require_role(&role_id, role)?;
                self.users.update_with(id, |user, _| {
                    user.role_id = role_id.clone();
                    Ok::<_, DirectoryError>(())
                })
            })
            .map_err(missing("user"))?;
        info!(user_id = %user.id, role_id = %user.role_id, "role assigned");
        Ok(user)
    }

    pub fn deactivate(&self, id: &UserId) -> Result<User, DirectoryError> {
        let user = self
            .users
            .update_with(id, |user, _| {
                user.active = false;
                Ok::<_, DirectoryError>(())
            })
            .map_err(missing("user"))?;
        info!(user_id = %user.id, "user deactivated");
        Ok(user)
    }
}

fn require_role(role_id: &RoleId, role: Option<&Role>) -> Result<(), DirectoryError> {
    match role {
        Some(_) => Ok(()),
        None => Err(DirectoryError::UnknownReference {
            kind: "role",
            id: role_id.to_string(),
        }),
    }
}

fn require_active_school(
    school_id: &SchoolId,
    school: Option<&School>,
) -> Result<(), DirectoryError> {
    match school {
        Some(school) if school.active => Ok(()),
        Some(_) => Err(DirectoryError::Validation(format!(
            "school {school_id} is inactive"
        ))),
        None => Err(DirectoryError::UnknownReference {
            kind: "school",
            id: school_id.to_string(),
        }),
    }
}
