//! Schools, roles and back-office users.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    NewSchool, NewUser, Permission, Role, RoleDefinition, RoleId, School, SchoolId, SchoolUpdate,
    User, UserId,
};
pub use router::{role_router, school_router, user_router};
pub use service::{DirectoryError, RoleService, SchoolService, UserService};
