use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    NewSchool, NewUser, Role, RoleDefinition, RoleId, School, SchoolId, SchoolUpdate, User,
    UserId,
};
use super::service::{DirectoryError, RoleService, SchoolService, UserService};
use crate::store::{Repository, RepositoryError};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserListQuery {
    #[serde(default)]
    pub(crate) school_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleAssignment {
    pub(crate) role_id: RoleId,
}

pub fn school_router<S>(service: Arc<SchoolService<S>>) -> Router
where
    S: Repository<School> + 'static,
{
    Router::new()
        .route(
            "/api/v1/schools",
            post(create_school::<S>).get(list_schools::<S>),
        )
        .route(
            "/api/v1/schools/:school_id",
            get(get_school::<S>).put(update_school::<S>),
        )
        .route(
            "/api/v1/schools/:school_id/deactivate",
            post(deactivate_school::<S>),
        )
        .with_state(service)
}

pub fn role_router<R, U>(service: Arc<RoleService<R, U>>) -> Router
where
    R: Repository<Role> + 'static,
    U: Repository<User> + 'static,
{
    Router::new()
        .route(
            "/api/v1/roles",
            post(create_role::<R, U>).get(list_roles::<R, U>),
        )
        .route(
            "/api/v1/roles/:role_id",
            get(get_role::<R, U>)
                .put(update_role::<R, U>)
                .delete(delete_role::<R, U>),
        )
        .with_state(service)
}

pub fn user_router<U, R, S>(service: Arc<UserService<U, R, S>>) -> Router
where
    U: Repository<User> + 'static,
    R: Repository<Role> + 'static,
    S: Repository<School> + 'static,
{
    Router::new()
        .route(
            "/api/v1/users",
            post(create_user::<U, R, S>).get(list_users::<U, R, S>),
        )
        .route("/api/v1/users/:user_id", get(get_user::<U, R, S>))
        .route("/api/v1/users/:user_id/role", put(assign_role::<U, R, S>))
        .route(
            "/api/v1/users/:user_id/deactivate",
            post(deactivate_user::<U, R, S>),
        )
        .with_state(service)
}

pub(crate) async fn create_school<S>(
    State(service): State<Arc<SchoolService<S>>>,
    Json(new): Json<NewSchool>,
) -> Response
where
    S: Repository<School> + 'static,
{
    created(service.create(new))
}

pub(crate) async fn list_schools<S>(State(service): State<Arc<SchoolService<S>>>) -> Response
where
    S: Repository<School> + 'static,
{
    respond(service.list())
}

pub(crate) async fn get_school<S>(
    State(service): State<Arc<SchoolService<S>>>,
    Path(school_id): Path<String>,
) -> Response
where
    S: Repository<School> + 'static,
{
    respond(service.get(&SchoolId(school_id)))
}

pub(crate) async fn update_school<S>(
    State(service): State<Arc<SchoolService<S>>>,
    Path(school_id): Path<String>,
    Json(update): Json<SchoolUpdate>,
) -> Response
where
    S: Repository<School> + 'static,
{
    respond(service.update(&SchoolId(school_id), update))
}

pub(crate) async fn deactivate_school<S>(
    State(service): State<Arc<SchoolService<S>>>,
    Path(school_id): Path<String>,
) -> Response
where
    S: Repository<School> + 'static,
{
    respond(service.deactivate(&SchoolId(school_id)))
}

pub(crate) async fn create_role<R, U>(
    State(service): State<Arc<RoleService<R, U>>>,
    Json(definition): Json<RoleDefinition>,
) -> Response
where
    R: Repository<Role> + 'static,
    U: Repository<User> + 'static,
{
    created(service.create(definition))
}

pub(crate) async fn list_roles<R, U>(State(service): State<Arc<RoleService<R, U>>>) -> Response
where
    R: Repository<Role> + 'static,
    U: Repository<User> + 'static,
{
    respond(service.list())
}

pub(crate) async fn get_role<R, U>(
    State(service): State<Arc<RoleService<R, U>>>,
    Path(role_id): Path<String>,
) -> Response
where
    R: Repository<Role> + 'static,
    U: Repository<User> + 'static,
{
    respond(service.get(&RoleId(role_id)))
}

pub(crate) async fn update_role<R, U>(
    State(service): State<Arc<RoleService<R, U>>>,
    Path(role_id): Path<String>,
    Json(definition): Json<RoleDefinition>,
) -> Response
where
    R: Repository<Role> + 'static,
    U: Repository<User> + 'static,
{
    respond(service.update(&RoleId(role_id), definition))
}

pub(crate) async fn delete_role<R, U>(
    State(service): State<Arc<RoleService<R, U>>>,
    Path(role_id): Path<String>,
) -> Response
where
    R: Repository<Role> + 'static,
    U: Repository<User> + 'static,
{
    match service.delete(&RoleId(role_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn create_user<U, R, S>(
    State(service): State<Arc<UserService<U, R, S>>>,
    Json(new): Json<NewUser>,
) -> Response
where
    U: Repository<User> + 'static,
    R: Repository<Role> + 'static,
    S: Repository<School> + 'static,
{
    created(service.create(new))
}

pub(crate) async fn list_users<U, R, S>(
    State(service): State<Arc<UserService<U, R, S>>>,
    Query(query): Query<UserListQuery>,
) -> Response
where
    U: Repository<User> + 'static,
    R: Repository<Role> + 'static,
    S: Repository<School> + 'static,
{
    let school_id = query.school_id.map(SchoolId);
    respond(service.list(school_id.as_ref()))
}

pub(crate) async fn get_user<U, R, S>(
    State(service): State<Arc<UserService<U, R, S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    U: Repository<User> + 'static,
    R: Repository<Role> + 'static,
    S: Repository<School> + 'static,
{
    respond(service.get(&UserId(user_id)))
}

pub(crate) async fn assign_role<U, R, S>(
    State(service): State<Arc<UserService<U, R, S>>>,
    Path(user_id): Path<String>,
    Json(assignment): Json<RoleAssignment>,
) -> Response
where
    U: Repository<User> + 'static,
    R: Repository<Role> + 'static,
    S: Repository<School> + 'static,
{
    respond(service.assign_role(&UserId(user_id), assignment.role_id))
}

pub(crate) async fn deactivate_user<U, R, S>(
    State(service): State<Arc<UserService<U, R, S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    U: Repository<User> + 'static,
    R: Repository<Role> + 'static,
    S: Repository<School> + 'static,
{
    respond(service.deactivate(&UserId(user_id)))
}

fn created<T: Serialize>(result: Result<T, DirectoryError>) -> Response {
    match result {
        Ok(body) => (StatusCode::CREATED, Json(body)).into_response(),
        Err(error) => failure(error),
    }
}

fn respond<T: Serialize>(result: Result<T, DirectoryError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) fn failure(error: DirectoryError) -> Response {
    let status = match &error {
        DirectoryError::Validation(_) | DirectoryError::UnknownReference { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DirectoryError::NotFound(_) | DirectoryError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        DirectoryError::Conflict(_) | DirectoryError::Repository(RepositoryError::Conflict) => {
            StatusCode::CONFLICT
        }
        DirectoryError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
