use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::completion::{assess, profile_from_json};
use super::domain::{BasicInfo, EmployeeId, EmployeeRecord, EmployeeSummary, NewEmployee};
use super::profile::{DocumentSlot, Documents, PersonalDetails, StoredFile};
use super::service::{EmployeeService, EmployeeServiceError};
use crate::directory::{School, SchoolId, User, UserId};
use crate::store::{Repository, RepositoryError};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EmployeeListQuery {
    #[serde(default)]
    pub(crate) school_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApprovalRequest {
    pub(crate) reviewer_id: UserId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectionRequest {
    pub(crate) reviewer_id: UserId,
    pub(crate) remarks: String,
}

/// Router exposing employee intake, profile updates and the verification workflow.
pub fn employee_router<E, S, U>(service: Arc<EmployeeService<E, S, U>>) -> Router
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    Router::new()
        .route(
            "/api/v1/employees",
            post(create_handler::<E, S, U>).get(list_handler::<E, S, U>),
        )
        .route(
            "/api/v1/employees/:employee_id",
            get(get_handler::<E, S, U>).delete(delete_handler::<E, S, U>),
        )
        .route(
            "/api/v1/employees/:employee_id/basic-info",
            put(basic_info_handler::<E, S, U>),
        )
        .route(
            "/api/v1/employees/:employee_id/personal-details",
            put(personal_details_handler::<E, S, U>),
        )
        .route(
            "/api/v1/employees/:employee_id/documents",
            put(documents_handler::<E, S, U>),
        )
        .route(
            "/api/v1/employees/:employee_id/documents/:slot",
            post(attach_document_handler::<E, S, U>),
        )
        .route(
            "/api/v1/employees/:employee_id/completion",
            get(completion_handler::<E, S, U>),
        )
        .route(
            "/api/v1/employees/:employee_id/verification",
            post(request_verification_handler::<E, S, U>),
        )
        .route(
            "/api/v1/employees/:employee_id/verification/approve",
            post(approve_handler::<E, S, U>),
        )
        .route(
            "/api/v1/employees/:employee_id/verification/reject",
            post(reject_handler::<E, S, U>),
        )
        .route("/api/v1/profiles/completion", post(score_profile_handler))
        .with_state(service)
}

pub(crate) async fn create_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Json(new): Json<NewEmployee>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    match service.create(new) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn list_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Query(query): Query<EmployeeListQuery>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    let school_id = query.school_id.map(SchoolId);
    match service.list(school_id.as_ref()) {
        Ok(records) => {
            let summaries: Vec<EmployeeSummary> =
                records.iter().map(|record| record.summary()).collect();
            (StatusCode::OK, Json(summaries)).into_response()
        }
        Err(error) => failure(error),
    }
}

pub(crate) async fn get_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    respond(service.get(&EmployeeId(employee_id)))
}

pub(crate) async fn delete_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    match service.delete(&EmployeeId(employee_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn basic_info_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Path(employee_id): Path<String>,
    Json(basic): Json<BasicInfo>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    respond(service.update_basic_info(&EmployeeId(employee_id), basic))
}

pub(crate) async fn personal_details_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Path(employee_id): Path<String>,
    Json(details): Json<PersonalDetails>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    respond(service.update_personal_details(&EmployeeId(employee_id), details))
}

pub(crate) async fn documents_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Path(employee_id): Path<String>,
    Json(documents): Json<Documents>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    respond(service.update_documents(&EmployeeId(employee_id), documents))
}

pub(crate) async fn attach_document_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Path((employee_id, slot)): Path<(String, String)>,
    Json(file): Json<StoredFile>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    let Some(slot) = DocumentSlot::parse(&slot) else {
        let payload = json!({ "error": format!("unknown document slot '{slot}'") });
        return (StatusCode::NOT_FOUND, Json(payload)).into_response();
    };
    respond(service.attach_document(&EmployeeId(employee_id), slot, file))
}

pub(crate) async fn completion_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    respond(service.completion(&EmployeeId(employee_id)))
}

pub(crate) async fn request_verification_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    respond(service.request_verification(&EmployeeId(employee_id)))
}

pub(crate) async fn approve_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Path(employee_id): Path<String>,
    Json(request): Json<ApprovalRequest>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    respond(service.approve(&EmployeeId(employee_id), request.reviewer_id))
}

pub(crate) async fn reject_handler<E, S, U>(
    State(service): State<Arc<EmployeeService<E, S, U>>>,
    Path(employee_id): Path<String>,
    Json(request): Json<RejectionRequest>,
) -> Response
where
    E: Repository<EmployeeRecord> + 'static,
    S: Repository<School> + 'static,
    U: Repository<User> + 'static,
{
    respond(service.reject(
        &EmployeeId(employee_id),
        request.reviewer_id,
        request.remarks,
    ))
}

/// Score an arbitrary profile payload without touching storage.
pub(crate) async fn score_profile_handler(Json(raw): Json<Value>) -> Response {
    match profile_from_json(&raw) {
        Ok(profile) => (StatusCode::OK, Json(assess(&profile))).into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
    }
}

fn respond<T: serde::Serialize>(result: Result<T, EmployeeServiceError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) fn failure(error: EmployeeServiceError) -> Response {
    let status = match &error {
        EmployeeServiceError::Validation(_)
        | EmployeeServiceError::UnknownReviewer(_)
        | EmployeeServiceError::UnknownSchool(_)
        | EmployeeServiceError::InactiveSchool(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EmployeeServiceError::NotFound
        | EmployeeServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        EmployeeServiceError::DuplicateCode { .. }
        | EmployeeServiceError::ProfileIncomplete { .. }
        | EmployeeServiceError::InvalidTransition { .. }
        | EmployeeServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        EmployeeServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let mut payload = json!({ "error": error.to_string() });
    if let EmployeeServiceError::ProfileIncomplete { percentage } = error {
        payload["completion_percentage"] = json!(percentage);
    }
    (status, Json(payload)).into_response()
}
