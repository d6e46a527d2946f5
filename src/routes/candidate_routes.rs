use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::candidate_dto::{CandidateFilter, CandidateListQuery, MessageResponse},
    error::{Error, Result},
    routes::submission::CandidateSubmission,
    AppState,
};

/// Identifiers that are not UUIDs cannot name a stored candidate.
fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::NotFound("Employee not found".into()))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "employees",
    params(CandidateListQuery),
    responses(
        (status = 200, description = "Candidates, newest first", body = [Candidate]),
        (status = 400, description = "Unknown status filter")
    )
)]
#[axum::debug_handler]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<CandidateListQuery>,
) -> Result<impl IntoResponse> {
    let filter = CandidateFilter::try_from(query)?;
    let candidates = state.candidate_service.list_filtered(&filter).await?;
    Ok(Json(candidates))
}

#[utoipa::path(
    get,
    path = "/api/employees/board",
    tag = "employees",
    params(CandidateListQuery),
    responses(
        (status = 200, description = "Candidates grouped by status column", body = CandidateBoard),
        (status = 400, description = "Unknown status filter")
    )
)]
#[axum::debug_handler]
pub async fn employee_board(
    State(state): State<AppState>,
    Query(query): Query<CandidateListQuery>,
) -> Result<impl IntoResponse> {
    let filter = CandidateFilter::try_from(query)?;
    let board = state.candidate_service.board(&filter).await?;
    Ok(Json(board))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "employees",
    params(
        ("id" = String, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate found", body = Candidate),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let candidate = state.candidate_service.find_by_id(parse_id(&id)?).await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "employees",
    request_body = RawCandidatePayload,
    responses(
        (status = 201, description = "Candidate created", body = Candidate),
        (status = 400, description = "Invalid payload or duplicate email")
    )
)]
#[axum::debug_handler]
pub async fn create_employee(
    State(state): State<AppState>,
    submission: CandidateSubmission,
) -> Result<impl IntoResponse> {
    let stored_photo = match &submission.photo {
        Some(photo) => Some(state.upload_service.store(photo).await?),
        None => None,
    };

    let result = match submission.payload.into_new_candidate(stored_photo.clone()) {
        Ok(record) => state.candidate_service.create(record).await,
        Err(errors) => Err(Error::Validation(errors)),
    };

    match result {
        Ok(candidate) => Ok((StatusCode::CREATED, Json(candidate))),
        Err(e) => {
            if let Some(name) = stored_photo {
                state.upload_service.discard(&name).await;
            }
            Err(e)
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "employees",
    params(
        ("id" = String, Path, description = "Candidate ID")
    ),
    request_body = RawCandidatePayload,
    responses(
        (status = 200, description = "Candidate updated", body = Candidate),
        (status = 400, description = "Invalid payload or duplicate email"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    submission: CandidateSubmission,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let stored_photo = match &submission.photo {
        Some(photo) => Some(state.upload_service.store(photo).await?),
        None => None,
    };

    let result = match submission.payload.into_patch(stored_photo.clone()) {
        Ok(patch) => state.candidate_service.update(id, patch).await,
        Err(errors) => Err(Error::Validation(errors)),
    };

    match result {
        Ok(candidate) => Ok(Json(candidate)),
        Err(e) => {
            if let Some(name) = stored_photo {
                state.upload_service.discard(&name).await;
            }
            Err(e)
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "employees",
    params(
        ("id" = String, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate deleted", body = MessageResponse),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.candidate_service.delete(parse_id(&id)?).await?;
    Ok(Json(MessageResponse {
        message: "Employee deleted successfully".into(),
    }))
}

pub async fn collection_method_not_allowed() -> Error {
    Error::MethodNotAllowed { allow: "GET, POST" }
}

pub async fn item_method_not_allowed() -> Error {
    Error::MethodNotAllowed {
        allow: "GET, PUT, DELETE",
    }
}

pub async fn read_only_method_not_allowed() -> Error {
    Error::MethodNotAllowed { allow: "GET" }
}
