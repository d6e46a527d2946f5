use axum::Json;
use utoipa::OpenApi;

use crate::dto::candidate_dto::{CandidateBoard, MessageResponse, RawCandidatePayload};
use crate::models::candidate::{Candidate, CandidateStatus};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::candidate_routes::list_employees,
        super::candidate_routes::employee_board,
        super::candidate_routes::get_employee,
        super::candidate_routes::create_employee,
        super::candidate_routes::update_employee,
        super::candidate_routes::delete_employee,
        super::health::health,
    ),
    components(schemas(
        Candidate,
        CandidateStatus,
        CandidateBoard,
        RawCandidatePayload,
        MessageResponse,
    )),
    tags((name = "employees", description = "Candidate records"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_employee_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/employees",
            "/api/employees/board",
            "/api/employees/{id}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
