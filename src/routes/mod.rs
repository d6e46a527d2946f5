pub mod candidate_routes;
pub mod docs;
pub mod health;
pub mod submission;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{middleware::cors::dashboard_cors, AppState};

/// Headroom on top of the photo limit for the text fields of a multipart body.
const FORM_FIELDS_HEADROOM: usize = 64 * 1024;

pub fn app(state: AppState) -> Router {
    let body_limit = state.upload_service.max_bytes() + FORM_FIELDS_HEADROOM;
    let uploads_dir = state.upload_service.dir().to_path_buf();

    let employees_api = Router::new()
        .route(
            "/api/employees",
            get(candidate_routes::list_employees)
                .post(candidate_routes::create_employee)
                .fallback(candidate_routes::collection_method_not_allowed),
        )
        .route(
            "/api/employees/board",
            get(candidate_routes::employee_board)
                .fallback(candidate_routes::read_only_method_not_allowed),
        )
        .route(
            "/api/employees/:id",
            get(candidate_routes::get_employee)
                .put(candidate_routes::update_employee)
                .delete(candidate_routes::delete_employee)
                .fallback(candidate_routes::item_method_not_allowed),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/api/openapi.json", get(docs::openapi_json))
        .merge(employees_api)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .with_state(state)
        .layer(dashboard_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
}
