use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// The dashboard is served from a different origin than the API.
pub fn dashboard_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any)
}
