use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A candidate with email {0} already exists")]
    DuplicateEmail(String),

    #[error("Method not allowed")]
    MethodNotAllowed { allow: &'static str },

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl Error {
    fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            Error::BadRequest(_) | Error::Multipart(_) => "BAD_REQUEST",
            Error::NotFound(_) => "NOT_FOUND",
            Error::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Error::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            Error::Config(_) | Error::Database(_) | Error::Internal(_) | Error::Io(_) => {
                "INTERNAL_ERROR"
            }
        }
    }
}

/// Internal error text is only echoed back to clients in development mode.
fn expose_internal_details() -> bool {
    crate::config::CONFIG
        .get()
        .map(|config| config.environment.is_development())
        .unwrap_or(false)
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let code = self.code();
        let (status, body) = match &self {
            Error::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "message": "Candidate payload failed validation",
                    "code": code,
                    "details": errors,
                }),
            ),
            Error::DuplicateEmail(_) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "message": "A candidate with this email address already exists.",
                    "code": code,
                }),
            ),
            Error::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": msg, "code": code }),
            ),
            Error::Multipart(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": err.to_string(), "code": code }),
            ),
            Error::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "message": msg, "code": code }),
            ),
            Error::MethodNotAllowed { .. } => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "message": "Method not allowed", "code": code }),
            ),
            Error::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                json!({ "message": msg, "code": code }),
            ),
            Error::Config(_) | Error::Database(_) | Error::Internal(_) | Error::Io(_) => {
                tracing::error!(error = %self, "request failed with internal error");
                let mut body = json!({
                    "message": "An unexpected error occurred",
                    "code": code,
                });
                if expose_internal_details() {
                    body["error"] = json!(self.to_string());
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };

        let mut response = (status, Json(body)).into_response();
        if let Error::MethodNotAllowed { allow } = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Employee not found".to_string()),
            other => Error::Database(other),
        }
    }
}
