use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};

use crate::dto::candidate_dto::RawCandidatePayload;
use crate::error::Error;
use crate::services::upload_service::UploadedPhoto;

const PHOTO_FIELD: &str = "photo";

/// Body of a create or update request: JSON, urlencoded form, or multipart
/// form with an optional `photo` file part.
#[derive(Debug, Default)]
pub struct CandidateSubmission {
    pub payload: RawCandidatePayload,
    pub photo: Option<UploadedPhoto>,
}

#[async_trait]
impl<S> FromRequest<S> for CandidateSubmission
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            read_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            Ok(Self {
                payload: RawCandidatePayload::from_fields(fields),
                photo: None,
            })
        } else if content_type.starts_with("application/json") {
            let Json(payload) = Json::<RawCandidatePayload>::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            Ok(Self {
                payload,
                photo: None,
            })
        } else if content_type.is_empty() {
            // A bodiless request names no fields at all.
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            if body.is_empty() {
                Ok(Self::default())
            } else {
                Err(unsupported_media_type(&content_type))
            }
        } else {
            Err(unsupported_media_type(&content_type))
        }
    }
}

fn unsupported_media_type(content_type: &str) -> Error {
    Error::UnsupportedMediaType(format!(
        "expected application/json, multipart/form-data or application/x-www-form-urlencoded (got '{}')",
        content_type
    ))
}

async fn read_multipart(mut multipart: Multipart) -> Result<CandidateSubmission, Error> {
    let mut submission = CandidateSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == PHOTO_FIELD && field.file_name().is_some() {
            let file_name = field.file_name().unwrap_or("photo").to_string();
            let data = field.bytes().await?;
            if data.is_empty() {
                continue;
            }
            if submission.photo.is_some() {
                return Err(Error::BadRequest("Only one photo may be uploaded".into()));
            }
            submission.photo = Some(UploadedPhoto { file_name, data });
        } else {
            let value = field.text().await?;
            submission.payload.set_field(&name, value);
        }
    }

    Ok(submission)
}
