use super::{method_not_allowed, preflight, wants_stream, StreamResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use juici::errors::ServiceError;
use juici::models::request::ImageUpload;

/// Form fields that may carry the image
const IMAGE_FIELDS: &[&str] = &["image", "file"];

async fn read_upload(mut multipart: Multipart) -> Result<ImageUpload, ApiError> {
    let mut image: Option<ImageUpload> = None;
    let mut agent_name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(name) if IMAGE_FIELDS.contains(&name) => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;

                let mut upload = ImageUpload::new(data);
                upload.file_name = file_name;
                upload.content_type = content_type;
                image = Some(upload);
            }
            Some("agent_name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                agent_name = Some(text);
            }
            other => tracing::debug!(field = ?other, "ignoring upload field"),
        }
    }

    let mut upload = image.ok_or(ServiceError::MissingImage)?;
    upload.agent_name = agent_name;
    Ok(upload)
}

async fn handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected upload body");
        ApiError::BadRequest("Expected a multipart/form-data body with an image.".to_string())
    })?;
    let upload = read_upload(multipart).await?;

    if wants_stream(&headers) {
        let reply = state.service.analyze_upload_stream(&upload).await?;
        Ok(StreamResponse::spawn(reply).into_response())
    } else {
        let reply = state.service.analyze_upload(&upload).await?;
        Ok(Json(reply).into_response())
    }
}

pub fn routes(state: AppState) -> Router {
    let limit = state.upload_limit_bytes;
    Router::new()
        .route(
            "/api/upload",
            post(handler)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}
