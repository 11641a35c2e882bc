//! Media upload endpoints backed by the S3-compatible object store.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::{delete, post},
};
use axum_valid::Valid;

use crate::{
    auth::{
        guard::{ACTIVE_USER, authorize},
        identity::Identity,
    },
    dto::upload::{DeleteUploadRequest, UploadResponse},
    error::AppError,
    services::upload_service,
    state::SharedState,
};

/// Upload endpoints; both require an active, verified account.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/upload", post(upload_file))
        .route("/upload", delete(delete_upload))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    responses(
        (status = 201, description = "Object stored; public URL returned", body = UploadResponse),
        (status = 400, description = "Missing `file` field, unsupported type or too large"),
        (status = 503, description = "Object storage unreachable"),
    )
)]
/// Store the multipart `file` field in the media bucket.
pub async fn upload_file(
    State(state): State<SharedState>,
    identity: Identity,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    authorize(&ACTIVE_USER, &identity)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let body = field
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(err.to_string()))?;

        let response = upload_service::put_object(&state, &file_name, &content_type, body).await?;
        return Ok((StatusCode::CREATED, Json(response)));
    }

    Err(AppError::BadRequest("missing `file` field".into()))
}

#[utoipa::path(
    delete,
    path = "/upload",
    tag = "upload",
    request_body = DeleteUploadRequest,
    responses(
        (status = 204, description = "Object removed"),
        (status = 400, description = "Malformed object key"),
        (status = 503, description = "Object storage unreachable"),
    )
)]
/// Remove a previously uploaded object by key.
pub async fn delete_upload(
    State(state): State<SharedState>,
    identity: Identity,
    Valid(Json(request)): Valid<Json<DeleteUploadRequest>>,
) -> Result<StatusCode, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    upload_service::delete_object(&state, &request.key).await?;
    Ok(StatusCode::NO_CONTENT)
}
