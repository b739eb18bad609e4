use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use lightwave_types::api::{Claims, UploadMediaResponse};
use lightwave_types::models::MediaKind;

use crate::error::{ApiError, join_error};
use crate::state::AppState;

/// 50 MB upload limit for media blobs
const MAX_MEDIA_SIZE: usize = 50 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub kind: MediaKind,
}

/// POST /media?kind=audio|image with a raw `application/octet-stream` body.
pub async fn upload_media(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    Extension(_claims): Extension<Claims>,
    bytes: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if bytes.len() > MAX_MEDIA_SIZE {
        return Err(ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "media exceeds the 50 MB limit",
        ));
    }

    let media_id = Uuid::new_v4();
    let size = bytes.len() as u64;

    tokio::task::spawn_blocking(move || state.media.save(media_id, &bytes, query.kind))
        .await
        .map_err(join_error)??;

    Ok((
        StatusCode::CREATED,
        Json(UploadMediaResponse { media_id, size }),
    ))
}

pub async fn download_media(
    State(state): State<AppState>,
    Path(media_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let item = tokio::task::spawn_blocking(move || state.media.get(media_id))
        .await
        .map_err(join_error)??
        .ok_or_else(|| ApiError::not_found("media"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::HeaderName::from_static("x-media-kind"), item.kind.as_str().to_string()),
        ],
        item.data,
    ))
}

pub async fn delete_media(
    State(state): State<AppState>,
    Path(media_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    tokio::task::spawn_blocking(move || state.media.delete(media_id))
        .await
        .map_err(join_error)??;

    Ok(StatusCode::NO_CONTENT)
}
