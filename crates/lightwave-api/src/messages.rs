use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use lightwave_core::messages::MessageDraft;
use lightwave_types::api::{Claims, CreateMessageRequest, ReplyRequest, UnlockResponse};

use crate::error::{ApiError, join_error};
use crate::state::AppState;

pub async fn list_messages(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = tokio::task::spawn_blocking(move || state.messages.list())
        .await
        .map_err(join_error)??;
    Ok(Json(messages))
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = MessageDraft {
        text: req.text,
        audio_id: req.audio_id,
        image_id: req.image_id,
        sender_name: Some(claims.nickname),
        viewport: req.viewport.unwrap_or_default(),
    };

    let message = tokio::task::spawn_blocking(move || state.messages.create(draft))
        .await
        .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn reply_message(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReplyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // No existence check on the original; dangling reply_to is tolerated
    let message = tokio::task::spawn_blocking(move || {
        state.messages.reply(
            message_id,
            &req.text,
            Some(claims.nickname),
            Default::default(),
        )
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn unlock_message(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || state.gate.unlock(claims.sub, message_id))
        .await
        .map_err(join_error)??;

    Ok(Json(UnlockResponse {
        unlocked: true,
        free_remaining: outcome.free_remaining,
    }))
}
