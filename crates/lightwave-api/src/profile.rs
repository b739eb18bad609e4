use axum::{Extension, Json, extract::State, response::IntoResponse};

use lightwave_types::api::{Claims, ProfileResponse, UpdateProfileRequest};

use crate::error::{ApiError, join_error};
use crate::state::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let (nickname, avatar) = tokio::task::spawn_blocking(move || {
        let nickname = state.profile.nickname()?;
        let avatar = state.profile.avatar()?;
        Ok::<_, lightwave_core::Error>((nickname, avatar))
    })
    .await
    .map_err(join_error)??;

    Ok(Json(ProfileResponse { nickname, avatar }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (nickname, avatar) = tokio::task::spawn_blocking(move || {
        if let Some(nickname) = &req.nickname {
            state.profile.set_nickname(nickname)?;
        }
        if let Some(avatar) = &req.avatar {
            state.profile.set_avatar(avatar)?;
        }
        let nickname = state.profile.nickname()?;
        let avatar = state.profile.avatar()?;
        Ok::<_, lightwave_core::Error>((nickname, avatar))
    })
    .await
    .map_err(join_error)??;

    Ok(Json(ProfileResponse { nickname, avatar }))
}
