use axum::{Extension, Json, extract::State, response::IntoResponse};

use lightwave_types::api::{Claims, SubscribeRequest, SubscriptionStatusResponse};

use crate::error::{ApiError, join_error};
use crate::state::AppState;

pub async fn get_status(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let (active, info, free_remaining) = tokio::task::spawn_blocking(move || {
        let active = state.subscriptions.is_subscribed()?;
        let info = state.subscriptions.info()?;
        let free_remaining = state.subscriptions.free_remaining()?;
        Ok::<_, lightwave_core::Error>((active, info, free_remaining))
    })
    .await
    .map_err(join_error)??;

    Ok(Json(SubscriptionStatusResponse {
        active,
        info,
        free_remaining,
    }))
}

/// Runs the (simulated) payment flow and records the subscription.
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let info = state.subscriptions.subscribe(req.plan).await?;
    Ok(Json(info))
}
