use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use lightwave_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};

use crate::error::{ApiError, join_error};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Registration hashes the password; run it off the async runtime
    let st = state.clone();
    let user = tokio::task::spawn_blocking(move || {
        st.auth.register(&req.credential, &req.password, req.nickname)
    })
    .await
    .map_err(join_error)??;

    let token = create_token(&state.jwt_secret, user.id, &user.nickname)
        .map_err(|_| ApiError::internal())?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let st = state.clone();
    let user = tokio::task::spawn_blocking(move || st.auth.login(&req.credential, &req.password))
        .await
        .map_err(join_error)??;

    let token = create_token(&state.jwt_secret, user.id, &user.nickname)
        .map_err(|_| ApiError::internal())?;

    Ok(Json(AuthResponse { user, token }))
}

fn create_token(secret: &str, user_id: Uuid, nickname: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        nickname: nickname.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
