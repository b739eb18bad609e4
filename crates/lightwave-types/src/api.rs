use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Plan, SubscriptionInfo, User, Viewport};

// -- JWT Claims --

/// JWT claims shared between lightwave-api (middleware) and token issuance.
/// Canonical definition lives here in lightwave-types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub nickname: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    /// Email address or mobile number.
    pub credential: String,
    pub password: String,
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub credential: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub text: Option<String>,
    pub audio_id: Option<Uuid>,
    pub image_id: Option<Uuid>,
    /// Pixel dimensions the release position is scattered within.
    pub viewport: Option<Viewport>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyRequest {
    pub text: String,
}

// -- Unlock / subscription --

#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub unlocked: bool,
    /// Free unlocks still available; `None` while a subscription is active.
    pub free_remaining: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscribeRequest {
    pub plan: Plan,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionStatusResponse {
    pub active: bool,
    pub info: SubscriptionInfo,
    pub free_remaining: u32,
}

// -- Media --

#[derive(Debug, Serialize)]
pub struct UploadMediaResponse {
    pub media_id: Uuid,
    pub size: u64,
}

// -- Profile --

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}
