use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pixel-space coordinate assigned when a message is released. The drift
/// animation that moves orbs around is a client concern; the stored value is
/// the release point and nothing re-reads it for meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Pixel dimensions of the client viewport a release position is scattered
/// within. Purely cosmetic; the default matches a common desktop window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Which content fields a message carries. Derived once at creation and
/// never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Audio,
    Image,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrbColor {
    Blue,
    Purple,
    Cyan,
    Pink,
    Orange,
    Green,
    Peach,
    Mint,
}

impl OrbColor {
    pub const ALL: [OrbColor; 8] = [
        OrbColor::Blue,
        OrbColor::Purple,
        OrbColor::Cyan,
        OrbColor::Pink,
        OrbColor::Orange,
        OrbColor::Green,
        OrbColor::Peach,
        OrbColor::Mint,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrbSize {
    Sm,
    Md,
    Lg,
}

/// A light-wave message. Serialized as the `cosmicMessages` JSON array, so
/// field names stay camelCase for compatibility with collections written by
/// the web client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub position: Position,
    pub color: OrbColor,
    pub size: OrbSize,
    /// Epoch milliseconds.
    pub created: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub is_from_current_user: bool,
    /// Weak reference; the target may have been deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Image,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "audio" => Some(MediaKind::Audio),
            "image" => Some(MediaKind::Image),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: Uuid,
    pub kind: MediaKind,
    pub data: Vec<u8>,
    /// Epoch milliseconds.
    pub created: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Monthly,
    Yearly,
}

impl Plan {
    pub fn duration(self) -> Duration {
        match self {
            Plan::Monthly => Duration::days(30),
            Plan::Yearly => Duration::days(365),
        }
    }
}

/// Stored under `cosmic_subscription`. `is_subscribed` may be stored as true
/// after `end_date` has passed; `SubscriptionService::is_subscribed` treats
/// that as expired and rewrites the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    pub is_subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    /// Epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
}

impl SubscriptionInfo {
    pub fn none() -> Self {
        Self {
            is_subscribed: false,
            plan: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl Default for SubscriptionInfo {
    fn default() -> Self {
        Self::none()
    }
}

/// Account record, stored in the `cosmic_users` JSON array. Exactly one of
/// `email` / `phone` is populated, depending on the registration credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Current time as epoch milliseconds, the timestamp unit used throughout
/// the persisted state.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
