use std::sync::Arc;

use lightwave_core::auth::AuthService;
use lightwave_core::media::MediaStore;
use lightwave_core::messages::MessageStore;
use lightwave_core::profile::ProfileStore;
use lightwave_core::subscription::SubscriptionService;
use lightwave_core::unlock::UnlockGate;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub auth: AuthService,
    pub messages: MessageStore,
    pub media: MediaStore,
    pub subscriptions: Arc<SubscriptionService>,
    pub gate: UnlockGate,
    pub profile: ProfileStore,
    pub jwt_secret: String,
}
