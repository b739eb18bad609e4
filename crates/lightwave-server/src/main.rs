use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use lightwave_api::state::{AppState, AppStateInner};
use lightwave_api::{auth, media, messages, profile, subscription};
use lightwave_api::middleware::require_auth;
use lightwave_core::auth::AuthService;
use lightwave_core::media::MediaStore;
use lightwave_core::messages::MessageStore;
use lightwave_core::profile::ProfileStore;
use lightwave_core::subscription::SubscriptionService;
use lightwave_core::unlock::UnlockGate;
use lightwave_db::Database;
use lightwave_db::kv::{KvStore, SqliteKv};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lightwave=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("LIGHTWAVE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("LIGHTWAVE_DB_PATH").unwrap_or_else(|_| "lightwave.db".into());
    let cache_dir =
        std::env::var("LIGHTWAVE_MEDIA_CACHE_DIR").unwrap_or_else(|_| "./media-cache".into());
    let host = std::env::var("LIGHTWAVE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("LIGHTWAVE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Persistence
    let db = Arc::new(Database::open(&PathBuf::from(&db_path))?);
    let kv: Arc<dyn KvStore> = Arc::new(SqliteKv::new(db.clone()));

    // Shared state
    let subscriptions = Arc::new(SubscriptionService::new(kv.clone()));
    let state: AppState = Arc::new(AppStateInner {
        auth: AuthService::new(kv.clone()),
        messages: MessageStore::load(kv.clone())?,
        media: MediaStore::new(db, PathBuf::from(cache_dir))?,
        gate: UnlockGate::new(subscriptions.clone()),
        subscriptions,
        profile: ProfileStore::new(kv),
        jwt_secret,
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/messages", get(messages::list_messages))
        .route("/messages", post(messages::create_message))
        .route("/messages/{message_id}/reply", post(messages::reply_message))
        .route("/messages/{message_id}/unlock", post(messages::unlock_message))
        .route("/subscription", get(subscription::get_status))
        .route("/subscription", post(subscription::subscribe))
        .route("/media", post(media::upload_media))
        .route("/media/{media_id}", get(media::download_media))
        .route("/media/{media_id}", axum::routing::delete(media::delete_media))
        .route("/profile", get(profile::get_profile))
        .route("/profile", axum::routing::put(profile::update_profile))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Lightwave server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}
