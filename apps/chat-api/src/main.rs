use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_api::chat::{ChatStore, MemoryChatStore};
use chat_api::config::Config;
use chat_api::game::registry::GameRegistry;
use chat_api::gateway::connections::ConnectionRegistry;
use chat_api::gateway::presence::PresenceRegistry;
use chat_api::gateway::scoreboard::MatchTracker;
use chat_api::profile::ProfileClient;
use chat_api::AppState;

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing — env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    // Display names and avatars come from the auth service.
    let profiles = Arc::new(ProfileClient::new(&config.auth_service_url));

    // In-memory message store. A database-backed ChatStore can slot in here.
    let chat: Arc<dyn ChatStore> = Arc::new(MemoryChatStore::new());

    tracing::info!(auth_service_url = %config.auth_service_url, "chat-api configured");

    let state = AppState {
        config: Arc::new(config),
        chat,
        presence: Arc::new(PresenceRegistry::new(profiles)),
        games: Arc::new(GameRegistry::new()),
        matches: Arc::new(MatchTracker::new()),
        connections: Arc::new(ConnectionRegistry::new()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(chat_api::routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "chat-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
