pub mod health;
pub mod messages;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(messages::router())
        .merge(crate::gateway::server::router())
        .route("/api/docs/openapi.json", get(openapi_spec))
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        messages::conversation,
        messages::mark_read,
        messages::unread,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::chat::StoredMessage,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Chat", description = "Direct-message history"),
    )
)]
pub struct ApiDoc;
