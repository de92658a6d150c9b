use crate::registry::{BotRegistry, EngineFactory};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use teloxide::types::Update;
use tracing::{error, warn};

/// Shared state of the webhook server.
pub struct WebhookState {
    /// Engines by token
    pub registry: Arc<BotRegistry>,
    /// Builds engines for tokens seen for the first time
    pub factory: Arc<dyn EngineFactory>,
}

/// HTTP routes: `POST /telegram/webhook/{token}/` and `GET /healthz`.
pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/telegram/webhook/{token}", post(receive_update))
        .route("/telegram/webhook/{token}/", post(receive_update))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "OK"
}

/// Always answers 200 so Telegram never redelivers an update.
async fn receive_update(
    State(state): State<Arc<WebhookState>>,
    Path(token): Path<String>,
    body: Bytes,
) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Ignoring undecodable update: {e}");
            return StatusCode::OK;
        }
    };

    let engine = state
        .registry
        .resolve_or_register(&token, state.factory.as_ref())
        .await;
    if let Err(e) = engine.handle_update(&update).await {
        error!("Bot '{}' failed to handle update {}: {e}", engine.title(), update.id.0);
    }
    StatusCode::OK
}
