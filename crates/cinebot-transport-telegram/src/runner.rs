use crate::bot::{ConversationEngine, TelegramMessenger};
use crate::config::{BotRegistration, BotSettings};
use crate::registry::{BotRegistry, EngineFactory};
use crate::webhook::{router, WebhookState};
use anyhow::Context;
use cinebot_core::config::CoreSettings;
use cinebot_core::movies::{MovieCatalog, TmdbClient};
use cinebot_core::storage::{self, UserStore};
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::AllowedUpdate;
use tracing::{error, info, warn};

/// Builds engines talking to the real Bot API.
pub struct TelegramEngineFactory {
    catalog: Arc<MovieCatalog>,
    users: Arc<dyn UserStore>,
    settings: Arc<CoreSettings>,
}

impl TelegramEngineFactory {
    /// Share one catalog and user store across every bot.
    #[must_use]
    pub fn new(
        catalog: Arc<MovieCatalog>,
        users: Arc<dyn UserStore>,
        settings: Arc<CoreSettings>,
    ) -> Self {
        Self {
            catalog,
            users,
            settings,
        }
    }
}

impl EngineFactory for TelegramEngineFactory {
    fn build(&self, registration: BotRegistration) -> Arc<ConversationEngine> {
        let bot = Bot::new(registration.token.clone());
        Arc::new(ConversationEngine::new(
            registration,
            Arc::new(TelegramMessenger::new(bot)),
            self.catalog.clone(),
            self.users.clone(),
            self.settings.clone(),
        ))
    }
}

fn init_catalog(settings: &CoreSettings) -> anyhow::Result<Arc<MovieCatalog>> {
    let client = TmdbClient::from_settings(settings).context("Failed to create TMDB client")?;
    info!("TMDB client initialized ({}).", settings.tmdb_api_url);
    Ok(Arc::new(MovieCatalog::new(
        Arc::new(client),
        Duration::from_secs(settings.genre_cache_ttl_secs),
    )))
}

async fn register_bots(
    settings: &BotSettings,
    registry: &BotRegistry,
    factory: &dyn EngineFactory,
) {
    let registrations = settings.telegram.bot_registrations();
    if registrations.is_empty() {
        warn!("No bots configured; engines are created on the first update per token.");
    }

    for registration in registrations {
        let webhook_url = settings.telegram.webhook_url(&registration.token);
        let engine = factory.build(registration);
        if let Some(url) = webhook_url {
            set_webhook(&engine, &url).await;
        }
        registry.register(engine).await;
    }
}

async fn set_webhook(engine: &ConversationEngine, url: &str) {
    let url = match reqwest::Url::parse(url) {
        Ok(url) => url,
        Err(e) => {
            error!("Invalid webhook URL for bot '{}': {e}", engine.title());
            return;
        }
    };

    let result = Bot::new(engine.token())
        .set_webhook(url)
        .allowed_updates(vec![
            AllowedUpdate::Message,
            AllowedUpdate::CallbackQuery,
            AllowedUpdate::InlineQuery,
        ])
        .await;
    match result {
        Ok(_) => info!("Webhook registered for bot '{}'.", engine.title()),
        Err(e) => error!("Failed to register webhook for bot '{}': {e}", engine.title()),
    }
}

/// Run the webhook server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the TMDB client or user storage cannot be created, or
/// if the server fails to bind.
pub async fn run_server(settings: Arc<BotSettings>) -> anyhow::Result<()> {
    let catalog = init_catalog(&settings.core)?;
    let users = storage::create_user_store(&settings.core)
        .await
        .context("Failed to initialize user storage")?;

    let registry = Arc::new(BotRegistry::new());
    let factory: Arc<dyn EngineFactory> = Arc::new(TelegramEngineFactory::new(
        catalog,
        users,
        settings.core.clone(),
    ));
    register_bots(&settings, &registry, factory.as_ref()).await;
    info!("{} bot(s) registered.", registry.len().await);

    let app = router(Arc::new(WebhookState { registry, factory }));
    let listener = tokio::net::TcpListener::bind(&settings.telegram.webhook_bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.telegram.webhook_bind_addr))?;
    info!("Webhook server listening on {}", settings.telegram.webhook_bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server failed")?;
    info!("Webhook server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {e}");
    }
}
