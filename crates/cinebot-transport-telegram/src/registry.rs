use crate::bot::ConversationEngine;
use crate::config::BotRegistration;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Builds an engine for a bot registration.
pub trait EngineFactory: Send + Sync {
    /// Create the engine serving `registration`.
    fn build(&self, registration: BotRegistration) -> Arc<ConversationEngine>;
}

/// Token-keyed set of engines served by this process.
#[derive(Default)]
pub struct BotRegistry {
    engines: RwLock<HashMap<String, Arc<ConversationEngine>>>,
}

impl BotRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine registered for `token`.
    pub async fn lookup(&self, token: &str) -> Option<Arc<ConversationEngine>> {
        self.engines.read().await.get(token).cloned()
    }

    /// Register `engine` under its token. A previous engine for the same token
    /// is replaced and returned.
    pub async fn register(&self, engine: Arc<ConversationEngine>) -> Option<Arc<ConversationEngine>> {
        let token = engine.token().to_string();
        let title = engine.title().to_string();
        let previous = self.engines.write().await.insert(token, engine);
        match &previous {
            Some(old) => warn!("Bot '{title}' replaced already registered bot '{}'", old.title()),
            None => info!("Registered bot '{title}'"),
        }
        previous
    }

    /// Engine for `token`, building and registering one with `factory` if the
    /// token is unknown.
    pub async fn resolve_or_register(
        &self,
        token: &str,
        factory: &dyn EngineFactory,
    ) -> Arc<ConversationEngine> {
        if let Some(engine) = self.lookup(token).await {
            return engine;
        }

        let mut engines = self.engines.write().await;
        // Another request may have registered it meanwhile.
        if let Some(engine) = engines.get(token) {
            return engine.clone();
        }
        let engine = factory.build(BotRegistration::from_token(token));
        info!("Registered bot '{}' on first update", engine.title());
        engines.insert(token.to_string(), engine.clone());
        engine
    }

    /// Number of registered bots.
    pub async fn len(&self) -> usize {
        self.engines.read().await.len()
    }

    /// Whether no bot is registered.
    pub async fn is_empty(&self) -> bool {
        self.engines.read().await.is_empty()
    }

    /// Registered tokens.
    pub async fn tokens(&self) -> Vec<String> {
        self.engines.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, RecordingMessenger, StubMovies};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingFactory {
        built: AtomicUsize,
    }

    impl EngineFactory for CountingFactory {
        fn build(&self, registration: BotRegistration) -> Arc<ConversationEngine> {
            self.built.fetch_add(1, Ordering::SeqCst);
            engine(registration)
        }
    }

    fn engine(registration: BotRegistration) -> Arc<ConversationEngine> {
        Harness::with_registration(registration, RecordingMessenger::default(), StubMovies::new(1, 1))
            .engine
    }

    fn registration(title: &str, token: &str) -> BotRegistration {
        BotRegistration {
            title: title.into(),
            token: token.into(),
        }
    }

    fn title(engine: Option<Arc<ConversationEngine>>) -> Option<String> {
        engine.map(|e| e.title().to_string())
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = BotRegistry::new();
        assert!(registry.is_empty().await);
        assert!(registry.register(engine(registration("one", "1:a"))).await.is_none());
        assert!(registry.register(engine(registration("two", "2:b"))).await.is_none());

        assert_eq!(registry.len().await, 2);
        assert_eq!(title(registry.lookup("1:a").await), Some("one".into()));
        assert!(registry.lookup("3:c").await.is_none());
    }

    #[tokio::test]
    async fn test_register_replaces_same_token() {
        let registry = BotRegistry::new();
        registry.register(engine(registration("old", "1:a"))).await;
        let previous = registry.register(engine(registration("new", "1:a"))).await;

        assert_eq!(title(previous), Some("old".into()));
        assert_eq!(registry.len().await, 1);
        assert_eq!(title(registry.lookup("1:a").await), Some("new".into()));
    }

    #[tokio::test]
    async fn test_unknown_token_is_built_once() {
        let registry = BotRegistry::new();
        let factory = CountingFactory::default();

        let first = registry.resolve_or_register("77:secret", &factory).await;
        let second = registry.resolve_or_register("77:secret", &factory).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.built.load(Ordering::SeqCst), 1);
        assert_eq!(first.title(), "bot77");
        assert_eq!(registry.tokens().await, vec!["77:secret".to_string()]);
    }
}
