//! Command handler registry
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Lookups and removal normalize names the same way registration does
//! - 1.0.0: Concurrent registry with duplicate/empty name rejection and unregister

use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::handler::CommandHandler;
use crate::core::RegistryError;

/// Registry mapping command names to handlers
///
/// Written at startup, read on every message. A single read-write lock keeps
/// lookups concurrent while registration stays exclusive.
///
/// # Example
///
/// ```ignore
/// let registry = CommandRegistry::new();
/// registry.register(Arc::new(PingHandler)).await?;
///
/// if let Some(handler) = registry.get("ping").await {
///     // dispatch
/// }
/// ```
#[derive(Default)]
pub struct CommandRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn CommandHandler>>>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    // Parsed command names are lowercased, so keys are too
    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Register a handler under its declared name. The first registration of
    /// a name wins; later ones are rejected.
    pub async fn register(&self, handler: Arc<dyn CommandHandler>) -> Result<(), RegistryError> {
        let name = Self::key(handler.name());
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let mut handlers = self.handlers.write().await;
        if handlers.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        debug!("Registered command /{name}");
        handlers.insert(name, handler);
        Ok(())
    }

    /// Get handler for a command name
    pub async fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.read().await.get(&Self::key(name)).cloned()
    }

    /// Snapshot of every registered handler, in no particular order
    pub async fn get_all(&self) -> Vec<Arc<dyn CommandHandler>> {
        self.handlers.read().await.values().cloned().collect()
    }

    /// Remove a handler. Returns whether one was registered; removing an
    /// unknown name is a no-op.
    pub async fn unregister(&self, name: &str) -> bool {
        self.handlers.write().await.remove(&Self::key(name)).is_some()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.handlers.read().await.contains_key(&Self::key(name))
    }

    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.handlers.read().await.is_empty()
    }

    /// Registered names, sorted
    pub async fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::CommandContext;
    use anyhow::Result;
    use async_trait::async_trait;

    // Mock handler for testing
    struct MockHandler {
        name: &'static str,
        description: &'static str,
    }

    impl MockHandler {
        fn named(name: &'static str) -> Arc<dyn CommandHandler> {
            Arc::new(MockHandler {
                name,
                description: "mock",
            })
        }
    }

    #[async_trait]
    impl CommandHandler for MockHandler {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            self.description
        }

        async fn handle(&self, _ctx: &CommandContext) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty().await);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_registry_register_and_get() {
        let registry = CommandRegistry::new();
        registry.register(MockHandler::named("ping")).await.unwrap();

        assert_eq!(registry.len().await, 1);
        assert!(registry.contains("ping").await);
        assert!(registry.get("ping").await.is_some());
        assert!(registry.get("pong").await.is_none());
    }

    #[tokio::test]
    async fn test_registry_duplicate_keeps_first() {
        let registry = CommandRegistry::new();
        registry
            .register(Arc::new(MockHandler {
                name: "ban",
                description: "first",
            }))
            .await
            .unwrap();

        let err = registry
            .register(Arc::new(MockHandler {
                name: "ban",
                description: "second",
            }))
            .await
            .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateName("ban".to_string()));
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.get("ban").await.unwrap().description(), "first");
    }

    #[tokio::test]
    async fn test_registry_rejects_empty_name() {
        let registry = CommandRegistry::new();
        assert_eq!(
            registry.register(MockHandler::named("")).await.unwrap_err(),
            RegistryError::EmptyName
        );
        assert_eq!(
            registry.register(MockHandler::named("   ")).await.unwrap_err(),
            RegistryError::EmptyName
        );
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_registry_names_are_case_insensitive() {
        let registry = CommandRegistry::new();
        let handler = MockHandler::named("Stats");
        registry.register(Arc::clone(&handler)).await.unwrap();

        assert!(registry.contains("Stats").await);
        assert!(registry.get(" STATS ").await.is_some());
        assert_eq!(registry.command_names().await, vec!["stats"]);
        assert_eq!(
            registry.register(MockHandler::named("stats")).await.unwrap_err(),
            RegistryError::DuplicateName("stats".to_string())
        );

        assert!(registry.unregister(handler.name()).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_registry_get_all_and_names() {
        let registry = CommandRegistry::new();
        for name in ["warn", "ban", "kick"] {
            registry.register(MockHandler::named(name)).await.unwrap();
        }

        assert_eq!(registry.get_all().await.len(), 3);
        assert_eq!(registry.command_names().await, vec!["ban", "kick", "warn"]);
    }

    #[tokio::test]
    async fn test_registry_unregister_is_idempotent() {
        let registry = CommandRegistry::new();
        registry.register(MockHandler::named("ping")).await.unwrap();

        assert!(registry.unregister("ping").await);
        assert!(!registry.unregister("ping").await);
        assert!(!registry.unregister("never-registered").await);
        assert!(registry.is_empty().await);

        registry.register(MockHandler::named("ping")).await.unwrap();
        assert!(registry.contains("ping").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_registry_concurrent_register_and_lookup() {
        const NAMES: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let registry = Arc::new(CommandRegistry::new());
        let mut tasks = Vec::new();

        for _ in 0..4 {
            for name in NAMES {
                let registry = Arc::clone(&registry);
                tasks.push(tokio::spawn(async move {
                    let registered = registry.register(MockHandler::named(name)).await.is_ok();
                    let _ = registry.get(name).await;
                    registered
                }));
            }
        }

        let mut successes = 0;
        for task in tasks {
            if task.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, NAMES.len());
        assert_eq!(registry.len().await, NAMES.len());
    }
}
