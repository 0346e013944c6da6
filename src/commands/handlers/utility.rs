//! Utility command handlers
//!
//! Handles: ping, help
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Help reads stored group overrides directly
//! - 1.0.0: Initial ping and help

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::{Arc, Weak};

use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::registry::CommandRegistry;
use crate::database::{command_enabled, GroupStore};

/// Handler for /ping
pub struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Test bot responsiveness"
    }

    async fn handle(&self, ctx: &CommandContext) -> Result<()> {
        ctx.reply("Pong!").await?;
        info!("[{}] Ping command completed for user {}", ctx.request_id, ctx.sender_id);
        Ok(())
    }
}

/// Handler for /help
///
/// Holds the registry weakly since the registry owns this handler.
pub struct HelpHandler {
    registry: Weak<CommandRegistry>,
    groups: Arc<dyn GroupStore>,
}

impl HelpHandler {
    pub fn new(registry: &Arc<CommandRegistry>, groups: Arc<dyn GroupStore>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            groups,
        }
    }

    /// Lines for every command the sender may run here, sorted by name
    async fn visible_commands(&self, ctx: &CommandContext) -> Vec<String> {
        let Some(registry) = self.registry.upgrade() else {
            return Vec::new();
        };

        let level = ctx.permission();
        let mut handlers = registry.get_all().await;
        handlers.sort_by(|a, b| a.name().cmp(b.name()));

        let mut lines = Vec::with_capacity(handlers.len());
        for handler in handlers {
            if !level.satisfies(handler.required_permission()) {
                continue;
            }
            if !command_enabled(self.groups.as_ref(), ctx.group_id, handler.name()).await {
                continue;
            }
            if !handler.is_enabled(ctx.group_id).await {
                continue;
            }
            lines.push(format!("/{} - {}", handler.name(), handler.description()));
        }
        lines
    }
}

#[async_trait]
impl CommandHandler for HelpHandler {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "Show the commands you can use here"
    }

    async fn handle(&self, ctx: &CommandContext) -> Result<()> {
        let lines = self.visible_commands(ctx).await;

        let text = if lines.is_empty() {
            "No commands are available to you here.".to_string()
        } else {
            format!("Available commands:\n{}", lines.join("\n"))
        };

        ctx.reply(&text).await
    }
}
