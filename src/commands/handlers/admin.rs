//! Admin command handlers
//!
//! Handles: toggle
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::info;
use std::sync::{Arc, Weak};

use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::registry::CommandRegistry;
use crate::core::{Group, Permission, StoreError};
use crate::database::GroupStore;

const USAGE: &str = "Usage: /toggle <command> <on|off>";

/// Handler for /toggle - enable or disable a command in the current group
pub struct ToggleHandler {
    registry: Weak<CommandRegistry>,
    groups: Arc<dyn GroupStore>,
}

impl ToggleHandler {
    pub fn new(registry: &Arc<CommandRegistry>, groups: Arc<dyn GroupStore>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            groups,
        }
    }

    async fn load_group(&self, group_id: i64) -> Result<Group> {
        match self.groups.find_by_id(group_id).await {
            Ok(group) => Ok(group),
            Err(StoreError::NotFound(_)) => Ok(Group::new(group_id, "")),
            Err(e) => Err(e).with_context(|| format!("failed to load group {group_id}")),
        }
    }
}

fn parse_state(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "enable" | "enabled" | "true" => Some(true),
        "off" | "disable" | "disabled" | "false" => Some(false),
        _ => None,
    }
}

#[async_trait]
impl CommandHandler for ToggleHandler {
    fn name(&self) -> &str {
        "toggle"
    }

    fn description(&self) -> &str {
        "Enable or disable a command in this group"
    }

    fn required_permission(&self) -> Permission {
        Permission::Admin
    }

    async fn handle(&self, ctx: &CommandContext) -> Result<()> {
        let (Some(target), Some(state)) = (ctx.args.first(), ctx.args.get(1)) else {
            return ctx.reply(USAGE).await;
        };
        let Some(enabled) = parse_state(state) else {
            return ctx.reply(USAGE).await;
        };

        let target = target.trim_start_matches('/').to_lowercase();
        if target == self.name() {
            return ctx.reply("/toggle cannot be toggled. It's a core command.").await;
        }

        let known = match self.registry.upgrade() {
            Some(registry) => registry.contains(&target).await,
            None => false,
        };
        if !known {
            return ctx.reply(&format!("Unknown command /{target}.")).await;
        }

        let mut group = self.load_group(ctx.group_id).await?;
        group.set_command_enabled(&target, enabled, ctx.sender_id);
        self.groups
            .save(&group)
            .await
            .with_context(|| format!("failed to save group {}", ctx.group_id))?;

        let status = if enabled { "enabled" } else { "disabled" };
        info!(
            "[{}] Toggle command completed: /{target} -> {status} in group {} by {}",
            ctx.request_id, ctx.group_id, ctx.sender_id
        );
        ctx.reply(&format!("/{target} is now {status} in this group.")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::handlers::utility::PingHandler;
    use crate::commands::middleware::testing::RecordingSender;
    use crate::commands::parser::parse_command;
    use crate::database::{command_enabled, MemoryGroupStore};
    use crate::transport::InboundMessage;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use uuid::Uuid;

    struct Fixture {
        registry: Arc<CommandRegistry>,
        groups: Arc<MemoryGroupStore>,
        sender: Arc<RecordingSender>,
    }

    async fn fixture() -> Fixture {
        let registry = Arc::new(CommandRegistry::new());
        let groups = Arc::new(MemoryGroupStore::new());
        registry
            .register(Arc::new(ToggleHandler::new(&registry, groups.clone())))
            .await
            .unwrap();
        registry.register(Arc::new(PingHandler)).await.unwrap();

        Fixture {
            registry,
            groups,
            sender: Arc::new(RecordingSender::default()),
        }
    }

    async fn run(f: &Fixture, text: &str) {
        let message = InboundMessage::new(10, -5, 1, text);
        let ctx = CommandContext::new(
            Uuid::new_v4(),
            &message,
            parse_command(text).unwrap(),
            f.sender.clone(),
            CancellationToken::new(),
            Duration::from_secs(5),
        );
        let toggle = f.registry.get("toggle").await.unwrap();
        toggle.handle(&ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_toggle_off_and_on() {
        let f = fixture().await;

        run(&f, "/toggle ping off").await;
        assert!(!command_enabled(f.groups.as_ref(), -5, "ping").await);
        assert!(command_enabled(f.groups.as_ref(), -6, "ping").await);

        let group = f.groups.find_by_id(-5).await.unwrap();
        assert_eq!(group.commands["ping"].updated_by, 10);

        run(&f, "/toggle /PING on").await;
        assert!(command_enabled(f.groups.as_ref(), -5, "ping").await);
        assert_eq!(f.sender.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_rejects_bad_input() {
        let f = fixture().await;

        run(&f, "/toggle").await;
        run(&f, "/toggle ping maybe").await;
        run(&f, "/toggle nope off").await;
        run(&f, "/toggle toggle off").await;

        let replies = f.sender.messages();
        assert!(replies[0].starts_with("Usage"));
        assert!(replies[1].starts_with("Usage"));
        assert!(replies[2].contains("Unknown command /nope"));
        assert!(replies[3].contains("cannot be toggled"));
        assert!(f.groups.is_empty());
    }

    #[test]
    fn test_toggle_requires_admin() {
        let registry = Arc::new(CommandRegistry::new());
        let handler = ToggleHandler::new(&registry, Arc::new(MemoryGroupStore::new()));
        assert_eq!(handler.required_permission(), Permission::Admin);
    }
}
