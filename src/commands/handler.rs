//! Command handler trait
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;

use super::context::CommandContext;
use crate::core::Permission;

/// Trait for command handlers
///
/// Each handler owns one command name. Handlers are registered with a
/// `CommandRegistry` and reached through the dispatcher's middleware chain, so
/// by the time `handle` runs the sender is rate-checked, authorized, and
/// `ctx.user` is populated.
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl CommandHandler for PingHandler {
///     fn name(&self) -> &str {
///         "ping"
///     }
///
///     fn description(&self) -> &str {
///         "Check that the bot is alive"
///     }
///
///     async fn handle(&self, ctx: &CommandContext) -> Result<()> {
///         ctx.reply("Pong!").await
///     }
/// }
/// ```
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command name without the leading slash
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn required_permission(&self) -> Permission {
        Permission::User
    }

    /// Handler-specific gate for `group_id`. Stored group overrides are
    /// checked by the dispatch pipeline before this is consulted.
    async fn is_enabled(&self, _group_id: i64) -> bool {
        true
    }

    async fn handle(&self, ctx: &CommandContext) -> Result<()>;
}
