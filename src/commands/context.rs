//! Per-message command context
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::parser::ParsedCommand;
use crate::core::{sanitize_reply, Permission, User};
use crate::transport::{InboundMessage, MessageSender};

/// State for one inbound command, created by the dispatcher and passed by
/// reference through the middleware chain.
///
/// Middleware may fill in `user`; everything else is fixed at creation.
pub struct CommandContext {
    pub request_id: Uuid,
    pub sender_id: i64,
    pub group_id: i64,
    pub message_id: i64,
    pub raw_text: String,
    /// Lowercased command name without slash or `@bot` suffix
    pub command: String,
    pub args: Vec<String>,
    /// Set by the permission middleware once the sender is resolved
    pub user: Option<User>,
    deadline: Instant,
    cancellation: CancellationToken,
    sender: Arc<dyn MessageSender>,
}

impl CommandContext {
    pub fn new(
        request_id: Uuid,
        message: &InboundMessage,
        parsed: ParsedCommand,
        sender: Arc<dyn MessageSender>,
        cancellation: CancellationToken,
        timeout: Duration,
    ) -> Self {
        Self {
            request_id,
            sender_id: message.sender_id,
            group_id: message.group_id,
            message_id: message.message_id,
            raw_text: message.text.clone(),
            command: parsed.name,
            args: parsed.args,
            user: None,
            deadline: Instant::now() + timeout,
            cancellation,
            sender,
        }
    }

    /// Sender's level in this group; `None` until the sender is resolved
    pub fn permission(&self) -> Permission {
        self.user
            .as_ref()
            .map(|user| user.permission_in(self.group_id))
            .unwrap_or(Permission::None)
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// True once the deadline has passed or the dispatcher cancelled the request
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Resolves when the request should stop; select on this in long handlers
    pub async fn cancelled(&self) {
        tokio::select! {
            _ = self.cancellation.cancelled() => {}
            _ = tokio::time::sleep_until(self.deadline) => {}
        }
    }

    /// Send a reply to the group this command came from
    pub async fn reply(&self, text: &str) -> Result<()> {
        self.sender
            .send_message(self.group_id, &sanitize_reply(text))
            .await
    }
}
