//! # Transport Boundary
//!
//! Shapes exchanged with the messaging platform client.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use anyhow::Result;
use async_trait::async_trait;

/// One message delivered by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: i64,
    pub group_id: i64,
    pub message_id: i64,
    pub text: String,
}

impl InboundMessage {
    pub fn new(sender_id: i64, group_id: i64, message_id: i64, text: impl Into<String>) -> Self {
        Self {
            sender_id,
            group_id,
            message_id,
            text: text.into(),
        }
    }
}

/// Outbound reply capability handed to handlers and the dispatcher
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(&self, group_id: i64, text: &str) -> Result<()>;
}
