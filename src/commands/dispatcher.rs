//! Command dispatcher
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! Entry point for every inbound message. Filters non-commands, resolves the
//! handler, runs it through `Logging -> RateLimit -> Permission -> Handler`,
//! and turns any failure into a sanitized reply.

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::context::CommandContext;
use super::middleware::{
    Chain, CommandLogger, HandlerEndpoint, LogLogger, LoggingMiddleware, PermissionMiddleware,
    RateLimitMiddleware,
};
use super::parser::{is_command, parse_command};
use super::registry::CommandRegistry;
use super::shutdown::InFlightTracker;
use crate::core::{CommandError, Config};
use crate::database::{GroupStore, UserStore};
use crate::features::rate_limiting::RateLimitManager;
use crate::transport::{InboundMessage, MessageSender};

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Commands addressed to another bot (`/cmd@other`) are ignored when set
    pub bot_username: Option<String>,
    /// Deadline attached to each command's context
    pub command_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            bot_username: None,
            command_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&Config> for DispatcherConfig {
    fn from(config: &Config) -> Self {
        Self {
            bot_username: config.bot_username.clone(),
            command_timeout: config.command_timeout,
        }
    }
}

/// What happened to one inbound message
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Not a command, not for this bot, or arrived during shutdown
    Ignored,
    Completed,
    /// Rejected or failed; the sender has been told
    Failed(CommandError),
}

impl DispatchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, DispatchOutcome::Completed)
    }
}

pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    users: Arc<dyn UserStore>,
    groups: Arc<dyn GroupStore>,
    limits: Arc<RateLimitManager>,
    sender: Arc<dyn MessageSender>,
    logger: Arc<dyn CommandLogger>,
    config: DispatcherConfig,
    in_flight: Arc<InFlightTracker>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        users: Arc<dyn UserStore>,
        groups: Arc<dyn GroupStore>,
        limits: Arc<RateLimitManager>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            registry,
            users,
            groups,
            limits,
            sender,
            logger: Arc::new(LogLogger),
            config: DispatcherConfig::default(),
            in_flight: InFlightTracker::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn CommandLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.in_flight()
    }

    /// Cancelled when shutdown finishes waiting; every command context derives from it
    pub fn cancellation_token(&self) -> CancellationToken {
        self.in_flight.cancellation_token().clone()
    }

    /// Handle one message on the current task
    pub async fn dispatch(&self, message: InboundMessage) -> DispatchOutcome {
        if !is_command(&message.text) {
            return DispatchOutcome::Ignored;
        }

        let Some(_guard) = self.in_flight.try_acquire() else {
            debug!("Dropping message {} received during shutdown", message.message_id);
            return DispatchOutcome::Ignored;
        };

        self.run(message).await
    }

    /// Handle one message on its own task. The in-flight count is taken before
    /// the task is spawned. Returns `None` for non-commands or during shutdown.
    pub fn spawn_dispatch(
        self: &Arc<Self>,
        message: InboundMessage,
    ) -> Option<JoinHandle<DispatchOutcome>> {
        if !is_command(&message.text) {
            return None;
        }

        let guard = self.in_flight.try_acquire()?;
        let dispatcher = Arc::clone(self);

        Some(tokio::spawn(async move {
            let outcome = dispatcher.run(message).await;
            drop(guard);
            outcome
        }))
    }

    /// Stop intake and drain in-flight commands for up to `grace`
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.in_flight.shutdown(grace).await
    }

    async fn run(&self, message: InboundMessage) -> DispatchOutcome {
        let Some(parsed) = parse_command(&message.text) else {
            return DispatchOutcome::Ignored;
        };

        if let Some(bot) = &self.config.bot_username {
            if !parsed.is_addressed_to(bot) {
                debug!("Ignoring /{} addressed to another bot", parsed.name);
                return DispatchOutcome::Ignored;
            }
        }

        let request_id = Uuid::new_v4();
        info!(
            "[{}] 🎯 Processing command: /{} | Args: {} | User: {} | Group: {}",
            request_id,
            parsed.name,
            parsed.args.len(),
            message.sender_id,
            message.group_id
        );

        let Some(handler) = self.registry.get(&parsed.name).await else {
            debug!("[{request_id}] ❓ Unknown command: /{}", parsed.name);
            let err = CommandError::CommandNotFound(parsed.name);
            self.reply(request_id, message.group_id, &err.user_message()).await;
            return DispatchOutcome::Failed(err);
        };

        let mut ctx = CommandContext::new(
            request_id,
            &message,
            parsed,
            Arc::clone(&self.sender),
            self.in_flight.cancellation_token().child_token(),
            self.config.command_timeout,
        );

        let endpoint = Chain::new()
            .with(Arc::new(LoggingMiddleware::new(Arc::clone(&self.logger))))
            .with(Arc::new(RateLimitMiddleware::new(Arc::clone(&self.limits))))
            .with(Arc::new(PermissionMiddleware::new(
                Arc::clone(&self.users),
                Arc::clone(&self.groups),
                Arc::clone(&handler),
            )))
            .then(Arc::new(HandlerEndpoint::new(handler)));

        match endpoint.call(&mut ctx).await {
            Ok(()) => DispatchOutcome::Completed,
            Err(err) => {
                if matches!(
                    err,
                    CommandError::Handler(_) | CommandError::UserProvisioningFailed(_)
                ) {
                    error!("[{request_id}] ❌ /{} failed: {err:#}", ctx.command);
                }
                self.reply(request_id, ctx.group_id, &err.user_message()).await;
                DispatchOutcome::Failed(err)
            }
        }
    }

    async fn reply(&self, request_id: Uuid, group_id: i64, text: &str) {
        let text = crate::core::sanitize_reply(text);
        if let Err(e) = self.sender.send_message(group_id, &text).await {
            warn!("[{request_id}] ⚠️ Failed to send reply to group {group_id}: {e}");
        }
    }
}
