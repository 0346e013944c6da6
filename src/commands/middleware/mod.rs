//! # Middleware Chain
//!
//! A [`Middleware`] turns one [`Endpoint`] into another. [`Chain`] stacks them
//! around a terminal endpoint so that the first middleware added runs first on
//! the way in and last on the way out.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod logging;
pub mod permission;
pub mod rate_limit;

use async_trait::async_trait;
use std::sync::Arc;

use super::context::CommandContext;
use super::handler::CommandHandler;
use crate::core::CommandError;

pub use logging::{CommandLogger, LogLogger, LoggingMiddleware};
pub use permission::PermissionMiddleware;
pub use rate_limit::RateLimitMiddleware;

/// Anything that can process a command context
#[async_trait]
pub trait Endpoint: Send + Sync {
    async fn call(&self, ctx: &mut CommandContext) -> Result<(), CommandError>;
}

/// Wraps an endpoint with cross-cutting behaviour.
///
/// The wrapped endpoint may call `next` once, post-process its result, or
/// return an error without calling `next` at all.
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: Arc<dyn Endpoint>) -> Arc<dyn Endpoint>;
}

/// Ordered list of middleware, outermost first
#[derive(Clone, Default)]
pub struct Chain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a middleware inside every middleware already in the chain
    pub fn with(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Wrap `terminal` so the first middleware is outermost
    pub fn then(&self, terminal: Arc<dyn Endpoint>) -> Arc<dyn Endpoint> {
        self.middlewares
            .iter()
            .rev()
            .fold(terminal, |next, middleware| middleware.wrap(next))
    }
}

/// Terminal endpoint that runs a command handler
pub struct HandlerEndpoint {
    handler: Arc<dyn CommandHandler>,
}

impl HandlerEndpoint {
    pub fn new(handler: Arc<dyn CommandHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl Endpoint for HandlerEndpoint {
    async fn call(&self, ctx: &mut CommandContext) -> Result<(), CommandError> {
        self.handler.handle(ctx).await.map_err(CommandError::Handler)
    }
}
