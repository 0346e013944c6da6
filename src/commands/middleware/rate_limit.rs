//! Rate-limit middleware
//!
//! Rejects before any inner stage runs, so a throttled sender never reaches
//! the permission check or the handler.

use async_trait::async_trait;
use log::warn;
use std::sync::Arc;

use super::{Endpoint, Middleware};
use crate::commands::context::CommandContext;
use crate::core::CommandError;
use crate::features::rate_limiting::RateLimitManager;

pub struct RateLimitMiddleware {
    limits: Arc<RateLimitManager>,
}

impl RateLimitMiddleware {
    pub fn new(limits: Arc<RateLimitManager>) -> Self {
        Self { limits }
    }
}

impl Middleware for RateLimitMiddleware {
    fn wrap(&self, next: Arc<dyn Endpoint>) -> Arc<dyn Endpoint> {
        Arc::new(RateLimitEndpoint {
            limits: Arc::clone(&self.limits),
            next,
        })
    }
}

struct RateLimitEndpoint {
    limits: Arc<RateLimitManager>,
    next: Arc<dyn Endpoint>,
}

#[async_trait]
impl Endpoint for RateLimitEndpoint {
    async fn call(&self, ctx: &mut CommandContext) -> Result<(), CommandError> {
        if !self.limits.allow(ctx.sender_id, &ctx.command) {
            warn!(
                "[{}] 🚫 Rate limit exceeded | User: {} | Command: /{}",
                ctx.request_id, ctx.sender_id, ctx.command
            );
            return Err(CommandError::RateLimitExceeded);
        }

        self.next.call(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::middleware::testing::{context_for, CountingHandler};
    use crate::commands::middleware::{Chain, HandlerEndpoint};
    use crate::core::Permission;
    use crate::features::rate_limiting::RateLimitConfig;
    use std::time::Duration;

    #[tokio::test]
    async fn test_blocks_after_limit_without_running_handler() {
        let limits = Arc::new(RateLimitManager::new(&RateLimitConfig {
            user_capacity: 2,
            user_refill_per_sec: 0.0,
            command_limit: 10,
            command_window: Duration::from_secs(60),
        }));
        let handler = Arc::new(CountingHandler::new("ping", Permission::User));
        let endpoint = Chain::new()
            .with(Arc::new(RateLimitMiddleware::new(limits)))
            .then(Arc::new(HandlerEndpoint::new(handler.clone())));

        for _ in 0..2 {
            let mut ctx = context_for(7, -1, "/ping");
            endpoint.call(&mut ctx).await.unwrap();
        }

        let mut ctx = context_for(7, -1, "/ping");
        let err = endpoint.call(&mut ctx).await.unwrap_err();
        assert!(matches!(err, CommandError::RateLimitExceeded));
        assert_eq!(handler.calls(), 2);

        // Another sender is unaffected
        let mut ctx = context_for(8, -1, "/ping");
        endpoint.call(&mut ctx).await.unwrap();
        assert_eq!(handler.calls(), 3);
    }
}
