//! Logging middleware
//!
//! Observes every command on its way in and out. Never changes the result.

use async_trait::async_trait;
use log::Level;
use std::sync::Arc;
use std::time::Instant;

use super::{Endpoint, Middleware};
use crate::commands::context::CommandContext;
use crate::core::CommandError;

/// Structured logging sink used by the dispatch pipeline
pub trait CommandLogger: Send + Sync {
    fn log(&self, level: Level, message: &str, fields: &[(&str, String)]);
}

/// Writes through the `log` facade as `message key=value ...`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLogger;

impl CommandLogger for LogLogger {
    fn log(&self, level: Level, message: &str, fields: &[(&str, String)]) {
        let rendered: String = fields
            .iter()
            .map(|(key, value)| format!(" {key}={value}"))
            .collect();
        log::log!(target: "gatekeeper::dispatch", level, "{message}{rendered}");
    }
}

pub struct LoggingMiddleware {
    logger: Arc<dyn CommandLogger>,
}

impl LoggingMiddleware {
    pub fn new(logger: Arc<dyn CommandLogger>) -> Self {
        Self { logger }
    }
}

impl Middleware for LoggingMiddleware {
    fn wrap(&self, next: Arc<dyn Endpoint>) -> Arc<dyn Endpoint> {
        Arc::new(LoggingEndpoint {
            logger: Arc::clone(&self.logger),
            next,
        })
    }
}

struct LoggingEndpoint {
    logger: Arc<dyn CommandLogger>,
    next: Arc<dyn Endpoint>,
}

#[async_trait]
impl Endpoint for LoggingEndpoint {
    async fn call(&self, ctx: &mut CommandContext) -> Result<(), CommandError> {
        let mut fields = vec![
            ("request_id", ctx.request_id.to_string()),
            ("command", ctx.command.clone()),
            ("sender", ctx.sender_id.to_string()),
            ("group", ctx.group_id.to_string()),
        ];

        self.logger.log(Level::Info, "received", &fields);
        let started = Instant::now();

        let result = self.next.call(ctx).await;

        fields.push(("elapsed_ms", started.elapsed().as_millis().to_string()));
        match &result {
            Ok(()) => self.logger.log(Level::Info, "success", &fields),
            Err(err) => {
                // Rejections are expected traffic; only real faults are errors
                let level = match err {
                    CommandError::Handler(_) | CommandError::UserProvisioningFailed(_) => {
                        Level::Error
                    }
                    _ => Level::Warn,
                };
                fields.push(("kind", err.kind().to_string()));
                fields.push(("error", err.to_string()));
                self.logger.log(level, "failed", &fields);
            }
        }

        result
    }
}
