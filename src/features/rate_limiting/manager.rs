//! Two-level throttling for command senders
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! A token bucket keyed by sender (`user:<id>`) catches floods across all
//! commands; a sliding window keyed by sender and command
//! (`cmd:<id>:<name>`) caps repeated use of a single command.

use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::limiter::Limiter;
use super::sliding_window::SlidingWindow;
use super::token_bucket::TokenBucket;

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    /// Burst size of the per-user bucket
    pub user_capacity: u32,
    pub user_refill_per_sec: f64,
    /// Requests per sender per command inside `command_window`
    pub command_limit: usize,
    pub command_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            user_capacity: 5,
            user_refill_per_sec: 2.0,
            command_limit: 10,
            command_window: Duration::from_secs(60),
        }
    }
}

pub struct RateLimitManager {
    users: TokenBucket,
    commands: SlidingWindow,
}

impl RateLimitManager {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            users: TokenBucket::new(config.user_capacity, config.user_refill_per_sec),
            commands: SlidingWindow::new(config.command_limit, config.command_window),
        }
    }

    fn user_key(user_id: i64) -> String {
        format!("user:{user_id}")
    }

    fn command_key(user_id: i64, command: &str) -> String {
        format!("cmd:{user_id}:{command}")
    }

    pub fn allow_user(&self, user_id: i64) -> bool {
        self.users.allow(&Self::user_key(user_id))
    }

    pub fn allow_command(&self, user_id: i64, command: &str) -> bool {
        self.commands.allow(&Self::command_key(user_id, command))
    }

    /// User-level check first; the command window is left untouched when the
    /// sender is already throttled.
    pub fn allow(&self, user_id: i64, command: &str) -> bool {
        self.allow_user(user_id) && self.allow_command(user_id, command)
    }

    pub fn reset_user(&self, user_id: i64) {
        self.users.reset(&Self::user_key(user_id));
    }

    pub fn reset_command(&self, user_id: i64, command: &str) {
        self.commands.reset(&Self::command_key(user_id, command));
    }

    pub fn reset_all(&self) {
        self.users.reset_all();
        self.commands.reset_all();
    }

    /// Keys held by the user and command limiters
    pub fn tracked_keys(&self) -> (usize, usize) {
        (self.users.len(), self.commands.len())
    }

    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        self.users.sweep_idle(max_idle) + self.commands.sweep_idle(max_idle)
    }

    /// Periodically evict idle keys until `shutdown` is cancelled
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        max_idle: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let manager = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately
            ticker.tick().await;

            info!(
                "Rate limiter sweeper started (interval: {interval:?}, idle after: {max_idle:?})"
            );

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let evicted = manager.sweep_idle(max_idle);
                        let (users, commands) = manager.tracked_keys();
                        debug!(
                            "Rate limiter sweep evicted {evicted} key(s); tracking {users} user / {commands} command key(s)"
                        );
                    }
                }
            }

            info!("Rate limiter sweeper stopped");
        })
    }
}

impl Default for RateLimitManager {
    fn default() -> Self {
        Self::new(&RateLimitConfig::default())
    }
}
