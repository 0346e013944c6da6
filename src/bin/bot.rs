use anyhow::Result;
use async_trait::async_trait;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use gatekeeper::commands::{create_all_handlers, CommandRegistry, Dispatcher, DispatcherConfig};
use gatekeeper::core::Config;
use gatekeeper::database::{MemoryGroupStore, MemoryUserStore, SeedConfig};
use gatekeeper::features::rate_limiting::RateLimitManager;
use gatekeeper::transport::{InboundMessage, MessageSender};

/// Prints replies to stdout in place of a chat platform
struct ConsoleSender;

#[async_trait]
impl MessageSender for ConsoleSender {
    async fn send_message(&self, group_id: i64, text: &str) -> Result<()> {
        println!("[group {group_id}] {text}");
        Ok(())
    }
}

/// Parse `<sender> <group> <text>`
fn parse_line(line: &str, message_id: i64) -> Option<InboundMessage> {
    let (sender, rest) = line.trim().split_once(char::is_whitespace)?;
    let (group, text) = rest.trim_start().split_once(char::is_whitespace)?;

    Some(InboundMessage::new(
        sender.parse().ok()?,
        group.parse().ok()?,
        message_id,
        text.trim(),
    ))
}

/// Dispatch `<sender> <group> <text>` lines until end of input or until
/// `shutdown` resolves. Returns how many messages were handed to the dispatcher.
async fn read_messages<R, S>(dispatcher: &Arc<Dispatcher>, input: R, shutdown: S) -> usize
where
    R: AsyncBufRead + Unpin,
    S: Future,
{
    let mut lines = input.lines();
    let mut message_id: i64 = 0;
    let mut dispatched = 0;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                break;
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("End of input");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read input: {e}");
                        break;
                    }
                };

                if line.trim().is_empty() {
                    continue;
                }

                message_id += 1;
                match parse_line(&line, message_id) {
                    Some(message) => {
                        if dispatcher.spawn_dispatch(message).is_some() {
                            dispatched += 1;
                        }
                    }
                    None => warn!("Ignoring malformed line: {line}"),
                }
            }
        }
    }

    dispatched
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting gatekeeper...");

    let users = Arc::new(MemoryUserStore::new());
    let groups = Arc::new(MemoryGroupStore::new());

    match SeedConfig::load(&config.seed_config_path) {
        Ok(seed) => {
            let (seeded_users, seeded_groups) = seed.apply(users.as_ref(), groups.as_ref()).await?;
            info!(
                "📄 Loaded seed config from {} ({seeded_users} user(s), {seeded_groups} group(s))",
                config.seed_config_path
            );
        }
        Err(e) => {
            if Path::new(&config.seed_config_path).exists() {
                error!("❌ Failed to load seed config from {}: {e}", config.seed_config_path);
            } else {
                info!("No seed config at {}; starting empty", config.seed_config_path);
            }
        }
    }

    let registry = Arc::new(CommandRegistry::new());
    for handler in create_all_handlers(&registry, groups.clone()) {
        registry.register(handler).await?;
    }
    info!("Registered commands: {}", registry.command_names().await.join(", "));

    let limits = Arc::new(RateLimitManager::new(&config.rate_limits));
    let sweeper_shutdown = CancellationToken::new();
    let sweeper = limits.spawn_sweeper(
        config.limiter_sweep_interval,
        config.limiter_idle_after,
        sweeper_shutdown.clone(),
    );

    let dispatcher = Arc::new(
        Dispatcher::new(registry, users, groups, limits, Arc::new(ConsoleSender))
            .with_config(DispatcherConfig::from(&config)),
    );

    info!("✅ Ready. Enter messages as: <sender_id> <group_id> <text>");

    let stdin = BufReader::new(tokio::io::stdin());
    read_messages(&dispatcher, stdin, tokio::signal::ctrl_c()).await;

    let drained = dispatcher.shutdown(config.shutdown_grace).await;
    sweeper_shutdown.cancel();
    if let Err(e) = sweeper.await {
        warn!("Sweeper task ended abnormally: {e}");
    }

    if drained {
        info!("Shutdown complete");
    } else {
        warn!("Shutdown complete with commands still running");
    }

    Ok(())
}
