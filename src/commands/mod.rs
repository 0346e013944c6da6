//! # Command System
//!
//! Slash command (/) parsing, registration, and dispatch for group chats.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Stored group overrides enforced by the permission stage
//! - 1.0.0: Parser, registry, middleware chain, dispatcher with graceful drain

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod middleware;
pub mod parser;
pub mod registry;
pub mod shutdown;

pub use context::CommandContext;
pub use dispatcher::{DispatchOutcome, Dispatcher, DispatcherConfig};
pub use handler::CommandHandler;
pub use handlers::create_all_handlers;
pub use middleware::{Chain, CommandLogger, Endpoint, LogLogger, Middleware};
pub use parser::{is_command, parse_command, ParsedCommand};
pub use registry::CommandRegistry;
pub use shutdown::{InFlightGuard, InFlightTracker};
