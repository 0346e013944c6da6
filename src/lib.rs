// Core layer - shared types, configuration, errors
pub mod core;

// Features layer - rate limiting
pub mod features;

// Storage seams and in-memory stores
pub mod database;

// Chat platform boundary
pub mod transport;

// Application layer - parsing, registry, middleware, dispatch
pub mod commands;

pub use crate::core::{CommandError, Config, Permission};

pub use commands::{
    create_all_handlers, CommandContext, CommandHandler, CommandRegistry, DispatchOutcome,
    Dispatcher, DispatcherConfig,
};

pub use database::{GroupStore, MemoryGroupStore, MemoryUserStore, SeedConfig, UserStore};

pub use features::{RateLimitConfig, RateLimitManager};

pub use transport::{InboundMessage, MessageSender};
