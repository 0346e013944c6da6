//! # Core Module
//!
//! Core domain types, configuration, and error handling for the dispatch core.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Reply limit counted in characters
//! - 1.0.0: Config, error taxonomy, permission model, reply shaping

pub mod config;
pub mod error;
pub mod permission;
pub mod response;

// Re-export commonly used items
pub use config::Config;
pub use error::{CommandError, RegistryError, StoreError};
pub use permission::{CommandConfig, Group, Permission, User};
pub use response::{sanitize_reply, truncate_for_message, MESSAGE_LIMIT};
