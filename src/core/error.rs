//! Error types for the dispatch pipeline
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use thiserror::Error;

use super::permission::Permission;

/// Failures from `CommandRegistry::register`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command name must not be empty")]
    EmptyName,
    #[error("command already registered: {0}")]
    DuplicateName(String),
}

/// Failures from user/group stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(i64),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Everything that can stop a command between intake and handler return
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    CommandNotFound(String),

    #[error("command disabled in this group: {0}")]
    CommandDisabled(String),

    #[error("permission denied: requires {required}, sender has {actual}")]
    PermissionDenied {
        required: Permission,
        actual: Permission,
    },

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("failed to provision user: {0}")]
    UserProvisioningFailed(#[source] StoreError),

    #[error("handler error: {0:#}")]
    Handler(#[source] anyhow::Error),
}

impl CommandError {
    /// Text safe to show the sender. Internal causes never leak through here.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::CommandNotFound(name) => {
                format!("Unknown command /{name}. Use /help to see available commands.")
            }
            CommandError::CommandDisabled(name) => {
                format!("The /{name} command is disabled in this group.")
            }
            CommandError::PermissionDenied { required, actual } => format!(
                "You don't have permission to use this command (requires {required}, you have {actual})."
            ),
            CommandError::RateLimitExceeded => {
                "You're sending commands too quickly! Please slow down.".to_string()
            }
            CommandError::UserProvisioningFailed(_) => {
                "Sorry, I couldn't set up your account. Please try again later.".to_string()
            }
            CommandError::Handler(_) => {
                "Sorry, an error occurred while processing your command.".to_string()
            }
        }
    }

    /// Short label used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::CommandNotFound(_) => "command_not_found",
            CommandError::CommandDisabled(_) => "command_disabled",
            CommandError::PermissionDenied { .. } => "permission_denied",
            CommandError::RateLimitExceeded => "rate_limit_exceeded",
            CommandError::UserProvisioningFailed(_) => "user_provisioning_failed",
            CommandError::Handler(_) => "handler_error",
        }
    }
}
