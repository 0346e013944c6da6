//! Built-in command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod admin;
pub mod utility;

use std::sync::Arc;

use super::handler::CommandHandler;
use super::registry::CommandRegistry;
use crate::database::GroupStore;

pub use admin::ToggleHandler;
pub use utility::{HelpHandler, PingHandler};

/// Create all built-in command handlers
///
/// Returns a vector of handlers ready to be registered with `registry`. Handlers
/// that inspect the registry hold it weakly.
pub fn create_all_handlers(
    registry: &Arc<CommandRegistry>,
    groups: Arc<dyn GroupStore>,
) -> Vec<Arc<dyn CommandHandler>> {
    vec![
        Arc::new(utility::PingHandler),
        Arc::new(utility::HelpHandler::new(registry, Arc::clone(&groups))),
        Arc::new(admin::ToggleHandler::new(registry, groups)),
    ]
}
