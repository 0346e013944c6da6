//! Permission middleware
//!
//! In order: refuse commands disabled for the group (by a stored group
//! override or by the handler itself), resolve (or provision)
//! the sender, compare their level in the group against the handler's
//! requirement, then attach the user to the context and continue.

use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

use super::{Endpoint, Middleware};
use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::core::CommandError;
use crate::database::{command_enabled, ensure_user, GroupStore, UserStore};

pub struct PermissionMiddleware {
    users: Arc<dyn UserStore>,
    groups: Arc<dyn GroupStore>,
    handler: Arc<dyn CommandHandler>,
}

impl PermissionMiddleware {
    pub fn new(
        users: Arc<dyn UserStore>,
        groups: Arc<dyn GroupStore>,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            users,
            groups,
            handler,
        }
    }
}

impl Middleware for PermissionMiddleware {
    fn wrap(&self, next: Arc<dyn Endpoint>) -> Arc<dyn Endpoint> {
        Arc::new(PermissionEndpoint {
            users: Arc::clone(&self.users),
            groups: Arc::clone(&self.groups),
            handler: Arc::clone(&self.handler),
            next,
        })
    }
}

struct PermissionEndpoint {
    users: Arc<dyn UserStore>,
    groups: Arc<dyn GroupStore>,
    handler: Arc<dyn CommandHandler>,
    next: Arc<dyn Endpoint>,
}

#[async_trait]
impl Endpoint for PermissionEndpoint {
    async fn call(&self, ctx: &mut CommandContext) -> Result<(), CommandError> {
        let enabled = command_enabled(self.groups.as_ref(), ctx.group_id, &ctx.command).await
            && self.handler.is_enabled(ctx.group_id).await;
        if !enabled {
            debug!(
                "[{}] /{} is disabled in group {}",
                ctx.request_id, ctx.command, ctx.group_id
            );
            return Err(CommandError::CommandDisabled(ctx.command.clone()));
        }

        let user = ensure_user(self.users.as_ref(), ctx.sender_id)
            .await
            .map_err(CommandError::UserProvisioningFailed)?;

        let required = self.handler.required_permission();
        let actual = user.permission_in(ctx.group_id);
        if !actual.satisfies(required) {
            warn!(
                "[{}] ⛔ Permission denied | User: {} | Command: /{} | Required: {} | Actual: {}",
                ctx.request_id, ctx.sender_id, ctx.command, required, actual
            );
            return Err(CommandError::PermissionDenied { required, actual });
        }

        ctx.user = Some(user);
        self.next.call(ctx).await
    }
}
