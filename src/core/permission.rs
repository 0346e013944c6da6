//! Permission levels and the user/group records they attach to
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Ordered permission levels. `a >= b` means "a is sufficient for b".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    None,
    #[default]
    User,
    Admin,
    SuperAdmin,
    Owner,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::None => "none",
            Permission::User => "user",
            Permission::Admin => "admin",
            Permission::SuperAdmin => "super_admin",
            Permission::Owner => "owner",
        }
    }

    /// Whether this level satisfies `required` (non-strict).
    pub fn satisfies(self, required: Permission) -> bool {
        self >= required
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sender known to the bot, with a permission level per group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub permissions: HashMap<i64, Permission>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Fresh user with no explicit grants
    pub fn new(id: i64) -> Self {
        Self {
            id,
            permissions: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Permission in `group_id`, falling back to the default level
    pub fn permission_in(&self, group_id: i64) -> Permission {
        self.permissions
            .get(&group_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn grant(&mut self, group_id: i64, level: Permission) {
        self.permissions.insert(group_id, level);
    }
}

/// Per-group override for a single command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub command_name: String,
    pub enabled: bool,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_by: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub commands: HashMap<String, CommandConfig>,
}

impl Group {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            commands: HashMap::new(),
        }
    }

    /// Commands without an override are enabled
    pub fn is_command_enabled(&self, name: &str) -> bool {
        self.commands.get(name).map(|c| c.enabled).unwrap_or(true)
    }

    /// Record an enable/disable override, stamped with who changed it
    pub fn set_command_enabled(&mut self, name: &str, enabled: bool, updated_by: i64) {
        self.commands.insert(
            name.to_string(),
            CommandConfig {
                command_name: name.to_string(),
                enabled,
                updated_at: Utc::now(),
                updated_by,
            },
        );
    }
}
