//! # Seed Configuration
//!
//! YAML file that pre-populates permission grants and per-group command
//! overrides at startup.
//!
//! ```yaml
//! users:
//!   - id: 42
//!     permissions:
//!       -100: super_admin
//! groups:
//!   - id: -100
//!     title: Moderators
//!     disabled_commands: [ban]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{GroupStore, UserStore};
use crate::core::{Group, Permission, User};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub groups: Vec<SeedGroup>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedUser {
    pub id: i64,
    #[serde(default)]
    pub permissions: HashMap<i64, Permission>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedGroup {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub disabled_commands: Vec<String>,
}

impl SeedConfig {
    /// Load seed data from a YAML file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: SeedConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for group in &self.groups {
            for name in &group.disabled_commands {
                if name.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "Group {} lists an empty command name",
                        group.id
                    ));
                }
            }
        }
        Ok(())
    }

    /// Write every seeded record into the stores. Returns (users, groups) written.
    pub async fn apply(
        &self,
        users: &dyn UserStore,
        groups: &dyn GroupStore,
    ) -> Result<(usize, usize)> {
        for seed in &self.users {
            let mut user = User::new(seed.id);
            for (&group_id, &level) in &seed.permissions {
                user.grant(group_id, level);
            }
            users.save(&user).await?;
        }

        for seed in &self.groups {
            let mut group = Group::new(seed.id, seed.title.clone());
            for name in &seed.disabled_commands {
                let name = name.trim().trim_start_matches('/').to_lowercase();
                group.set_command_enabled(&name, false, 0);
            }
            groups.save(&group).await?;
        }

        Ok((self.users.len(), self.groups.len()))
    }
}
