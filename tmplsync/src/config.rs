//! Engine configuration.
//!
//! Stored as `.json` or `.toml`; every field is optional.
//!
//! ```toml
//! disable_policy = "FollowSyncMode"
//! max_cascade_depth = 8
//! run_child_actions = true
//! ```

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::document;

/// Tunables of the synchronization engine.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Which parent state disables the children of a `disable_children` group.
    pub disable_policy: DisablePolicy,
    /// Upper bound on re-submitted events in
    /// [`Engine::on_value_changed_cascading`](crate::Engine::on_value_changed_cascading).
    pub max_cascade_depth: usize,
    /// Whether actions of children changed by propagation run too.
    pub run_child_actions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            disable_policy: DisablePolicy::default(),
            max_cascade_depth: 8,
            run_child_actions: true,
        }
    }
}

impl EngineConfig {
    /// Load a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = document::read(path.as_ref())?;
        let config = serde_json::from_value(raw)?;
        Ok(config)
    }
}

/// When a parent disables its children.
///
/// A parent's `ui_disable_other` / `ui_disable_self` sentinels take precedence
/// over the policy.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum DisablePolicy {
    /// Children are disabled whenever the group's sync mode would not make them
    /// mirror the parent: a falsy parent under `sync` / `desync_true`, a truthy
    /// parent otherwise.
    #[default]
    FollowSyncMode,
    /// Children are disabled while the parent is truthy.
    Truthy,
    /// Children are disabled while the parent is falsy.
    Falsy,
}
