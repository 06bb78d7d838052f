use serde::Serialize;
use serde_json::Value;

use crate::data::{SettingPath, ValueType};

/// One `(path, value?, enabled?)` tuple of a change outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub path: SettingPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Update {
    pub fn new(path: impl Into<SettingPath>) -> Self {
        Self {
            path: path.into(),
            value: None,
            enabled: None,
        }
    }

    pub fn value(path: impl Into<SettingPath>, value: Value) -> Self {
        Self::new(path).with_value(value)
    }

    pub fn enabled(path: impl Into<SettingPath>, enabled: bool) -> Self {
        Self::new(path).with_enabled(enabled)
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.enabled.is_none()
    }
}

/// Everything one value-change event changed, in emission order.
///
/// Tuples for the same path may repeat; later ones win.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChangeOutcome {
    pub updates: Vec<Update>,
    /// A changed setting is flagged `requires_reload`.
    pub requires_reload: bool,
}

impl ChangeOutcome {
    /// Fold every tuple for `path` into one, last write wins.
    pub fn final_state(&self, path: &str) -> Option<Update> {
        let path = SettingPath::parse(path);
        self.updates
            .iter()
            .filter(|u| u.path == path)
            .fold(None, |acc: Option<Update>, u| {
                let mut folded = acc.unwrap_or_else(|| Update::new(u.path.clone()));
                if let Some(value) = &u.value {
                    folded.value = Some(value.clone());
                }
                if let Some(enabled) = u.enabled {
                    folded.enabled = Some(enabled);
                }
                Some(folded)
            })
    }

    /// Paths touched by the event, first occurrence order.
    pub fn paths(&self) -> Vec<&SettingPath> {
        let mut paths: Vec<&SettingPath> = Vec::new();
        for update in &self.updates {
            if !paths.contains(&&update.path) {
                paths.push(&update.path);
            }
        }
        paths
    }

    pub(crate) fn merge(&mut self, other: ChangeOutcome) {
        self.updates.extend(other.updates);
        self.requires_reload |= other.requires_reload;
    }
}

/// Current value of one setting, as written to the config layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigEntry {
    pub path: SettingPath,
    pub value: Value,
    pub value_type: ValueType,
}
