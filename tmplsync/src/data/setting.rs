use std::{collections::BTreeSet, fmt};

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{
    data::{
        GroupId,
        value::{ValueType, describe},
    },
    error::ValidationError,
    schema::{GroupParentVariant, UiFlag, WidgetKind},
};

/// Category/group segments ending in the setting key, e.g. `Appearance.appTheme`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettingPath(Vec<String>);

impl SettingPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Split a dot-separated path. Template keys never contain dots.
    pub fn parse(s: &str) -> Self {
        Self(s.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The setting's own key.
    pub fn key(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// Everything but the key.
    pub fn category(&self) -> &[String] {
        &self.0[..self.0.len().saturating_sub(1)]
    }

    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }
}

impl fmt::Display for SettingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl Serialize for SettingPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for SettingPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Position of a setting in its registry (parse order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SettingId(pub(crate) usize);

impl SettingId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Name of a validator or action registered with the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CallableRef(pub String);

impl fmt::Display for CallableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Title plus optional description shown by the GUI layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Message {
    pub title: String,
    pub description: String,
}

/// Presentation metadata, carried but not interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Presentation {
    pub title: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub widget: Option<WidgetKind>,
    pub file_filter: Option<String>,
    pub show_dir_only: bool,
    pub invalid_input: Option<Message>,
}

/// Whether the GUI offers a button that disables the setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisableButton {
    /// Present iff the setting declares `ui_disable_self`.
    #[default]
    Implicit,
    Explicit(bool),
}

/// One resolved template leaf. Immutable once the template is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Setting {
    pub path: SettingPath,
    pub value_type: ValueType,
    pub default: Value,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allowed_values: Option<Vec<Value>>,
    pub disable_self_value: Option<Value>,
    pub disable_other_value: Option<Value>,
    pub validators: Vec<CallableRef>,
    pub actions: Vec<CallableRef>,
    /// Ordered, duplicate free. The first id is the only group this setting can parent.
    pub group_ids: Vec<GroupId>,
    /// Declared `ui_group_parent` variants, duplicate free.
    pub group_parent: Vec<GroupParentVariant>,
    /// Filled in by group resolution.
    pub is_group_parent_for: BTreeSet<GroupId>,
    pub disable_button: DisableButton,
    pub flags: BTreeSet<UiFlag>,
    pub presentation: Presentation,
}

impl Setting {
    pub fn key(&self) -> &str {
        self.path.key()
    }

    pub fn has_flag(&self, flag: UiFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn has_disable_button(&self) -> bool {
        match self.disable_button {
            DisableButton::Explicit(enabled) => enabled,
            DisableButton::Implicit => self.disable_self_value.is_some(),
        }
    }

    pub fn primary_group(&self) -> Option<&GroupId> {
        self.group_ids.first()
    }

    pub fn is_group_parent(&self) -> bool {
        !self.is_group_parent_for.is_empty()
    }

    /// Whether `value` is one of the disable sentinels of this setting.
    pub fn is_disable_sentinel(&self, value: &Value) -> bool {
        self.disable_self_value.as_ref() == Some(value)
            || self.disable_other_value.as_ref() == Some(value)
    }

    /// Lower bound used for validation.
    ///
    /// When `min` is declared, the smallest of `min`, the disable sentinels and
    /// the default wins, so a sentinel below the range stays valid.
    pub fn effective_min(&self) -> Option<f64> {
        let min = self.min?;
        let lowest = [
            self.disable_self_value.as_ref(),
            self.disable_other_value.as_ref(),
            Some(&self.default),
        ]
        .into_iter()
        .flatten()
        .filter_map(Value::as_f64)
        .fold(min, f64::min);
        Some(lowest)
    }

    /// Built-in checks run before any registered validator.
    pub fn check_value(&self, value: &Value) -> Result<(), ValidationError> {
        let sentinel = self.is_disable_sentinel(value);
        if !sentinel && !self.value_type.accepts(value) {
            return Err(ValidationError::TypeMismatch {
                path: self.path.clone(),
                expected: self.value_type,
                actual: describe(value),
            });
        }
        if sentinel {
            return Ok(());
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = self.effective_min()
                && n < min
            {
                return Err(ValidationError::BelowMinimum {
                    path: self.path.clone(),
                    value: n,
                    min,
                });
            }
            if let Some(max) = self.max
                && n > max
            {
                return Err(ValidationError::AboveMaximum {
                    path: self.path.clone(),
                    value: n,
                    max,
                });
            }
        }

        if let Some(allowed) = &self.allowed_values
            && !allowed.contains(value)
        {
            return Err(ValidationError::NotAllowed {
                path: self.path.clone(),
                value: value.to_string(),
            });
        }
        Ok(())
    }
}
