//! Error taxonomy of the engine.
//!
//! - [`ConstructionError`] - template-time problems. They are accumulated, never
//!   returned early; the partial registry is still produced.
//! - [`PropagationWarning`] - template-time options that are accepted but have no
//!   effect (for example a sync mode on a setting that parents no group).
//! - [`ValidationError`] - a runtime value change that was rejected. No state is
//!   mutated when one is returned.
//! - [`ChangeError`] - everything a value-change call can fail with.

use serde::Serialize;
use thiserror::Error;

use crate::data::{GroupId, SettingPath, ValueType};

/// Problem found while parsing a template or resolving its groups.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstructionError {
    #[error("{path}: {reason}")]
    InvalidNode { path: String, reason: String },

    #[error("{path}: unknown option `{key}`")]
    UnknownOption { path: SettingPath, key: String },

    #[error("{path}: missing required option `{key}`")]
    MissingOption { path: SettingPath, key: &'static str },

    #[error("{path}: option `{key}` does not apply to widget `{widget}`")]
    InapplicableOption {
        path: SettingPath,
        key: &'static str,
        widget: String,
    },

    #[error("{path}: option `{key}` expected {expected}, got {actual}")]
    InvalidShape {
        path: SettingPath,
        key: &'static str,
        expected: &'static str,
        actual: String,
    },

    #[error("{path}: option `{key}` has unknown value `{value}`, expected one of: {expected}")]
    UnknownVariant {
        path: SettingPath,
        key: &'static str,
        value: String,
        expected: String,
    },

    #[error("{path}: could not determine value type (tried: {})", .tried.join(", "))]
    UnresolvedType {
        path: SettingPath,
        tried: Vec<&'static str>,
    },

    #[error("{path}: default {actual} does not match type `{expected}`")]
    DefaultTypeMismatch {
        path: SettingPath,
        expected: ValueType,
        actual: String,
    },

    #[error("{path}: min {min} is greater than max {max}")]
    InvertedBounds { path: SettingPath, min: f64, max: f64 },

    #[error("{path}: default {default} is outside the bounds [{}, {}]", fmt_bound(.min), fmt_bound(.max))]
    DefaultOutOfBounds {
        path: SettingPath,
        default: String,
        min: Option<f64>,
        max: Option<f64>,
    },

    #[error("{path}: default {default} is not one of the allowed values")]
    DefaultNotAllowed { path: SettingPath, default: String },

    #[error("{path}: duplicate setting path, first occurrence kept")]
    DuplicatePath { path: SettingPath },

    #[error("group `{group}`: parent {parent} declares both `clustered` and `nested_children`")]
    ConflictingLayout { group: GroupId, parent: SettingPath },

    #[error("group `{group}`: parent {parent} declares more than one sync mode ({})", .modes.join(", "))]
    ConflictingSyncModes {
        group: GroupId,
        parent: SettingPath,
        modes: Vec<&'static str>,
    },

    #[error("group `{group}`: sync mode needs boolean settings, {path} is `{value_type}`")]
    SyncOnNonBoolean {
        group: GroupId,
        path: SettingPath,
        value_type: ValueType,
    },
}

fn fmt_bound(bound: &Option<f64>) -> String {
    bound.map_or_else(|| "-".to_string(), |b| b.to_string())
}

/// Option accepted by the template but without any runtime effect.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropagationWarning {
    #[error("{path}: `ui_group_parent` without `ui_group`, ignored")]
    ParentWithoutGroup { path: SettingPath },

    #[error("{path}: empty group id in `ui_group`, skipped")]
    EmptyGroupId { path: SettingPath },

    #[error("group `{group}`: {path} is shadowed by parent {parent}, its propagation options are ignored")]
    ShadowedParent {
        group: GroupId,
        path: SettingPath,
        parent: SettingPath,
    },

    #[error("group `{group}`: parent {parent} has no children")]
    ChildlessParent { group: GroupId, parent: SettingPath },

    #[error("group `{group}`: `undirected_sync` without a sync mode has no effect")]
    UndirectedWithoutSync { group: GroupId },

    #[error("{path}: excluded settings do not join groups, `ui_group` ignored")]
    ExcludedFromGroups { path: SettingPath },
}

/// A value plus the diagnostics collected while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Checked<T> {
    /// Whatever could be built.
    pub value: T,
    /// Construction errors, in discovery order.
    pub errors: Vec<ConstructionError>,
    /// Non-fatal warnings, in discovery order.
    pub warnings: Vec<PropagationWarning>,
}

impl<T> Checked<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// True when no construction error was recorded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Checked<U> {
        Checked {
            value: f(self.value),
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    /// Move the diagnostics of `other` into `self` and return its value.
    pub fn absorb<U>(&mut self, other: Checked<U>) -> U {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        other.value
    }

    /// Drop the partial value when any construction error was recorded.
    pub fn into_result(self) -> Result<T, Vec<ConstructionError>> {
        if self.errors.is_empty() {
            Ok(self.value)
        } else {
            Err(self.errors)
        }
    }
}

/// Runtime rejection of a new value. The setting keeps its prior value.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{path}: expected `{expected}`, got {actual}")]
    TypeMismatch {
        path: SettingPath,
        expected: ValueType,
        actual: String,
    },

    #[error("{path}: {value} is below the minimum {min}")]
    BelowMinimum {
        path: SettingPath,
        value: f64,
        min: f64,
    },

    #[error("{path}: {value} is above the maximum {max}")]
    AboveMaximum {
        path: SettingPath,
        value: f64,
        max: f64,
    },

    #[error("{path}: {value} is not one of the allowed values")]
    NotAllowed { path: SettingPath, value: String },

    #[error("{path}: rejected by validator `{validator}`: {reason}")]
    Rejected {
        path: SettingPath,
        validator: String,
        reason: String,
    },

    #[error("{path}: no callable registered under `{name}`")]
    UnknownCallable { path: SettingPath, name: String },

    #[error("{path}: action `{action}` failed: {reason}")]
    ActionFailed {
        path: SettingPath,
        action: String,
        reason: String,
    },
}

/// Failure of a value-change request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChangeError {
    /// The caller addressed a setting that is not in the registry.
    #[error("no setting at path `{0}`")]
    UnknownSetting(String),

    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error("{0}: setting has no disable button")]
    NoDisableButton(SettingPath),
}
