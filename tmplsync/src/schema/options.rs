//! Static catalog of option keys, their value shapes and applicability.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{data::value::is_scalar, schema::WidgetKind};

/// Every option key a setting may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionKey {
    Default,
    Type,
    Min,
    Max,
    Values,
    Validators,
    Actions,
    UiDisableButton,
    UiDisableSelf,
    UiDisableOther,
    UiFileFilter,
    UiShowDirOnly,
    UiFlags,
    UiGroup,
    UiGroupParent,
    UiInfo,
    UiInvalidInput,
    UiType,
    UiUnit,
}

impl OptionKey {
    pub const ALL: [OptionKey; 19] = [
        OptionKey::Default,
        OptionKey::Type,
        OptionKey::Min,
        OptionKey::Max,
        OptionKey::Values,
        OptionKey::Validators,
        OptionKey::Actions,
        OptionKey::UiDisableButton,
        OptionKey::UiDisableSelf,
        OptionKey::UiDisableOther,
        OptionKey::UiFileFilter,
        OptionKey::UiShowDirOnly,
        OptionKey::UiFlags,
        OptionKey::UiGroup,
        OptionKey::UiGroupParent,
        OptionKey::UiInfo,
        OptionKey::UiInvalidInput,
        OptionKey::UiType,
        OptionKey::UiUnit,
    ];

    /// Template spelling of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::Default => "default",
            OptionKey::Type => "type",
            OptionKey::Min => "min",
            OptionKey::Max => "max",
            OptionKey::Values => "values",
            OptionKey::Validators => "validators",
            OptionKey::Actions => "actions",
            OptionKey::UiDisableButton => "ui_disable_button",
            OptionKey::UiDisableSelf => "ui_disable_self",
            OptionKey::UiDisableOther => "ui_disable_other",
            OptionKey::UiFileFilter => "ui_file_filter",
            OptionKey::UiShowDirOnly => "ui_show_dir_only",
            OptionKey::UiFlags => "ui_flags",
            OptionKey::UiGroup => "ui_group",
            OptionKey::UiGroupParent => "ui_group_parent",
            OptionKey::UiInfo => "ui_info",
            OptionKey::UiInvalidInput => "ui_invalid_input",
            OptionKey::UiType => "ui_type",
            OptionKey::UiUnit => "ui_unit",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }

    pub fn shape(&self) -> OptionShape {
        match self {
            OptionKey::Default => OptionShape::Value,
            OptionKey::Type | OptionKey::UiType | OptionKey::UiUnit => OptionShape::Text,
            OptionKey::Min | OptionKey::Max => OptionShape::Bound,
            OptionKey::Values => OptionShape::Choices,
            OptionKey::Validators
            | OptionKey::Actions
            | OptionKey::UiFlags
            | OptionKey::UiGroupParent => OptionShape::Names,
            OptionKey::UiDisableButton | OptionKey::UiShowDirOnly => OptionShape::Flag,
            OptionKey::UiDisableSelf | OptionKey::UiDisableOther => OptionShape::Scalar,
            OptionKey::UiFileFilter => OptionShape::OptionalText,
            OptionKey::UiGroup => OptionShape::GroupIds,
            OptionKey::UiInfo | OptionKey::UiInvalidInput => OptionShape::Message,
        }
    }

    /// Whether the key may be declared for `widget` (`None` = no `ui_type`).
    pub fn applies_to(&self, widget: Option<WidgetKind>) -> bool {
        let Some(widget) = widget else {
            return true;
        };
        match self {
            OptionKey::Values => widget == WidgetKind::ComboBox,
            OptionKey::Min | OptionKey::Max => {
                widget.is_numeric_range() || widget == WidgetKind::ComboBox
            }
            OptionKey::UiFileFilter | OptionKey::UiShowDirOnly => {
                widget == WidgetKind::FileSelection
            }
            OptionKey::UiInvalidInput => widget == WidgetKind::LineEdit,
            _ => true,
        }
    }

    /// Whether the key must be declared for `widget`.
    pub fn required_for(&self, widget: Option<WidgetKind>) -> bool {
        match self {
            OptionKey::Default => true,
            OptionKey::Values => widget == Some(WidgetKind::ComboBox),
            OptionKey::Min => widget == Some(WidgetKind::Slider),
            _ => false,
        }
    }
}

/// Expected shape of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionShape {
    /// Anything but a mapping.
    Value,
    /// Non-null scalar.
    Scalar,
    Text,
    /// String or null.
    OptionalText,
    /// Number, or null for "unbounded".
    Bound,
    Flag,
    /// List of scalars, or a mapping whose keys are the choices.
    Choices,
    /// A name or a list of names.
    Names,
    /// Comma separated string, integer, or a list of those.
    GroupIds,
    /// Title string, or `{title, description}`.
    Message,
}

impl OptionShape {
    pub fn expected(&self) -> &'static str {
        match self {
            OptionShape::Value => "a scalar or a list",
            OptionShape::Scalar => "a scalar",
            OptionShape::Text => "a string",
            OptionShape::OptionalText => "a string or null",
            OptionShape::Bound => "a number or null",
            OptionShape::Flag => "a bool",
            OptionShape::Choices => "a list of scalars or a mapping",
            OptionShape::Names => "a string or a list of strings",
            OptionShape::GroupIds => "a group id or a list of group ids",
            OptionShape::Message => "a title or {title, description}",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            OptionShape::Value => !value.is_object(),
            OptionShape::Scalar => is_scalar(value),
            OptionShape::Text => value.is_string(),
            OptionShape::OptionalText => value.is_string() || value.is_null(),
            OptionShape::Bound => value.is_number() || value.is_null(),
            OptionShape::Flag => value.is_boolean(),
            OptionShape::Choices => match value {
                Value::Array(items) => items.iter().all(is_scalar),
                Value::Object(_) => true,
                _ => false,
            },
            OptionShape::Names => match value {
                Value::String(_) => true,
                Value::Array(items) => items.iter().all(Value::is_string),
                _ => false,
            },
            OptionShape::GroupIds => match value {
                Value::Array(items) => items.iter().all(is_group_id),
                other => is_group_id(other),
            },
            OptionShape::Message => match value {
                Value::String(_) => true,
                Value::Object(map) => {
                    map.get("title").is_some_and(Value::is_string)
                        && map.get("description").is_none_or(Value::is_string)
                        && map.keys().all(|k| k == "title" || k == "description")
                }
                _ => false,
            },
        }
    }
}

fn is_group_id(value: &Value) -> bool {
    value.is_string() || value.is_i64() || value.is_u64()
}

/// Requirement of one option key for a widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRule {
    pub required: bool,
    pub applies: bool,
}

/// Option requirements for a setting whose widget kind is `widget`.
pub fn describe(widget: Option<WidgetKind>) -> BTreeMap<OptionKey, OptionRule> {
    OptionKey::ALL
        .iter()
        .map(|key| {
            (
                *key,
                OptionRule {
                    required: key.required_for(widget),
                    applies: key.applies_to(widget),
                },
            )
        })
        .collect()
}

/// Recognized, shape-checked options of one setting.
#[derive(Debug, Clone, Default)]
pub struct RawOptions<'a> {
    options: BTreeMap<OptionKey, &'a Value>,
}

impl<'a> RawOptions<'a> {
    pub fn insert(&mut self, key: OptionKey, value: &'a Value) {
        self.options.insert(key, value);
    }

    pub fn get(&self, key: OptionKey) -> Option<&'a Value> {
        self.options.get(&key).copied()
    }

    pub fn contains(&self, key: OptionKey) -> bool {
        self.options.contains_key(&key)
    }

    pub fn remove(&mut self, key: OptionKey) -> Option<&'a Value> {
        self.options.remove(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = OptionKey> + '_ {
        self.options.keys().copied()
    }
}
