//! Template parsing.
//!
//! Walks `category -> (category ->)* setting -> options` trees and produces a
//! flat [`SettingRegistry`]. Parsing never stops at the first problem: every
//! construction error is recorded and the settings that could be built are
//! still returned.
//!
//! Inside a category, a mapping that contains at least one recognized option
//! key is a setting; any other mapping is a nested category.

use serde_json::{Map, Value};

use crate::{
    data::{
        CallableRef, DisableButton, GroupId, Message, Presentation, Setting, SettingPath,
        SettingRegistry, ValueType,
        value::describe,
    },
    error::{Checked, ConstructionError, PropagationWarning},
    infer::infer,
    schema::{GroupParentVariant, OptionKey, RawOptions, UiFlag, WidgetKind, describe as rules},
};

/// Parse one raw template.
pub fn parse(raw: &Value) -> Checked<SettingRegistry> {
    parse_all(std::slice::from_ref(raw))
}

/// Parse several raw templates into one registry, in order.
///
/// A path defined by more than one source is reported; the first definition wins.
pub fn parse_all(sources: &[Value]) -> Checked<SettingRegistry> {
    let mut parser = TemplateParser::default();
    for raw in sources {
        parser.parse_source(raw);
    }
    parser.finish()
}

#[derive(Default)]
struct TemplateParser {
    registry: SettingRegistry,
    errors: Vec<ConstructionError>,
    warnings: Vec<PropagationWarning>,
}

impl TemplateParser {
    fn finish(self) -> Checked<SettingRegistry> {
        info!(
            "parsed {} settings ({} errors, {} warnings)",
            self.registry.len(),
            self.errors.len(),
            self.warnings.len()
        );
        Checked {
            value: self.registry,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    fn parse_source(&mut self, raw: &Value) {
        let Value::Object(categories) = raw else {
            self.errors.push(ConstructionError::InvalidNode {
                path: "<root>".to_string(),
                reason: format!("expected a mapping of categories, got {}", describe(raw)),
            });
            return;
        };
        for (name, node) in categories {
            let path = SettingPath::new(vec![name.clone()]);
            if !self.check_key(&path) {
                continue;
            }
            match node {
                Value::Object(map) => self.parse_category(&path, map),
                other => self.errors.push(ConstructionError::InvalidNode {
                    path: path.to_string(),
                    reason: format!("expected a category, got {}", describe(other)),
                }),
            }
        }
    }

    fn check_key(&mut self, path: &SettingPath) -> bool {
        let key = path.key();
        if key.is_empty() || key.contains('.') {
            self.errors.push(ConstructionError::InvalidNode {
                path: path.to_string(),
                reason: "keys must be non-empty and must not contain '.'".to_string(),
            });
            return false;
        }
        true
    }

    fn parse_category(&mut self, path: &SettingPath, map: &Map<String, Value>) {
        for (key, node) in map {
            let child = path.child(key);
            if !self.check_key(&child) {
                continue;
            }
            match node {
                Value::Object(options) if is_setting(options) => {
                    self.parse_setting(child, options)
                }
                Value::Object(nested) => self.parse_category(&child, nested),
                other => self.errors.push(ConstructionError::InvalidNode {
                    path: child.to_string(),
                    reason: format!("expected a setting or a category, got {}", describe(other)),
                }),
            }
        }
    }

    fn parse_setting(&mut self, path: SettingPath, map: &Map<String, Value>) {
        if self.registry.contains(&path) {
            self.errors.push(ConstructionError::DuplicatePath { path });
            return;
        }

        let mut options = RawOptions::default();
        for (key, value) in map {
            let Some(option) = OptionKey::from_key(key) else {
                self.errors.push(ConstructionError::UnknownOption {
                    path: path.clone(),
                    key: key.clone(),
                });
                continue;
            };
            let shape = option.shape();
            if !shape.matches(value) {
                self.errors.push(ConstructionError::InvalidShape {
                    path: path.clone(),
                    key: option.as_str(),
                    expected: shape.expected(),
                    actual: describe(value),
                });
                continue;
            }
            options.insert(option, value);
        }

        let widget = self.widget(&path, &options);
        for (key, rule) in rules(widget) {
            let present = options.contains(key);
            if rule.required && !present {
                self.errors.push(ConstructionError::MissingOption {
                    path: path.clone(),
                    key: key.as_str(),
                });
            }
            if present && !rule.applies {
                self.errors.push(ConstructionError::InapplicableOption {
                    path: path.clone(),
                    key: key.as_str(),
                    widget: widget.map(|w| w.to_string()).unwrap_or_default(),
                });
                options.remove(key);
            }
        }

        let Some(default) = options.get(OptionKey::Default) else {
            return;
        };
        if let Some(name) = options.get(OptionKey::Type).and_then(Value::as_str)
            && ValueType::from_name(name).is_none()
        {
            self.errors.push(ConstructionError::UnknownVariant {
                path: path.clone(),
                key: OptionKey::Type.as_str(),
                value: name.to_string(),
                expected: ValueType::expected(),
            });
        }

        let value_type = match infer(&options) {
            Ok(ty) => ty,
            Err(failure) => {
                self.errors.push(ConstructionError::UnresolvedType {
                    path,
                    tried: failure.tried,
                });
                return;
            }
        };
        if !value_type.accepts(default) {
            self.errors.push(ConstructionError::DefaultTypeMismatch {
                path,
                expected: value_type,
                actual: describe(default),
            });
            return;
        }

        let min = options.get(OptionKey::Min).and_then(Value::as_f64);
        let max = options.get(OptionKey::Max).and_then(Value::as_f64);
        if let (Some(lo), Some(hi)) = (min, max)
            && lo > hi
        {
            self.errors.push(ConstructionError::InvertedBounds {
                path,
                min: lo,
                max: hi,
            });
            return;
        }

        let disable_self_value = options.get(OptionKey::UiDisableSelf).cloned();
        let disable_other_value = options.get(OptionKey::UiDisableOther).cloned();
        let default_is_sentinel = disable_self_value.as_ref() == Some(default)
            || disable_other_value.as_ref() == Some(default);

        if let Some(d) = default.as_f64()
            && !default_is_sentinel
            && (min.is_some_and(|lo| d < lo) || max.is_some_and(|hi| d > hi))
        {
            self.errors.push(ConstructionError::DefaultOutOfBounds {
                path,
                default: default.to_string(),
                min,
                max,
            });
            return;
        }

        let allowed_values = options.get(OptionKey::Values).map(choices);
        if let Some(allowed) = &allowed_values
            && !default_is_sentinel
            && !allowed.contains(default)
        {
            self.errors.push(ConstructionError::DefaultNotAllowed {
                path,
                default: default.to_string(),
            });
            return;
        }

        let flags = self
            .variants(&path, &options, OptionKey::UiFlags, UiFlag::parse, UiFlag::expected)
            .into_iter()
            .collect();
        let group_parent = self.variants(
            &path,
            &options,
            OptionKey::UiGroupParent,
            GroupParentVariant::parse,
            GroupParentVariant::expected,
        );
        let group_ids = self.group_ids(&path, options.get(OptionKey::UiGroup));
        if !group_parent.is_empty() && group_ids.is_empty() {
            self.warnings
                .push(PropagationWarning::ParentWithoutGroup { path: path.clone() });
        }

        let disable_button = options
            .get(OptionKey::UiDisableButton)
            .and_then(Value::as_bool)
            .map_or(DisableButton::Implicit, DisableButton::Explicit);

        let info = options.get(OptionKey::UiInfo).map(message);
        let presentation = Presentation {
            title: info.as_ref().map(|m| m.title.clone()),
            description: info
                .map(|m| m.description)
                .filter(|d| !d.is_empty()),
            unit: text(options.get(OptionKey::UiUnit)),
            widget,
            file_filter: text(options.get(OptionKey::UiFileFilter)),
            show_dir_only: options
                .get(OptionKey::UiShowDirOnly)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            invalid_input: options.get(OptionKey::UiInvalidInput).map(message),
        };

        debug!("{path}: {value_type} setting, groups {group_ids:?}");
        let setting = Setting {
            path,
            value_type,
            default: default.clone(),
            min,
            max,
            allowed_values,
            disable_self_value,
            disable_other_value,
            validators: callables(options.get(OptionKey::Validators)),
            actions: callables(options.get(OptionKey::Actions)),
            group_ids,
            group_parent,
            is_group_parent_for: Default::default(),
            disable_button,
            flags,
            presentation,
        };
        if let Err(rejected) = self.registry.insert(setting) {
            self.errors
                .push(ConstructionError::DuplicatePath { path: rejected.path });
        }
    }

    fn widget(&mut self, path: &SettingPath, options: &RawOptions<'_>) -> Option<WidgetKind> {
        let name = options.get(OptionKey::UiType)?.as_str()?;
        let widget = WidgetKind::parse(name);
        if widget.is_none() {
            self.errors.push(ConstructionError::UnknownVariant {
                path: path.clone(),
                key: OptionKey::UiType.as_str(),
                value: name.to_string(),
                expected: WidgetKind::expected(),
            });
        }
        widget
    }

    fn variants<T: PartialEq>(
        &mut self,
        path: &SettingPath,
        options: &RawOptions<'_>,
        key: OptionKey,
        parse: fn(&str) -> Option<T>,
        expected: fn() -> String,
    ) -> Vec<T> {
        let mut out = Vec::new();
        for name in names(options.get(key)) {
            match parse(&name) {
                Some(variant) => {
                    if !out.contains(&variant) {
                        out.push(variant);
                    }
                }
                None => self.errors.push(ConstructionError::UnknownVariant {
                    path: path.clone(),
                    key: key.as_str(),
                    value: name,
                    expected: expected(),
                }),
            }
        }
        out
    }

    /// Normalize the single-value, comma-separated and list forms of `ui_group`.
    fn group_ids(&mut self, path: &SettingPath, raw: Option<&Value>) -> Vec<GroupId> {
        let pieces: Vec<String> = match raw {
            None => Vec::new(),
            Some(Value::Array(items)) => items.iter().flat_map(split_group_ids).collect(),
            Some(other) => split_group_ids(other),
        };
        let mut ids: Vec<GroupId> = Vec::new();
        for piece in pieces {
            if piece.is_empty() {
                self.warnings
                    .push(PropagationWarning::EmptyGroupId { path: path.clone() });
                continue;
            }
            let id = GroupId::new(piece);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

fn is_setting(map: &Map<String, Value>) -> bool {
    map.keys().any(|k| OptionKey::from_key(k).is_some())
}

fn split_group_ids(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s.split(',').map(|p| p.trim().to_string()).collect(),
        other => vec![other.to_string()],
    }
}

fn names(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn callables(value: Option<&Value>) -> Vec<CallableRef> {
    names(value)
        .into_iter()
        .filter(|n| !n.trim().is_empty())
        .map(CallableRef)
        .collect()
}

fn choices(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map.keys().cloned().map(Value::String).collect(),
        _ => Vec::new(),
    }
}

fn message(value: &Value) -> Message {
    match value {
        Value::Object(map) => Message {
            title: text(map.get("title")).unwrap_or_default(),
            description: text(map.get("description")).unwrap_or_default(),
        },
        other => Message {
            title: other.as_str().unwrap_or_default().to_string(),
            description: String::new(),
        },
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}
