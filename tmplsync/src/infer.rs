//! Value type inference.
//!
//! Rules, in order:
//!
//! 1. an explicit `type` wins unconditionally;
//! 2. the shape of `default` (bool, int, float, list);
//! 3. `values` present: enum;
//! 4. `ui_file_filter`, `ui_show_dir_only` or a file widget: path;
//! 5. a color widget: color.
//!
//! A string default is only a weak hint: rules 3-5 refine it, and when none of
//! them applies it resolves to [`ValueType::String`].

use serde_json::Value;

use crate::{
    data::ValueType,
    schema::{OptionKey, RawOptions, WidgetKind},
};

/// Every rule failed; `tried` names them in the order they ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceFailure {
    pub tried: Vec<&'static str>,
}

/// Infer the value type of a setting from its options.
pub fn infer(options: &RawOptions<'_>) -> Result<ValueType, InferenceFailure> {
    let mut tried = Vec::new();

    tried.push("explicit type");
    if let Some(ty) = options
        .get(OptionKey::Type)
        .and_then(Value::as_str)
        .and_then(ValueType::from_name)
    {
        return Ok(ty);
    }

    tried.push("default shape");
    let default = options.get(OptionKey::Default);
    match default {
        Some(Value::Bool(_)) => return Ok(ValueType::Bool),
        Some(Value::Number(n)) if n.is_f64() => return Ok(ValueType::Float),
        Some(Value::Number(_)) => return Ok(ValueType::Int),
        Some(Value::Array(_)) => return Ok(ValueType::List),
        _ => {}
    }
    let text_default = default.is_some_and(Value::is_string);

    let widget = options
        .get(OptionKey::UiType)
        .and_then(Value::as_str)
        .and_then(WidgetKind::parse);

    tried.push("allowed values");
    if options.contains(OptionKey::Values) || widget == Some(WidgetKind::ComboBox) {
        return Ok(ValueType::Enum);
    }

    tried.push("file filter");
    if options.contains(OptionKey::UiFileFilter)
        || options.contains(OptionKey::UiShowDirOnly)
        || widget == Some(WidgetKind::FileSelection)
    {
        return Ok(ValueType::Path);
    }

    tried.push("color widget");
    if widget == Some(WidgetKind::ColorPicker) {
        return Ok(ValueType::Color);
    }

    if text_default {
        return Ok(ValueType::String);
    }
    Err(InferenceFailure { tried })
}
