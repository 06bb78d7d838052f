//! Human-readable output.

use std::path::Path;

use colored::Colorize;
use serde_json::{Map, Value, json};
use tmplsync::{ChangeOutcome, Checked, Template, document};

pub fn print_diagnostics(path: &Path, checked: &Checked<Template>) {
    for error in &checked.errors {
        println!("{} {error}", "error:".red().bold());
    }
    for warning in &checked.warnings {
        println!("{} {warning}", "warning:".yellow().bold());
    }

    let summary = format!(
        "{}: {} settings, {} groups, {} error(s), {} warning(s)",
        path.display(),
        checked.value.settings().len(),
        checked.value.groups().len(),
        checked.errors.len(),
        checked.warnings.len()
    );
    if checked.is_ok() {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.red());
    }
}

pub fn print_outcome(change: &str, outcome: &ChangeOutcome) {
    println!("{}", change.purple().bold());
    for update in &outcome.updates {
        let mut line = format!("  {}", update.path.to_string().bold());
        if let Some(value) = &update.value {
            line += &format!(" = {}", value.to_string().green());
        }
        match update.enabled {
            Some(true) => line += &format!(" {}", "enabled".cyan()),
            Some(false) => line += &format!(" {}", "disabled".yellow()),
            None => {}
        }
        println!("{line}");
    }
    if outcome.requires_reload {
        println!("  {}", "requires reload".yellow().bold());
    }
}

/// Settings plus groups, with group members named by path.
pub fn dump_value(template: &Template) -> anyhow::Result<Value> {
    let settings = template.settings();
    let mut groups = Map::new();
    for group in template.groups().iter() {
        let members: Vec<String> = template
            .members(group)
            .map(|s| s.path.to_string())
            .collect();
        let mut value = serde_json::to_value(group)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("members".to_string(), json!(members));
            object.insert(
                "parent".to_string(),
                json!(group.parent.map(|id| settings.get(id).path.to_string())),
            );
        }
        groups.insert(group.id.to_string(), value);
    }
    Ok(json!({
        "settings": serde_json::to_value(settings)?,
        "groups": groups,
    }))
}

/// Render in the named format. TOML has no null, so nulls are dropped there.
pub fn render(value: Value, ext: &str) -> anyhow::Result<String> {
    let value = match ext {
        "toml" => strip_nulls(value),
        _ => value,
    };
    document::render(&value, ext)
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(strip_nulls)
                .collect(),
        ),
        other => other,
    }
}
