use std::io::Write;

use serde_json::json;
use tmplsync::{
    ConstructionError, Dispatcher, Engine, EngineConfig, LayoutMode, SettingPath, Template,
};

const TOML_TEMPLATE: &str = r#"
[General.autosave]
default = true
ui_group = "save"
ui_group_parent = ["nested_children", "disable_children"]
ui_info = { title = "Autosave", description = "Save lists periodically" }

[General.interval]
default = 10
min = 1
max = 120
ui_type = "spinbox"
ui_unit = "min"
ui_group = "save"

[General.folder]
default = ""
ui_type = "file_selection"
ui_show_dir_only = true
ui_group = "save"
"#;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn load_toml_template() {
    let file = write_temp(".toml", TOML_TEMPLATE);
    let checked = Template::from_path(file.path()).unwrap();
    assert!(checked.is_ok(), "{:?}", checked.errors);
    let template = checked.value;

    let keys: Vec<&str> = template.settings().iter().map(|(_, s)| s.key()).collect();
    assert_eq!(keys, ["autosave", "interval", "folder"]);

    let group = template.group("save").unwrap();
    assert_eq!(group.layout, LayoutMode::Nested);
    assert!(group.disable_children);
    assert_eq!(
        group.parent,
        template.settings().find(&SettingPath::parse("General.autosave"))
    );
    assert_eq!(
        template.setting("General.folder").unwrap().value_type,
        tmplsync::ValueType::Path
    );

    let engine = Engine::new(template, Dispatcher::new(), EngineConfig::default());
    assert_eq!(engine.is_enabled("General.interval"), Some(false));
}

#[test]
fn json_and_toml_resolve_identically() {
    let toml_file = write_temp(".toml", TOML_TEMPLATE);
    let from_toml = Template::from_path(toml_file.path()).unwrap();

    let raw = tmplsync::document::parse(TOML_TEMPLATE, "toml").unwrap();
    let json_file = write_temp(".json", &serde_json::to_string_pretty(&raw).unwrap());
    let from_json = Template::from_path(json_file.path()).unwrap();

    assert_eq!(from_toml, from_json);
}

#[test]
fn resolution_is_idempotent() {
    let raw = json!({
        "Appearance": {
            "theme": {"default": "System", "values": ["System", "Dark"], "ui_group": "look", "ui_group_parent": "clustered"},
            "accent": {"default": "#2abdc7", "ui_type": "color_picker", "ui_group": "look"}
        },
        "Broken": {
            "range": {"default": 7, "min": 10, "max": 5}
        }
    });
    let first = Template::from_value(&raw);
    let second = Template::from_value(&raw);
    assert_eq!(first, second);
    assert_eq!(
        first.errors,
        vec![ConstructionError::InvertedBounds {
            path: SettingPath::parse("Broken.range"),
            min: 10.0,
            max: 5.0
        }]
    );
}

#[test]
fn load_errors() {
    assert!(Template::from_path("/definitely/not/here.toml").is_err());

    let file = write_temp(".yaml", "General: {}");
    assert!(Template::from_path(file.path()).is_err());

    let file = write_temp(".json", "{ not json");
    assert!(Template::from_path(file.path()).is_err());
}

#[test]
fn engine_config_from_toml() {
    let file = write_temp(".toml", "disable_policy = \"Truthy\"\nmax_cascade_depth = 3\n");
    let config = EngineConfig::from_path(file.path()).unwrap();
    assert_eq!(config.max_cascade_depth, 3);
    assert_eq!(config.disable_policy, tmplsync::DisablePolicy::Truthy);
}

#[test]
fn repeated_json_setting_keeps_the_first_definition() {
    let content = r#"{"G": {"a": {"default": 1}, "a": {"default": 2}}}"#;
    let checked = Template::from_content(content, "json").unwrap();
    assert_eq!(
        checked.errors,
        vec![ConstructionError::DuplicatePath {
            path: SettingPath::parse("G.a")
        }]
    );
    assert_eq!(
        checked.value.setting("G.a").map(|s| &s.default),
        Some(&json!(1))
    );

    let file = write_temp(".json", content);
    let from_file = Template::from_path(file.path()).unwrap();
    assert_eq!(from_file, checked);
}
