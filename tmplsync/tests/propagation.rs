use serde_json::{Value, json};
use tmplsync::{
    ChangeError, ConstructionError, Dispatcher, DisablePolicy, Engine, EngineConfig, Template,
    Update, ValidationError,
};

fn template(raw: Value) -> Template {
    let _ = env_logger::builder().is_test(true).try_init();
    let checked = Template::from_value(&raw);
    assert!(checked.is_ok(), "{:?}", checked.errors);
    checked.value
}

fn engine(raw: Value) -> Engine {
    Engine::new(template(raw), Dispatcher::new(), EngineConfig::default())
}

#[test]
fn desync_false_with_disable_children() {
    let mut engine = engine(json!({
        "Demo": {
            "A": {"default": false, "ui_group": "g1", "ui_group_parent": ["desync_false_children", "disable_children"]},
            "B": {"default": false, "ui_group": "g1"},
            "C": {"default": true, "ui_group": "g1"}
        }
    }));
    assert_eq!(engine.is_enabled("Demo.B"), Some(true));

    let outcome = engine.on_value_changed("Demo.A", json!(true)).unwrap();
    assert_eq!(
        outcome.updates,
        vec![
            Update::value("Demo.A", json!(true)),
            Update::enabled("Demo.B", false),
            Update::value("Demo.C", json!(false)).with_enabled(false),
        ]
    );
    assert_eq!(engine.value("Demo.C"), Some(&json!(false)));
    assert_eq!(engine.is_enabled("Demo.C"), Some(false));

    // Parent back to false: children re-enabled, values left alone.
    let outcome = engine.on_value_changed("Demo.A", json!(false)).unwrap();
    assert_eq!(
        outcome.updates,
        vec![
            Update::value("Demo.A", json!(false)),
            Update::enabled("Demo.B", true),
            Update::enabled("Demo.C", true),
        ]
    );
    assert_eq!(engine.value("Demo.C"), Some(&json!(false)));
}

#[test]
fn sync_propagates_to_every_boolean_child() {
    let mut engine = engine(json!({
        "Save": {
            "autosave": {"default": false, "ui_group": "save", "ui_group_parent": "sync_children"},
            "backup": {"default": false, "ui_group": "save"},
            "history": {"default": false, "ui_group": "save"}
        }
    }));
    let outcome = engine.on_value_changed("Save.autosave", json!(true)).unwrap();
    assert_eq!(
        outcome.updates,
        vec![
            Update::value("Save.autosave", json!(true)),
            Update::value("Save.backup", json!(true)),
            Update::value("Save.history", json!(true)),
        ]
    );
}

#[test]
fn desync_children_negate_the_parent() {
    let mut engine = engine(json!({
        "G": {
            "p": {"default": false, "ui_group": "g", "ui_group_parent": "desync_children"},
            "c": {"default": true, "ui_group": "g"}
        }
    }));
    let outcome = engine.on_value_changed("G.p", json!(true)).unwrap();
    assert_eq!(outcome.final_state("G.c").unwrap().value, Some(json!(false)));
    // Value already matches: no tuple.
    let outcome = engine.on_value_changed("G.p", json!(true)).unwrap();
    assert_eq!(outcome.updates.len(), 1);
}

#[test]
fn desync_true_keeps_child_when_parent_turns_false() {
    let mut engine = engine(json!({
        "G": {
            "p": {"default": true, "ui_group": "g", "ui_group_parent": "desync_true_children"},
            "c": {"default": false, "ui_group": "g"}
        }
    }));
    engine.on_value_changed("G.c", json!(true)).unwrap();
    let outcome = engine.on_value_changed("G.p", json!(false)).unwrap();
    assert_eq!(outcome.updates, vec![Update::value("G.p", json!(false))]);
    assert_eq!(engine.value("G.c"), Some(&json!(true)));

    engine.on_value_changed("G.c", json!(false)).unwrap();
    let outcome = engine.on_value_changed("G.p", json!(true)).unwrap();
    assert_eq!(outcome.final_state("G.c").unwrap().value, Some(json!(true)));
}

#[test]
fn disable_children_without_sentinel_keeps_the_value() {
    let mut engine = engine(json!({
        "Process": {
            "limit": {"default": false, "ui_group": "limits", "ui_group_parent": "disable_children"},
            "threads": {"default": 5, "min": 1, "max": 64, "ui_group": "limits"}
        }
    }));
    let outcome = engine.on_value_changed("Process.limit", json!(true)).unwrap();
    assert_eq!(
        outcome.updates,
        vec![
            Update::value("Process.limit", json!(true)),
            Update::enabled("Process.threads", false),
        ]
    );
    assert_eq!(engine.value("Process.threads"), Some(&json!(5)));
    assert_eq!(engine.is_enabled("Process.threads"), Some(false));
}

#[test]
fn disable_policy_is_configurable() {
    let template = template(json!({
        "G": {
            "p": {"default": false, "ui_group": "g", "ui_group_parent": "disable_children"},
            "c": {"default": 1, "ui_group": "g"}
        }
    }));
    let config = EngineConfig {
        disable_policy: DisablePolicy::Falsy,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(template, Dispatcher::new(), config);
    assert_eq!(engine.is_enabled("G.c"), Some(false));
    engine.on_value_changed("G.p", json!(true)).unwrap();
    assert_eq!(engine.is_enabled("G.c"), Some(true));
}

#[test]
fn parent_disable_other_sentinel() {
    let mut engine = engine(json!({
        "Process": {
            "maxThreads": {"default": 4, "min": 1, "ui_disable_other": 0, "ui_group": "t", "ui_group_parent": "disable_children"},
            "affinity": {"default": "", "ui_group": "t"}
        }
    }));
    assert_eq!(engine.is_enabled("Process.affinity"), Some(true));
    let outcome = engine.on_value_changed("Process.maxThreads", json!(0)).unwrap();
    assert_eq!(outcome.final_state("Process.affinity").unwrap().enabled, Some(false));
    engine.on_value_changed("Process.maxThreads", json!(8)).unwrap();
    assert_eq!(engine.is_enabled("Process.affinity"), Some(true));
}

#[test]
fn undirected_sync_updates_the_parent_once() {
    let mut engine = engine(json!({
        "G": {
            "all": {"default": false, "ui_group": "g", "ui_group_parent": ["sync_children", "undirected_sync"]},
            "one": {"default": false, "ui_group": "g"},
            "two": {"default": false, "ui_group": "g"}
        }
    }));
    let outcome = engine.on_value_changed("G.one", json!(true)).unwrap();
    assert_eq!(
        outcome.updates,
        vec![
            Update::value("G.one", json!(true)),
            Update::value("G.all", json!(true)),
        ]
    );
    // The parent's own group is not re-propagated.
    assert_eq!(engine.value("G.two"), Some(&json!(false)));
}

#[test]
fn undirected_desync_false() {
    let mut engine = engine(json!({
        "G": {
            "auto": {"default": true, "ui_group": "g", "ui_group_parent": ["desync_false_children", "undirected_sync"]},
            "manual": {"default": false, "ui_group": "g"}
        }
    }));
    let outcome = engine.on_value_changed("G.manual", json!(true)).unwrap();
    assert_eq!(outcome.final_state("G.auto").unwrap().value, Some(json!(false)));
    let outcome = engine.on_value_changed("G.manual", json!(false)).unwrap();
    assert_eq!(outcome.updates.len(), 1);
}

#[test]
fn undirected_desync_true() {
    let mut engine = engine(json!({
        "G": {
            "any": {"default": false, "ui_group": "g", "ui_group_parent": ["desync_true_children", "undirected_sync"]},
            "c": {"default": false, "ui_group": "g"}
        }
    }));
    let outcome = engine.on_value_changed("G.c", json!(true)).unwrap();
    assert_eq!(
        outcome.updates,
        vec![
            Update::value("G.c", json!(true)),
            Update::value("G.any", json!(true)),
        ]
    );
    // A child turning false leaves the parent alone.
    let outcome = engine.on_value_changed("G.c", json!(false)).unwrap();
    assert_eq!(outcome.updates, vec![Update::value("G.c", json!(false))]);
    assert_eq!(engine.value("G.any"), Some(&json!(true)));
}

#[test]
fn sync_skips_non_boolean_children() {
    let checked = Template::from_value(&json!({
        "G": {
            "p": {"default": false, "ui_group": "g", "ui_group_parent": ["sync_children", "disable_children"]},
            "label": {"default": "text", "ui_group": "g"},
            "flag": {"default": false, "ui_group": "g"}
        }
    }));
    assert!(matches!(
        checked.errors.as_slice(),
        [ConstructionError::SyncOnNonBoolean { .. }]
    ));
    let mut engine = Engine::new(checked.value, Dispatcher::new(), EngineConfig::default());

    let outcome = engine.on_value_changed("G.p", json!(true)).unwrap();
    assert_eq!(
        outcome.updates,
        vec![
            Update::value("G.p", json!(true)),
            Update::enabled("G.label", true),
            Update::value("G.flag", json!(true)).with_enabled(true),
        ]
    );
    assert_eq!(engine.value("G.label"), Some(&json!("text")));
}

#[test]
fn clustered_groups_only_lay_out() {
    let mut engine = engine(json!({
        "G": {
            "p": {"default": false, "ui_group": "g", "ui_group_parent": ["clustered", "disable_children"]},
            "c": {"default": false, "ui_group": "g"}
        }
    }));
    let outcome = engine.on_value_changed("G.p", json!(true)).unwrap();
    assert_eq!(outcome.updates.len(), 1);
    assert_eq!(engine.is_enabled("G.c"), Some(true));
}

#[test]
fn validators_reject_without_mutation() {
    let template = template(json!({
        "General": {
            "name": {"default": "main", "validators": "no_spaces"},
            "other": {"default": "x", "validators": "not_registered"}
        }
    }));
    let mut dispatcher = Dispatcher::new();
    dispatcher.register_validator("no_spaces", |v: &Value| match v.as_str() {
        Some(s) if s.contains(' ') => Err("spaces are not allowed".to_string()),
        _ => Ok(()),
    });
    let mut engine = Engine::new(template, dispatcher, EngineConfig::default());

    let err = engine
        .on_value_changed("General.name", json!("two words"))
        .unwrap_err();
    assert!(matches!(
        err,
        ChangeError::Rejected(ValidationError::Rejected { .. })
    ));
    assert_eq!(engine.value("General.name"), Some(&json!("main")));
    engine.on_value_changed("General.name", json!("two_words")).unwrap();

    assert!(matches!(
        engine.on_value_changed("General.other", json!("y")),
        Err(ChangeError::Rejected(ValidationError::UnknownCallable { .. }))
    ));
}

#[test]
fn built_in_checks_run_first() {
    let mut engine = engine(json!({
        "Appearance": {
            "theme": {"default": "System", "values": ["System", "Light", "Dark"]},
            "accent": {"default": "#2abdc7", "ui_type": "color_picker"}
        }
    }));
    assert!(matches!(
        engine.on_value_changed("Appearance.theme", json!("Blue")),
        Err(ChangeError::Rejected(ValidationError::NotAllowed { .. }))
    ));
    assert!(matches!(
        engine.on_value_changed("Appearance.accent", json!("teal")),
        Err(ChangeError::Rejected(ValidationError::TypeMismatch { .. }))
    ));
    engine.on_value_changed("Appearance.accent", json!("#fff")).unwrap();
}

#[test]
fn requires_reload_is_reported() {
    let mut engine = engine(json!({
        "General": {
            "language": {"default": "en", "values": ["en", "de"], "ui_flags": "requires_reload"},
            "verbose": {"default": false}
        }
    }));
    assert!(engine.on_value_changed("General.language", json!("de")).unwrap().requires_reload);
    assert!(!engine.on_value_changed("General.language", json!("de")).unwrap().requires_reload);
    assert!(!engine.on_value_changed("General.verbose", json!(true)).unwrap().requires_reload);
}
