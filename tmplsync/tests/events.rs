use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tmplsync::{
    ChangeError, Dispatcher, Engine, EngineConfig, Template, Update, ValidationError,
};

fn nested_template() -> Template {
    let checked = Template::from_value(&json!({
        "Network": {
            "enabled": {"default": false, "ui_group": "net", "ui_group_parent": ["sync_children", "nested_children"]},
            "proxy": {"default": false, "ui_group": "proxy, net", "ui_group_parent": "sync_children"},
            "proxyAuth": {"default": false, "ui_group": "proxy"}
        }
    }));
    assert!(checked.is_ok(), "{:?}", checked.errors);
    checked.value
}

#[test]
fn propagation_is_one_level_per_event() {
    let mut engine = Engine::new(nested_template(), Dispatcher::new(), EngineConfig::default());
    let outcome = engine.on_value_changed("Network.enabled", json!(true)).unwrap();
    assert_eq!(
        outcome.updates,
        vec![
            Update::value("Network.enabled", json!(true)),
            Update::value("Network.proxy", json!(true)),
        ]
    );
    assert_eq!(engine.value("Network.proxyAuth"), Some(&json!(false)));

    // The caller re-submits the derived change to go one level deeper.
    engine.on_value_changed("Network.proxy", json!(true)).unwrap();
    assert_eq!(engine.value("Network.proxyAuth"), Some(&json!(true)));
}

#[test]
fn cascading_follows_group_parents() {
    let mut engine = Engine::new(nested_template(), Dispatcher::new(), EngineConfig::default());
    let outcome = engine
        .on_value_changed_cascading("Network.enabled", json!(true))
        .unwrap();
    assert_eq!(
        outcome.updates,
        vec![
            Update::value("Network.enabled", json!(true)),
            Update::value("Network.proxy", json!(true)),
            Update::value("Network.proxyAuth", json!(true)),
        ]
    );
    assert_eq!(
        engine.template().group("proxy").unwrap().nested_under,
        Some("net".into())
    );
}

#[test]
fn cascading_depth_is_bounded() {
    let config = EngineConfig {
        max_cascade_depth: 0,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(nested_template(), Dispatcher::new(), config);
    let outcome = engine
        .on_value_changed_cascading("Network.enabled", json!(true))
        .unwrap();
    assert_eq!(outcome.updates.len(), 2);
    assert_eq!(engine.value("Network.proxyAuth"), Some(&json!(false)));
}

#[test]
fn cascading_stops_at_cycles() {
    let checked = Template::from_value(&json!({
        "G": {
            "a": {"default": false, "ui_group": "ga, gb", "ui_group_parent": "sync_children"},
            "b": {"default": false, "ui_group": "gb, ga", "ui_group_parent": "sync_children"}
        }
    }));
    assert!(checked.is_ok(), "{:?}", checked.errors);
    let mut engine = Engine::new(checked.value, Dispatcher::new(), EngineConfig::default());
    let outcome = engine.on_value_changed_cascading("G.a", json!(true)).unwrap();
    assert_eq!(
        outcome.updates,
        vec![
            Update::value("G.a", json!(true)),
            Update::value("G.b", json!(true)),
        ]
    );
}

fn recording_dispatcher(log: &Arc<Mutex<Vec<String>>>, fail: &'static str) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    for name in ["apply_parent", "apply_child"] {
        let log = Arc::clone(log);
        dispatcher.register_action(name, move |v: &Value| {
            if name == fail {
                anyhow::bail!("{name} refused {v}");
            }
            log.lock().unwrap().push(format!("{name}={v}"));
            Ok(())
        });
    }
    dispatcher
}

fn action_template() -> Template {
    let checked = Template::from_value(&json!({
        "G": {
            "p": {"default": false, "actions": "apply_parent", "ui_group": "g", "ui_group_parent": "sync_children"},
            "c": {"default": false, "actions": "apply_child", "ui_group": "g"}
        }
    }));
    assert!(checked.is_ok(), "{:?}", checked.errors);
    checked.value
}

#[test]
fn actions_run_for_every_changed_setting() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = Engine::new(
        action_template(),
        recording_dispatcher(&log, ""),
        EngineConfig::default(),
    );
    engine.on_value_changed("G.p", json!(true)).unwrap();
    assert_eq!(*log.lock().unwrap(), ["apply_parent=true", "apply_child=true"]);
}

#[test]
fn child_actions_can_be_skipped() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let config = EngineConfig {
        run_child_actions: false,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(action_template(), recording_dispatcher(&log, ""), config);
    engine.on_value_changed("G.p", json!(true)).unwrap();
    assert_eq!(*log.lock().unwrap(), ["apply_parent=true"]);
}

#[test]
fn failing_action_rejects_the_whole_event() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = Engine::new(
        action_template(),
        recording_dispatcher(&log, "apply_child"),
        EngineConfig::default(),
    );
    let err = engine.on_value_changed("G.p", json!(true)).unwrap_err();
    match err {
        ChangeError::Rejected(ValidationError::ActionFailed { action, reason, .. }) => {
            assert_eq!(action, "apply_child");
            assert_eq!(reason, "apply_child refused true");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(engine.value("G.p"), Some(&json!(false)));
    assert_eq!(engine.value("G.c"), Some(&json!(false)));
}

#[test]
fn disable_button_propagates() {
    let checked = Template::from_value(&json!({
        "Process": {
            "maxThreads": {"default": 4, "min": 1, "ui_disable_self": 0, "ui_group": "t", "ui_group_parent": "disable_children"},
            "pinning": {"default": true, "ui_group": "t"}
        }
    }));
    assert!(checked.is_ok(), "{:?}", checked.errors);
    let mut engine = Engine::new(checked.value, Dispatcher::new(), EngineConfig::default());
    assert_eq!(engine.is_enabled("Process.pinning"), Some(true));

    let outcome = engine.set_disabled("Process.maxThreads", true).unwrap();
    assert_eq!(
        outcome.updates,
        vec![
            Update::value("Process.maxThreads", json!(0)).with_enabled(false),
            Update::enabled("Process.pinning", false),
        ]
    );

    let outcome = engine.set_disabled("Process.maxThreads", false).unwrap();
    assert_eq!(
        outcome.final_state("Process.maxThreads"),
        Some(Update::value("Process.maxThreads", json!(4)).with_enabled(true))
    );
    assert_eq!(engine.is_enabled("Process.pinning"), Some(true));
}
