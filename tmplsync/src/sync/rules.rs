//! Pure propagation rules.

use serde_json::Value;

use crate::{
    config::DisablePolicy,
    data::{ChildSyncMode, Group, Setting, value::is_truthy},
};

/// Value a boolean child takes when its parent becomes `parent`.
///
/// `None` leaves the child's prior value in place.
pub fn child_target(mode: ChildSyncMode, parent: bool) -> Option<bool> {
    match mode {
        ChildSyncMode::None => None,
        ChildSyncMode::Sync => Some(parent),
        ChildSyncMode::Desync => Some(!parent),
        ChildSyncMode::DesyncTrue => parent.then_some(true),
        ChildSyncMode::DesyncFalse => parent.then_some(false),
    }
}

/// Value the parent takes when a child of an `undirected_sync` group becomes `child`.
///
/// The child-to-parent direction applies the same rule as [`child_target`].
pub fn parent_target(mode: ChildSyncMode, child: bool) -> Option<bool> {
    child_target(mode, child)
}

/// Whether `parent` holding `value` disables the children of `group`.
///
/// A declared `ui_disable_other` decides alone, then `ui_disable_self`; only a
/// parent with neither falls back to `policy`.
pub fn disables_children(
    parent: &Setting,
    group: &Group,
    value: &Value,
    policy: DisablePolicy,
) -> bool {
    if let Some(other) = &parent.disable_other_value {
        return value == other;
    }
    if let Some(own) = &parent.disable_self_value {
        return value == own;
    }
    let truthy = is_truthy(value);
    match policy {
        DisablePolicy::Truthy => truthy,
        DisablePolicy::Falsy => !truthy,
        DisablePolicy::FollowSyncMode => match group.child_sync {
            ChildSyncMode::Sync | ChildSyncMode::DesyncTrue => !truthy,
            ChildSyncMode::Desync | ChildSyncMode::DesyncFalse | ChildSyncMode::None => truthy,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::GroupId, template::Template};
    use serde_json::json;

    #[test]
    fn test_child_targets() {
        assert_eq!(child_target(ChildSyncMode::Sync, true), Some(true));
        assert_eq!(child_target(ChildSyncMode::Desync, true), Some(false));
        assert_eq!(child_target(ChildSyncMode::DesyncTrue, true), Some(true));
        assert_eq!(child_target(ChildSyncMode::DesyncTrue, false), None);
        assert_eq!(child_target(ChildSyncMode::DesyncFalse, true), Some(false));
        assert_eq!(child_target(ChildSyncMode::DesyncFalse, false), None);
        assert_eq!(child_target(ChildSyncMode::None, true), None);
    }

    #[test]
    fn test_parent_targets() {
        assert_eq!(parent_target(ChildSyncMode::Sync, false), Some(false));
        assert_eq!(parent_target(ChildSyncMode::Desync, false), Some(true));
        assert_eq!(parent_target(ChildSyncMode::DesyncTrue, true), Some(true));
        assert_eq!(parent_target(ChildSyncMode::DesyncTrue, false), None);
        assert_eq!(parent_target(ChildSyncMode::DesyncFalse, true), Some(false));
        assert_eq!(parent_target(ChildSyncMode::DesyncFalse, false), None);
    }

    fn parent_and_group(variants: Value, extra: Value) -> (Setting, Group) {
        let mut parent = json!({"default": true, "ui_group": "g", "ui_group_parent": variants});
        if let (Some(p), Some(e)) = (parent.as_object_mut(), extra.as_object()) {
            p.extend(e.clone());
        }
        let checked = Template::from_value(&json!({
            "G": {"p": parent, "c": {"default": false, "ui_group": "g"}}
        }));
        assert!(checked.is_ok(), "{:?}", checked.errors);
        let template = checked.value;
        let group = template.groups().get(&GroupId::from("g")).unwrap().clone();
        let parent = template.setting("G.p").unwrap().clone();
        (parent, group)
    }

    #[test]
    fn test_policy_follows_sync_mode() {
        let (p, g) = parent_and_group(json!(["disable_children", "sync_children"]), json!({}));
        let policy = DisablePolicy::FollowSyncMode;
        assert!(disables_children(&p, &g, &json!(false), policy));
        assert!(!disables_children(&p, &g, &json!(true), policy));

        let (p, g) = parent_and_group(json!(["disable_children", "desync_false_children"]), json!({}));
        assert!(disables_children(&p, &g, &json!(true), policy));
        assert!(!disables_children(&p, &g, &json!(false), policy));

        let (p, g) = parent_and_group(json!("disable_children"), json!({}));
        assert!(disables_children(&p, &g, &json!(true), policy));
        assert!(disables_children(&p, &g, &json!(false), DisablePolicy::Falsy));
        assert!(!disables_children(&p, &g, &json!(false), DisablePolicy::Truthy));
    }

    #[test]
    fn test_sentinels_take_precedence() {
        let (p, g) = parent_and_group(
            json!(["disable_children", "sync_children"]),
            json!({"ui_disable_other": true}),
        );
        assert!(disables_children(&p, &g, &json!(true), DisablePolicy::FollowSyncMode));
        assert!(!disables_children(&p, &g, &json!(false), DisablePolicy::FollowSyncMode));
    }
}
