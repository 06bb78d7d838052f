//! Group resolution.
//!
//! Builds one [`Group`] per distinct group id out of the `ui_group` /
//! `ui_group_parent` declarations of a [`SettingRegistry`]:
//!
//! - membership follows parse order;
//! - only the first id of a setting's `ui_group` can make it a parent, and the
//!   first declaring member wins;
//! - layout, disable and sync options come from the parent alone;
//! - a parent listing further group ids is nested under the first of those
//!   groups whose parent nests its children.
//!
//! Resolution is deterministic: the same registry always yields the same groups.

use crate::{
    data::{ChildSyncMode, Group, GroupId, GroupRegistry, LayoutMode, SettingRegistry, ValueType},
    error::{Checked, ConstructionError, PropagationWarning},
    schema::{GroupParentVariant, UiFlag},
};

/// Resolve the groups of `settings`.
pub fn resolve(settings: &SettingRegistry) -> Checked<GroupRegistry> {
    let mut out = Checked::new(GroupRegistry::default());
    collect_members(settings, &mut out);
    classify(settings, &mut out);
    resolve_nesting(settings, &mut out.value);
    info!("resolved {} groups", out.value.len());
    out
}

/// Record every group a parent leads on the parent itself.
pub(crate) fn assign_parents(groups: &GroupRegistry, settings: &mut SettingRegistry) {
    for group in groups.iter() {
        if let Some(parent) = group.parent {
            settings
                .get_mut(parent)
                .is_group_parent_for
                .insert(group.id.clone());
        }
    }
}

fn collect_members(settings: &SettingRegistry, out: &mut Checked<GroupRegistry>) {
    for (id, setting) in settings.iter() {
        if setting.has_flag(UiFlag::Exclude) {
            if !setting.group_ids.is_empty() {
                out.warnings.push(PropagationWarning::ExcludedFromGroups {
                    path: setting.path.clone(),
                });
            }
            continue;
        }

        for (position, gid) in setting.group_ids.iter().enumerate() {
            let group = out.value.entry(gid);
            group.members.push(id);
            if position > 0 || setting.group_parent.is_empty() {
                continue;
            }
            match group.parent {
                None => {
                    debug!("group `{gid}`: parent is {}", setting.path);
                    group.parent = Some(id);
                }
                Some(parent) => {
                    let parent = &settings.get(parent).path;
                    warn!(
                        "group `{gid}`: {} also declares `ui_group_parent`, keeping {parent}",
                        setting.path
                    );
                    if setting.group_parent.iter().any(|v| v.affects_propagation()) {
                        out.warnings.push(PropagationWarning::ShadowedParent {
                            group: gid.clone(),
                            path: setting.path.clone(),
                            parent: parent.clone(),
                        });
                    }
                }
            }
        }
    }
}

fn classify(settings: &SettingRegistry, out: &mut Checked<GroupRegistry>) {
    let Checked {
        value: groups,
        errors,
        warnings,
    } = out;

    for group in groups.iter_mut() {
        let Some(pid) = group.parent else {
            continue;
        };
        let parent = settings.get(pid);
        let has = |v: GroupParentVariant| parent.group_parent.contains(&v);

        group.layout = match (
            has(GroupParentVariant::Clustered),
            has(GroupParentVariant::NestedChildren),
        ) {
            (true, true) => {
                errors.push(ConstructionError::ConflictingLayout {
                    group: group.id.clone(),
                    parent: parent.path.clone(),
                });
                LayoutMode::None
            }
            (true, false) => LayoutMode::Clustered,
            (false, true) => LayoutMode::Nested,
            (false, false) => LayoutMode::None,
        };

        group.disable_children = has(GroupParentVariant::DisableChildren);
        if group.disable_children && group.layout == LayoutMode::Clustered {
            warn!(
                "group `{}`: `disable_children` is ignored for clustered groups",
                group.id
            );
            group.disable_children = false;
        }

        let modes: Vec<GroupParentVariant> = parent
            .group_parent
            .iter()
            .copied()
            .filter(GroupParentVariant::is_sync_mode)
            .collect();
        group.child_sync = match modes.as_slice() {
            [] => ChildSyncMode::None,
            [mode] => sync_mode(*mode),
            many => {
                errors.push(ConstructionError::ConflictingSyncModes {
                    group: group.id.clone(),
                    parent: parent.path.clone(),
                    modes: many.iter().map(|m| m.as_str()).collect(),
                });
                ChildSyncMode::None
            }
        };

        if group.child_sync != ChildSyncMode::None {
            if parent.value_type != ValueType::Bool {
                errors.push(ConstructionError::SyncOnNonBoolean {
                    group: group.id.clone(),
                    path: parent.path.clone(),
                    value_type: parent.value_type,
                });
                group.child_sync = ChildSyncMode::None;
            } else {
                for child in group.children() {
                    let child = settings.get(child);
                    if child.value_type != ValueType::Bool {
                        errors.push(ConstructionError::SyncOnNonBoolean {
                            group: group.id.clone(),
                            path: child.path.clone(),
                            value_type: child.value_type,
                        });
                    }
                }
            }
        }

        group.undirected_sync = has(GroupParentVariant::UndirectedSync);
        if group.undirected_sync && group.child_sync == ChildSyncMode::None {
            warnings.push(PropagationWarning::UndirectedWithoutSync {
                group: group.id.clone(),
            });
        }

        if group.children().next().is_none() {
            warnings.push(PropagationWarning::ChildlessParent {
                group: group.id.clone(),
                parent: parent.path.clone(),
            });
        }
    }
}

fn resolve_nesting(settings: &SettingRegistry, groups: &mut GroupRegistry) {
    let nesting: Vec<(GroupId, GroupId)> = groups
        .iter()
        .filter_map(|group| {
            let parent = settings.get(group.parent?);
            let mut hosts = parent.group_ids.iter().skip(1).filter(|gid| {
                groups
                    .get(gid)
                    .is_some_and(|host| host.parent.is_some() && host.layout.nests_children())
            });
            let host = hosts.next()?.clone();
            for other in hosts {
                warn!(
                    "group `{}`: also nested by `{other}`, keeping `{host}`",
                    group.id
                );
            }
            Some((group.id.clone(), host))
        })
        .collect();

    for (id, host) in nesting {
        if let Some(group) = groups.get_mut(&id) {
            group.nested_under = Some(host);
        }
    }
}

fn sync_mode(variant: GroupParentVariant) -> ChildSyncMode {
    match variant {
        GroupParentVariant::SyncChildren => ChildSyncMode::Sync,
        GroupParentVariant::DesyncChildren => ChildSyncMode::Desync,
        GroupParentVariant::DesyncTrueChildren => ChildSyncMode::DesyncTrue,
        GroupParentVariant::DesyncFalseChildren => ChildSyncMode::DesyncFalse,
        _ => ChildSyncMode::None,
    }
}
