use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    config::EngineConfig,
    data::{GroupId, Setting, SettingId, SettingPath, ValueType},
    dispatch::Dispatcher,
    error::ChangeError,
    schema::UiFlag,
    sync::{ChangeOutcome, ConfigEntry, Update, rules},
    template::Template,
};

/// Mutable runtime state of one setting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingState {
    pub value: Value,
    pub enabled: bool,
    /// Value replaced by the disable sentinel, restored on re-enable.
    #[serde(skip)]
    backup: Option<Value>,
}

impl SettingState {
    fn new(value: Value) -> Self {
        Self {
            value,
            enabled: true,
            backup: None,
        }
    }

    pub fn backup(&self) -> Option<&Value> {
        self.backup.as_ref()
    }
}

/// Single-writer owner of the current values and enabled flags.
///
/// Every event is handled to completion before returning: validation, then
/// propagation on a staged copy, then actions, then commit. Nothing is
/// committed when any step fails.
#[derive(Debug)]
pub struct Engine {
    template: Arc<Template>,
    dispatcher: Dispatcher,
    config: EngineConfig,
    states: Vec<SettingState>,
}

impl Engine {
    /// Start from the template defaults.
    ///
    /// Initial enabled flags follow the default values of group parents; no
    /// value is rewritten.
    pub fn new(
        template: impl Into<Arc<Template>>,
        dispatcher: Dispatcher,
        config: EngineConfig,
    ) -> Self {
        let template = template.into();
        let states = initial_states(&template, &config);
        Self {
            template,
            dispatcher,
            config,
            states,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn state(&self, path: &str) -> Option<&SettingState> {
        let id = self.find(path).ok()?;
        Some(&self.states[id.index()])
    }

    pub fn value(&self, path: &str) -> Option<&Value> {
        self.state(path).map(|s| &s.value)
    }

    pub fn is_enabled(&self, path: &str) -> Option<bool> {
        self.state(path).map(|s| s.enabled)
    }

    /// Back to the template defaults.
    pub fn reset(&mut self) {
        self.states = initial_states(&self.template, &self.config);
    }

    /// Swap in a re-resolved template. All state starts over from its defaults.
    pub fn reload(&mut self, template: impl Into<Arc<Template>>) {
        self.template = template.into();
        self.reset();
        info!("engine reloaded: {} settings", self.states.len());
    }

    /// Handle one value-change event.
    ///
    /// The update list starts with the changed setting, followed by the
    /// children of the group it parents in membership order. A setting parents
    /// at most one group (the first id of its `ui_group`), so there is no
    /// ordering between groups to rely on. Undirected groups the setting is a
    /// child of come last, by ascending group id. Groups led by a changed child
    /// are not re-propagated; see
    /// [`on_value_changed_cascading`](Self::on_value_changed_cascading).
    pub fn on_value_changed(
        &mut self,
        path: &str,
        value: Value,
    ) -> Result<ChangeOutcome, ChangeError> {
        let id = self.find(path)?;
        let setting = self.template.settings().get(id);
        setting.check_value(&value)?;
        self.dispatcher.validate(setting, &value)?;
        debug!(
            "{}: {} -> {value}",
            setting.path,
            self.states[id.index()].value
        );

        let mut event = Event::new(self);
        event.trigger = Some(id);
        event.set_value(id, value.clone());
        event.updates.push(Update::value(setting.path.clone(), value));
        event.propagate(id);
        event.sync_upwards(id);

        let (states, outcome) = event.finish()?;
        self.states = states;
        Ok(outcome)
    }

    /// Like [`on_value_changed`](Self::on_value_changed), then re-submit every
    /// propagated change of a group parent as its own event, breadth first.
    ///
    /// Each re-submitted event commits on its own. Depth is bounded by
    /// [`EngineConfig::max_cascade_depth`] and every setting cascades at most once.
    pub fn on_value_changed_cascading(
        &mut self,
        path: &str,
        value: Value,
    ) -> Result<ChangeOutcome, ChangeError> {
        let root = self.find(path)?;
        let mut outcome = self.on_value_changed(path, value)?;

        let mut visited = HashSet::from([root]);
        let mut queue: VecDeque<(SettingId, usize)> = self.cascade_targets(&outcome, 1).collect();
        while let Some((id, depth)) = queue.pop_front() {
            if depth > self.config.max_cascade_depth {
                warn!("cascade from {path} stopped at depth {depth}");
                break;
            }
            if !visited.insert(id) {
                continue;
            }
            debug!(
                "cascade from {path}: {}",
                self.template.settings().get(id).path
            );

            let mut event = Event::new(self);
            event.propagate(id);
            let (states, step) = event.finish()?;
            self.states = states;

            queue.extend(self.cascade_targets(&step, depth + 1));
            outcome.merge(step);
        }
        Ok(outcome)
    }

    /// Press or release the setting's own disable button.
    ///
    /// Disabling stores `ui_disable_self` (backing up the current value);
    /// enabling restores the backup, or the default when there is none. A
    /// resulting value change propagates like any other.
    pub fn set_disabled(
        &mut self,
        path: &str,
        disabled: bool,
    ) -> Result<ChangeOutcome, ChangeError> {
        let id = self.find(path)?;
        let setting = self.template.settings().get(id);
        if !setting.has_disable_button() {
            return Err(ChangeError::NoDisableButton(setting.path.clone()));
        }

        let mut event = Event::new(self);
        let mut update = Update::enabled(setting.path.clone(), !disabled);
        update.value = event.toggle(id, setting, disabled);
        let changed = update.value.is_some();
        event.updates.push(update);
        if changed {
            event.trigger = Some(id);
            event.propagate(id);
            event.sync_upwards(id);
        }

        let (states, outcome) = event.finish()?;
        self.states = states;
        Ok(outcome)
    }

    /// Current values in parse order.
    pub fn config_entries(&self) -> Vec<ConfigEntry> {
        self.template
            .settings()
            .iter()
            .map(|(id, setting)| ConfigEntry {
                path: setting.path.clone(),
                value: self.states[id.index()].value.clone(),
                value_type: setting.value_type,
            })
            .collect()
    }

    /// Current values nested by path segment.
    pub fn config_json(&self) -> Value {
        let mut root = Map::new();
        'entries: for entry in self.config_entries() {
            let Some((key, category)) = entry.path.segments().split_last() else {
                continue;
            };
            let mut node = &mut root;
            for segment in category {
                let next = node
                    .entry(segment.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                let Some(next) = next.as_object_mut() else {
                    warn!("{}: `{segment}` is both a setting and a category", entry.path);
                    continue 'entries;
                };
                node = next;
            }
            node.insert(key.clone(), entry.value);
        }
        Value::Object(root)
    }

    fn find(&self, path: &str) -> Result<SettingId, ChangeError> {
        self.template
            .settings()
            .find(&SettingPath::parse(path))
            .ok_or_else(|| ChangeError::UnknownSetting(path.to_string()))
    }

    fn cascade_targets<'a>(
        &'a self,
        outcome: &'a ChangeOutcome,
        depth: usize,
    ) -> impl Iterator<Item = (SettingId, usize)> + 'a {
        let settings = self.template.settings();
        outcome
            .updates
            .iter()
            .filter(|u| u.value.is_some())
            .filter_map(move |u| settings.find(&u.path))
            .filter(move |id| settings.get(*id).is_group_parent())
            .map(move |id| (id, depth))
    }
}

fn initial_states(template: &Template, config: &EngineConfig) -> Vec<SettingState> {
    let settings = template.settings();
    let mut states: Vec<SettingState> = settings
        .iter()
        .map(|(_, setting)| {
            let mut state = SettingState::new(setting.default.clone());
            if setting.has_disable_button()
                && setting.disable_self_value.as_ref() == Some(&setting.default)
            {
                state.enabled = false;
            }
            state
        })
        .collect();

    for group in template.groups().iter() {
        let Some(parent) = group.parent else {
            continue;
        };
        if !group.disable_children {
            continue;
        }
        let parent = settings.get(parent);
        let disabled =
            rules::disables_children(parent, group, &parent.default, config.disable_policy);
        for child in group.children() {
            states[child.index()].enabled = !disabled;
        }
    }
    states
}

/// One event under construction, staged on a copy of the engine state.
struct Event<'e> {
    template: &'e Template,
    dispatcher: &'e Dispatcher,
    config: &'e EngineConfig,
    before: &'e [SettingState],
    staged: Vec<SettingState>,
    updates: Vec<Update>,
    /// Setting whose actions always run.
    trigger: Option<SettingId>,
    /// Settings whose value was written by propagation, in order.
    touched: Vec<SettingId>,
}

impl<'e> Event<'e> {
    fn new(engine: &'e Engine) -> Self {
        Self {
            template: &engine.template,
            dispatcher: &engine.dispatcher,
            config: &engine.config,
            before: &engine.states,
            staged: engine.states.clone(),
            updates: Vec::new(),
            trigger: None,
            touched: Vec::new(),
        }
    }

    /// Returns whether the staged value changed.
    fn set_value(&mut self, id: SettingId, value: Value) -> bool {
        let state = &mut self.staged[id.index()];
        if state.value == value {
            return false;
        }
        state.value = value;
        true
    }

    fn touch(&mut self, id: SettingId) {
        if !self.touched.contains(&id) {
            self.touched.push(id);
        }
    }

    /// Apply `id`'s groups to their children.
    fn propagate(&mut self, id: SettingId) {
        let template = self.template;
        let settings = template.settings();
        let parent = settings.get(id);
        for gid in &parent.is_group_parent_for {
            let Some(group) = template.groups().get(gid) else {
                continue;
            };
            if !group.propagates() {
                continue;
            }

            let parent_value = self.staged[id.index()].value.clone();
            let disabled = group.disable_children.then(|| {
                rules::disables_children(parent, group, &parent_value, self.config.disable_policy)
            });
            let target = parent_value
                .as_bool()
                .and_then(|p| rules::child_target(group.child_sync, p));
            trace!("group `{gid}`: target {target:?}, disabled {disabled:?}");

            for child in group.children() {
                let setting = settings.get(child);
                let mut update = Update::new(setting.path.clone());
                if let Some(target) = target
                    && setting.value_type == ValueType::Bool
                    && self.set_value(child, Value::Bool(target))
                {
                    update.value = Some(Value::Bool(target));
                }
                if let Some(disabled) = disabled {
                    update.enabled = Some(!disabled);
                    if let Some(value) = self.toggle(child, setting, disabled) {
                        update.value = Some(value);
                    }
                }
                if update.is_empty() {
                    continue;
                }
                if update.value.is_some() {
                    self.touch(child);
                }
                self.updates.push(update);
            }
        }
    }

    /// Run the inverse sync rule of every `undirected_sync` group `id` is a child of.
    fn sync_upwards(&mut self, id: SettingId) {
        let template = self.template;
        let settings = template.settings();
        let setting = settings.get(id);
        let Some(child_value) = self.staged[id.index()].value.as_bool() else {
            return;
        };

        let mut gids: Vec<&GroupId> = setting.group_ids.iter().collect();
        gids.sort();
        for gid in gids {
            let Some(group) = template.groups().get(gid) else {
                continue;
            };
            let Some(parent) = group.parent else {
                continue;
            };
            if parent == id || !group.undirected_sync || !group.members.contains(&id) {
                continue;
            }
            let parent_setting = settings.get(parent);
            if parent_setting.value_type != ValueType::Bool {
                continue;
            }
            let Some(target) = rules::parent_target(group.child_sync, child_value) else {
                continue;
            };
            if self.set_value(parent, Value::Bool(target)) {
                debug!("group `{gid}`: {} -> {target} from child", parent_setting.path);
                self.touch(parent);
                self.updates
                    .push(Update::value(parent_setting.path.clone(), Value::Bool(target)));
            }
        }
    }

    /// Set the enabled flag and swap the disable sentinel in or out.
    ///
    /// Returns the new value when it changed.
    fn toggle(&mut self, id: SettingId, setting: &Setting, disabled: bool) -> Option<Value> {
        let state = &mut self.staged[id.index()];
        state.enabled = !disabled;
        let sentinel = setting.disable_self_value.as_ref()?;

        if disabled {
            if state.value == *sentinel {
                return None;
            }
            let previous = std::mem::replace(&mut state.value, sentinel.clone());
            state.backup = Some(previous);
            return Some(sentinel.clone());
        }

        let backup = state.backup.take();
        if state.value != *sentinel {
            return None;
        }
        let restored = backup.unwrap_or_else(|| setting.default.clone());
        if restored == state.value {
            return None;
        }
        state.value = restored.clone();
        Some(restored)
    }

    /// Run actions and hand back the state to commit.
    fn finish(self) -> Result<(Vec<SettingState>, ChangeOutcome), ChangeError> {
        let settings = self.template.settings();
        let changed =
            |id: SettingId| self.staged[id.index()].value != self.before[id.index()].value;

        let mut run: Vec<SettingId> = self.trigger.into_iter().collect();
        if self.config.run_child_actions {
            run.extend(
                self.touched
                    .iter()
                    .copied()
                    .filter(|id| Some(*id) != self.trigger && changed(*id)),
            );
        }
        for id in run {
            self.dispatcher
                .run_actions(settings.get(id), &self.staged[id.index()].value)?;
        }

        let requires_reload = settings
            .iter()
            .any(|(id, s)| s.has_flag(UiFlag::RequiresReload) && changed(id));
        Ok((
            self.staged,
            ChangeOutcome {
                updates: self.updates,
                requires_reload,
            },
        ))
    }
}
