use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::data::{Setting, SettingId, SettingPath};

/// Flat, parse-ordered store of settings, addressed by [`SettingId`] or path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingRegistry {
    settings: Vec<Setting>,
    index: HashMap<SettingPath, SettingId>,
}

impl SettingRegistry {
    /// Add a setting. A path that is already present is handed back untouched.
    pub(crate) fn insert(&mut self, setting: Setting) -> Result<SettingId, Setting> {
        if self.index.contains_key(&setting.path) {
            return Err(setting);
        }
        let id = SettingId(self.settings.len());
        self.index.insert(setting.path.clone(), id);
        self.settings.push(setting);
        Ok(id)
    }

    pub fn get(&self, id: SettingId) -> &Setting {
        &self.settings[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: SettingId) -> &mut Setting {
        &mut self.settings[id.0]
    }

    pub fn find(&self, path: &SettingPath) -> Option<SettingId> {
        self.index.get(path).copied()
    }

    pub fn by_path(&self, path: &SettingPath) -> Option<&Setting> {
        self.find(path).map(|id| self.get(id))
    }

    pub fn contains(&self, path: &SettingPath) -> bool {
        self.index.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SettingId, &Setting)> {
        self.settings
            .iter()
            .enumerate()
            .map(|(i, s)| (SettingId(i), s))
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

impl Serialize for SettingRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.settings)
    }
}
