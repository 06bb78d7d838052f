//! Immutable resolved template.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::{
    data::{Group, GroupId, GroupRegistry, Setting, SettingPath, SettingRegistry},
    document,
    error::Checked,
    parser, resolver,
    schema::UiFlag,
};

/// Parsed settings plus their resolved groups.
///
/// Built once; shared read-only by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Template {
    settings: SettingRegistry,
    groups: GroupRegistry,
}

impl Template {
    /// Build a template from one raw `category -> setting -> options` tree.
    pub fn from_value(raw: &Value) -> Checked<Self> {
        Self::from_values(std::slice::from_ref(raw))
    }

    /// Build a template from several raw trees, merged in order.
    pub fn from_values(sources: &[Value]) -> Checked<Self> {
        let mut checked = Checked::new(());
        let mut settings = checked.absorb(parser::parse_all(sources));
        let groups = checked.absorb(resolver::resolve(&settings));
        resolver::assign_parents(&groups, &mut settings);
        info!(
            "template ready: {} settings, {} groups",
            settings.len(),
            groups.len()
        );
        checked.map(|_| Template { settings, groups })
    }

    /// Load a `.json` or `.toml` template file.
    ///
    /// I/O and syntax problems are returned as errors; template problems are
    /// reported through the returned [`Checked`].
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Checked<Self>> {
        let raw = document::read_checked(path.as_ref())?;
        Ok(Self::from_document(raw))
    }

    /// Parse template text in the format named by `ext`.
    pub fn from_content(content: &str, ext: &str) -> anyhow::Result<Checked<Self>> {
        let raw = document::parse_checked(content, ext)?;
        Ok(Self::from_document(raw))
    }

    /// Keys repeated in the document come first among the diagnostics.
    fn from_document(mut raw: Checked<Value>) -> Checked<Self> {
        let template = Self::from_value(&raw.value);
        let template = raw.absorb(template);
        raw.map(|_| template)
    }

    pub fn settings(&self) -> &SettingRegistry {
        &self.settings
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    /// Look up a setting by its dotted path.
    pub fn setting(&self, path: &str) -> Option<&Setting> {
        self.settings.by_path(&SettingPath::parse(path))
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.get(&GroupId::from(id))
    }

    /// Members of `group`, in membership order.
    pub fn members<'a>(&'a self, group: &'a Group) -> impl Iterator<Item = &'a Setting> + 'a {
        group.members.iter().map(|id| self.settings.get(*id))
    }

    /// Settings the GUI should render, in parse order. Excluded settings are skipped.
    pub fn presentation(&self) -> impl Iterator<Item = &Setting> {
        self.settings
            .iter()
            .map(|(_, s)| s)
            .filter(|s| !s.has_flag(UiFlag::Exclude))
    }
}
