use std::{collections::BTreeMap, fmt};

use serde::{Serialize, Serializer};

use crate::data::SettingId;

/// Identifier shared by all settings of a `ui_group`.
///
/// Ordering is plain string ordering; it is the order in which a parent's
/// groups are processed during propagation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for GroupId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// How the GUI lays out a group around its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    None,
    Clustered,
    Nested,
}

impl LayoutMode {
    /// Whether the parent places its children inside its own card.
    pub fn nests_children(&self) -> bool {
        !matches!(self, LayoutMode::None)
    }
}

/// Value rule applied to boolean children when the parent changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildSyncMode {
    #[default]
    None,
    /// child = parent
    Sync,
    /// child = !parent
    Desync,
    /// parent true => child true, otherwise unchanged
    DesyncTrue,
    /// parent true => child false, otherwise unchanged
    DesyncFalse,
}

/// Derived aggregate over every setting sharing one [`GroupId`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: GroupId,
    /// Registry indices in first-seen (parse) order. Includes the parent.
    pub members: Vec<SettingId>,
    pub parent: Option<SettingId>,
    pub layout: LayoutMode,
    pub disable_children: bool,
    pub child_sync: ChildSyncMode,
    pub undirected_sync: bool,
    /// Group whose parent nests this group's parent card.
    pub nested_under: Option<GroupId>,
}

impl Group {
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            members: Vec::new(),
            parent: None,
            layout: LayoutMode::None,
            disable_children: false,
            child_sync: ChildSyncMode::None,
            undirected_sync: false,
            nested_under: None,
        }
    }

    /// Members other than the parent, in membership order.
    pub fn children(&self) -> impl Iterator<Item = SettingId> + '_ {
        self.members
            .iter()
            .copied()
            .filter(move |id| Some(*id) != self.parent)
    }

    /// Whether changing the parent can change anything else.
    pub fn propagates(&self) -> bool {
        self.parent.is_some() && (self.disable_children || self.child_sync != ChildSyncMode::None)
    }
}

/// All groups of a template, iterated in ascending id order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct GroupRegistry {
    groups: BTreeMap<GroupId, Group>,
}

impl GroupRegistry {
    pub fn get(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &GroupId) -> Option<&mut Group> {
        self.groups.get_mut(id)
    }

    pub(crate) fn entry(&mut self, id: &GroupId) -> &mut Group {
        self.groups
            .entry(id.clone())
            .or_insert_with(|| Group::new(id.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.groups.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &GroupId> {
        self.groups.keys()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
