//! Resolved template records.
//!
//! - [`setting`] - the per-leaf [`Setting`] record and its path/id types
//! - [`group`] - the derived [`Group`] aggregate
//! - [`registry`] - index-based [`SettingRegistry`]
//! - [`value`] - value types and shared value checks
//!
//! Groups refer to settings by [`SettingId`]; settings refer to groups by
//! [`GroupId`]. Neither embeds the other.

/// Derived group records.
pub mod group;

/// Parse-ordered setting storage.
pub mod registry;

/// Setting records.
pub mod setting;

/// Value types.
pub mod value;

pub use group::{ChildSyncMode, Group, GroupId, GroupRegistry, LayoutMode};
pub use registry::SettingRegistry;
pub use setting::{
    CallableRef, DisableButton, Message, Presentation, Setting, SettingId, SettingPath,
};
pub use value::ValueType;
