//! Runtime state synchronization.
//!
//! - [`engine`] - the [`Engine`] owning current values and enabled flags
//! - [`rules`] - pure sync / disable rules
//! - [`update`] - event outcomes
//!
//! Propagation is one level per event: a child that is itself a group parent
//! does not re-trigger its own group unless the change is re-submitted.

/// Value-change handling.
pub mod engine;

/// Sync and disable rules.
pub mod rules;

/// Update tuples and outcomes.
pub mod update;

pub use engine::{Engine, SettingState};
pub use update::{ChangeOutcome, ConfigEntry, Update};
