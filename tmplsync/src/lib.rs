//! # tmplsync
//!
//! Settings template resolution and group synchronization.
//!
//! A template is a nested `category -> setting -> options` document. `tmplsync`
//! turns it into typed setting records, resolves the groups those settings
//! declare, and keeps current values and enabled flags consistent when a value
//! changes at runtime.
//!
//! ## Features
//!
//! - Closed option vocabulary with per-widget requirements
//! - Value type inference from `type`, `default`, `values` and widget hints
//! - Accumulated diagnostics: a broken template still yields every setting that could be built
//! - Group layout (clustered / nested), disable cascades and boolean value sync
//! - Atomic value-change events with validators and actions looked up by name
//! - TOML and JSON templates
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use tmplsync::{Dispatcher, Engine, EngineConfig, Template};
//!
//! let checked = Template::from_value(&json!({
//!     "General": {
//!         "autosave": {"default": false, "ui_group": "save", "ui_group_parent": ["sync_children"]},
//!         "backup": {"default": false, "ui_group": "save"}
//!     }
//! }));
//! assert!(checked.is_ok());
//!
//! let mut engine = Engine::new(checked.value, Dispatcher::new(), EngineConfig::default());
//! let outcome = engine.on_value_changed("General.autosave", json!(true)).unwrap();
//! assert_eq!(outcome.final_state("General.backup").unwrap().value, Some(json!(true)));
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - option vocabulary
//! - [`data`] - setting and group records
//! - [`infer`] - value type inference
//! - [`parser`] - template parsing
//! - [`resolver`] - group resolution
//! - [`template`] - the resolved, immutable template
//! - [`dispatch`] - validator and action registry
//! - [`sync`] - the runtime engine
//! - [`config`] - engine configuration
//! - [`error`] - diagnostics and error types

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

/// Engine configuration loaded from `.toml` / `.json`.
pub mod config;

/// Setting, group and value records.
pub mod data;

/// Validators and actions referenced by name.
pub mod dispatch;

/// Reading and writing template documents.
pub mod document;

/// Construction diagnostics and runtime errors.
pub mod error;

/// Value type inference.
pub mod infer;

/// Raw template to setting registry.
pub mod parser;

/// Setting registry to group registry.
pub mod resolver;

/// Option keys, shapes and closed vocabularies.
pub mod schema;

/// Runtime value and enabled-state synchronization.
pub mod sync;

/// Resolved template.
pub mod template;

pub use config::{DisablePolicy, EngineConfig};
pub use data::{
    ChildSyncMode, Group, GroupId, GroupRegistry, LayoutMode, Setting, SettingId, SettingPath,
    SettingRegistry, ValueType,
};
pub use dispatch::{Action, Dispatcher, Validator};
pub use error::{ChangeError, Checked, ConstructionError, PropagationWarning, ValidationError};
pub use sync::{ChangeOutcome, ConfigEntry, Engine, SettingState, Update};
pub use template::Template;
