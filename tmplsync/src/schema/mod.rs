//! Template option vocabulary.
//!
//! - [`options`] - option keys, shapes and per-widget requirements
//! - [`vocab`] - closed enumerations for widget kinds, group-parent variants and flags

/// Option keys and their requirements.
pub mod options;

/// Closed enumerations used by option values.
pub mod vocab;

pub use options::{OptionKey, OptionRule, OptionShape, RawOptions, describe};
pub use vocab::{GroupParentVariant, UiFlag, WidgetKind};
