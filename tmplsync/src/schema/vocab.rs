//! Closed vocabularies interpreted by the engine.

vocabulary! {
    /// Widget kind requested through `ui_type`.
    pub enum WidgetKind {
        /// Boolean check box.
        Checkbox => "checkbox",
        /// RGB color selector.
        ColorPicker => "color_picker",
        /// Drop-down selection of one allowed value.
        ComboBox => "combobox",
        /// File or directory selector.
        FileSelection => "file_selection",
        /// One-line free-form text field.
        LineEdit => "line_edit",
        /// Sliding numeric range.
        Slider => "slider",
        /// Numeric input with step buttons.
        SpinBox => "spinbox",
        /// Boolean toggle switch.
        Switch => "switch",
    }
}

impl WidgetKind {
    /// Widgets that edit a number inside a range.
    pub fn is_numeric_range(&self) -> bool {
        matches!(self, WidgetKind::Slider | WidgetKind::SpinBox)
    }
}

vocabulary! {
    /// Variants accepted by `ui_group_parent`.
    pub enum GroupParentVariant {
        /// Parent and children are laid out flat on one card.
        Clustered => "clustered",
        /// Children are nested under the parent.
        NestedChildren => "nested_children",
        /// Parent state enables or disables the children.
        DisableChildren => "disable_children",
        /// Sync rules also run from child to parent.
        UndirectedSync => "undirected_sync",
        /// Children follow the parent value.
        SyncChildren => "sync_children",
        /// Children take the negated parent value.
        DesyncChildren => "desync_children",
        /// A true parent forces children true.
        DesyncTrueChildren => "desync_true_children",
        /// A true parent forces children false.
        DesyncFalseChildren => "desync_false_children",
    }
}

impl GroupParentVariant {
    /// Whether this variant selects a child sync mode.
    pub fn is_sync_mode(&self) -> bool {
        matches!(
            self,
            GroupParentVariant::SyncChildren
                | GroupParentVariant::DesyncChildren
                | GroupParentVariant::DesyncTrueChildren
                | GroupParentVariant::DesyncFalseChildren
        )
    }

    /// Whether this variant only has an effect when it drives propagation.
    pub fn affects_propagation(&self) -> bool {
        self.is_sync_mode()
            || matches!(
                self,
                GroupParentVariant::DisableChildren | GroupParentVariant::UndirectedSync
            )
    }
}

vocabulary! {
    /// Per-setting flags accepted by `ui_flags`.
    pub enum UiFlag {
        /// A change only takes effect after the application reloads.
        RequiresReload => "requires_reload",
        /// Kept in the config model but hidden from presentation.
        Exclude => "exclude",
    }
}
