//! The model interface tree views program against.

use region_lattice_core::Signal;

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};

/// What a view may do with an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    pub selectable: bool,
    pub editable: bool,
    pub enabled: bool,
}

impl ItemFlags {
    /// Selectable and enabled, but read-only.
    pub fn new() -> Self {
        Self {
            selectable: true,
            editable: false,
            enabled: true,
        }
    }

    /// No interaction at all; used for invalid indices.
    pub fn none() -> Self {
        Self::default()
    }

    /// Selectable, enabled and renamable in place.
    pub fn editable() -> Self {
        Self {
            editable: true,
            ..Self::new()
        }
    }
}

/// A hierarchical, single- or multi-column item model.
///
/// Views address items through [`ModelIndex`] values obtained from
/// [`index`](Self::index); the invalid index stands for the (hidden) top
/// level.
///
/// # Contract
///
/// - Nothing panics on bad input. Out-of-range positions and stale indices
///   give [`ModelIndex::invalid()`], unsupported queries give
///   [`ItemData::None`].
/// - `parent(index(row, 0, p)) == p` for every `p` and every
///   `row < row_count(p)`, including the invalid top-level parent.
/// - Change signals are emitted with no internal locks held, so slots may
///   call back into the model.
pub trait ItemModel: Send + Sync {
    /// Number of children under `parent`.
    fn row_count(&self, parent: &ModelIndex) -> usize;

    /// Number of columns for children of `parent`.
    fn column_count(&self, parent: &ModelIndex) -> usize;

    /// Value of the item at `index` for `role`.
    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData;

    /// Index of the child at (`row`, `column`) under `parent`.
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// Parent of `index`; invalid for top-level items.
    fn parent(&self, index: &ModelIndex) -> ModelIndex;

    /// Change notifications for attached views.
    fn signals(&self) -> &ModelSignals;

    /// Writes `value` under `role`, returning whether it was accepted.
    ///
    /// Read-only models keep this default. Implementations emit
    /// `data_changed` after an accepted write.
    fn set_data(&self, _index: &ModelIndex, _value: ItemData, _role: ItemRole) -> bool {
        false
    }

    /// Interaction flags for the item at `index`.
    fn flags(&self, _index: &ModelIndex) -> ItemFlags {
        ItemFlags::new()
    }

    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// Shorthand for the `Display` role as a string.
    fn display_text(&self, index: &ModelIndex) -> Option<String> {
        self.data(index, ItemRole::Display).into_string()
    }
}

/// Signals an [`ItemModel`] emits while its contents change.
///
/// Row signals carry `(parent, first row, last row)`, both rows inclusive.
/// Every `*_about_to_*` signal is followed by its completion signal once the
/// model has been updated.
pub struct ModelSignals {
    pub rows_about_to_be_inserted: Signal<(ModelIndex, usize, usize)>,
    pub rows_inserted: Signal<(ModelIndex, usize, usize)>,
    pub rows_about_to_be_removed: Signal<(ModelIndex, usize, usize)>,
    pub rows_removed: Signal<(ModelIndex, usize, usize)>,
    /// `(top-left, bottom-right, roles)` of items whose values changed.
    pub data_changed: Signal<(ModelIndex, ModelIndex, Vec<ItemRole>)>,
    pub model_about_to_reset: Signal<()>,
    /// All previously issued indices are stale after this fires.
    pub model_reset: Signal<()>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSignals {
    pub fn new() -> Self {
        Self {
            rows_about_to_be_inserted: Signal::new(),
            rows_inserted: Signal::new(),
            rows_about_to_be_removed: Signal::new(),
            rows_removed: Signal::new(),
            data_changed: Signal::new(),
            model_about_to_reset: Signal::new(),
            model_reset: Signal::new(),
        }
    }

    /// Emits `data_changed` for one item.
    pub fn emit_data_changed_single(&self, index: ModelIndex, roles: Vec<ItemRole>) {
        self.data_changed.emit((index, index, roles));
    }

    /// Runs `reset_fn` between `model_about_to_reset` and `model_reset`.
    pub fn emit_reset<F, R>(&self, reset_fn: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.model_about_to_reset.emit(());
        let result = reset_fn();
        self.model_reset.emit(());
        result
    }
}

impl std::fmt::Debug for ModelSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSignals")
            .field("rows_inserted", &self.rows_inserted)
            .field("rows_removed", &self.rows_removed)
            .field("data_changed", &self.data_changed)
            .field("model_reset", &self.model_reset)
            .finish_non_exhaustive()
    }
}
