//! Change notifications emitted by the engine.

use lattice_adapter_core::Signal;

use super::state::StateKey;

/// Signals describing every change to the flattened list.
///
/// Row ranges are `(first, count)` in global positions after the change for
/// insertions and before it for removals.
#[derive(Debug, Default)]
pub struct ListSignals {
    /// Rows were inserted: `(first, count)`.
    pub rows_inserted: Signal<(usize, usize)>,
    /// Rows were removed: `(first, count)`.
    pub rows_removed: Signal<(usize, usize)>,
    /// Rows changed in place: `(first, count)`.
    pub rows_changed: Signal<(usize, usize)>,
    /// A row moved: `(from, to)`.
    pub row_moved: Signal<(usize, usize)>,
    /// Everything changed; hosts should rebind all rows.
    pub data_set_changed: Signal<()>,
    /// Selection changed: `(selected, deselected)`.
    pub selection_changed: Signal<(Vec<StateKey>, Vec<StateKey>)>,
    /// A row was expanded (`true`) or collapsed (`false`).
    pub expansion_changed: Signal<(usize, bool)>,
}

impl ListSignals {
    /// Creates the signal set with no connections.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn emit_rows_inserted(&self, first: usize, count: usize) {
        if count > 0 {
            self.rows_inserted.emit((first, count));
        }
    }

    pub(crate) fn emit_rows_removed(&self, first: usize, count: usize) {
        if count > 0 {
            self.rows_removed.emit((first, count));
        }
    }

    pub(crate) fn emit_rows_changed(&self, first: usize, count: usize) {
        if count > 0 {
            self.rows_changed.emit((first, count));
        }
    }

    pub(crate) fn emit_selection_changed(&self, selected: Vec<StateKey>, deselected: Vec<StateKey>) {
        if !selected.is_empty() || !deselected.is_empty() {
            self.selection_changed.emit((selected, deselected));
        }
    }

    /// Blocks or unblocks every signal at once.
    pub fn set_blocked(&self, blocked: bool) {
        self.rows_inserted.set_blocked(blocked);
        self.rows_removed.set_blocked(blocked);
        self.rows_changed.set_blocked(blocked);
        self.row_moved.set_blocked(blocked);
        self.data_set_changed.set_blocked(blocked);
        self.selection_changed.set_blocked(blocked);
        self.expansion_changed.set_blocked(blocked);
    }
}
