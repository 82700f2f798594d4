//! Selection.

use std::collections::BTreeSet;

use lattice_adapter_core::logging::targets;

use super::CompositeAdapter;
use crate::error::Result;
use crate::model::{Item, StateKey};

impl CompositeAdapter {
    /// Toggles the selection of a row the way a click does.
    ///
    /// Does nothing when selection is disabled or the item is not selectable.
    /// Without multi-select every other row is deselected first, even when
    /// the row itself stays selected because deselection is not allowed.
    pub fn select(&mut self, position: usize) -> Result<()> {
        let selectable = self.item_at(position)?.is_selectable();
        if !self.config.selectable || !selectable {
            tracing::trace!(target: targets::SELECTION, position, "row not selectable");
            return Ok(());
        }

        let key = self.state_key(position)?;
        let was_selected = self.selection.contains(key);

        let mut selected = Vec::new();
        let mut deselected = Vec::new();
        let mut refresh = Vec::new();

        if !self.config.multi_select {
            let others: Vec<StateKey> = self.selection.iter().filter(|&other| other != key).collect();
            for other in others {
                refresh.extend(self.drop_selection_key(other));
                deselected.push(other);
            }
        }

        // A selected row that may not be deselected stays selected.
        if !was_selected || self.config.allow_deselection {
            self.set_row_selected(position, key, !was_selected);
            if was_selected {
                deselected.push(key);
            } else {
                selected.push(key);
            }
            refresh.push(position);
        }

        if selected.is_empty() && deselected.is_empty() {
            return Ok(());
        }
        self.finish_selection_change(selected, deselected, refresh);
        Ok(())
    }

    /// Selects a row programmatically.
    ///
    /// Idempotent, and independent of the click-oriented switches: neither
    /// `selectable` nor the single-selection policy apply.
    pub fn select_at(&mut self, position: usize) -> Result<()> {
        let key = self.state_key(position)?;
        if self.selection.contains(key) {
            return Ok(());
        }
        self.set_row_selected(position, key, true);
        self.finish_selection_change(vec![key], Vec::new(), vec![position]);
        Ok(())
    }

    /// Deselects a row.
    pub fn deselect(&mut self, position: usize) -> Result<()> {
        let key = self.state_key(position)?;
        if !self.selection.contains(key) {
            return Ok(());
        }
        self.set_row_selected(position, key, false);
        self.finish_selection_change(Vec::new(), vec![key], vec![position]);
        Ok(())
    }

    /// Deselects everything, including children hidden in collapsed rows.
    pub fn deselect_all(&mut self) {
        let keys = self.selection.clear();
        let mut refresh = Vec::new();
        for &key in &keys {
            if let Some(position) = self.resolve_key(key) {
                if let Ok(item) = self.item_at_mut(position) {
                    item.set_selected(false);
                }
                refresh.push(position);
            }
        }
        self.for_each_hidden_mut(&mut |item| item.set_selected(false));

        if !keys.is_empty() {
            self.finish_selection_change(Vec::new(), keys, refresh);
        }
    }

    /// The selection set.
    pub fn selections(&self) -> &BTreeSet<StateKey> {
        self.selection.keys()
    }

    /// Positions of the selected rows, ascending.
    pub fn selected_positions(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = self
            .selection
            .iter()
            .filter_map(|key| self.resolve_key(key))
            .collect();
        positions.sort_unstable();
        positions
    }

    /// The selected items, in row order.
    pub fn selected_items(&self) -> Vec<&dyn Item> {
        self.selected_positions()
            .into_iter()
            .filter_map(|position| self.item_at(position).ok())
            .collect()
    }

    /// Whether the row at `position` is selected.
    pub fn is_selected(&self, position: usize) -> bool {
        self.state_key(position)
            .is_ok_and(|key| self.selection.contains(key))
    }

    fn set_row_selected(&mut self, position: usize, key: StateKey, selected: bool) {
        if let Ok(item) = self.item_at_mut(position) {
            item.set_selected(selected);
        }
        if selected {
            self.selection.insert(key);
        } else {
            self.selection.remove(key);
        }
    }

    /// Removes a key and clears the flag of its row, returning the row.
    fn drop_selection_key(&mut self, key: StateKey) -> Option<usize> {
        self.selection.remove(key);
        let position = self.resolve_key(key)?;
        if let Ok(item) = self.item_at_mut(position) {
            item.set_selected(false);
        }
        Some(position)
    }

    fn finish_selection_change(
        &self,
        selected: Vec<StateKey>,
        deselected: Vec<StateKey>,
        mut refresh: Vec<usize>,
    ) {
        if self.config.select_with_refresh {
            refresh.sort_unstable();
            refresh.dedup();
            for position in refresh {
                self.signals.emit_rows_changed(position, 1);
            }
        }
        tracing::debug!(
            target: targets::SELECTION,
            selected = selected.len(),
            deselected = deselected.len(),
            "selection changed"
        );
        self.signals.emit_selection_changed(selected, deselected);
    }

    /// Visits every item held inside a collapsed row, at any depth.
    pub(crate) fn for_each_hidden_mut(&mut self, visit: &mut dyn FnMut(&mut dyn Item)) {
        for position in 0..self.item_count() {
            let Ok(item) = self.item_at_mut(position) else {
                continue;
            };
            let Some(expandable) = item.as_expandable_mut() else {
                continue;
            };
            if expandable.is_expanded() {
                continue;
            }
            let mut children = expandable.take_sub_items();
            visit_tree_mut(&mut children, visit);
            expandable.set_sub_items(children);
        }
    }

    /// Every item held inside a collapsed row, at any depth.
    pub(crate) fn hidden_items(&self) -> Vec<&dyn Item> {
        let mut hidden = Vec::new();
        for position in 0..self.item_count() {
            let Some(expandable) = self.item_at(position).ok().and_then(|item| item.as_expandable())
            else {
                continue;
            };
            if !expandable.is_expanded() {
                collect_tree(expandable.sub_items(), &mut hidden);
            }
        }
        hidden
    }
}

fn visit_tree_mut(items: &mut [Box<dyn Item>], visit: &mut dyn FnMut(&mut dyn Item)) {
    for item in items.iter_mut() {
        visit(item.as_mut());
        if let Some(expandable) = item.as_expandable_mut() {
            let mut children = expandable.take_sub_items();
            visit_tree_mut(&mut children, visit);
            expandable.set_sub_items(children);
        }
    }
}

fn collect_tree<'a>(items: &'a [Box<dyn Item>], out: &mut Vec<&'a dyn Item>) {
    for item in items {
        out.push(item.as_ref());
        if let Some(expandable) = item.as_expandable() {
            collect_tree(expandable.sub_items(), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::config::AdapterConfig;
    use crate::error::Error;
    use crate::model::{BasicItem, ItemAdapter};

    fn list(config: AdapterConfig, ids: impl IntoIterator<Item = i64>) -> CompositeAdapter {
        let mut list = CompositeAdapter::with_config(config);
        list.register_adapter(
            ids.into_iter()
                .map(|id| BasicItem::new(id, 0).boxed())
                .collect::<ItemAdapter>(),
            0,
        );
        list
    }

    fn selectable() -> AdapterConfig {
        AdapterConfig::default().with_selectable(true)
    }

    #[test]
    fn test_single_select_replaces_previous() {
        let mut list = list(selectable(), 0..5);
        list.select(1).unwrap();
        list.select(3).unwrap();

        assert_eq!(list.selected_positions(), vec![3]);
        assert!(!list.item_at(1).unwrap().is_selected());
        assert!(list.item_at(3).unwrap().is_selected());
    }

    #[test]
    fn test_multi_select_accumulates() {
        let mut list = list(selectable().with_multi_select(true), 0..5);
        list.select(1).unwrap();
        list.select(3).unwrap();
        assert_eq!(list.selected_positions(), vec![1, 3]);
        assert_eq!(list.selected_items().len(), 2);
    }

    #[test]
    fn test_toggle_respects_allow_deselection() {
        let mut list = list(selectable(), 0..3);
        list.select(2).unwrap();
        list.select(2).unwrap();
        assert!(list.selections().is_empty());

        list.set_config(selectable().with_allow_deselection(false));
        list.select(2).unwrap();
        list.select(2).unwrap();
        assert_eq!(list.selected_positions(), vec![2]);
    }

    #[test]
    fn test_single_select_click_on_kept_row_drops_others() {
        let mut list = list(selectable().with_allow_deselection(false), 0..5);
        let events = Arc::new(Mutex::new(0));
        let sink = events.clone();
        list.signals().selection_changed.connect(move |_| *sink.lock() += 1);

        list.select_at(1).unwrap();
        list.select_at(3).unwrap();
        list.select(3).unwrap();
        assert_eq!(list.selected_positions(), vec![3]);
        assert!(!list.item_at(1).unwrap().is_selected());
        assert_eq!(*events.lock(), 3);

        list.select(3).unwrap();
        assert_eq!(list.selected_positions(), vec![3]);
        assert_eq!(*events.lock(), 3);
    }

    #[test]
    fn test_select_is_noop_when_not_selectable() {
        let mut list = list(AdapterConfig::default(), 0..3);
        list.select(1).unwrap();
        assert!(list.selections().is_empty());

        let mut list = CompositeAdapter::with_config(selectable());
        list.register_adapter(
            ItemAdapter::from_items(vec![BasicItem::new(1, 0).with_selectable(false).boxed()]),
            0,
        );
        list.select(0).unwrap();
        assert!(!list.is_selected(0));
    }

    #[test]
    fn test_select_at_is_idempotent() {
        let mut list = list(AdapterConfig::default(), 0..3);
        let events = Arc::new(Mutex::new(0));
        let sink = events.clone();
        list.signals().selection_changed.connect(move |_| *sink.lock() += 1);

        list.select_at(1).unwrap();
        list.select_at(1).unwrap();
        assert_eq!(list.selected_positions(), vec![1]);
        assert_eq!(*events.lock(), 1);

        list.deselect(1).unwrap();
        assert!(!list.is_selected(1));
        assert_eq!(*events.lock(), 2);
    }

    #[test]
    fn test_select_with_refresh_emits_rows_changed() {
        let mut list = list(selectable().with_select_with_refresh(true), 0..4);
        let changed = Arc::new(Mutex::new(Vec::new()));
        let sink = changed.clone();
        list.signals().rows_changed.connect(move |&range| sink.lock().push(range));

        list.select(0).unwrap();
        list.select(2).unwrap();
        assert_eq!(*changed.lock(), vec![(0, 1), (0, 1), (2, 1)]);
    }

    #[test]
    fn test_identifier_mode_needs_identifiers() {
        let mut list = CompositeAdapter::with_config(selectable().with_position_based(false));
        list.register_adapter(ItemAdapter::from_items(vec![BasicItem::anonymous(0).boxed()]), 0);
        assert_eq!(list.select(0), Err(Error::MissingIdentifier));
    }

    #[test]
    fn test_deselect_all() {
        let mut list = list(selectable().with_multi_select(true), 0..4);
        for position in [0, 2, 3] {
            list.select(position).unwrap();
        }
        list.deselect_all();
        assert!(list.selections().is_empty());
        assert!((0..4).all(|position| !list.item_at(position).unwrap().is_selected()));
    }

    #[test]
    fn test_out_of_range() {
        let mut list = list(selectable(), 0..2);
        assert_eq!(list.select(2), Err(Error::invalid_position(2, 2)));
        assert!(!list.is_selected(7));
    }
}
