//! Expansion: flattening children of expandable rows into the list.
//!
//! Expanding moves the children out of the item and splices them in right
//! after it. Collapsing drains them back, deepest expanded descendants first.

use lattice_adapter_core::logging::targets;

use super::CompositeAdapter;
use crate::error::Result;

impl CompositeAdapter {
    /// Expands the row at `position`.
    ///
    /// Rows that are not expandable, or hold no children, are left alone.
    /// With `only_one_expanded_item` every other expanded row, except the
    /// ancestors of this one, is collapsed first, even if this row is already
    /// expanded.
    pub fn expand(&mut self, position: usize) -> Result<()> {
        self.expand_tracked(position).map(|_| ())
    }

    /// Expands the row at `position`, returning where the row ends up.
    fn expand_tracked(&mut self, position: usize) -> Result<usize> {
        let item = self.item_at(position)?;
        let Some(expandable) = item.as_expandable() else {
            return Ok(position);
        };
        let already_expanded = expandable.is_expanded();
        if !already_expanded && expandable.sub_items().is_empty() {
            return Ok(position);
        }
        self.state_key(position)?;

        let mut position = position;
        if self.config.only_one_expanded_item {
            position = self.collapse_others(position);
        }
        if !already_expanded {
            self.expand_row(position)?;
        }
        Ok(position)
    }

    /// Collapses the row at `position` and every expanded row beneath it.
    ///
    /// With `notify_children` each nested collapse reports its own removal;
    /// otherwise a single removal covers every hidden row.
    pub fn collapse(&mut self, position: usize, notify_children: bool) -> Result<()> {
        self.item_at(position)?;
        if self.is_expanded(position) {
            self.collapse_row(position, true, notify_children);
        }
        Ok(())
    }

    /// Expands a collapsed row or collapses an expanded one.
    pub fn toggle_expansion(&mut self, position: usize) -> Result<()> {
        self.toggle_tracked(position).map(|_| ())
    }

    /// Toggles the row at `position`, returning where the row ends up.
    pub(crate) fn toggle_tracked(&mut self, position: usize) -> Result<usize> {
        if self.is_expanded(position) {
            self.collapse(position, true).map(|()| position)
        } else {
            self.expand_tracked(position)
        }
    }

    /// Collapses every expanded row.
    pub fn collapse_all(&mut self) {
        for position in self.expanded_positions().into_iter().rev() {
            if self.is_expanded(position) {
                self.collapse_row(position, true, true);
            }
        }
    }

    /// Whether the row at `position` is expanded.
    pub fn is_expanded(&self, position: usize) -> bool {
        self.state_key(position)
            .is_ok_and(|key| self.expansion.contains(key))
    }

    /// Positions of the expanded rows, ascending.
    pub fn expanded_positions(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = self
            .expansion
            .iter()
            .filter_map(|(key, _)| self.resolve_key(key))
            .collect();
        positions.sort_unstable();
        positions
    }

    /// `(position, flattened descendant rows)` of each expanded row.
    pub fn expanded_items(&self) -> Vec<(usize, usize)> {
        self.expanded_positions()
            .into_iter()
            .map(|position| (position, self.descendant_rows(position)))
            .collect()
    }

    fn expand_row(&mut self, position: usize) -> Result<()> {
        let key = self.state_key(position)?;
        let (order, local) = self.locate(position)?;
        let children = {
            let item = self.item_at_mut(position)?;
            let Some(expandable) = item.as_expandable_mut() else {
                return Ok(());
            };
            expandable.set_expanded(true);
            expandable.take_sub_items()
        };
        let count = children.len();

        self.splice_in(order, local + 1, children)?;
        self.expansion.insert(key, count);

        tracing::debug!(target: targets::EXPANSION, position, count, "expanded");
        self.signals.emit_rows_inserted(position + 1, count);
        self.signals.emit_rows_changed(position, 1);
        self.signals.expansion_changed.emit((position, true));
        Ok(())
    }

    /// Collapses a row known to be expanded, returning how many rows it hid.
    ///
    /// `emit` controls the notifications of this row; nested rows emit only
    /// when `notify_children` is set.
    pub(crate) fn collapse_row(&mut self, position: usize, emit: bool, notify_children: bool) -> usize {
        let span = self.descendant_rows(position);
        let nested: Vec<usize> = self
            .expanded_positions()
            .into_iter()
            .filter(|&expanded| expanded > position && expanded <= position + span)
            .rev()
            .collect();
        for expanded in nested {
            self.collapse_row(expanded, notify_children, notify_children);
        }

        let (Ok(key), Ok((order, local))) = (self.state_key(position), self.locate(position)) else {
            return 0;
        };
        let available = self.collection_end(position).saturating_sub(position + 1);
        let direct = self.expansion.get(key).unwrap_or(0).min(available);

        let mut children = self.splice_out(order, local + 1, direct).unwrap_or_default();
        self.expansion.remove(key);
        if self.config.position_based {
            for child in &mut children {
                child.set_selected(false);
            }
        }
        if let Ok(item) = self.item_at_mut(position)
            && let Some(expandable) = item.as_expandable_mut()
        {
            expandable.set_sub_items(children);
            expandable.set_expanded(false);
        }

        tracing::debug!(target: targets::EXPANSION, position, hidden = span, "collapsed");
        if emit {
            let removed = if notify_children { direct } else { span };
            self.signals.emit_rows_removed(position + 1, removed);
            self.signals.emit_rows_changed(position, 1);
            self.signals.expansion_changed.emit((position, false));
        }
        span
    }

    /// Collapses every expanded row except `keep` and its ancestors.
    ///
    /// Returns the position of `keep` afterwards.
    pub(crate) fn collapse_others(&mut self, keep: usize) -> usize {
        let expanded = self.expanded_positions();
        let ancestors: Vec<usize> = expanded
            .iter()
            .copied()
            .filter(|&row| row < keep && keep <= row + self.descendant_rows(row))
            .collect();

        let mut current = keep;
        for row in expanded.into_iter().rev() {
            if row == keep || ancestors.contains(&row) || !self.is_expanded(row) {
                continue;
            }
            let hidden = self.collapse_row(row, true, true);
            if row < keep {
                current -= hidden;
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::config::AdapterConfig;
    use crate::error::Error;
    use crate::model::{BasicItem, Item, ItemAdapter};

    fn leaf(id: i64) -> Box<dyn Item> {
        BasicItem::new(id, 1).boxed()
    }

    fn folder(id: i64, children: Vec<Box<dyn Item>>) -> Box<dyn Item> {
        BasicItem::new(id, 0).with_sub_items(children).boxed()
    }

    fn ids(list: &CompositeAdapter) -> Vec<i64> {
        (0..list.item_count())
            .map(|position| list.item_id(position).unwrap())
            .collect()
    }

    /// `[A(a1, a2), B(b1(x)), C]`
    fn tree(config: AdapterConfig) -> CompositeAdapter {
        let mut list = CompositeAdapter::with_config(config);
        list.register_adapter(
            ItemAdapter::from_items(vec![
                folder(1, vec![leaf(11), leaf(12)]),
                folder(2, vec![folder(21, vec![leaf(211)])]),
                leaf(3),
            ]),
            0,
        );
        list
    }

    #[test]
    fn test_expand_and_collapse() {
        let mut list = tree(AdapterConfig::default());
        list.expand(0).unwrap();
        assert_eq!(ids(&list), vec![1, 11, 12, 2, 3]);
        assert!(list.is_expanded(0));
        assert_eq!(list.expanded_items(), vec![(0, 2)]);

        list.collapse(0, true).unwrap();
        assert_eq!(ids(&list), vec![1, 2, 3]);
        assert!(list.expanded_positions().is_empty());
        let children = list.item_at(0).unwrap().as_expandable().map(|e| e.sub_items().len());
        assert_eq!(children, Some(2));
    }

    #[test]
    fn test_expand_leaf_is_noop() {
        let mut list = tree(AdapterConfig::default());
        list.expand(2).unwrap();
        assert_eq!(list.item_count(), 3);
        assert_eq!(list.expand(3), Err(Error::invalid_position(3, 3)));
    }

    #[test]
    fn test_nested_collapse_cascades() {
        let mut list = tree(AdapterConfig::default());
        list.expand(1).unwrap();
        list.expand(2).unwrap();
        assert_eq!(ids(&list), vec![1, 2, 21, 211, 3]);
        assert_eq!(list.expanded_items(), vec![(1, 2), (2, 1)]);

        let removed = Arc::new(Mutex::new(Vec::new()));
        let sink = removed.clone();
        list.signals().rows_removed.connect(move |&range| sink.lock().push(range));

        list.collapse(1, false).unwrap();
        assert_eq!(ids(&list), vec![1, 2, 3]);
        assert_eq!(*removed.lock(), vec![(2, 2)]);
        assert!(list.expanded_positions().is_empty());

        list.expand(1).unwrap();
        assert_eq!(ids(&list), vec![1, 2, 21, 3]);
        assert!(!list.is_expanded(2));
    }

    #[test]
    fn test_nested_collapse_notifies_children() {
        let mut list = tree(AdapterConfig::default());
        list.expand(1).unwrap();
        list.expand(2).unwrap();

        let removed = Arc::new(Mutex::new(Vec::new()));
        let sink = removed.clone();
        list.signals().rows_removed.connect(move |&range| sink.lock().push(range));

        list.collapse(1, true).unwrap();
        assert_eq!(*removed.lock(), vec![(3, 1), (2, 1)]);
    }

    #[test]
    fn test_only_one_expanded() {
        let mut list = tree(AdapterConfig::default().with_only_one_expanded_item(true));
        list.expand(0).unwrap();
        assert_eq!(ids(&list), vec![1, 11, 12, 2, 3]);

        list.expand(3).unwrap();
        assert_eq!(ids(&list), vec![1, 2, 21, 3]);
        assert_eq!(list.expanded_positions(), vec![1]);

        // Expanding a child keeps its ancestor open.
        list.expand(2).unwrap();
        assert_eq!(ids(&list), vec![1, 2, 21, 211, 3]);
        assert_eq!(list.expanded_positions(), vec![1, 2]);
    }

    #[test]
    fn test_expansion_shifts_position_selection() {
        let mut list = tree(AdapterConfig::default().with_selectable(true));
        list.select(2).unwrap();
        list.expand(0).unwrap();
        assert_eq!(list.selected_positions(), vec![4]);
        assert_eq!(list.item_id(4), Ok(3));
    }

    #[test]
    fn test_position_mode_collapse_deselects_children() {
        let mut list = tree(AdapterConfig::default().with_selectable(true));
        list.expand(0).unwrap();
        list.select(1).unwrap();

        list.collapse(0, true).unwrap();
        assert!(list.selections().is_empty());

        list.expand(0).unwrap();
        assert!(!list.is_selected(1));
    }

    #[test]
    fn test_identifier_mode_collapse_keeps_child_flags() {
        let mut list = tree(
            AdapterConfig::default()
                .with_selectable(true)
                .with_position_based(false),
        );
        list.expand(0).unwrap();
        list.select(2).unwrap();

        list.collapse(0, true).unwrap();
        assert!(list.selections().is_empty());

        list.expand(0).unwrap();
        assert!(list.is_selected(2));
        assert_eq!(list.item_id(2), Ok(12));
    }

    #[test]
    fn test_collapse_all() {
        let mut list = tree(AdapterConfig::default());
        list.expand(1).unwrap();
        list.expand(2).unwrap();
        list.expand(0).unwrap();
        assert_eq!(list.item_count(), 7);

        list.collapse_all();
        assert_eq!(ids(&list), vec![1, 2, 3]);
    }

    #[test]
    fn test_toggle_expansion() {
        let mut list = tree(AdapterConfig::default());
        list.toggle_expansion(0).unwrap();
        assert!(list.is_expanded(0));
        list.toggle_expansion(0).unwrap();
        assert!(!list.is_expanded(0));
    }
}
