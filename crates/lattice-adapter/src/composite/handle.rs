//! Mutable access to one registered sub-collection.

use lattice_adapter_core::logging::targets;

use super::CompositeAdapter;
use crate::error::{Error, Result};
use crate::model::{Item, StateKey};

impl CompositeAdapter {
    /// A handle for editing the sub-collection registered under `order`.
    ///
    /// All edits made through the handle keep the offsets, selection and
    /// expansion state consistent and emit the matching signals.
    pub fn item_adapter(&mut self, order: i32) -> Result<ItemAdapterHandle<'_>> {
        if !self.adapters.contains_key(&order) {
            return Err(Error::UnknownOrder(order));
        }
        Ok(ItemAdapterHandle { list: self, order })
    }
}

/// Edits one sub-collection through its owning [`CompositeAdapter`].
///
/// Positions taken by the handle are local to the sub-collection.
///
/// Rows inserted inside the flattened children of an expanded row become
/// children of the innermost such row. Removing an expanded row collapses it
/// first, so its children go with it.
///
/// # Example
///
/// ```
/// use lattice_adapter::prelude::*;
///
/// let mut list = CompositeAdapter::new();
/// list.register_adapter(ItemAdapter::new(), 0);
///
/// let mut items = list.item_adapter(0).unwrap();
/// items.add(vec![BasicItem::new(1, 0).boxed(), BasicItem::new(2, 0).boxed()]).unwrap();
/// items.add_at(1, vec![BasicItem::new(3, 0).boxed()]).unwrap();
/// assert_eq!(items.adapter_item_count(), 3);
///
/// assert_eq!(list.item_id(1), Ok(3));
/// ```
#[derive(Debug)]
pub struct ItemAdapterHandle<'a> {
    list: &'a mut CompositeAdapter,
    order: i32,
}

impl ItemAdapterHandle<'_> {
    /// Order key of the sub-collection.
    pub fn order(&self) -> i32 {
        self.order
    }

    /// The owning engine.
    pub fn list(&self) -> &CompositeAdapter {
        self.list
    }

    /// Total number of rows of the owning engine.
    pub fn item_count(&self) -> usize {
        self.list.item_count()
    }

    /// Number of items in this sub-collection.
    pub fn adapter_item_count(&self) -> usize {
        self.list
            .adapter(self.order)
            .map_or(0, |adapter| adapter.adapter_item_count())
    }

    /// Global position of a local position.
    pub fn global_position(&self, position: usize) -> usize {
        self.list.pre_item_count_by_order(self.order) + position
    }

    /// The item at a local position.
    pub fn adapter_item(&self, position: usize) -> Option<&dyn Item> {
        self.list
            .adapter(self.order)
            .and_then(|adapter| adapter.adapter_item(position))
    }

    /// Replaces every item, reporting the difference as changed, inserted
    /// and removed rows.
    pub fn set_items(&mut self, items: Vec<Box<dyn Item>>) -> Result<()> {
        let first = self.global_position(0);
        let previous = self.replace_all(items)?;
        let current = self.adapter_item_count();

        let signals = &self.list.signals;
        if current > previous {
            signals.emit_rows_changed(first, previous);
            signals.emit_rows_inserted(first + previous, current - previous);
        } else {
            signals.emit_rows_changed(first, current);
            signals.emit_rows_removed(first + current, previous - current);
        }
        Ok(())
    }

    /// Replaces every item and reports a full data set change.
    pub fn set_new_list(&mut self, items: Vec<Box<dyn Item>>) -> Result<()> {
        self.replace_all(items)?;
        self.list.signals.data_set_changed.emit(());
        Ok(())
    }

    /// Appends items.
    pub fn add(&mut self, items: Vec<Box<dyn Item>>) -> Result<()> {
        let end = self.adapter_item_count();
        self.insert_rows(end, items, true).map(|_| ())
    }

    /// Inserts items before a local position.
    pub fn add_at(&mut self, position: usize, items: Vec<Box<dyn Item>>) -> Result<()> {
        let count = self.adapter_item_count();
        if position > count {
            return Err(Error::invalid_position(position, count));
        }
        self.insert_rows(position, items, true).map(|_| ())
    }

    /// Replaces the item at a local position, returning the previous one.
    ///
    /// An expanded row is collapsed first, so the returned item holds its
    /// children again.
    pub fn set(&mut self, position: usize, item: Box<dyn Item>) -> Result<Box<dyn Item>> {
        self.check(position)?;
        let global = self.global_position(position);
        if self.list.is_expanded(global) {
            self.list.collapse_row(global, true, true);
        }

        let old_key = self.list.state_key(global).ok();
        self.list.types.register_tree(item.as_ref());
        let previous = self
            .list
            .adapters
            .get_mut(&self.order)
            .ok_or(Error::UnknownOrder(self.order))?
            .replace_item(position, item);
        self.list.generation = self.list.generation.wrapping_add(1);

        if let Some(key) = old_key
            && self.list.selection.remove(key)
        {
            self.list.signals.emit_selection_changed(Vec::new(), vec![key]);
        }
        self.list.adopt_flags(global, 1);
        self.list.signals.emit_rows_changed(global, 1);
        Ok(previous)
    }

    /// Removes the item at a local position.
    pub fn remove(&mut self, position: usize) -> Result<Box<dyn Item>> {
        self.check(position)?;
        self.remove_rows(position, 1, true)?
            .pop()
            .ok_or_else(|| Error::invalid_position(position, self.adapter_item_count()))
    }

    /// Removes `count` items starting at a local position.
    pub fn remove_range(&mut self, position: usize, count: usize) -> Result<Vec<Box<dyn Item>>> {
        let available = self.adapter_item_count();
        if position > available {
            return Err(Error::invalid_position(position, available));
        }
        if count > available - position {
            return Err(Error::invalid_position(position + count - 1, available));
        }
        self.remove_rows(position, count, true)
    }

    /// Removes every item.
    pub fn clear(&mut self) -> Result<Vec<Box<dyn Item>>> {
        let count = self.adapter_item_count();
        self.remove_rows(0, count, true)
    }

    /// Moves a draggable item. Returns `false` if the item is not draggable.
    ///
    /// An expanded item is collapsed before it moves.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<bool> {
        self.check(from)?;
        self.check(to)?;
        let draggable = self
            .adapter_item(from)
            .and_then(|item| item.as_draggable())
            .is_some_and(|draggable| draggable.is_draggable());
        if !draggable {
            tracing::debug!(target: targets::REGISTRY, from, "item is not draggable");
            return Ok(false);
        }

        let global_from = self.global_position(from);
        let mut to = to;
        if self.list.is_expanded(global_from) {
            let hidden = self.list.collapse_row(global_from, true, true);
            if to > from + hidden {
                to -= hidden;
            } else if to > from {
                to = from;
            }
        }
        if from == to {
            return Ok(true);
        }

        let moved = self.remove_rows(from, 1, false)?;
        let global_to = self.insert_rows(to, moved, false)?;
        self.list.signals.row_moved.emit((global_from, global_to));
        Ok(true)
    }

    /// Mutates the item at a local position in place.
    ///
    /// Selection state follows the item's selected flag afterwards, and the
    /// row is reported as changed.
    pub fn modify<R>(&mut self, position: usize, f: impl FnOnce(&mut dyn Item) -> R) -> Result<R> {
        self.check(position)?;
        let global = self.global_position(position);
        let key_before = self.list.state_key(global).ok();

        let result = f(self.list.item_at_mut(global)?);

        let flagged = self.list.item_at(global)?.is_selected();
        let key_after = self.list.state_key(global).ok();
        let mut selected = Vec::new();
        let mut deselected = Vec::new();

        if let Some(before) = key_before {
            if (key_after != key_before || !flagged) && self.list.selection.remove(before) {
                deselected.push(before);
            }
            if key_after != key_before
                && let Some(direct) = self.list.expansion.remove(before)
                && let Some(after) = key_after
            {
                self.list.expansion.insert(after, direct);
            }
        }
        match key_after {
            Some(key) if flagged => {
                if self.list.selection.insert(key) {
                    selected.push(key);
                }
            }
            None if flagged => {
                self.list.item_at_mut(global)?.set_selected(false);
            }
            _ => {}
        }

        self.list.signals.emit_selection_changed(selected, deselected);
        self.list.signals.emit_rows_changed(global, 1);
        Ok(result)
    }

    /// Replaces the children of an expandable item.
    ///
    /// Returns `false` if the item is not expandable. An expanded item is
    /// collapsed first.
    pub fn set_sub_items(&mut self, position: usize, sub_items: Vec<Box<dyn Item>>) -> Result<bool> {
        self.check(position)?;
        let expandable = self
            .adapter_item(position)
            .is_some_and(|item| item.as_expandable().is_some());
        if !expandable {
            return Ok(false);
        }

        let global = self.global_position(position);
        if self.list.is_expanded(global) {
            self.list.collapse_row(global, true, true);
        }
        for item in &sub_items {
            self.list.types.register_tree(item.as_ref());
        }
        if let Some(expandable) = self.list.item_at_mut(global)?.as_expandable_mut() {
            expandable.set_sub_items(sub_items);
        }
        self.list.signals.emit_rows_changed(global, 1);
        Ok(true)
    }

    fn check(&self, position: usize) -> Result<()> {
        let count = self.adapter_item_count();
        if position < count {
            Ok(())
        } else {
            Err(Error::invalid_position(position, count))
        }
    }

    /// Collapses expanded rows in `[first, end)`, returning the adjusted end.
    fn collapse_range(&mut self, first: usize, end: usize) -> usize {
        let expanded: Vec<usize> = self
            .list
            .expanded_positions()
            .into_iter()
            .filter(|&row| row >= first && row < end)
            .rev()
            .collect();

        let mut end = end;
        for row in expanded {
            if self.list.is_expanded(row) {
                let hidden = self.list.collapse_row(row, true, true);
                end -= hidden.min(end - row - 1);
            }
        }
        end
    }

    fn insert_rows(&mut self, position: usize, items: Vec<Box<dyn Item>>, emit: bool) -> Result<usize> {
        let first = self.global_position(position);
        let count = items.len();
        if count == 0 {
            return Ok(first);
        }

        if let Some(parent) = self.list.enclosing_expansion(first) {
            let key = self.list.state_key(parent)?;
            self.list.expansion.adjust(key, count as isize);
        }
        self.list.splice_in(self.order, position, items)?;

        tracing::trace!(target: targets::REGISTRY, order = self.order, first, count, "rows inserted");
        if emit {
            self.list.signals.emit_rows_inserted(first, count);
        }
        Ok(first)
    }

    fn remove_rows(&mut self, position: usize, count: usize, emit: bool) -> Result<Vec<Box<dyn Item>>> {
        let first = self.global_position(position);
        let end = self.collapse_range(first, first + count);

        let mut shrink: Vec<(StateKey, usize)> = Vec::new();
        for row in self.list.expanded_positions() {
            if row >= first {
                break;
            }
            let hit = self
                .list
                .direct_child_rows(row)
                .into_iter()
                .filter(|child| (first..end).contains(child))
                .count();
            if hit > 0 {
                shrink.push((self.list.state_key(row)?, hit));
            }
        }
        for (key, hit) in shrink {
            self.list.expansion.adjust(key, -(hit as isize));
        }

        let removed = self.list.splice_out(self.order, position, end - first)?;
        tracing::trace!(target: targets::REGISTRY, order = self.order, first, count = end - first, "rows removed");
        if emit {
            self.list.signals.emit_rows_removed(first, end - first);
        }
        Ok(removed)
    }

    /// Swaps in new items, returning how many items were replaced.
    fn replace_all(&mut self, items: Vec<Box<dyn Item>>) -> Result<usize> {
        let first = self.global_position(0);
        self.collapse_range(first, first + self.adapter_item_count());

        let previous = self.adapter_item_count();
        self.list.splice_out(self.order, 0, previous)?;
        self.list.splice_in(self.order, 0, items)?;
        Ok(previous)
    }
}
