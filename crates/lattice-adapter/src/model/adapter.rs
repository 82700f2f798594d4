//! Sub-collections: ordered lists of items registered with the engine.

use super::item::Item;

/// An ordered list of items contributing a contiguous run of rows.
///
/// The engine owns registered sub-collections and performs every mutation
/// through this trait, so it always knows when counts change. Implementors
/// can rely on the engine passing in-range positions; the structural methods
/// may panic otherwise.
pub trait Adapter: Send + Sync {
    /// Number of items in this sub-collection.
    fn adapter_item_count(&self) -> usize;

    /// The item at a local position.
    fn adapter_item(&self, position: usize) -> Option<&dyn Item>;

    /// Mutable access to the item at a local position.
    fn adapter_item_mut(&mut self, position: usize) -> Option<&mut dyn Item>;

    /// Local position of the first item with the identifier.
    fn adapter_position(&self, identifier: i64) -> Option<usize> {
        (0..self.adapter_item_count()).find(|&position| {
            self.adapter_item(position)
                .is_some_and(|item| item.identifier() == identifier)
        })
    }

    /// Inserts items before `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position > adapter_item_count()`.
    fn insert_items(&mut self, position: usize, items: Vec<Box<dyn Item>>);

    /// Removes `count` items starting at `position` and returns them.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the item count.
    fn remove_items(&mut self, position: usize, count: usize) -> Vec<Box<dyn Item>>;

    /// Replaces the item at `position`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `position >= adapter_item_count()`.
    fn replace_item(&mut self, position: usize, item: Box<dyn Item>) -> Box<dyn Item>;

    /// Returns `true` when the sub-collection has no items.
    fn is_empty(&self) -> bool {
        self.adapter_item_count() == 0
    }
}

/// A `Vec`-backed sub-collection.
///
/// # Example
///
/// ```
/// use lattice_adapter::model::{Adapter, BasicItem, ItemAdapter};
///
/// let adapter: ItemAdapter = (0..3).map(|id| BasicItem::new(id, 0).boxed()).collect();
/// assert_eq!(adapter.adapter_item_count(), 3);
/// assert_eq!(adapter.adapter_position(2), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ItemAdapter {
    items: Vec<Box<dyn Item>>,
}

impl ItemAdapter {
    /// Creates an empty sub-collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sub-collection holding the given items.
    pub fn from_items(items: Vec<Box<dyn Item>>) -> Self {
        Self { items }
    }

    /// The items, in order.
    pub fn items(&self) -> &[Box<dyn Item>] {
        &self.items
    }
}

impl FromIterator<Box<dyn Item>> for ItemAdapter {
    fn from_iter<I: IntoIterator<Item = Box<dyn Item>>>(iter: I) -> Self {
        Self::from_items(iter.into_iter().collect())
    }
}

impl Adapter for ItemAdapter {
    fn adapter_item_count(&self) -> usize {
        self.items.len()
    }

    fn adapter_item(&self, position: usize) -> Option<&dyn Item> {
        self.items.get(position).map(|item| item.as_ref())
    }

    fn adapter_item_mut(&mut self, position: usize) -> Option<&mut dyn Item> {
        match self.items.get_mut(position) {
            Some(item) => Some(item.as_mut()),
            None => None,
        }
    }

    fn insert_items(&mut self, position: usize, items: Vec<Box<dyn Item>>) {
        self.items.splice(position..position, items);
    }

    fn remove_items(&mut self, position: usize, count: usize) -> Vec<Box<dyn Item>> {
        self.items.drain(position..position + count).collect()
    }

    fn replace_item(&mut self, position: usize, item: Box<dyn Item>) -> Box<dyn Item> {
        std::mem::replace(&mut self.items[position], item)
    }
}
