//! Selection and expansion bookkeeping.
//!
//! Both are keyed by [`StateKey`]. Position keys move with structural edits:
//! [`rows_inserted`](SelectionSet::rows_inserted) and
//! [`rows_removed`](SelectionSet::rows_removed) shift them so they keep
//! pointing at the same rows. Identifier keys never need shifting.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Key of a selection or expansion entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StateKey {
    /// A global row position.
    Position(usize),
    /// An item identifier.
    Identifier(i64),
}

impl StateKey {
    /// The position, for position keys.
    pub fn position(self) -> Option<usize> {
        match self {
            Self::Position(position) => Some(position),
            Self::Identifier(_) => None,
        }
    }

    /// The identifier, for identifier keys.
    pub fn identifier(self) -> Option<i64> {
        match self {
            Self::Identifier(identifier) => Some(identifier),
            Self::Position(_) => None,
        }
    }

    fn shifted_for_insert(self, first: usize, count: usize) -> Self {
        match self {
            Self::Position(p) if p >= first => Self::Position(p + count),
            key => key,
        }
    }

    /// `None` when the key pointed into the removed range.
    fn shifted_for_remove(self, first: usize, count: usize) -> Option<Self> {
        match self {
            Self::Position(p) if p >= first + count => Some(Self::Position(p - count)),
            Self::Position(p) if p >= first => None,
            key => Some(key),
        }
    }
}

/// The set of selected keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    keys: BTreeSet<StateKey>,
}

impl SelectionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key. Returns `true` if it was not present.
    pub fn insert(&mut self, key: StateKey) -> bool {
        self.keys.insert(key)
    }

    /// Removes a key. Returns `true` if it was present.
    pub fn remove(&mut self, key: StateKey) -> bool {
        self.keys.remove(&key)
    }

    pub fn contains(&self, key: StateKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The keys in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StateKey> + '_ {
        self.keys.iter().copied()
    }

    /// The underlying ordered set.
    pub fn keys(&self) -> &BTreeSet<StateKey> {
        &self.keys
    }

    /// Removes every key and returns them.
    pub fn clear(&mut self) -> Vec<StateKey> {
        std::mem::take(&mut self.keys).into_iter().collect()
    }

    /// Shifts position keys at or after `first` by `count`.
    pub fn rows_inserted(&mut self, first: usize, count: usize) {
        if count == 0 {
            return;
        }
        self.keys = self
            .keys
            .iter()
            .map(|key| key.shifted_for_insert(first, count))
            .collect();
    }

    /// Drops position keys inside the removed range and shifts those after it.
    ///
    /// Returns the dropped keys.
    pub fn rows_removed(&mut self, first: usize, count: usize) -> Vec<StateKey> {
        if count == 0 {
            return Vec::new();
        }
        let mut dropped = Vec::new();
        let mut kept = BTreeSet::new();
        for key in &self.keys {
            match key.shifted_for_remove(first, count) {
                Some(shifted) => {
                    kept.insert(shifted);
                }
                None => dropped.push(*key),
            }
        }
        self.keys = kept;
        dropped
    }
}

/// Expanded keys mapped to the number of direct children they contributed.
///
/// The flattened span of an expanded row is its direct child count plus the
/// spans of its expanded children, computed by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionMap {
    entries: BTreeMap<StateKey, usize>,
}

impl ExpansionMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an expansion.
    pub fn insert(&mut self, key: StateKey, direct_children: usize) {
        self.entries.insert(key, direct_children);
    }

    /// Removes an expansion, returning its direct child count.
    pub fn remove(&mut self, key: StateKey) -> Option<usize> {
        self.entries.remove(&key)
    }

    /// The direct child count of an expanded key.
    pub fn get(&self, key: StateKey) -> Option<usize> {
        self.entries.get(&key).copied()
    }

    pub fn contains(&self, key: StateKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(key, direct_children)` pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (StateKey, usize)> + '_ {
        self.entries.iter().map(|(&key, &count)| (key, count))
    }

    /// Adds `delta` to the direct child count of `key`, saturating at zero.
    pub fn adjust(&mut self, key: StateKey, delta: isize) {
        if let Some(count) = self.entries.get_mut(&key) {
            *count = count.saturating_add_signed(delta);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Shifts position keys at or after `first` by `count`.
    pub fn rows_inserted(&mut self, first: usize, count: usize) {
        if count == 0 {
            return;
        }
        self.entries = self
            .entries
            .iter()
            .map(|(key, &children)| (key.shifted_for_insert(first, count), children))
            .collect();
    }

    /// Drops position keys inside the removed range and shifts those after it.
    pub fn rows_removed(&mut self, first: usize, count: usize) {
        if count == 0 {
            return;
        }
        self.entries = self
            .entries
            .iter()
            .filter_map(|(key, &children)| {
                key.shifted_for_remove(first, count)
                    .map(|shifted| (shifted, children))
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(set: &SelectionSet) -> Vec<usize> {
        set.iter().filter_map(StateKey::position).collect()
    }

    #[test]
    fn test_selection_shifts_on_insert() {
        let mut set = SelectionSet::new();
        set.insert(StateKey::Position(1));
        set.insert(StateKey::Position(4));

        set.rows_inserted(2, 3);
        assert_eq!(positions(&set), vec![1, 7]);

        set.rows_inserted(1, 1);
        assert_eq!(positions(&set), vec![2, 8]);
    }

    #[test]
    fn test_selection_drops_removed_rows() {
        let mut set = SelectionSet::new();
        for p in [0, 2, 3, 6] {
            set.insert(StateKey::Position(p));
        }

        let dropped = set.rows_removed(2, 2);
        assert_eq!(dropped, vec![StateKey::Position(2), StateKey::Position(3)]);
        assert_eq!(positions(&set), vec![0, 4]);
    }

    #[test]
    fn test_identifier_keys_do_not_shift() {
        let mut set = SelectionSet::new();
        set.insert(StateKey::Identifier(5));
        set.rows_inserted(0, 10);
        assert!(set.rows_removed(0, 10).is_empty());
        assert!(set.contains(StateKey::Identifier(5)));
    }

    #[test]
    fn test_expansion_map_shifts_and_adjusts() {
        let mut map = ExpansionMap::new();
        map.insert(StateKey::Position(0), 2);
        map.insert(StateKey::Position(5), 1);

        map.rows_inserted(3, 2);
        assert_eq!(map.get(StateKey::Position(7)), Some(1));

        map.rows_removed(6, 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(StateKey::Position(0)), Some(2));

        map.adjust(StateKey::Position(0), -5);
        assert_eq!(map.get(StateKey::Position(0)), Some(0));
        map.adjust(StateKey::Position(0), 3);
        assert_eq!(map.get(StateKey::Position(0)), Some(3));
    }

    #[test]
    fn test_clear_returns_keys() {
        let mut set = SelectionSet::new();
        set.insert(StateKey::Identifier(2));
        set.insert(StateKey::Identifier(1));
        assert_eq!(set.clear(), vec![StateKey::Identifier(1), StateKey::Identifier(2)]);
        assert!(set.is_empty());
    }
}
