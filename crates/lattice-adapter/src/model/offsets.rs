//! The offset index mapping global positions to sub-collections.

use std::collections::BTreeMap;

/// Ordered map from start offset to order key.
///
/// Only non-empty sub-collections get an entry, so the entry with the largest
/// start offset `<= position` always owns `position`. Start offsets of every
/// sub-collection, empty ones included, are kept separately for
/// pre-item-count queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetIndex {
    starts: BTreeMap<usize, i32>,
    order_starts: BTreeMap<i32, usize>,
    total: usize,
}

impl OffsetIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index from `(order, item_count)` pairs in ascending order.
    pub fn rebuild(&mut self, counts: impl IntoIterator<Item = (i32, usize)>) {
        self.starts.clear();
        self.order_starts.clear();

        let mut offset = 0;
        for (order, count) in counts {
            self.order_starts.insert(order, offset);
            if count > 0 {
                self.starts.insert(offset, order);
                offset += count;
            }
        }
        self.total = offset;
    }

    /// Total number of rows.
    pub fn total(&self) -> usize {
        self.total
    }

    /// `(start, order)` of the sub-collection owning `position`.
    pub fn floor(&self, position: usize) -> Option<(usize, i32)> {
        if position >= self.total {
            return None;
        }
        self.starts
            .range(..=position)
            .next_back()
            .map(|(&start, &order)| (start, order))
    }

    /// Global start offset of the sub-collection registered under `order`.
    pub fn start_of(&self, order: i32) -> Option<usize> {
        self.order_starts.get(&order).copied()
    }

    /// Number of non-empty sub-collections.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Returns `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_skips_empty_collections() {
        let mut index = OffsetIndex::new();
        index.rebuild([(0, 3), (5, 0), (7, 2)]);

        assert_eq!(index.total(), 5);
        assert_eq!(index.len(), 2);
        assert_eq!(index.floor(0), Some((0, 0)));
        assert_eq!(index.floor(2), Some((0, 0)));
        assert_eq!(index.floor(3), Some((3, 7)));
        assert_eq!(index.floor(4), Some((3, 7)));
        assert_eq!(index.floor(5), None);
    }

    #[test]
    fn test_start_of_includes_empty_collections() {
        let mut index = OffsetIndex::new();
        index.rebuild([(-1, 2), (0, 0), (1, 4)]);

        assert_eq!(index.start_of(-1), Some(0));
        assert_eq!(index.start_of(0), Some(2));
        assert_eq!(index.start_of(1), Some(2));
        assert_eq!(index.start_of(2), None);
    }

    #[test]
    fn test_empty_index() {
        let index = OffsetIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.floor(0), None);
    }
}
