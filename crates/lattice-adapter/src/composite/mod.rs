//! The composite adapter engine.
//!
//! [`CompositeAdapter`] presents any number of ordered sub-collections as one
//! flattened list. It owns them, keeps an offset index mapping global
//! positions to `(sub-collection, local position)`, and layers selection,
//! expansion, click dispatch and state persistence on top.
//!
//! Every structural change goes through the engine (directly or through an
//! [`ItemAdapterHandle`]), which rebuilds the offsets, shifts position-keyed
//! state and emits [`ListSignals`] before returning.

mod dispatch;
mod expansion;
mod handle;
mod persistence;
mod selection;
mod view;

pub use dispatch::{
    ClickContext, ClickListener, DispatchOutcome, TouchAction, TouchEvent, TouchListener,
};
pub use handle::ItemAdapterHandle;
pub use persistence::{EXPANDED_KEY, MemoryStateStore, SELECTIONS_KEY, StateSnapshot, StateStore};
pub use view::ViewHost;

use std::collections::BTreeMap;
use std::fmt;

use lattice_adapter_core::PerfSpan;
use lattice_adapter_core::logging::{span_names, targets};

use crate::config::AdapterConfig;
use crate::error::{Error, Result};
use crate::model::{
    Adapter, ExpansionMap, Item, ListSignals, OffsetIndex, SelectionSet, StateKey, TypeRegistry,
    ViewType,
};
use dispatch::Listeners;

/// A global position resolved to its sub-collection.
#[derive(Clone, Copy)]
pub struct RelativeInfo<'a> {
    /// The owning sub-collection.
    pub adapter: &'a dyn Adapter,
    /// Its order key.
    pub order: i32,
    /// The item at the position.
    pub item: &'a dyn Item,
    /// Position inside the sub-collection.
    pub local_position: usize,
}

impl fmt::Debug for RelativeInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelativeInfo")
            .field("order", &self.order)
            .field("item", &self.item)
            .field("local_position", &self.local_position)
            .finish()
    }
}

/// A flattened view over ordered sub-collections.
///
/// # Example
///
/// ```
/// use lattice_adapter::prelude::*;
///
/// let mut list = CompositeAdapter::new();
/// list.register_adapter(ItemAdapter::from_items(vec![BasicItem::new(100, 0).boxed()]), -1);
/// list.register_adapter(
///     (1..=3).map(|id| BasicItem::new(id, 1).boxed()).collect::<ItemAdapter>(),
///     0,
/// );
///
/// assert_eq!(list.item_count(), 4);
/// assert_eq!(list.item_at(1).map(|item| item.identifier()), Ok(1));
/// assert_eq!(list.pre_item_count_by_order(0), 1);
/// ```
pub struct CompositeAdapter {
    adapters: BTreeMap<i32, Box<dyn Adapter>>,
    offsets: OffsetIndex,
    types: TypeRegistry,
    config: AdapterConfig,
    selection: SelectionSet,
    expansion: ExpansionMap,
    listeners: Listeners,
    signals: ListSignals,
    /// Bumped on every structural change.
    generation: u64,
}

impl Default for CompositeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompositeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeAdapter")
            .field("orders", &self.adapters.keys().collect::<Vec<_>>())
            .field("item_count", &self.item_count())
            .field("view_types", &self.types.len())
            .field("config", &self.config)
            .field("selection", &self.selection)
            .field("expansion", &self.expansion)
            .finish_non_exhaustive()
    }
}

impl CompositeAdapter {
    /// Creates an empty engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(AdapterConfig::default())
    }

    /// Creates an empty engine.
    pub fn with_config(config: AdapterConfig) -> Self {
        Self {
            adapters: BTreeMap::new(),
            offsets: OffsetIndex::new(),
            types: TypeRegistry::new(),
            config,
            selection: SelectionSet::new(),
            expansion: ExpansionMap::new(),
            listeners: Listeners::default(),
            signals: ListSignals::new(),
            generation: 0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> AdapterConfig {
        self.config
    }

    /// Replaces the configuration.
    ///
    /// Switching between position and identifier keys re-keys the current
    /// selection and expansion state. Rows without an identifier cannot hold
    /// identifier-keyed state: they are collapsed and deselected.
    pub fn set_config(&mut self, config: AdapterConfig) {
        if config.position_based == self.config.position_based {
            self.config = config;
            return;
        }

        if !config.position_based {
            for position in self.expanded_positions().into_iter().rev() {
                if self.item_at(position).is_ok_and(|item| !item.has_identifier()) {
                    self.collapse_row(position, true, true);
                }
            }
        }

        let selected = self.selected_positions();
        let expanded: Vec<(usize, usize)> = self
            .expansion
            .iter()
            .filter_map(|(key, direct)| self.resolve_key(key).map(|position| (position, direct)))
            .collect();

        self.config = config;
        self.selection = SelectionSet::new();
        self.expansion.clear();

        for position in selected {
            match self.state_key(position) {
                Ok(key) => {
                    self.selection.insert(key);
                }
                Err(_) => {
                    if let Ok(item) = self.item_at_mut(position) {
                        item.set_selected(false);
                    }
                }
            }
        }
        for (position, direct) in expanded {
            if let Ok(key) = self.state_key(position) {
                self.expansion.insert(key, direct);
            }
        }

        lattice_adapter_core::adapter_debug!(
            targets::REGISTRY,
            position_based = config.position_based,
            "state keys rebuilt"
        );
        self.signals.data_set_changed.emit(());
    }

    /// Change notifications.
    pub fn signals(&self) -> &ListSignals {
        &self.signals
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a sub-collection under `order`, taking ownership of it.
    ///
    /// Returns `false` and leaves everything untouched if the order key is
    /// already taken. The sub-collection's items get their view types
    /// registered and its rows are reported as inserted.
    pub fn register_adapter<A: Adapter + 'static>(&mut self, adapter: A, order: i32) -> bool {
        if self.adapters.contains_key(&order) {
            tracing::debug!(target: targets::REGISTRY, order, "order key already registered");
            return false;
        }

        let count = adapter.adapter_item_count();
        for local in 0..count {
            if let Some(item) = adapter.adapter_item(local) {
                self.types.register_tree(item);
            }
        }
        self.adapters.insert(order, Box::new(adapter));
        self.rebuild_offsets();

        let first = self.pre_item_count_by_order(order);
        self.after_rows_inserted(first, count);
        tracing::debug!(target: targets::REGISTRY, order, first, count, "registered sub-collection");
        self.signals.emit_rows_inserted(first, count);
        true
    }

    /// Registers the item's view type. Returns `false` if it was known.
    pub fn register_type(&mut self, item: &dyn Item) -> bool {
        self.types.register(item)
    }

    /// The prototype item registered for `view_type`.
    pub fn prototype(&self, view_type: ViewType) -> Result<&dyn Item> {
        self.types.prototype(view_type)
    }

    /// Order keys of the registered sub-collections, ascending.
    pub fn orders(&self) -> impl Iterator<Item = i32> + '_ {
        self.adapters.keys().copied()
    }

    /// The sub-collection registered under `order`.
    pub fn adapter(&self, order: i32) -> Option<&dyn Adapter> {
        self.adapters.get(&order).map(|adapter| adapter.as_ref() as &dyn Adapter)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Total number of rows.
    pub fn item_count(&self) -> usize {
        self.offsets.total()
    }

    /// Returns `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// The item at a global position.
    pub fn item_at(&self, position: usize) -> Result<&dyn Item> {
        let (order, local) = self.locate(position)?;
        self.adapters
            .get(&order)
            .and_then(|adapter| adapter.adapter_item(local))
            .ok_or_else(|| Error::invalid_position(position, self.item_count()))
    }

    /// The sub-collection owning a global position.
    pub fn adapter_at(&self, position: usize) -> Result<&dyn Adapter> {
        let (order, _) = self.locate(position)?;
        self.adapter(order)
            .ok_or_else(|| Error::invalid_position(position, self.item_count()))
    }

    /// The order key of the sub-collection owning a global position.
    pub fn order_at(&self, position: usize) -> Result<i32> {
        self.locate(position).map(|(order, _)| order)
    }

    /// Resolves a global position to sub-collection, order, item and local position.
    pub fn relative_info(&self, position: usize) -> Option<RelativeInfo<'_>> {
        let (start, order) = self.offsets.floor(position)?;
        let adapter = self.adapters.get(&order)?;
        let local_position = position - start;
        let item = adapter.adapter_item(local_position)?;
        Some(RelativeInfo {
            adapter: adapter.as_ref(),
            order,
            item,
            local_position,
        })
    }

    /// Global position of the item, matched by identifier.
    ///
    /// Sub-collections with a negative order key are not searched, though
    /// their rows still count towards the returned position.
    pub fn position_of(&self, item: &dyn Item) -> Result<Option<usize>> {
        self.position_of_identifier(item.identifier())
    }

    /// Global position of the first item with `identifier`.
    ///
    /// Searches the same sub-collections as [`position_of`](Self::position_of).
    pub fn position_of_identifier(&self, identifier: i64) -> Result<Option<usize>> {
        if identifier < 0 {
            lattice_adapter_core::adapter_warn!(targets::REGISTRY, identifier, "lookup without identifier");
            return Err(Error::MissingIdentifier);
        }
        Ok(self.find_identifier(identifier, false))
    }

    /// View type of the item at a global position.
    pub fn item_view_type(&self, position: usize) -> Result<ViewType> {
        self.item_at(position).map(|item| item.view_type())
    }

    /// Identifier of the item at a global position.
    pub fn item_id(&self, position: usize) -> Result<i64> {
        self.item_at(position).map(|item| item.identifier())
    }

    /// Rows contributed by sub-collections ordered before `order`.
    ///
    /// `order` does not need to be registered.
    pub fn pre_item_count_by_order(&self, order: i32) -> usize {
        self.offsets.start_of(order).unwrap_or_else(|| {
            self.adapters
                .range(..order)
                .map(|(_, adapter)| adapter.adapter_item_count())
                .sum()
        })
    }

    /// Rows before the sub-collection owning `position`.
    pub fn pre_item_count(&self, position: usize) -> Result<usize> {
        self.offsets
            .floor(position)
            .map(|(start, _)| start)
            .ok_or_else(|| Error::invalid_position(position, self.item_count()))
    }

    // =========================================================================
    // Internal plumbing
    // =========================================================================

    /// `(order, local position)` for a global position.
    pub(crate) fn locate(&self, position: usize) -> Result<(i32, usize)> {
        self.offsets
            .floor(position)
            .map(|(start, order)| (order, position - start))
            .ok_or_else(|| Error::invalid_position(position, self.item_count()))
    }

    pub(crate) fn item_at_mut(&mut self, position: usize) -> Result<&mut dyn Item> {
        let item_count = self.item_count();
        let (order, local) = self.locate(position)?;
        self.adapters
            .get_mut(&order)
            .and_then(|adapter| adapter.adapter_item_mut(local))
            .ok_or(Error::invalid_position(position, item_count))
    }

    /// Scans every sub-collection, or only non-negative orders.
    fn find_identifier(&self, identifier: i64, include_negative: bool) -> Option<usize> {
        let mut offset = 0;
        for (&order, adapter) in &self.adapters {
            if (include_negative || order >= 0)
                && let Some(local) = adapter.adapter_position(identifier)
            {
                return Some(offset + local);
            }
            offset += adapter.adapter_item_count();
        }
        None
    }

    /// The selection/expansion key of the row at `position`.
    pub(crate) fn state_key(&self, position: usize) -> Result<StateKey> {
        let item = self.item_at(position)?;
        if self.config.position_based {
            Ok(StateKey::Position(position))
        } else if item.has_identifier() {
            Ok(StateKey::Identifier(item.identifier()))
        } else {
            Err(Error::MissingIdentifier)
        }
    }

    /// Current position of the row a key refers to.
    pub(crate) fn resolve_key(&self, key: StateKey) -> Option<usize> {
        match key {
            StateKey::Position(position) => (position < self.item_count()).then_some(position),
            StateKey::Identifier(identifier) => self.find_identifier(identifier, true),
        }
    }

    fn rebuild_offsets(&mut self) {
        let _perf = PerfSpan::new(span_names::REBUILD_OFFSETS);
        self.generation = self.generation.wrapping_add(1);
        self.offsets.rebuild(
            self.adapters
                .iter()
                .map(|(&order, adapter)| (order, adapter.adapter_item_count())),
        );
        tracing::trace!(target: targets::OFFSETS, total = self.offsets.total(), "offsets rebuilt");
    }

    /// Shifts state for new rows and adopts their item flags.
    fn after_rows_inserted(&mut self, first: usize, count: usize) {
        if count == 0 {
            return;
        }
        if self.config.position_based {
            self.selection.rows_inserted(first, count);
            self.expansion.rows_inserted(first, count);
        }
        self.adopt_flags(first, count);
    }

    /// Brings the state of new rows in line with their item flags.
    ///
    /// New rows always start collapsed; a selected flag becomes a selection
    /// entry, or is cleared if the row cannot be keyed.
    fn adopt_flags(&mut self, first: usize, count: usize) {
        let mut flagged = Vec::new();
        for position in first..first + count {
            let Ok(item) = self.item_at_mut(position) else {
                continue;
            };
            if let Some(expandable) = item.as_expandable_mut()
                && expandable.is_expanded()
            {
                expandable.set_expanded(false);
            }
            if item.is_selected() {
                flagged.push(position);
            }
        }

        let mut selected = Vec::new();
        for position in flagged {
            match self.state_key(position) {
                Ok(key) => {
                    if self.selection.insert(key) {
                        selected.push(key);
                    }
                }
                Err(_) => {
                    if let Ok(item) = self.item_at_mut(position) {
                        item.set_selected(false);
                    }
                }
            }
        }
        self.signals.emit_selection_changed(selected, Vec::new());
    }

    /// Inserts items into a sub-collection without emitting row signals.
    ///
    /// Returns the global position of the first inserted row.
    pub(crate) fn splice_in(
        &mut self,
        order: i32,
        local: usize,
        items: Vec<Box<dyn Item>>,
    ) -> Result<usize> {
        let first = self.pre_item_count_by_order(order) + local;
        let count = items.len();
        for item in &items {
            self.types.register_tree(item.as_ref());
        }
        self.adapters
            .get_mut(&order)
            .ok_or(Error::UnknownOrder(order))?
            .insert_items(local, items);
        self.rebuild_offsets();
        self.after_rows_inserted(first, count);
        Ok(first)
    }

    /// Removes items from a sub-collection without emitting row signals.
    ///
    /// State keyed to the removed rows is dropped.
    pub(crate) fn splice_out(
        &mut self,
        order: i32,
        local: usize,
        count: usize,
    ) -> Result<Vec<Box<dyn Item>>> {
        let first = self.pre_item_count_by_order(order) + local;
        let keys: Vec<StateKey> = (first..first + count)
            .filter_map(|position| self.state_key(position).ok())
            .collect();

        let removed = self
            .adapters
            .get_mut(&order)
            .ok_or(Error::UnknownOrder(order))?
            .remove_items(local, count);
        self.rebuild_offsets();

        let mut deselected = Vec::new();
        for key in keys {
            if self.selection.remove(key) {
                deselected.push(key);
            }
            self.expansion.remove(key);
        }
        if self.config.position_based {
            self.selection.rows_removed(first, count);
            self.expansion.rows_removed(first, count);
        }
        self.signals.emit_selection_changed(Vec::new(), deselected);
        Ok(removed)
    }

    /// One past the last row of the sub-collection owning `position`.
    fn collection_end(&self, position: usize) -> usize {
        self.offsets
            .floor(position)
            .and_then(|(start, order)| {
                self.adapters
                    .get(&order)
                    .map(|adapter| start + adapter.adapter_item_count())
            })
            .unwrap_or(0)
    }

    fn expanded_child_count(&self, position: usize) -> Option<usize> {
        self.state_key(position)
            .ok()
            .and_then(|key| self.expansion.get(key))
    }

    /// Rows of the direct children of an expanded row.
    pub(crate) fn direct_child_rows(&self, position: usize) -> Vec<usize> {
        let Some(direct) = self.expanded_child_count(position) else {
            return Vec::new();
        };
        let end = self.collection_end(position);
        let mut rows = Vec::with_capacity(direct);
        let mut cursor = position + 1;
        while rows.len() < direct && cursor < end {
            rows.push(cursor);
            cursor += 1 + self.descendant_rows(cursor);
        }
        rows
    }

    /// Number of flattened descendant rows following an expanded row.
    pub(crate) fn descendant_rows(&self, position: usize) -> usize {
        let Some(direct) = self.expanded_child_count(position) else {
            return 0;
        };
        let end = self.collection_end(position);
        let mut cursor = position + 1;
        for _ in 0..direct {
            if cursor >= end {
                break;
            }
            cursor += 1 + self.descendant_rows(cursor);
        }
        cursor.min(end) - position - 1
    }

    /// Innermost expanded row whose span a row inserted at `position` joins.
    pub(crate) fn enclosing_expansion(&self, position: usize) -> Option<usize> {
        self.expanded_positions()
            .into_iter()
            .filter(|&expanded| {
                expanded < position && position <= expanded + self.descendant_rows(expanded)
            })
            .max()
    }
}
