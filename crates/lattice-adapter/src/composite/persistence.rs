//! Saving and restoring selection and expansion state.
//!
//! State is written to a [`StateStore`] under `"bundle_selections"` and
//! `"bundle_expanded"`, each followed by a caller-chosen prefix so several
//! lists can share one store. Position-keyed state is stored as integer
//! arrays, identifier-keyed state as string arrays of identifiers.
//!
//! Restoring deselects everything, re-expands every recorded row and then
//! selects every recorded row. Call it after the sub-collections are filled
//! again.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use lattice_adapter_core::PerfSpan;
use lattice_adapter_core::logging::{span_names, targets};

use super::CompositeAdapter;
use crate::error::Result;

/// Key prefix of the saved selections.
pub const SELECTIONS_KEY: &str = "bundle_selections";

/// Key prefix of the saved expansions.
pub const EXPANDED_KEY: &str = "bundle_expanded";

/// A key-value store holding integer and string arrays.
pub trait StateStore {
    fn int_array(&self, key: &str) -> Option<Vec<i64>>;

    fn put_int_array(&mut self, key: &str, values: Vec<i64>);

    fn string_array(&self, key: &str) -> Option<Vec<String>>;

    fn put_string_array(&mut self, key: &str, values: Vec<String>);
}

/// An in-memory [`StateStore`], serializable with serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStateStore {
    #[serde(default)]
    int_arrays: BTreeMap<String, Vec<i64>>,
    #[serde(default)]
    string_arrays: BTreeMap<String, Vec<String>>,
}

/// A standalone export of an engine's state.
pub type StateSnapshot = MemoryStateStore;

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.int_arrays.is_empty() && self.string_arrays.is_empty()
    }
}

impl StateStore for MemoryStateStore {
    fn int_array(&self, key: &str) -> Option<Vec<i64>> {
        self.int_arrays.get(key).cloned()
    }

    fn put_int_array(&mut self, key: &str, values: Vec<i64>) {
        self.int_arrays.insert(key.to_owned(), values);
    }

    fn string_array(&self, key: &str) -> Option<Vec<String>> {
        self.string_arrays.get(key).cloned()
    }

    fn put_string_array(&mut self, key: &str, values: Vec<String>) {
        self.string_arrays.insert(key.to_owned(), values);
    }
}

impl CompositeAdapter {
    /// Exports selection and expansion state into a new snapshot.
    pub fn export_state(&self, prefix: &str) -> StateSnapshot {
        let mut snapshot = StateSnapshot::new();
        self.save_state(&mut snapshot, prefix);
        snapshot
    }

    /// Restores state exported by [`export_state`](Self::export_state).
    pub fn import_state(&mut self, snapshot: &StateSnapshot, prefix: &str) {
        self.restore_state(snapshot, prefix);
    }

    /// Writes selection and expansion state into `store`.
    ///
    /// In identifier mode, selected children hidden inside collapsed rows are
    /// saved too.
    pub fn save_state<S: StateStore + ?Sized>(&self, store: &mut S, prefix: &str) {
        let expanded_key = format!("{EXPANDED_KEY}{prefix}");
        let selections_key = format!("{SELECTIONS_KEY}{prefix}");
        let expanded = self.expanded_positions();
        let selected = self.selected_positions();

        if self.config.position_based {
            store.put_int_array(&expanded_key, expanded.iter().map(|&p| p as i64).collect());
            store.put_int_array(&selections_key, selected.iter().map(|&p| p as i64).collect());
        } else {
            let expanded_ids: Vec<String> = expanded
                .iter()
                .filter_map(|&position| self.item_id(position).ok())
                .map(|identifier| identifier.to_string())
                .collect();
            let mut selected_ids: Vec<i64> = selected
                .iter()
                .filter_map(|&position| self.item_id(position).ok())
                .collect();
            selected_ids.extend(
                self.hidden_items()
                    .into_iter()
                    .filter(|item| item.is_selected() && item.has_identifier())
                    .map(|item| item.identifier()),
            );
            store.put_string_array(&expanded_key, expanded_ids);
            store.put_string_array(
                &selections_key,
                selected_ids.iter().map(i64::to_string).collect(),
            );
        }

        tracing::debug!(
            target: targets::STATE,
            prefix,
            expanded = expanded.len(),
            selected = selected.len(),
            "state saved"
        );
    }

    /// Restores selection and expansion state from `store`.
    ///
    /// Entries that no longer match a row are skipped with a warning.
    pub fn restore_state<S: StateStore + ?Sized>(&mut self, store: &S, prefix: &str) {
        let _perf = PerfSpan::new(span_names::IMPORT_STATE);
        let expanded_key = format!("{EXPANDED_KEY}{prefix}");
        let selections_key = format!("{SELECTIONS_KEY}{prefix}");

        self.deselect_all();

        if self.config.position_based {
            let mut expanded = store.int_array(&expanded_key).unwrap_or_default();
            expanded.sort_unstable();
            for position in expanded {
                self.restore_one(position, "expand", Self::expand);
            }
            for position in store.int_array(&selections_key).unwrap_or_default() {
                self.restore_one(position, "select", Self::select_at);
            }
        } else {
            let expanded = parse_identifiers(store.string_array(&expanded_key));
            let selected = parse_identifiers(store.string_array(&selections_key));

            // Rows revealed by an expansion are visited too.
            let mut position = 0;
            while position < self.item_count() {
                if let Ok(identifier) = self.item_id(position)
                    && expanded.contains(&identifier)
                    && !self.is_expanded(position)
                    && let Err(error) = self.expand(position)
                {
                    tracing::warn!(target: targets::STATE, position, %error, "could not restore expansion");
                }
                position += 1;
            }

            for position in 0..self.item_count() {
                if let Ok(identifier) = self.item_id(position)
                    && selected.contains(&identifier)
                    && let Err(error) = self.select_at(position)
                {
                    tracing::warn!(target: targets::STATE, position, %error, "could not restore selection");
                }
            }
            self.for_each_hidden_mut(&mut |item| {
                if item.has_identifier() && selected.contains(&item.identifier()) {
                    item.set_selected(true);
                }
            });
        }

        tracing::debug!(
            target: targets::STATE,
            prefix,
            selected = self.selection.len(),
            expanded = self.expansion.len(),
            "state restored"
        );
    }

    fn restore_one(&mut self, position: i64, what: &str, apply: fn(&mut Self, usize) -> Result<()>) {
        let Ok(row) = usize::try_from(position) else {
            tracing::warn!(target: targets::STATE, position, what, "ignoring negative saved position");
            return;
        };
        if let Err(error) = apply(self, row) {
            tracing::warn!(target: targets::STATE, position, what, %error, "could not restore entry");
        }
    }
}

fn parse_identifiers(values: Option<Vec<String>>) -> HashSet<i64> {
    values
        .unwrap_or_default()
        .iter()
        .filter_map(|value| match value.parse::<i64>() {
            Ok(identifier) if identifier >= 0 => Some(identifier),
            _ => {
                tracing::warn!(target: targets::STATE, value = %value, "ignoring saved identifier");
                None
            }
        })
        .collect()
}
