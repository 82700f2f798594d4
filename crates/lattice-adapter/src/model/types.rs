//! View-type registry.

use std::collections::HashMap;

use lattice_adapter_core::logging::targets;

use super::item::{Item, ViewType};
use crate::error::{Error, Result};

/// Maps each view type to a prototype item used to create views.
///
/// The first item registered for a type stays its prototype.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    prototypes: HashMap<ViewType, Box<dyn Item>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the item's view type. Returns `false` if it was known.
    pub fn register(&mut self, item: &dyn Item) -> bool {
        let view_type = item.view_type();
        if self.prototypes.contains_key(&view_type) {
            return false;
        }
        tracing::debug!(target: targets::REGISTRY, view_type, "registered view type");
        self.prototypes.insert(view_type, item.clone_item());
        true
    }

    /// Registers the item and, recursively, the children it holds.
    pub fn register_tree(&mut self, item: &dyn Item) {
        self.register(item);
        if let Some(expandable) = item.as_expandable() {
            for child in expandable.sub_items() {
                self.register_tree(child.as_ref());
            }
        }
    }

    /// The prototype registered for `view_type`.
    pub fn prototype(&self, view_type: ViewType) -> Result<&dyn Item> {
        match self.prototypes.get(&view_type) {
            Some(item) => Ok(item.as_ref()),
            None => {
                tracing::error!(target: targets::REGISTRY, view_type, "view type not registered");
                Err(Error::TypeNotRegistered(view_type))
            }
        }
    }

    /// Whether `view_type` is registered.
    pub fn contains(&self, view_type: ViewType) -> bool {
        self.prototypes.contains_key(&view_type)
    }

    /// Number of registered view types.
    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }
}
