//! Items and their optional capabilities.
//!
//! Every row of the composite list is an [`Item`]. Extra behavior is not
//! inherited but attached as capabilities that callers query:
//!
//! - [`Clickable`]: per-item pre-click and click listeners
//! - [`Expandable`]: child items that can be flattened into the list
//! - [`Draggable`]: the item may be reordered by drag
//!
//! [`BasicItem`] implements all of them behind builder setters and covers
//! most lists without a custom type.

use std::fmt;
use std::sync::Arc;

use crate::composite::{ClickContext, ClickListener, CompositeAdapter};

/// Integer tag selecting which kind of view renders an item.
pub type ViewType = i32;

/// Identifier value meaning "this item has no identifier".
pub const NO_IDENTIFIER: i64 = -1;

/// A row of the composite list.
///
/// # Example
///
/// ```ignore
/// use lattice_adapter::model::{Item, ViewType};
///
/// #[derive(Clone)]
/// struct Contact {
///     id: i64,
///     name: String,
///     selected: bool,
/// }
///
/// impl Item for Contact {
///     fn identifier(&self) -> i64 { self.id }
///     fn view_type(&self) -> ViewType { 1 }
///     fn is_selected(&self) -> bool { self.selected }
///     fn set_selected(&mut self, selected: bool) { self.selected = selected; }
///     fn clone_item(&self) -> Box<dyn Item> { Box::new(self.clone()) }
/// }
/// ```
pub trait Item: Send + Sync {
    /// Stable identifier, or [`NO_IDENTIFIER`].
    fn identifier(&self) -> i64;

    /// The view type used to create and recycle views for this item.
    fn view_type(&self) -> ViewType;

    /// Disabled items ignore clicks and long clicks.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Items that are not selectable are never toggled by a click.
    fn is_selectable(&self) -> bool {
        true
    }

    /// Whether the item is currently selected.
    fn is_selected(&self) -> bool;

    /// Sets the selected flag. Called by the engine; hosts should go through
    /// the selection API so the selection set stays consistent.
    fn set_selected(&mut self, selected: bool);

    /// Returns an owned copy, used to keep view-type prototypes.
    fn clone_item(&self) -> Box<dyn Item>;

    /// Returns `true` when the item carries an identifier.
    fn has_identifier(&self) -> bool {
        self.identifier() != NO_IDENTIFIER
    }

    /// Click listener capability.
    fn as_clickable(&self) -> Option<&dyn Clickable> {
        None
    }

    /// Expansion capability.
    fn as_expandable(&self) -> Option<&dyn Expandable> {
        None
    }

    /// Mutable expansion capability.
    fn as_expandable_mut(&mut self) -> Option<&mut dyn Expandable> {
        None
    }

    /// Drag reorder capability.
    fn as_draggable(&self) -> Option<&dyn Draggable> {
        None
    }
}

impl Clone for Box<dyn Item> {
    fn clone(&self) -> Self {
        self.clone_item()
    }
}

impl fmt::Debug for dyn Item + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("identifier", &self.identifier())
            .field("view_type", &self.view_type())
            .field("enabled", &self.is_enabled())
            .field("selected", &self.is_selected())
            .finish()
    }
}

/// Per-item listeners consulted by the click pipeline.
pub trait Clickable {
    /// Runs before any built-in handling; returning `true` consumes the click.
    fn pre_click_listener(&self) -> Option<ClickListener> {
        None
    }

    /// Runs after selection handling.
    fn click_listener(&self) -> Option<ClickListener> {
        None
    }
}

/// An item owning child items that can be flattened into the list.
///
/// While an item is expanded its children live in the list right after it,
/// so [`sub_items`](Expandable::sub_items) is empty until it collapses again.
pub trait Expandable {
    /// Whether the children are currently part of the list.
    fn is_expanded(&self) -> bool;

    /// Sets the expanded flag. Called by the engine.
    fn set_expanded(&mut self, expanded: bool);

    /// The children held by the item while it is collapsed.
    fn sub_items(&self) -> &[Box<dyn Item>];

    /// Moves the children out of the item.
    fn take_sub_items(&mut self) -> Vec<Box<dyn Item>>;

    /// Replaces the children held by the item.
    fn set_sub_items(&mut self, sub_items: Vec<Box<dyn Item>>);

    /// Whether a click toggles the expansion.
    fn is_auto_expanding(&self) -> bool {
        true
    }
}

/// An item that may be reordered by drag.
pub trait Draggable {
    /// Whether dragging is currently allowed.
    fn is_draggable(&self) -> bool;
}

#[derive(Clone, Default)]
struct ExpandableState {
    expanded: bool,
    auto_expand: bool,
    sub_items: Vec<Box<dyn Item>>,
}

/// A general purpose item with builder-style configuration.
///
/// Capabilities are attached by the builder methods: sub-items make it
/// [`Expandable`], listeners make it [`Clickable`] and
/// [`with_draggable`](Self::with_draggable) makes it [`Draggable`].
///
/// # Example
///
/// ```
/// use lattice_adapter::model::{BasicItem, Item};
///
/// let folder = BasicItem::new(1, 10)
///     .with_label("Inbox")
///     .with_sub_items(vec![
///         BasicItem::new(2, 11).with_label("Today").boxed(),
///         BasicItem::new(3, 11).with_label("Yesterday").boxed(),
///     ]);
///
/// assert!(folder.as_expandable().is_some());
/// assert!(folder.as_draggable().is_none());
/// ```
#[derive(Clone)]
pub struct BasicItem {
    identifier: i64,
    view_type: ViewType,
    label: String,
    enabled: bool,
    selectable: bool,
    selected: bool,
    expandable: Option<ExpandableState>,
    draggable: Option<bool>,
    pre_click: Option<ClickListener>,
    click: Option<ClickListener>,
}

impl BasicItem {
    /// Creates an enabled, selectable item.
    pub fn new(identifier: i64, view_type: ViewType) -> Self {
        Self {
            identifier,
            view_type,
            label: String::new(),
            enabled: true,
            selectable: true,
            selected: false,
            expandable: None,
            draggable: None,
            pre_click: None,
            click: None,
        }
    }

    /// Creates an item without an identifier.
    pub fn anonymous(view_type: ViewType) -> Self {
        Self::new(NO_IDENTIFIER, view_type)
    }

    /// Boxes the item for insertion into a sub-collection.
    pub fn boxed(self) -> Box<dyn Item> {
        Box::new(self)
    }

    /// The display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the selectable flag.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Sets the initial selected flag.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Makes the item expandable with the given children.
    pub fn with_sub_items(mut self, sub_items: Vec<Box<dyn Item>>) -> Self {
        self.expandable_state().sub_items = sub_items;
        self
    }

    /// Controls whether a click toggles the expansion. Makes the item expandable.
    pub fn with_auto_expand(mut self, auto_expand: bool) -> Self {
        self.expandable_state().auto_expand = auto_expand;
        self
    }

    /// Makes the item draggable (or explicitly not).
    pub fn with_draggable(mut self, draggable: bool) -> Self {
        self.draggable = Some(draggable);
        self
    }

    /// Sets the per-item pre-click listener.
    pub fn with_on_pre_click<F>(mut self, listener: F) -> Self
    where
        F: Fn(&mut CompositeAdapter, &ClickContext) -> bool + Send + Sync + 'static,
    {
        self.pre_click = Some(Arc::new(listener));
        self
    }

    /// Sets the per-item click listener.
    pub fn with_on_click<F>(mut self, listener: F) -> Self
    where
        F: Fn(&mut CompositeAdapter, &ClickContext) -> bool + Send + Sync + 'static,
    {
        self.click = Some(Arc::new(listener));
        self
    }

    fn expandable_state(&mut self) -> &mut ExpandableState {
        self.expandable.get_or_insert_with(|| ExpandableState {
            auto_expand: true,
            ..Default::default()
        })
    }
}

impl fmt::Debug for BasicItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("BasicItem");
        s.field("identifier", &self.identifier)
            .field("view_type", &self.view_type)
            .field("label", &self.label)
            .field("enabled", &self.enabled)
            .field("selected", &self.selected);
        if let Some(state) = &self.expandable {
            s.field("expanded", &state.expanded)
                .field("sub_items", &state.sub_items.len());
        }
        s.finish()
    }
}

impl Item for BasicItem {
    fn identifier(&self) -> i64 {
        self.identifier
    }

    fn view_type(&self) -> ViewType {
        self.view_type
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_selectable(&self) -> bool {
        self.selectable
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn clone_item(&self) -> Box<dyn Item> {
        Box::new(self.clone())
    }

    fn as_clickable(&self) -> Option<&dyn Clickable> {
        if self.pre_click.is_some() || self.click.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_expandable(&self) -> Option<&dyn Expandable> {
        self.expandable.as_ref().map(|_| self as &dyn Expandable)
    }

    fn as_expandable_mut(&mut self) -> Option<&mut dyn Expandable> {
        if self.expandable.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_draggable(&self) -> Option<&dyn Draggable> {
        self.draggable.map(|_| self as &dyn Draggable)
    }
}

impl Clickable for BasicItem {
    fn pre_click_listener(&self) -> Option<ClickListener> {
        self.pre_click.clone()
    }

    fn click_listener(&self) -> Option<ClickListener> {
        self.click.clone()
    }
}

impl Expandable for BasicItem {
    fn is_expanded(&self) -> bool {
        self.expandable.as_ref().is_some_and(|s| s.expanded)
    }

    fn set_expanded(&mut self, expanded: bool) {
        self.expandable_state().expanded = expanded;
    }

    fn sub_items(&self) -> &[Box<dyn Item>] {
        self.expandable
            .as_ref()
            .map_or(&[], |s| s.sub_items.as_slice())
    }

    fn take_sub_items(&mut self) -> Vec<Box<dyn Item>> {
        std::mem::take(&mut self.expandable_state().sub_items)
    }

    fn set_sub_items(&mut self, sub_items: Vec<Box<dyn Item>>) {
        self.expandable_state().sub_items = sub_items;
    }

    fn is_auto_expanding(&self) -> bool {
        self.expandable.as_ref().is_some_and(|s| s.auto_expand)
    }
}

impl Draggable for BasicItem {
    fn is_draggable(&self) -> bool {
        self.draggable.unwrap_or(false)
    }
}
