//! Lattice Adapter: a composite list adapter engine.
//!
//! Lattice Adapter presents several independently owned, ordered item
//! collections as one flattened list, ready to back a virtualized list view.
//! On top of the flattened positions it keeps:
//!
//! - **Selection** keyed by position or by item identifier
//! - **Expansion** of hierarchical items, flattening children into the list
//! - **Click dispatch** through an ordered, short-circuiting listener pipeline
//! - **State persistence** of selection and expansion through a key-value store
//!
//! The engine is single-threaded and does no rendering. Hosts plug their view
//! layer in through [`ViewHost`] and observe changes through [`ListSignals`].
//!
//! # Example
//!
//! ```
//! use lattice_adapter::prelude::*;
//!
//! let mut list = CompositeAdapter::with_config(AdapterConfig::default().with_selectable(true));
//! list.register_adapter(ItemAdapter::from_items(vec![BasicItem::new(0, 0).boxed()]), -1);
//! list.register_adapter(
//!     ItemAdapter::from_items(vec![
//!         BasicItem::new(1, 1)
//!             .with_sub_items(vec![BasicItem::new(10, 2).boxed(), BasicItem::new(11, 2).boxed()])
//!             .boxed(),
//!         BasicItem::new(2, 1).boxed(),
//!     ]),
//!     0,
//! );
//!
//! // Clicking an expandable row expands it and selects it.
//! assert!(!list.dispatch_click(1).is_consumed());
//! assert_eq!(list.item_count(), 5);
//! assert_eq!(list.selected_positions(), vec![1]);
//!
//! let snapshot = list.export_state("");
//! assert_eq!(snapshot.int_array("bundle_expanded"), Some(vec![1]));
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod prelude;

mod composite;

pub use composite::{
    ClickContext, ClickListener, CompositeAdapter, DispatchOutcome, EXPANDED_KEY, ItemAdapterHandle,
    MemoryStateStore, RelativeInfo, SELECTIONS_KEY, StateSnapshot, StateStore, TouchAction, TouchEvent,
    TouchListener, ViewHost,
};
pub use config::AdapterConfig;
pub use error::{Error, Result};
pub use model::ListSignals;
