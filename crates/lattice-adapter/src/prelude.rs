//! Convenient re-exports for common usage.
//!
//! ```
//! use lattice_adapter::prelude::*;
//! ```

pub use crate::config::AdapterConfig;
pub use crate::error::{Error, Result};
pub use crate::model::{
    Adapter, BasicItem, Clickable, Draggable, Expandable, Item, ItemAdapter, ListSignals, NO_IDENTIFIER,
    StateKey, ViewType,
};
pub use crate::{
    ClickContext, CompositeAdapter, DispatchOutcome, ItemAdapterHandle, MemoryStateStore, StateSnapshot,
    StateStore, TouchAction, TouchEvent, ViewHost,
};
