//! Data model for the composite list.
//!
//! - [`Item`] and its capabilities ([`Clickable`], [`Expandable`], [`Draggable`])
//! - [`Adapter`], the sub-collection contract, and [`ItemAdapter`]
//! - [`OffsetIndex`], [`TypeRegistry`], [`SelectionSet`] and [`ExpansionMap`],
//!   the engine's bookkeeping
//! - [`ListSignals`], the change notifications

mod adapter;
mod item;
mod offsets;
mod signals;
mod state;
mod types;

pub use adapter::{Adapter, ItemAdapter};
pub use item::{BasicItem, Clickable, Draggable, Expandable, Item, NO_IDENTIFIER, ViewType};
pub use offsets::OffsetIndex;
pub use signals::ListSignals;
pub use state::{ExpansionMap, SelectionSet, StateKey};
pub use types::TypeRegistry;
