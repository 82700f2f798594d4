//! Core systems for Lattice Adapter.
//!
//! This crate provides the foundational pieces shared by the adapter engine:
//!
//! - **Signal/Slot System**: Type-safe, re-entrancy tolerant change notification
//! - **Logging**: Tracing targets, span names and a scoped performance span
//!
//! # Signal/Slot Example
//!
//! ```
//! use lattice_adapter_core::Signal;
//!
//! // Create a signal that notifies when a row range changes
//! let rows_changed = Signal::<(usize, usize)>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = rows_changed.connect(|(first, count)| {
//!     println!("rows {first}..{} changed", first + count);
//! });
//!
//! // Emit the signal
//! rows_changed.emit((0, 4));
//!
//! // Disconnect when done
//! rows_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
