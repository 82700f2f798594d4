//! Logging facilities for Lattice Adapter.
//!
//! This module provides:
//! - Target and span names for the `tracing` crate, one per subsystem
//! - [`PerfSpan`], a scoped span for timing expensive operations
//! - `adapter_*!` macros with consistent target naming
//!
//! # Tracing Integration
//!
//! Lattice Adapter never installs a subscriber. To see logs, install one in
//! your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("lattice_adapter::dispatch=debug")
//!     .init();
//! ```

/// Span names used throughout Lattice Adapter for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Offset index rebuild span.
    pub const REBUILD_OFFSETS: &str = "lattice_adapter::rebuild_offsets";
    /// Click/long-click dispatch span.
    pub const DISPATCH: &str = "lattice_adapter::dispatch";
    /// State import span.
    pub const IMPORT_STATE: &str = "lattice_adapter::import_state";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "lattice_adapter_core::signal";
    /// Sub-collection and type registration target.
    pub const REGISTRY: &str = "lattice_adapter::registry";
    /// Offset index target.
    pub const OFFSETS: &str = "lattice_adapter::offsets";
    /// Selection state target.
    pub const SELECTION: &str = "lattice_adapter::selection";
    /// Expansion state target.
    pub const EXPANSION: &str = "lattice_adapter::expansion";
    /// Click dispatch pipeline target.
    pub const DISPATCH: &str = "lattice_adapter::dispatch";
    /// State export/import target.
    pub const STATE: &str = "lattice_adapter::state";
    /// View host forwarding target.
    pub const VIEW: &str = "lattice_adapter::view";
    /// Performance spans target.
    pub const PERF: &str = "lattice_adapter::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// Thin wrappers around the `tracing` macros. The first argument is one of
/// the [`targets`] constants.
///
/// ```ignore
/// adapter_debug!(targets::REGISTRY, order, "registered sub-collection");
/// ```
#[macro_export]
macro_rules! adapter_debug {
    ($target:expr, $($arg:tt)*) => {
        tracing::debug!(target: $target, $($arg)*)
    };
}

#[macro_export]
macro_rules! adapter_warn {
    ($target:expr, $($arg:tt)*) => {
        tracing::warn!(target: $target, $($arg)*)
    };
}
