//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Behavior switches of a [`CompositeAdapter`](crate::CompositeAdapter).
///
/// # Example
///
/// ```
/// use lattice_adapter::AdapterConfig;
///
/// let config = AdapterConfig::default()
///     .with_selectable(true)
///     .with_multi_select(true);
/// assert!(config.position_based);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Several rows may be selected at once.
    pub multi_select: bool,
    /// Long click selects instead of click.
    pub select_on_long_click: bool,
    /// A click on a selected row deselects it.
    pub allow_deselection: bool,
    /// Clicks change the selection at all.
    pub selectable: bool,
    /// Selection changes also emit `rows_changed` for the affected rows.
    pub select_with_refresh: bool,
    /// State is keyed by global position instead of item identifier.
    pub position_based: bool,
    /// Expanding a row collapses every other expanded row.
    pub only_one_expanded_item: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            multi_select: false,
            select_on_long_click: false,
            allow_deselection: true,
            selectable: false,
            select_with_refresh: false,
            position_based: true,
            only_one_expanded_item: false,
        }
    }
}

impl AdapterConfig {
    pub fn with_multi_select(mut self, enabled: bool) -> Self {
        self.multi_select = enabled;
        self
    }

    pub fn with_select_on_long_click(mut self, enabled: bool) -> Self {
        self.select_on_long_click = enabled;
        self
    }

    pub fn with_allow_deselection(mut self, enabled: bool) -> Self {
        self.allow_deselection = enabled;
        self
    }

    pub fn with_selectable(mut self, enabled: bool) -> Self {
        self.selectable = enabled;
        self
    }

    pub fn with_select_with_refresh(mut self, enabled: bool) -> Self {
        self.select_with_refresh = enabled;
        self
    }

    pub fn with_position_based(mut self, enabled: bool) -> Self {
        self.position_based = enabled;
        self
    }

    pub fn with_only_one_expanded_item(mut self, enabled: bool) -> Self {
        self.only_one_expanded_item = enabled;
        self
    }
}
