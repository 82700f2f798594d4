//! Forwarding view lifecycle calls to a host.
//!
//! The engine does not render. A [`ViewHost`] creates and binds the host's
//! row views; the engine resolves prototypes and items for it.

use lattice_adapter_core::logging::targets;

use super::CompositeAdapter;
use crate::error::Result;
use crate::model::{Item, ViewType};

/// Creates, binds and recycles the host's row views.
pub trait ViewHost {
    /// The host's view type.
    type Handle;

    /// Creates a view for the prototype of a view type.
    fn create_view(&mut self, prototype: &dyn Item) -> Self::Handle;

    /// Binds an item to a view.
    fn bind_view(&mut self, handle: &mut Self::Handle, item: &dyn Item, position: usize);

    /// A view became visible.
    fn row_attached(&mut self, _handle: &mut Self::Handle) {}

    /// A view left the screen.
    fn row_detached(&mut self, _handle: &mut Self::Handle) {}

    /// A view is about to be reused.
    fn row_recycled(&mut self, _handle: &mut Self::Handle) {}

    /// A view could not be recycled. Return `true` to recycle it anyway.
    fn row_recycle_failed(&mut self, _handle: &mut Self::Handle) -> bool {
        false
    }
}

impl CompositeAdapter {
    /// Creates a view for `view_type` from its registered prototype.
    pub fn create_view<H: ViewHost>(&self, host: &mut H, view_type: ViewType) -> Result<H::Handle> {
        let prototype = self.prototype(view_type)?;
        tracing::trace!(target: targets::VIEW, view_type, "creating view");
        Ok(host.create_view(prototype))
    }

    /// Binds the item at `position` to a view.
    pub fn bind_view<H: ViewHost>(&self, host: &mut H, handle: &mut H::Handle, position: usize) -> Result<()> {
        let item = self.item_at(position)?;
        host.bind_view(handle, item, position);
        Ok(())
    }

    pub fn row_attached<H: ViewHost>(&self, host: &mut H, handle: &mut H::Handle) {
        host.row_attached(handle);
    }

    pub fn row_detached<H: ViewHost>(&self, host: &mut H, handle: &mut H::Handle) {
        host.row_detached(handle);
    }

    pub fn row_recycled<H: ViewHost>(&self, host: &mut H, handle: &mut H::Handle) {
        host.row_recycled(handle);
    }

    /// Returns whether the view should be recycled anyway.
    pub fn row_recycle_failed<H: ViewHost>(&self, host: &mut H, handle: &mut H::Handle) -> bool {
        let recycle = host.row_recycle_failed(handle);
        tracing::debug!(target: targets::VIEW, recycle, "row failed to recycle");
        recycle
    }
}
