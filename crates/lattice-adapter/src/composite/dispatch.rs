//! Click, long-click and touch dispatch.
//!
//! A click runs through a fixed pipeline:
//!
//! 1. resolve the row; disabled items ignore the click
//! 2. the item's own pre-click listener
//! 3. the global pre-click listener
//! 4. auto-expansion toggle
//! 5. single-expansion enforcement
//! 6. selection toggle
//! 7. the item's own click listener
//! 8. the global click listener
//!
//! A listener returning `true` consumes the click, which skips the
//! listener-gated stages after it. Listeners get `&mut CompositeAdapter` and
//! may restructure the list; each later stage re-resolves the clicked row by
//! identifier and the pipeline stops with [`DispatchOutcome::Aborted`] if it
//! is gone.

use std::sync::Arc;

use lattice_adapter_core::PerfSpan;
use lattice_adapter_core::logging::{span_names, targets};

use super::CompositeAdapter;
use crate::model::{Clickable, Item, NO_IDENTIFIER, ViewType};

/// Listener invoked with the engine and the clicked row.
///
/// Returning `true` consumes the event.
pub type ClickListener = Arc<dyn Fn(&mut CompositeAdapter, &ClickContext) -> bool + Send + Sync>;

/// Listener invoked for raw touch events.
pub type TouchListener =
    Arc<dyn Fn(&mut CompositeAdapter, &ClickContext, &TouchEvent) -> bool + Send + Sync>;

/// The row an event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickContext {
    /// Global position of the row.
    pub position: usize,
    /// Order key of the owning sub-collection.
    pub order: i32,
    /// Identifier of the item.
    pub identifier: i64,
    /// View type of the item.
    pub view_type: ViewType,
    generation: u64,
}

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// A touch event on a row, in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub x: f32,
    pub y: f32,
}

impl TouchEvent {
    pub fn new(action: TouchAction, x: f32, y: f32) -> Self {
        Self { action, x, y }
    }
}

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No row at the position, the item is disabled, or nobody listens.
    Ignored,
    /// A listener removed the row the event was for.
    Aborted,
    /// All stages ran.
    Completed {
        /// Whether a listener consumed the event.
        consumed: bool,
    },
}

impl DispatchOutcome {
    /// Whether a listener consumed the event.
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Completed { consumed: true })
    }
}

#[derive(Default, Clone)]
pub(crate) struct Listeners {
    pre_click: Option<ClickListener>,
    click: Option<ClickListener>,
    pre_long_click: Option<ClickListener>,
    long_click: Option<ClickListener>,
    touch: Option<TouchListener>,
}

impl CompositeAdapter {
    /// Sets the global pre-click listener, run after the item's own.
    pub fn set_on_pre_click<F>(&mut self, listener: F)
    where
        F: Fn(&mut CompositeAdapter, &ClickContext) -> bool + Send + Sync + 'static,
    {
        self.listeners.pre_click = Some(Arc::new(listener));
    }

    /// Sets the global click listener, run last.
    pub fn set_on_click<F>(&mut self, listener: F)
    where
        F: Fn(&mut CompositeAdapter, &ClickContext) -> bool + Send + Sync + 'static,
    {
        self.listeners.click = Some(Arc::new(listener));
    }

    /// Sets the global pre-long-click listener.
    pub fn set_on_pre_long_click<F>(&mut self, listener: F)
    where
        F: Fn(&mut CompositeAdapter, &ClickContext) -> bool + Send + Sync + 'static,
    {
        self.listeners.pre_long_click = Some(Arc::new(listener));
    }

    /// Sets the global long-click listener.
    pub fn set_on_long_click<F>(&mut self, listener: F)
    where
        F: Fn(&mut CompositeAdapter, &ClickContext) -> bool + Send + Sync + 'static,
    {
        self.listeners.long_click = Some(Arc::new(listener));
    }

    /// Sets the touch listener.
    pub fn set_on_touch<F>(&mut self, listener: F)
    where
        F: Fn(&mut CompositeAdapter, &ClickContext, &TouchEvent) -> bool + Send + Sync + 'static,
    {
        self.listeners.touch = Some(Arc::new(listener));
    }

    /// Removes every global listener.
    pub fn clear_listeners(&mut self) {
        self.listeners = Listeners::default();
    }

    /// Runs the click pipeline for the row at `position`.
    pub fn dispatch_click(&mut self, position: usize) -> DispatchOutcome {
        let _perf = PerfSpan::new(span_names::DISPATCH);
        tracing::trace!(target: targets::DISPATCH, position, "click");

        let Some(mut context) = self.enabled_context(position) else {
            return DispatchOutcome::Ignored;
        };
        let mut consumed = false;

        if let Some(listener) = self.item_listener(&context, |c| c.pre_click_listener()) {
            consumed = listener(self, &context);
            let Some(next) = self.reresolve(&context, "item pre-click") else {
                return DispatchOutcome::Aborted;
            };
            context = next;
        }

        if !consumed && let Some(listener) = self.listeners.pre_click.clone() {
            consumed = listener(self, &context);
            let Some(next) = self.reresolve(&context, "pre-click") else {
                return DispatchOutcome::Aborted;
            };
            context = next;
        }

        if !consumed && self.auto_expands(context.position) {
            match self.toggle_tracked(context.position) {
                Ok(position) => context.position = position,
                Err(error) => tracing::debug!(target: targets::DISPATCH, %error, "expansion toggle skipped"),
            }
            context.generation = self.generation;
            let Some(next) = self.reresolve(&context, "expansion") else {
                return DispatchOutcome::Aborted;
            };
            context = next;
        }

        if self.config.only_one_expanded_item {
            context.position = self.collapse_others(context.position);
            context.generation = self.generation;
            let Some(next) = self.reresolve(&context, "single expansion") else {
                return DispatchOutcome::Aborted;
            };
            context = next;
        }

        if !consumed && !self.config.select_on_long_click && self.config.selectable {
            if let Err(error) = self.select(context.position) {
                tracing::debug!(target: targets::DISPATCH, %error, "selection skipped");
            }
            let Some(next) = self.reresolve(&context, "selection") else {
                return DispatchOutcome::Aborted;
            };
            context = next;
        }

        if let Some(listener) = self.item_listener(&context, |c| c.click_listener()) {
            consumed = listener(self, &context);
            if !consumed {
                let Some(next) = self.reresolve(&context, "item click") else {
                    return DispatchOutcome::Aborted;
                };
                context = next;
            }
        }

        if !consumed && let Some(listener) = self.listeners.click.clone() {
            consumed = listener(self, &context);
        }

        tracing::debug!(target: targets::DISPATCH, consumed, "click dispatched");
        DispatchOutcome::Completed { consumed }
    }

    /// Runs the long-click chain for the row at `position`.
    ///
    /// The pre-long-click listener runs first; unless it consumes the event,
    /// the row is selected when `select_on_long_click` is set. The long-click
    /// listener always runs last.
    pub fn dispatch_long_click(&mut self, position: usize) -> DispatchOutcome {
        let _perf = PerfSpan::new(span_names::DISPATCH);
        tracing::trace!(target: targets::DISPATCH, position, "long click");

        let Some(mut context) = self.enabled_context(position) else {
            return DispatchOutcome::Ignored;
        };
        let mut consumed = false;

        if let Some(listener) = self.listeners.pre_long_click.clone() {
            consumed = listener(self, &context);
            let Some(next) = self.reresolve(&context, "pre-long-click") else {
                return DispatchOutcome::Aborted;
            };
            context = next;
        }

        if !consumed && self.config.select_on_long_click && self.config.selectable {
            if let Err(error) = self.select(context.position) {
                tracing::debug!(target: targets::DISPATCH, %error, "selection skipped");
            }
            let Some(next) = self.reresolve(&context, "selection") else {
                return DispatchOutcome::Aborted;
            };
            context = next;
        }

        if let Some(listener) = self.listeners.long_click.clone() {
            consumed = listener(self, &context);
        }

        DispatchOutcome::Completed { consumed }
    }

    /// Forwards a touch event on the row at `position` to the touch listener.
    pub fn dispatch_touch(&mut self, position: usize, event: &TouchEvent) -> DispatchOutcome {
        let Some(listener) = self.listeners.touch.clone() else {
            return DispatchOutcome::Ignored;
        };
        let Some(context) = self.click_context(position) else {
            return DispatchOutcome::Ignored;
        };
        let consumed = listener(self, &context, event);
        DispatchOutcome::Completed { consumed }
    }

    fn click_context(&self, position: usize) -> Option<ClickContext> {
        let info = self.relative_info(position)?;
        Some(ClickContext {
            position,
            order: info.order,
            identifier: info.item.identifier(),
            view_type: info.item.view_type(),
            generation: self.generation,
        })
    }

    fn enabled_context(&self, position: usize) -> Option<ClickContext> {
        let context = self.click_context(position)?;
        match self.item_at(position) {
            Ok(item) if item.is_enabled() => Some(context),
            _ => {
                tracing::trace!(target: targets::DISPATCH, position, "row missing or disabled");
                None
            }
        }
    }

    /// Finds the clicked row again after a listener may have moved it.
    ///
    /// A row without an identifier can only be found again while the list
    /// structure is unchanged since `context` was taken.
    fn reresolve(&self, context: &ClickContext, stage: &str) -> Option<ClickContext> {
        let resolved = if context.identifier == NO_IDENTIFIER {
            let unchanged = context.generation == self.generation
                && self
                    .item_at(context.position)
                    .is_ok_and(|item| item.view_type() == context.view_type);
            unchanged.then(|| self.click_context(context.position)).flatten()
        } else if self
            .item_at(context.position)
            .is_ok_and(|item| item.identifier() == context.identifier)
        {
            self.click_context(context.position)
        } else {
            self.find_identifier(context.identifier, true)
                .and_then(|position| self.click_context(position))
        };

        if resolved.is_none() {
            tracing::debug!(
                target: targets::DISPATCH,
                stage,
                position = context.position,
                identifier = context.identifier,
                "clicked row is gone, aborting dispatch"
            );
        }
        resolved
    }

    fn item_listener(
        &self,
        context: &ClickContext,
        pick: impl FnOnce(&dyn Clickable) -> Option<ClickListener>,
    ) -> Option<ClickListener> {
        self.item_at(context.position)
            .ok()
            .and_then(|item| item.as_clickable())
            .and_then(pick)
    }

    fn auto_expands(&self, position: usize) -> bool {
        self.item_at(position)
            .ok()
            .and_then(|item| item.as_expandable())
            .is_some_and(|expandable| {
                expandable.is_auto_expanding()
                    && (expandable.is_expanded() || !expandable.sub_items().is_empty())
            })
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::config::AdapterConfig;
    use crate::model::{BasicItem, ItemAdapter};

    fn list(config: AdapterConfig, items: Vec<Box<dyn Item>>) -> CompositeAdapter {
        let mut list = CompositeAdapter::with_config(config);
        list.register_adapter(ItemAdapter::from_items(items), 0);
        list
    }

    #[test]
    fn test_disabled_and_missing_rows_are_ignored() {
        let mut list = list(
            AdapterConfig::default(),
            vec![BasicItem::new(1, 0).with_enabled(false).boxed()],
        );
        assert_eq!(list.dispatch_click(0), DispatchOutcome::Ignored);
        assert_eq!(list.dispatch_click(5), DispatchOutcome::Ignored);
        assert_eq!(list.dispatch_long_click(0), DispatchOutcome::Ignored);
    }

    #[test]
    fn test_stage_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
        let item = BasicItem::new(1, 0)
            .with_on_pre_click(move |_, _| {
                a.lock().push("item pre");
                false
            })
            .with_on_click(move |list, ctx| {
                b.lock().push(if list.is_selected(ctx.position) { "item click (selected)" } else { "item click" });
                false
            });

        let mut list = list(AdapterConfig::default().with_selectable(true), vec![item.boxed()]);
        list.set_on_pre_click(move |_, _| {
            c.lock().push("global pre");
            false
        });
        list.set_on_click(move |_, _| {
            d.lock().push("global click");
            true
        });

        assert_eq!(list.dispatch_click(0), DispatchOutcome::Completed { consumed: true });
        assert_eq!(
            *log.lock(),
            vec!["item pre", "global pre", "item click (selected)", "global click"]
        );
    }

    #[test]
    fn test_pre_click_consumes() {
        let mut list = list(
            AdapterConfig::default().with_selectable(true),
            vec![BasicItem::new(1, 0).with_on_pre_click(|_, _| true).boxed()],
        );
        let clicked = Arc::new(Mutex::new(false));
        let sink = clicked.clone();
        list.set_on_click(move |_, _| {
            *sink.lock() = true;
            false
        });

        let outcome = list.dispatch_click(0);
        assert!(outcome.is_consumed());
        assert!(!list.is_selected(0));
        assert!(!*clicked.lock());
    }

    #[test]
    fn test_click_toggles_auto_expansion() {
        let parent = BasicItem::new(1, 0).with_sub_items(vec![BasicItem::new(2, 1).boxed()]);
        let manual = BasicItem::new(3, 0)
            .with_auto_expand(false)
            .with_sub_items(vec![BasicItem::new(4, 1).boxed()]);
        let mut list = list(AdapterConfig::default(), vec![parent.boxed(), manual.boxed()]);

        list.dispatch_click(0);
        assert_eq!(list.item_count(), 3);
        list.dispatch_click(2);
        assert_eq!(list.item_count(), 3);
        list.dispatch_click(0);
        assert_eq!(list.item_count(), 2);
    }

    #[test]
    fn test_listener_removing_row_aborts() {
        let mut list = list(
            AdapterConfig::default().with_selectable(true),
            vec![
                BasicItem::new(1, 0)
                    .with_on_pre_click(|list, ctx| {
                        let local = ctx.position;
                        list.item_adapter(ctx.order)
                            .and_then(|mut handle| handle.remove(local))
                            .is_err()
                    })
                    .boxed(),
                BasicItem::new(2, 0).boxed(),
            ],
        );
        assert_eq!(list.dispatch_click(0), DispatchOutcome::Aborted);
        assert!(list.selections().is_empty());
        assert_eq!(list.item_id(0), Ok(2));
    }

    #[test]
    fn test_listener_shifting_row_is_followed() {
        let mut list = list(
            AdapterConfig::default().with_selectable(true),
            vec![BasicItem::new(1, 0).boxed(), BasicItem::new(2, 0).boxed()],
        );
        list.set_on_pre_click(|list, _| {
            let inserted = list
                .item_adapter(0)
                .and_then(|mut handle| handle.add_at(0, vec![BasicItem::new(9, 0).boxed()]));
            inserted.is_err()
        });

        assert_eq!(list.dispatch_click(1), DispatchOutcome::Completed { consumed: false });
        assert_eq!(list.selected_positions(), vec![2]);
        assert_eq!(list.item_id(2), Ok(2));
    }

    #[test]
    fn test_long_click_selects_when_configured() {
        let config = AdapterConfig::default()
            .with_selectable(true)
            .with_select_on_long_click(true);
        let mut list = list(config, vec![BasicItem::new(1, 0).boxed()]);

        list.dispatch_click(0);
        assert!(!list.is_selected(0));

        let outcome = list.dispatch_long_click(0);
        assert_eq!(outcome, DispatchOutcome::Completed { consumed: false });
        assert!(list.is_selected(0));
    }

    #[test]
    fn test_pre_long_click_consumes_selection() {
        let config = AdapterConfig::default()
            .with_selectable(true)
            .with_select_on_long_click(true);
        let mut list = list(config, vec![BasicItem::new(1, 0).boxed()]);
        list.set_on_pre_long_click(|_, _| true);

        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        list.set_on_long_click(move |_, ctx| {
            *sink.lock() = Some(ctx.identifier);
            false
        });

        assert_eq!(list.dispatch_long_click(0), DispatchOutcome::Completed { consumed: false });
        assert!(!list.is_selected(0));
        assert_eq!(*seen.lock(), Some(1));
    }

    #[test]
    fn test_touch_forwarding() {
        let mut list = list(AdapterConfig::default(), vec![BasicItem::new(1, 0).boxed()]);
        let event = TouchEvent::new(TouchAction::Down, 1.0, 2.0);
        assert_eq!(list.dispatch_touch(0, &event), DispatchOutcome::Ignored);

        list.set_on_touch(|_, ctx, event| ctx.position == 0 && event.action == TouchAction::Down);
        assert!(list.dispatch_touch(0, &event).is_consumed());
        assert_eq!(list.dispatch_touch(3, &event), DispatchOutcome::Ignored);

        list.clear_listeners();
        assert_eq!(list.dispatch_touch(0, &event), DispatchOutcome::Ignored);
    }
}
