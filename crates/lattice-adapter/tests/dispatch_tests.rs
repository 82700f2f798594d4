//! Integration tests for the click pipeline with listeners that restructure the list.

use std::sync::Arc;

use lattice_adapter::prelude::*;
use parking_lot::Mutex;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn leaf(id: i64) -> Box<dyn Item> {
    BasicItem::new(id, 0).boxed()
}

fn list_with(config: AdapterConfig, items: Vec<Box<dyn Item>>) -> CompositeAdapter {
    let mut list = CompositeAdapter::with_config(config);
    list.register_adapter(ItemAdapter::from_items(items), 0);
    list
}

fn ids(list: &CompositeAdapter) -> Vec<i64> {
    (0..list.item_count()).map(|p| list.item_id(p).unwrap()).collect()
}

#[test]
fn test_click_expands_and_selects() {
    let config = AdapterConfig::default().with_selectable(true);
    let mut list = list_with(
        config,
        vec![leaf(1), BasicItem::new(2, 0).with_sub_items(vec![leaf(21)]).boxed()],
    );

    let outcome = list.dispatch_click(1);
    assert_eq!(outcome, DispatchOutcome::Completed { consumed: false });
    assert_eq!(ids(&list), vec![1, 2, 21]);
    assert_eq!(list.selected_positions(), vec![1]);

    list.dispatch_click(1);
    assert_eq!(ids(&list), vec![1, 2]);
    assert!(list.selections().is_empty());
}

#[test]
fn test_listener_inserting_rows_before_clicked_row() {
    init_tracing();
    let config = AdapterConfig::default().with_selectable(true);
    let mut list = list_with(config, vec![leaf(1), leaf(2), leaf(3)]);

    list.set_on_pre_click(|list, context| {
        if context.identifier == 3 {
            list.item_adapter(0)
                .unwrap()
                .add_at(0, vec![leaf(10), leaf(11)])
                .unwrap();
        }
        false
    });
    let clicked = Arc::new(Mutex::new(Vec::new()));
    let seen = clicked.clone();
    list.set_on_click(move |_, context| {
        seen.lock().push((context.position, context.identifier));
        true
    });

    let outcome = list.dispatch_click(2);
    assert!(outcome.is_consumed());
    assert_eq!(ids(&list), vec![10, 11, 1, 2, 3]);
    assert_eq!(list.selected_positions(), vec![4]);
    assert_eq!(*clicked.lock(), vec![(4, 3)]);
}

#[test]
fn test_listener_removing_clicked_row_aborts() {
    init_tracing();
    let config = AdapterConfig::default().with_selectable(true);
    let mut list = list_with(config, vec![leaf(1), leaf(2)]);

    let reached = Arc::new(Mutex::new(false));
    let flag = reached.clone();
    list.set_on_pre_click(|list, context| {
        let position = context.position;
        list.item_adapter(0).unwrap().remove(position).unwrap();
        false
    });
    list.set_on_click(move |_, _| {
        *flag.lock() = true;
        false
    });

    assert_eq!(list.dispatch_click(1), DispatchOutcome::Aborted);
    assert_eq!(ids(&list), vec![1]);
    assert!(list.selections().is_empty());
    assert!(!*reached.lock());
}

#[test]
fn test_listener_inserting_before_anonymous_row_aborts() {
    init_tracing();
    let config = AdapterConfig::default().with_selectable(true);
    let mut list = list_with(
        config,
        vec![BasicItem::anonymous(0).boxed(), BasicItem::anonymous(0).boxed()],
    );

    let reached = Arc::new(Mutex::new(false));
    let flag = reached.clone();
    list.set_on_pre_click(|list, _| {
        list.item_adapter(0)
            .unwrap()
            .add_at(0, vec![BasicItem::anonymous(0).boxed()])
            .unwrap();
        false
    });
    list.set_on_click(move |_, _| {
        *flag.lock() = true;
        false
    });

    assert_eq!(list.dispatch_click(1), DispatchOutcome::Aborted);
    assert_eq!(list.item_count(), 3);
    assert!(list.selections().is_empty());
    assert!(!*reached.lock());
}

#[test]
fn test_anonymous_rows_expand_and_select_on_click() {
    let config = AdapterConfig::default()
        .with_selectable(true)
        .with_only_one_expanded_item(true);
    let group = || {
        BasicItem::anonymous(0)
            .with_sub_items(vec![BasicItem::anonymous(1).boxed()])
            .boxed()
    };
    let mut list = list_with(config, vec![group(), group()]);
    list.expand(0).unwrap();

    // The second group sits below the first one's child and moves up when it collapses.
    let outcome = list.dispatch_click(2);
    assert_eq!(outcome, DispatchOutcome::Completed { consumed: false });
    assert_eq!(list.expanded_positions(), vec![1]);
    assert_eq!(list.selected_positions(), vec![1]);
    assert_eq!(list.item_count(), 3);
}

#[test]
fn test_consumed_pre_click_still_enforces_single_expansion() {
    init_tracing();
    let config = AdapterConfig::default().with_only_one_expanded_item(true);
    let mut list = list_with(
        config,
        vec![
            BasicItem::new(1, 0).with_sub_items(vec![leaf(11)]).boxed(),
            BasicItem::new(2, 0).with_sub_items(vec![leaf(21)]).boxed(),
        ],
    );
    list.expand(0).unwrap();
    list.set_on_pre_click(|_, _| true);

    // Row 2 sits at position 2; the consumed click skips the toggle but not the enforcement.
    let outcome = list.dispatch_click(2);
    assert!(outcome.is_consumed());
    assert!(list.expanded_positions().is_empty());
    assert_eq!(ids(&list), vec![1, 2]);
}

#[test]
fn test_click_listener_sees_position_after_expansion_elsewhere() {
    let config = AdapterConfig::default().with_only_one_expanded_item(true);
    let mut list = list_with(
        config,
        vec![
            BasicItem::new(1, 0).with_sub_items(vec![leaf(11), leaf(12)]).boxed(),
            BasicItem::new(2, 0).with_sub_items(vec![leaf(21)]).boxed(),
        ],
    );
    list.expand(0).unwrap();

    let seen = Arc::new(Mutex::new(None));
    let record = seen.clone();
    list.set_on_click(move |_, context| {
        *record.lock() = Some(context.position);
        false
    });

    list.dispatch_click(3);
    assert_eq!(ids(&list), vec![1, 2, 21]);
    assert_eq!(*seen.lock(), Some(1));
}

#[test]
fn test_item_listener_runs_before_global_one() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let item_log = order.clone();
    let item = BasicItem::new(7, 0)
        .with_on_pre_click(move |_, _| {
            item_log.lock().push("item pre-click");
            false
        })
        .boxed();
    let mut list = list_with(AdapterConfig::default(), vec![item]);

    let global_log = order.clone();
    list.set_on_pre_click(move |_, _| {
        global_log.lock().push("pre-click");
        false
    });

    list.dispatch_click(0);
    assert_eq!(*order.lock(), vec!["item pre-click", "pre-click"]);
}

#[test]
fn test_disabled_and_missing_rows_are_ignored() {
    let mut list = list_with(
        AdapterConfig::default().with_selectable(true),
        vec![BasicItem::new(1, 0).with_enabled(false).boxed()],
    );
    assert_eq!(list.dispatch_click(0), DispatchOutcome::Ignored);
    assert_eq!(list.dispatch_click(4), DispatchOutcome::Ignored);
    assert_eq!(list.dispatch_long_click(0), DispatchOutcome::Ignored);
    assert!(list.selections().is_empty());
}

#[test]
fn test_long_click_selection_mode() {
    let config = AdapterConfig::default()
        .with_selectable(true)
        .with_select_on_long_click(true);
    let mut list = list_with(config, vec![leaf(1), leaf(2)]);

    list.dispatch_click(0);
    assert!(list.selections().is_empty());

    let outcome = list.dispatch_long_click(1);
    assert_eq!(outcome, DispatchOutcome::Completed { consumed: false });
    assert_eq!(list.selected_positions(), vec![1]);
}

#[test]
fn test_touch_forwarding() {
    let mut list = list_with(AdapterConfig::default(), vec![leaf(1)]);
    let down = TouchEvent::new(TouchAction::Down, 1.0, 2.0);
    assert_eq!(list.dispatch_touch(0, &down), DispatchOutcome::Ignored);

    let events = Arc::new(Mutex::new(Vec::new()));
    let seen = events.clone();
    list.set_on_touch(move |_, context, event| {
        seen.lock().push((context.identifier, event.action));
        event.action == TouchAction::Up
    });

    assert!(!list.dispatch_touch(0, &down).is_consumed());
    assert!(list.dispatch_touch(0, &TouchEvent::new(TouchAction::Up, 1.0, 2.0)).is_consumed());
    assert_eq!(*events.lock(), vec![(1, TouchAction::Down), (1, TouchAction::Up)]);

    list.clear_listeners();
    assert_eq!(list.dispatch_touch(0, &down), DispatchOutcome::Ignored);
}
