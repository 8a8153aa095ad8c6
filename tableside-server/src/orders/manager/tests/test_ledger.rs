use super::*;
use shared::models::{MenuItem, MenuItemClass};

#[test]
fn test_add_item_snapshots_menu() {
    let ctx = create_test_manager();
    let order = ctx.manager.open_order_for_table(&server(), "t1").unwrap();

    let added = ctx
        .manager
        .add_item(
            &server(),
            &order.id,
            AddItemInput {
                menu_item_id: "spritz".to_string(),
                quantity: 2,
                notes: Some("sans glace".to_string()),
            },
        )
        .unwrap();
    assert_eq!(added.order_id, order.id);
    assert_eq!(added.name_snapshot, "Spritz");
    assert_eq!(added.unit_price_cents, 850);
    assert_eq!(added.quantity, 2);
    assert_eq!(added.notes.as_deref(), Some("sans glace"));
    assert_eq!(added.station, Station::Bar);
    assert_eq!(added.status, OrderItemStatus::New);
}

#[test]
fn test_snapshot_survives_catalog_edit() {
    let ctx = create_test_manager();
    let order = ctx.manager.open_order_for_table(&server(), "t1").unwrap();
    let added = add(&ctx, &order.id, "margherita", 1);

    // Price and class change after the item was taken
    ctx.catalog.upsert(MenuItem {
        id: "margherita".to_string(),
        name: "Margherita XL".to_string(),
        price_cents: 1500,
        available: true,
        class: MenuItemClass::Drink,
        recipe_text: None,
        image_ref: None,
    });

    let stored = ctx.manager.storage().find_item(&added.id).unwrap().unwrap();
    assert_eq!(stored.name_snapshot, "Margherita");
    assert_eq!(stored.unit_price_cents, 900);
    assert_eq!(stored.station, Station::Kitchen);

    // Moving through statuses keeps the snapshot too
    ctx.manager.send_order(&server(), &order.id).unwrap();
    let done = ctx
        .manager
        .update_item_status(&kitchen(), &added.id, OrderItemStatus::InProgress)
        .unwrap();
    assert_eq!(done.station, Station::Kitchen);
    assert_eq!(done.unit_price_cents, 900);
}

#[test]
fn test_add_item_to_open_order_is_silent() {
    let mut ctx = create_test_manager();
    let order = ctx.manager.open_order_for_table(&server(), "t1").unwrap();
    add(&ctx, &order.id, "carbonara", 1);

    assert_eq!(ctx.broadcaster.count(), 0);
    assert_eq!(
        ctx.audit_actions(),
        vec![AuditAction::OrderOpened, AuditAction::OrderItemAdded]
    );
}

#[test]
fn test_add_item_to_sent_order_notifies_station_and_table() {
    let ctx = create_test_manager();
    let order = ctx.manager.open_order_for_table(&server(), "t2").unwrap();
    ctx.manager.send_order(&server(), &order.id).unwrap();
    ctx.broadcaster.take();

    let late = add(&ctx, &order.id, "coca-cola", 1);
    assert_eq!(
        ctx.broadcaster.take(),
        vec![
            (
                Room::Station(Station::Bar),
                RealtimeEvent::NewItem(late.clone())
            ),
            (table_room("t2"), RealtimeEvent::ItemUpdate(late)),
        ]
    );
}

#[test]
fn test_add_item_validation_order() {
    let ctx = create_test_manager();

    let err = ctx
        .manager
        .add_item(&server(), "missing", item("margherita", 1))
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::NotFound {
            kind: ResourceKind::Order,
            ..
        }
    ));

    let order = ctx.manager.open_order_for_table(&server(), "t1").unwrap();

    let err = ctx
        .manager
        .add_item(&server(), &order.id, item("unknown-dish", 1))
        .unwrap_err();
    assert!(matches!(err, OrderError::ItemUnavailable(ref id) if id == "unknown-dish"));

    // Unavailable wins over a bad quantity
    ctx.catalog.set_available("tiramisu", false);
    let err = ctx
        .manager
        .add_item(&server(), &order.id, item("tiramisu", 0))
        .unwrap_err();
    assert!(matches!(err, OrderError::ItemUnavailable(_)));

    for quantity in [0, -3] {
        let err = ctx
            .manager
            .add_item(&server(), &order.id, item("margherita", quantity))
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity(q) if q == quantity));
    }

    let detail = ctx.manager.get_order(&server(), &order.id).unwrap();
    assert!(detail.items.is_empty());
}

#[test]
fn test_blank_notes_are_dropped() {
    let ctx = create_test_manager();
    let order = ctx.manager.open_order_for_table(&server(), "t1").unwrap();
    let added = ctx
        .manager
        .add_item(
            &server(),
            &order.id,
            AddItemInput {
                menu_item_id: "diavola".to_string(),
                quantity: 1,
                notes: Some("   ".to_string()),
            },
        )
        .unwrap();
    assert!(added.notes.is_none());
}

#[test]
fn test_items_keep_creation_order() {
    let ctx = create_test_manager();
    let order = ctx.manager.open_order_for_table(&server(), "t1").unwrap();
    let ids: Vec<String> = ["margherita", "spritz", "tiramisu", "coca-cola"]
        .iter()
        .map(|m| add(&ctx, &order.id, m, 1).id)
        .collect();

    let detail = ctx.manager.get_order(&server(), &order.id).unwrap();
    let stored: Vec<String> = detail.items.iter().map(|i| i.id.clone()).collect();
    assert_eq!(stored, ids);
    assert!(detail.items.windows(2).all(|w| w[0].seq < w[1].seq));
}

#[test]
fn test_closed_order_rejects_item_changes() {
    let ctx = create_test_manager();
    let order = ctx.manager.open_order_for_table(&server(), "t3").unwrap();
    let a = add(&ctx, &order.id, "margherita", 1);
    add(&ctx, &order.id, "spritz", 1);
    ctx.manager.send_order(&server(), &order.id).unwrap();
    ctx.manager.close_order(&server(), &order.id).unwrap();
    ctx.broadcaster.take();

    let err = ctx
        .manager
        .add_item(&server(), &order.id, item("margherita", 1))
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderClosed(_)));

    // The item row is gone but its id still resolves to the closed order
    let err = ctx
        .manager
        .update_item_status(&kitchen(), &a.id, OrderItemStatus::Done)
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderClosed(ref id) if id == &order.id));
    assert_eq!(ctx.broadcaster.count(), 0);
}

#[test]
fn test_closed_item_markers_expire() {
    let ctx = create_test_manager_with(
        OrderStorage::open_in_memory()
            .unwrap()
            .with_closed_marker_retention(1),
    );
    let first = ctx.manager.open_order_for_table(&server(), "t1").unwrap();
    let old = add(&ctx, &first.id, "margherita", 1);
    ctx.manager.close_order(&server(), &first.id).unwrap();

    let second = ctx.manager.open_order_for_table(&server(), "t2").unwrap();
    let recent = add(&ctx, &second.id, "spritz", 1);
    ctx.manager.close_order(&server(), &second.id).unwrap();

    let err = ctx
        .manager
        .update_item_status(&kitchen(), &recent.id, OrderItemStatus::Done)
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderClosed(ref id) if id == &second.id));

    // Older than the retention window: the id no longer resolves
    let err = ctx
        .manager
        .update_item_status(&kitchen(), &old.id, OrderItemStatus::Done)
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::NotFound {
            kind: ResourceKind::OrderItem,
            ..
        }
    ));
}

#[test]
fn test_update_status_broadcasts_to_table_and_station() {
    let mut ctx = create_test_manager();
    let order = ctx.manager.open_order_for_table(&server(), "t2").unwrap();
    let drink = add(&ctx, &order.id, "spritz", 1);
    ctx.manager.send_order(&server(), &order.id).unwrap();
    ctx.broadcaster.take();
    ctx.audit_actions();

    let updated = ctx
        .manager
        .update_item_status(&bar(), &drink.id, OrderItemStatus::InProgress)
        .unwrap();
    assert_eq!(updated.status, OrderItemStatus::InProgress);
    assert_eq!(
        ctx.broadcaster.take(),
        vec![
            (table_room("t2"), RealtimeEvent::ItemUpdate(updated.clone())),
            (
                Room::Station(Station::Bar),
                RealtimeEvent::ItemUpdate(updated)
            ),
        ]
    );
    assert_eq!(ctx.audit_actions(), vec![AuditAction::OrderItemStatus]);
}

#[test]
fn test_update_status_unknown_item() {
    let ctx = create_test_manager();
    let err = ctx
        .manager
        .update_item_status(&kitchen(), "missing", OrderItemStatus::Done)
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::NotFound {
            kind: ResourceKind::OrderItem,
            ..
        }
    ));
}

#[test]
fn test_strict_transitions_reject_backwards_moves() {
    let ctx = create_test_manager();
    let order = ctx.manager.open_order_for_table(&server(), "t1").unwrap();
    let pizza = add(&ctx, &order.id, "margherita", 1);

    ctx.manager
        .update_item_status(&kitchen(), &pizza.id, OrderItemStatus::InProgress)
        .unwrap();
    ctx.manager
        .update_item_status(&kitchen(), &pizza.id, OrderItemStatus::Done)
        .unwrap();
    ctx.broadcaster.take();

    let err = ctx
        .manager
        .update_item_status(&kitchen(), &pizza.id, OrderItemStatus::New)
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition {
            from: OrderItemStatus::Done,
            to: OrderItemStatus::New
        }
    ));
    assert_eq!(ctx.broadcaster.count(), 0);

    // Re-setting the current status is a re-broadcast, not an error
    ctx.manager
        .update_item_status(&kitchen(), &pizza.id, OrderItemStatus::Done)
        .unwrap();
    assert_eq!(ctx.broadcaster.count(), 2);
}

#[test]
fn test_relaxed_transitions_accept_any_target() {
    let ctx = create_test_manager();
    let TestContext {
        manager,
        broadcaster,
        audit_rx: _audit_rx,
        ..
    } = ctx;
    let manager = manager.with_strict_item_transitions(false);
    assert!(!manager.strict_item_transitions());

    let order = manager.open_order_for_table(&server(), "t1").unwrap();
    let pizza = manager
        .add_item(&server(), &order.id, item("margherita", 1))
        .unwrap();
    manager
        .update_item_status(&kitchen(), &pizza.id, OrderItemStatus::Done)
        .unwrap();
    let back = manager
        .update_item_status(&kitchen(), &pizza.id, OrderItemStatus::New)
        .unwrap();
    assert_eq!(back.status, OrderItemStatus::New);
    assert_eq!(broadcaster.count(), 4);
}

#[test]
fn test_ledger_roles() {
    let ctx = create_test_manager();
    let order = ctx.manager.open_order_for_table(&server(), "t1").unwrap();
    assert!(matches!(
        ctx.manager.add_item(&kitchen(), &order.id, item("margherita", 1)),
        Err(OrderError::Forbidden(_))
    ));

    let pizza = add(&ctx, &order.id, "margherita", 1);
    assert!(matches!(
        ctx.manager
            .update_item_status(&server(), &pizza.id, OrderItemStatus::Done),
        Err(OrderError::Forbidden(_))
    ));
}
