use serde::Serialize;
use serde_json::json;
use shared::message::RealtimeEvent;
use shared::models::{
    DiningTable, DiningTableUpdate, OrderItem, OrderItemStatus, OrderStatus, Station,
    TableIndicators, TableView,
};
use shared::util::new_id;
use std::sync::Arc;

use crate::audit::{AuditAction, AuditService};
use crate::auth::{Actor, Operation, authorize};
use crate::orders::{OrderError, OrderResult, OrderStorage, ResourceKind};
use crate::realtime::Broadcaster;

/// Per-table display state derived from the active order's items
pub struct TableOccupancy {
    storage: OrderStorage,
    broadcaster: Arc<dyn Broadcaster>,
    audit: Arc<AuditService>,
}

/// Result of deleting a table
#[derive(Debug, Clone, Serialize)]
pub struct TableRemoval {
    pub table: DiningTable,
    /// Orders of the table, closed ones included
    pub removed_orders: usize,
    pub removed_items: usize,
    /// OPEN/SENT order that was discarded with the table
    pub active_order_id: Option<String>,
}

/// Aggregate item statuses; CANCELLED items are not counted
pub fn indicators_for(items: &[OrderItem]) -> TableIndicators {
    items
        .iter()
        .fold(TableIndicators::default(), |mut acc, item| {
            match item.status {
                OrderItemStatus::New => acc.new_count += 1,
                OrderItemStatus::InProgress => acc.in_progress_count += 1,
                OrderItemStatus::Done => acc.done_count += 1,
                OrderItemStatus::Cancelled => {}
            }
            acc
        })
}

fn check_number(number: u32) -> OrderResult<()> {
    if number == 0 {
        return Err(OrderError::InvalidTableNumber(number));
    }
    Ok(())
}

impl TableOccupancy {
    pub fn new(
        storage: OrderStorage,
        broadcaster: Arc<dyn Broadcaster>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            storage,
            broadcaster,
            audit,
        }
    }

    /// Every table with its indicators, by table number
    pub fn list_with_indicators(&self, actor: &Actor) -> OrderResult<Vec<TableView>> {
        authorize(actor, Operation::ListTables)?;

        let views = self
            .storage
            .list_tables_with_active_items()?
            .into_iter()
            .map(|(table, items)| {
                let indicators = indicators_for(&items);
                TableView {
                    table,
                    ready: indicators.is_ready(),
                    indicators,
                }
            })
            .collect();
        Ok(views)
    }

    /// Create a table (admin)
    pub fn create_table(&self, actor: &Actor, number: u32) -> OrderResult<DiningTable> {
        authorize(actor, Operation::ManageTables)?;
        check_number(number)?;

        let txn = self.storage.begin_write()?;
        if self.storage.table_number_exists_txn(&txn, number)? {
            return Err(OrderError::TableNumberExists(number));
        }
        let table = DiningTable::new(new_id(), number);
        self.storage.put_table(&txn, &table)?;
        txn.commit()?;

        tracing::info!(table_id = %table.id, number, "Table created");
        self.audit.log(
            AuditAction::TableCreated,
            "table",
            &table.id,
            Some(actor.id.clone()),
            json!({ "number": number }),
        );
        Ok(table)
    }

    /// Renumber a table (admin)
    ///
    /// Occupancy is not writable here, it follows the order lifecycle.
    pub fn update_table(
        &self,
        actor: &Actor,
        table_id: &str,
        update: DiningTableUpdate,
    ) -> OrderResult<DiningTable> {
        authorize(actor, Operation::ManageTables)?;

        let txn = self.storage.begin_write()?;
        let mut table = self
            .storage
            .get_table_txn(&txn, table_id)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::Table, table_id))?;
        let previous = table.number;

        if let Some(number) = update.number {
            check_number(number)?;
            if self
                .storage
                .table_number_taken_by_other_txn(&txn, number, table_id)?
            {
                return Err(OrderError::TableNumberExists(number));
            }
            table.number = number;
        }
        self.storage.put_table(&txn, &table)?;
        txn.commit()?;

        tracing::info!(table_id, from = previous, to = table.number, "Table updated");
        self.audit.log(
            AuditAction::TableUpdated,
            "table",
            table_id,
            Some(actor.id.clone()),
            json!({ "previous_number": previous, "number": table.number }),
        );
        Ok(table)
    }

    /// Delete a table with every order ever opened on it (admin)
    ///
    /// 一个写事务内完成：删除明细及其索引、订单、活动订单登记，最后删除桌台。
    /// 活动订单随桌台一起作废，桌台房间与相关站点收到 `order_closed`。
    pub fn delete_table(&self, actor: &Actor, table_id: &str) -> OrderResult<TableRemoval> {
        authorize(actor, Operation::ManageTables)?;

        let txn = self.storage.begin_write()?;
        let table = self
            .storage
            .get_table_txn(&txn, table_id)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::Table, table_id))?;

        let active_order = match self.storage.find_active_order_for_table_txn(&txn, table_id)? {
            Some(order_id) => self.storage.get_order_txn(&txn, &order_id)?,
            None => None,
        };
        let active_items = match &active_order {
            Some(order) => self.storage.list_items_txn(&txn, &order.id)?,
            None => Vec::new(),
        };

        let order_ids = self.storage.list_order_ids_for_table_txn(&txn, table_id)?;
        let mut removed_items = 0;
        for order_id in &order_ids {
            removed_items += self.storage.remove_items_for_order(&txn, order_id)?.len();
            self.storage.remove_order(&txn, order_id)?;
        }
        self.storage
            .remove_closed_markers_for_orders(&txn, &order_ids)?;
        self.storage.clear_table_active(&txn, table_id)?;
        self.storage.remove_table(&txn, table_id)?;
        txn.commit()?;

        if let Some(order) = &active_order {
            let event = RealtimeEvent::OrderClosed {
                order_id: order.id.clone(),
            };
            if order.status == OrderStatus::Sent {
                for station in Station::ALL {
                    if active_items.iter().any(|item| item.station == station) {
                        self.broadcaster.publish_to_station(station, event.clone());
                    }
                }
            }
            self.broadcaster.publish_to_table(table_id, event);
        }

        let removal = TableRemoval {
            table,
            removed_orders: order_ids.len(),
            removed_items,
            active_order_id: active_order.map(|order| order.id),
        };
        tracing::info!(
            table_id,
            number = removal.table.number,
            removed_orders = removal.removed_orders,
            removed_items,
            "Table deleted"
        );
        self.audit.log(
            AuditAction::TableDeleted,
            "table",
            table_id,
            Some(actor.id.clone()),
            json!({
                "number": removal.table.number,
                "removed_orders": removal.removed_orders,
                "removed_items": removed_items,
                "active_order_id": removal.active_order_id,
            }),
        );
        Ok(removal)
    }

    /// Create tables 1..=count when the store has none; returns how many were created
    pub fn seed_tables(&self, count: u32) -> OrderResult<usize> {
        if count == 0 || self.storage.count_tables()? > 0 {
            return Ok(0);
        }

        let txn = self.storage.begin_write()?;
        for number in 1..=count {
            self.storage
                .put_table(&txn, &DiningTable::new(new_id(), number))?;
        }
        txn.commit()?;

        tracing::info!(count, "Seeded dining tables");
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditLogRequest, AuditStorage};
    use crate::auth::Role;
    use crate::catalog::InMemoryMenuCatalog;
    use crate::orders::{AddItemInput, OrdersManager};
    use crate::realtime::RoomHub;
    use crate::stations::StationQueue;
    use shared::message::Room;
    use shared::models::TableStatus;
    use tokio::sync::mpsc;

    fn admin() -> Actor {
        Actor::new("admin", Role::Admin)
    }

    fn waiter() -> Actor {
        Actor::new("w", Role::Server)
    }

    fn chef() -> Actor {
        Actor::new("k", Role::Kitchen)
    }

    struct Fixture {
        tables: TableOccupancy,
        manager: OrdersManager,
        queue: StationQueue,
        hub: RoomHub,
        rx: mpsc::Receiver<AuditLogRequest>,
    }

    fn setup() -> Fixture {
        let storage = OrderStorage::open_in_memory().unwrap();
        let catalog = Arc::new(InMemoryMenuCatalog::with_demo_menu());
        let hub = RoomHub::new(16);
        let (audit, rx) = AuditService::new(AuditStorage::open_in_memory().unwrap(), 64);
        let manager = OrdersManager::new(
            storage.clone(),
            catalog.clone(),
            Arc::new(hub.clone()),
            audit.clone(),
        );
        Fixture {
            tables: TableOccupancy::new(storage.clone(), Arc::new(hub.clone()), audit),
            manager,
            queue: StationQueue::new(storage, catalog),
            hub,
            rx,
        }
    }

    fn add(manager: &OrdersManager, order_id: &str, menu_item_id: &str) -> OrderItem {
        manager
            .add_item(
                &waiter(),
                order_id,
                AddItemInput {
                    menu_item_id: menu_item_id.to_string(),
                    quantity: 1,
                    notes: None,
                },
            )
            .unwrap()
    }

    #[test]
    fn test_seed_only_when_empty() {
        let f = setup();
        assert_eq!(f.tables.seed_tables(15).unwrap(), 15);
        assert_eq!(f.tables.seed_tables(15).unwrap(), 0);

        let views = f.tables.list_with_indicators(&waiter()).unwrap();
        let numbers: Vec<u32> = views.iter().map(|v| v.table.number).collect();
        assert_eq!(numbers, (1..=15).collect::<Vec<_>>());
        assert!(views.iter().all(|v| v.table.status == TableStatus::Free));
        assert!(views.iter().all(|v| v.indicators == TableIndicators::default()));
    }

    #[test]
    fn test_create_table_rejects_duplicate_number() {
        let mut f = setup();
        let created = f.tables.create_table(&admin(), 12).unwrap();
        assert_eq!(created.number, 12);
        assert!(created.is_free());

        let err = f.tables.create_table(&admin(), 12).unwrap_err();
        assert!(matches!(err, OrderError::TableNumberExists(12)));

        let err = f.tables.create_table(&admin(), 0).unwrap_err();
        assert!(matches!(err, OrderError::InvalidTableNumber(0)));

        let err = f.tables.create_table(&waiter(), 13).unwrap_err();
        assert!(matches!(err, OrderError::Forbidden(_)));

        assert_eq!(f.rx.try_recv().unwrap().action, AuditAction::TableCreated);
        assert!(f.rx.try_recv().is_err());
    }

    #[test]
    fn test_indicators_follow_active_order() {
        let f = setup();
        let t = f.tables.create_table(&admin(), 4).unwrap();
        f.tables.create_table(&admin(), 2).unwrap();

        let order = f.manager.open_order_for_table(&waiter(), &t.id).unwrap();
        let ids: Vec<String> = ["margherita", "diavola", "spritz", "tiramisu"]
            .into_iter()
            .map(|m| add(&f.manager, &order.id, m).id)
            .collect();
        f.manager
            .update_item_status(&chef(), &ids[0], OrderItemStatus::InProgress)
            .unwrap();
        f.manager
            .update_item_status(&chef(), &ids[1], OrderItemStatus::InProgress)
            .unwrap();
        f.manager
            .update_item_status(&chef(), &ids[1], OrderItemStatus::Done)
            .unwrap();
        f.manager
            .update_item_status(&chef(), &ids[3], OrderItemStatus::Cancelled)
            .unwrap();

        let views = f.tables.list_with_indicators(&waiter()).unwrap();
        assert_eq!(views[0].table.number, 2);
        assert_eq!(views[0].indicators, TableIndicators::default());

        let four = &views[1];
        assert_eq!(four.table.status, TableStatus::Occupied);
        assert_eq!(
            four.indicators,
            TableIndicators {
                new_count: 1,
                in_progress_count: 1,
                done_count: 1,
            }
        );
        assert!(!four.ready);

        f.manager.close_order(&waiter(), &order.id).unwrap();
        let views = f.tables.list_with_indicators(&waiter()).unwrap();
        assert_eq!(views[1].indicators, TableIndicators::default());
        assert_eq!(views[1].table.status, TableStatus::Free);
    }

    #[test]
    fn test_list_requires_front_of_house() {
        let f = setup();
        let err = f
            .tables
            .list_with_indicators(&Actor::new("b", Role::Bar))
            .unwrap_err();
        assert!(matches!(err, OrderError::Forbidden(_)));
    }

    #[test]
    fn test_update_table_renumbers() {
        let mut f = setup();
        let a = f.tables.create_table(&admin(), 1).unwrap();
        f.tables.create_table(&admin(), 2).unwrap();
        let order = f.manager.open_order_for_table(&waiter(), &a.id).unwrap();

        let updated = f
            .tables
            .update_table(&admin(), &a.id, DiningTableUpdate { number: Some(9) })
            .unwrap();
        assert_eq!(updated.number, 9);
        // occupancy untouched
        assert_eq!(updated.status, TableStatus::Occupied);
        assert_eq!(updated.current_order_id.as_deref(), Some(order.id.as_str()));

        // keeping its own number is not a conflict
        f.tables
            .update_table(&admin(), &a.id, DiningTableUpdate { number: Some(9) })
            .unwrap();

        let err = f
            .tables
            .update_table(&admin(), &a.id, DiningTableUpdate { number: Some(2) })
            .unwrap_err();
        assert!(matches!(err, OrderError::TableNumberExists(2)));

        let err = f
            .tables
            .update_table(&admin(), "missing", DiningTableUpdate::default())
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::NotFound {
                kind: ResourceKind::Table,
                ..
            }
        ));

        let err = f
            .tables
            .update_table(&waiter(), &a.id, DiningTableUpdate { number: Some(5) })
            .unwrap_err();
        assert!(matches!(err, OrderError::Forbidden(_)));

        let actions: Vec<AuditAction> = std::iter::from_fn(|| f.rx.try_recv().ok())
            .map(|req| req.action)
            .filter(|a| *a == AuditAction::TableUpdated)
            .collect();
        assert_eq!(actions.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_occupied_table_clears_queue() {
        let f = setup();
        let doomed = f.tables.create_table(&admin(), 3).unwrap();
        let other = f.tables.create_table(&admin(), 5).unwrap();

        // a closed order and a sent one on the doomed table
        let old = f.manager.open_order_for_table(&waiter(), &doomed.id).unwrap();
        let old_item = add(&f.manager, &old.id, "carbonara");
        f.manager.close_order(&waiter(), &old.id).unwrap();

        let active = f.manager.open_order_for_table(&waiter(), &doomed.id).unwrap();
        let pizza = add(&f.manager, &active.id, "margherita");
        add(&f.manager, &active.id, "diavola");
        f.manager.send_order(&waiter(), &active.id).unwrap();

        let kept = f.manager.open_order_for_table(&waiter(), &other.id).unwrap();
        let kept_item = add(&f.manager, &kept.id, "bolognese");
        f.manager.send_order(&waiter(), &kept.id).unwrap();

        let mut kitchen_rx = f.hub.subscribe(&Room::station(Station::Kitchen));
        let mut bar_rx = f.hub.subscribe(&Room::station(Station::Bar));
        let mut table_rx = f.hub.subscribe(&Room::table(doomed.id.clone()));

        let removal = f.tables.delete_table(&admin(), &doomed.id).unwrap();
        assert_eq!(removal.removed_orders, 2);
        assert_eq!(removal.removed_items, 2);
        assert_eq!(removal.active_order_id.as_deref(), Some(active.id.as_str()));

        // only the other table's item is left in the kitchen queue
        let queue = f.queue.get_queue(&chef(), Station::Kitchen).unwrap();
        let ids: Vec<&str> = queue.iter().map(|e| e.item.id.as_str()).collect();
        assert_eq!(ids, vec![kept_item.id.as_str()]);

        let views = f.tables.list_with_indicators(&waiter()).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].table.id, other.id);

        // items and their index entries are gone
        for item_id in [&pizza.id, &old_item.id] {
            let err = f
                .manager
                .update_item_status(&chef(), item_id, OrderItemStatus::Done)
                .unwrap_err();
            assert!(matches!(
                err,
                OrderError::NotFound {
                    kind: ResourceKind::OrderItem,
                    ..
                }
            ));
        }
        let err = f.manager.get_order(&waiter(), &active.id).unwrap_err();
        assert!(matches!(err, OrderError::NotFound { .. }));

        let closed = RealtimeEvent::OrderClosed {
            order_id: active.id.clone(),
        };
        assert_eq!(kitchen_rx.recv().await.unwrap().event, closed);
        assert_eq!(table_rx.recv().await.unwrap().event, closed);
        // the order had nothing for the bar
        assert!(bar_rx.try_recv().is_err());

        // the number is free again and the table id can no longer be opened
        f.tables.create_table(&admin(), 3).unwrap();
        let err = f
            .manager
            .open_order_for_table(&waiter(), &doomed.id)
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::NotFound {
                kind: ResourceKind::Table,
                ..
            }
        ));
    }

    #[test]
    fn test_delete_free_table() {
        let mut f = setup();
        let t = f.tables.create_table(&admin(), 8).unwrap();
        f.rx.try_recv().unwrap();

        let err = f.tables.delete_table(&waiter(), &t.id).unwrap_err();
        assert!(matches!(err, OrderError::Forbidden(_)));

        let removal = f.tables.delete_table(&admin(), &t.id).unwrap();
        assert_eq!(removal.removed_orders, 0);
        assert!(removal.active_order_id.is_none());
        assert_eq!(f.rx.try_recv().unwrap().action, AuditAction::TableDeleted);

        let err = f.tables.delete_table(&admin(), &t.id).unwrap_err();
        assert!(matches!(err, OrderError::NotFound { .. }));
        assert_eq!(f.hub.room_count(), 0);
    }
}
