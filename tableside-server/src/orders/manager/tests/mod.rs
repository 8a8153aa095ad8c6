use super::*;
use crate::audit::{AuditLogRequest, AuditStorage};
use crate::auth::Role;
use crate::catalog::InMemoryMenuCatalog;
use parking_lot::Mutex;
use shared::message::{RealtimeEvent, Room};
use shared::models::{DiningTable, OrderItem, OrderItemStatus, OrderStatus, Station};
use tokio::sync::mpsc;

/// Broadcaster fake that records every publish
#[derive(Default)]
struct RecordingBroadcaster {
    published: Mutex<Vec<(Room, RealtimeEvent)>>,
}

impl RecordingBroadcaster {
    fn take(&self) -> Vec<(Room, RealtimeEvent)> {
        std::mem::take(&mut *self.published.lock())
    }

    fn count(&self) -> usize {
        self.published.lock().len()
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn publish_to_table(&self, table_id: &str, event: RealtimeEvent) {
        self.published
            .lock()
            .push((Room::Table(table_id.to_string()), event));
    }

    fn publish_to_station(&self, station: Station, event: RealtimeEvent) {
        self.published.lock().push((Room::Station(station), event));
    }
}

struct TestContext {
    manager: OrdersManager,
    broadcaster: Arc<RecordingBroadcaster>,
    catalog: Arc<InMemoryMenuCatalog>,
    audit_rx: mpsc::Receiver<AuditLogRequest>,
}

impl TestContext {
    /// Audit actions emitted so far, in order
    fn audit_actions(&mut self) -> Vec<AuditAction> {
        let mut actions = Vec::new();
        while let Ok(req) = self.audit_rx.try_recv() {
            actions.push(req.action);
        }
        actions
    }
}

/// Tables `t1..=t6` numbered 1..=6, demo menu
fn create_test_manager() -> TestContext {
    create_test_manager_with(OrderStorage::open_in_memory().unwrap())
}

fn create_test_manager_with(storage: OrderStorage) -> TestContext {
    let txn = storage.begin_write().unwrap();
    for number in 1..=6 {
        storage
            .put_table(&txn, &DiningTable::new(format!("t{}", number), number))
            .unwrap();
    }
    txn.commit().unwrap();

    let catalog = Arc::new(InMemoryMenuCatalog::with_demo_menu());
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let (audit, audit_rx) = AuditService::new(AuditStorage::open_in_memory().unwrap(), 64);
    let manager = OrdersManager::new(storage, catalog.clone(), broadcaster.clone(), audit);

    TestContext {
        manager,
        broadcaster,
        catalog,
        audit_rx,
    }
}

fn server() -> Actor {
    Actor::new("waiter-1", Role::Server)
}

fn kitchen() -> Actor {
    Actor::new("chef-1", Role::Kitchen)
}

fn bar() -> Actor {
    Actor::new("barman-1", Role::Bar)
}

fn item(menu_item_id: &str, quantity: i64) -> AddItemInput {
    AddItemInput {
        menu_item_id: menu_item_id.to_string(),
        quantity,
        notes: None,
    }
}

fn add(ctx: &TestContext, order_id: &str, menu_item_id: &str, quantity: i64) -> OrderItem {
    ctx.manager
        .add_item(&server(), order_id, item(menu_item_id, quantity))
        .unwrap()
}

fn table_room(table_id: &str) -> Room {
    Room::Table(table_id.to_string())
}

mod test_ledger;
