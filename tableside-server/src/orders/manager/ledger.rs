//! Order item ledger: add item / update item status

use serde_json::json;
use shared::message::RealtimeEvent;
use shared::models::{OrderItem, OrderItemStatus, OrderStatus};
use shared::util::{new_id, now_millis};

use super::{AddItemInput, OrdersManager};
use crate::audit::AuditAction;
use crate::auth::{Actor, Operation, authorize};
use crate::orders::error::{OrderError, OrderResult, ResourceKind};
use crate::orders::routing::route_station;

impl OrdersManager {
    /// Add a line item to an OPEN or SENT order
    ///
    /// 站点、名称、单价在此刻从菜单快照。订单已 SENT 时立即通知站点与桌台；
    /// OPEN 时静默累积，等 `send_order` 批量推送。
    pub fn add_item(
        &self,
        actor: &Actor,
        order_id: &str,
        input: AddItemInput,
    ) -> OrderResult<OrderItem> {
        authorize(actor, Operation::AddItem)?;

        let txn = self.storage.begin_write()?;
        let order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::Order, order_id))?;
        if order.status == OrderStatus::Closed {
            return Err(OrderError::OrderClosed(order_id.to_string()));
        }

        let menu_item = self
            .catalog
            .get(&input.menu_item_id)
            .filter(|m| m.available)
            .ok_or_else(|| OrderError::ItemUnavailable(input.menu_item_id.clone()))?;

        let quantity = u32::try_from(input.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(OrderError::InvalidQuantity(input.quantity))?;

        let item = OrderItem {
            id: new_id(),
            order_id: order_id.to_string(),
            menu_item_id: menu_item.id,
            name_snapshot: menu_item.name,
            unit_price_cents: menu_item.price_cents,
            quantity,
            notes: input.notes.filter(|n| !n.trim().is_empty()),
            station: route_station(menu_item.class),
            status: OrderItemStatus::New,
            created_at: now_millis(),
            seq: self.storage.next_item_seq(&txn)?,
        };
        self.storage.put_item(&txn, &item)?;
        txn.commit()?;

        if order.status == OrderStatus::Sent {
            self.broadcaster
                .publish_to_station(item.station, RealtimeEvent::NewItem(item.clone()));
            self.broadcaster
                .publish_to_table(&order.table_id, RealtimeEvent::ItemUpdate(item.clone()));
        }

        tracing::info!(
            order_id,
            item_id = %item.id,
            menu_item_id = %item.menu_item_id,
            station = %item.station,
            quantity,
            "Item added"
        );
        self.audit(
            AuditAction::OrderItemAdded,
            "order_item",
            &item.id,
            actor,
            json!({
                "order_id": order_id,
                "menu_item_id": item.menu_item_id,
                "quantity": quantity,
                "station": item.station,
            }),
        );
        Ok(item)
    }

    /// Set an item's preparation status
    ///
    /// Resolves the item through the index, so an item of a recently closed
    /// order reports `OrderClosed` rather than `NotFound`.
    pub fn update_item_status(
        &self,
        actor: &Actor,
        item_id: &str,
        status: OrderItemStatus,
    ) -> OrderResult<OrderItem> {
        authorize(actor, Operation::UpdateItemStatus)?;

        let txn = self.storage.begin_write()?;
        let (order_id, seq) = self
            .storage
            .find_item_location_txn(&txn, item_id)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::OrderItem, item_id))?;
        let order = self
            .storage
            .get_order_txn(&txn, &order_id)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::Order, order_id.as_str()))?;
        if order.status == OrderStatus::Closed {
            return Err(OrderError::OrderClosed(order_id));
        }
        let mut item = self
            .storage
            .get_item_txn(&txn, &order_id, seq)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::OrderItem, item_id))?;

        let previous = item.status;
        if self.strict_item_transitions && !previous.can_transition_to(status) {
            return Err(OrderError::InvalidTransition {
                from: previous,
                to: status,
            });
        }
        item.status = status;
        self.storage.put_item(&txn, &item)?;
        txn.commit()?;

        self.broadcaster
            .publish_to_table(&order.table_id, RealtimeEvent::ItemUpdate(item.clone()));
        self.broadcaster
            .publish_to_station(item.station, RealtimeEvent::ItemUpdate(item.clone()));

        tracing::info!(item_id, order_id = %order_id, from = ?previous, to = ?status, "Item status updated");
        self.audit(
            AuditAction::OrderItemStatus,
            "order_item",
            item_id,
            actor,
            json!({ "order_id": order_id, "from": previous, "to": status }),
        );
        Ok(item)
    }
}
