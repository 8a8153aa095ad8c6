//! Order lifecycle: open / send / close

use serde_json::json;
use shared::message::RealtimeEvent;
use shared::models::{
    DiningTable, Order, OrderDetail, OrderItem, OrderStatus, Station, TableStatus,
};
use shared::util::{new_id, now_millis};

use super::OrdersManager;
use crate::audit::AuditAction;
use crate::auth::{Actor, Operation, authorize};
use crate::orders::error::{OrderError, OrderResult, ResourceKind};

impl OrdersManager {
    /// Open (or return) the active order of a table
    ///
    /// 幂等：桌台已有 OPEN/SENT 订单时原样返回，不会产生第二张单。
    /// 查找与创建在同一个写事务中完成，并发开台不会重复建单。
    pub fn open_order_for_table(&self, actor: &Actor, table_id: &str) -> OrderResult<Order> {
        authorize(actor, Operation::OpenOrder)?;

        let txn = self.storage.begin_write()?;
        let mut table = self
            .storage
            .get_table_txn(&txn, table_id)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::Table, table_id))?;

        if let Some(order_id) = self.storage.find_active_order_for_table_txn(&txn, table_id)?
            && let Some(existing) = self.storage.get_order_txn(&txn, &order_id)?
            && existing.status.is_active()
        {
            // Read-only path, nothing to commit
            drop(txn);
            tracing::debug!(table_id, order_id = %existing.id, "Table already has an active order");
            return Ok(existing);
        }

        let order = Order {
            id: new_id(),
            table_id: table_id.to_string(),
            status: OrderStatus::Open,
            created_by_actor_id: actor.id.clone(),
            created_at: now_millis(),
            closed_at: None,
        };
        table.status = TableStatus::Occupied;
        table.current_order_id = Some(order.id.clone());

        self.storage.put_order(&txn, &order)?;
        self.storage.put_table(&txn, &table)?;
        self.storage.mark_table_active(&txn, table_id, &order.id)?;
        txn.commit()?;

        tracing::info!(table_id, table_number = table.number, order_id = %order.id, "Order opened");
        self.audit(
            AuditAction::OrderOpened,
            "order",
            &order.id,
            actor,
            json!({ "table_id": table_id, "table_number": table.number }),
        );
        Ok(order)
    }

    /// Send an order to its stations
    ///
    /// A second send while SENT is a no-op success that re-broadcasts.
    pub fn send_order(&self, actor: &Actor, order_id: &str) -> OrderResult<OrderDetail> {
        authorize(actor, Operation::SendOrder)?;

        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::Order, order_id))?;
        if order.status == OrderStatus::Closed {
            return Err(OrderError::OrderClosed(order_id.to_string()));
        }

        let resend = order.status == OrderStatus::Sent;
        if !resend {
            order.status = OrderStatus::Sent;
            self.storage.put_order(&txn, &order)?;
        }
        let items = self.storage.list_items_txn(&txn, order_id)?;
        let table = self.storage.get_table_txn(&txn, &order.table_id)?;
        txn.commit()?;

        for (station, batch) in partition_by_station(&items) {
            tracing::debug!(order_id, %station, count = batch.len(), "Items sent to station");
            self.broadcaster
                .publish_to_station(station, RealtimeEvent::NewItems(batch));
        }
        self.broadcaster.publish_to_table(
            &order.table_id,
            RealtimeEvent::OrderSent {
                order_id: order.id.clone(),
                items: items.clone(),
            },
        );

        tracing::info!(order_id, table_id = %order.table_id, items = items.len(), resend, "Order sent");
        self.audit(
            AuditAction::OrderSent,
            "order",
            order_id,
            actor,
            json!({ "table_id": order.table_id, "item_count": items.len(), "resend": resend }),
        );

        Ok(OrderDetail {
            order,
            items,
            table,
        })
    }

    /// Close an order: hard-delete its items and free its table
    ///
    /// Closing an already CLOSED order fails with `OrderClosed` and changes nothing.
    /// The table is only freed if it still points at this order.
    pub fn close_order(&self, actor: &Actor, order_id: &str) -> OrderResult<Order> {
        authorize(actor, Operation::CloseOrder)?;

        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::Order, order_id))?;
        if order.status == OrderStatus::Closed {
            return Err(OrderError::OrderClosed(order_id.to_string()));
        }

        let removed_ids = self.storage.remove_items_for_order(&txn, order_id)?;
        let removed = removed_ids.len();
        let pruned = self.storage.mark_items_closed(&txn, order_id, &removed_ids)?;

        order.status = OrderStatus::Closed;
        order.closed_at = Some(now_millis());
        self.storage.put_order(&txn, &order)?;

        let freed = match self.storage.find_table_by_current_order_txn(&txn, order_id)? {
            Some(table) => {
                self.storage.put_table(&txn, &free(table))?;
                true
            }
            None => {
                tracing::warn!(order_id, table_id = %order.table_id, "No table points at this order, left untouched");
                false
            }
        };
        if self.storage.find_active_order_for_table_txn(&txn, &order.table_id)?.as_deref()
            == Some(order_id)
        {
            self.storage.clear_table_active(&txn, &order.table_id)?;
        }
        txn.commit()?;

        self.broadcaster.publish_to_table(
            &order.table_id,
            RealtimeEvent::OrderClosed {
                order_id: order.id.clone(),
            },
        );

        tracing::info!(order_id, table_id = %order.table_id, removed_items = removed, freed, "Order closed");
        if pruned > 0 {
            tracing::debug!(pruned, "Expired closed-item markers pruned");
        }
        self.audit(
            AuditAction::OrderClosed,
            "order",
            order_id,
            actor,
            json!({ "table_id": order.table_id, "removed_items": removed, "table_freed": freed }),
        );
        Ok(order)
    }
}

fn free(mut table: DiningTable) -> DiningTable {
    table.status = TableStatus::Free;
    table.current_order_id = None;
    table
}

/// Non-empty per-station batches, in station order
fn partition_by_station(items: &[OrderItem]) -> Vec<(Station, Vec<OrderItem>)> {
    Station::ALL
        .iter()
        .filter_map(|&station| {
            let batch: Vec<OrderItem> = items
                .iter()
                .filter(|item| item.station == station)
                .cloned()
                .collect();
            (!batch.is_empty()).then_some((station, batch))
        })
        .collect()
}
