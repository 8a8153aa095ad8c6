//! OrdersManager - order lifecycle and item ledger
//!
//! Every mutation follows the same shape:
//!
//! ```text
//! operation(actor, ..)
//!     ├─ 1. authorize(actor, operation)
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Load + validate (NotFound / OrderClosed / ...)
//!     ├─ 4. Persist changes
//!     ├─ 5. Commit
//!     ├─ 6. Broadcast to table / station rooms
//!     └─ 7. Audit (fire-and-forget)
//! ```
//!
//! - [`lifecycle`]: open / send / close
//! - [`ledger`]: add item / update item status

mod ledger;
mod lifecycle;

#[cfg(test)]
mod tests;

use serde::Deserialize;
use shared::models::OrderDetail;
use std::sync::Arc;

use super::error::{OrderError, OrderResult, ResourceKind};
use super::storage::OrderStorage;
use crate::audit::{AuditAction, AuditService};
use crate::auth::{Actor, Operation, authorize};
use crate::catalog::MenuCatalog;
use crate::realtime::Broadcaster;

/// Input for [`OrdersManager::add_item`]
#[derive(Debug, Clone, Deserialize)]
pub struct AddItemInput {
    pub menu_item_id: String,
    /// Signed so that non-positive values reach validation instead of failing to parse
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Order core
///
/// 持有存储与协作者（菜单、广播、审计），所有依赖在构造时显式注入。
pub struct OrdersManager {
    storage: OrderStorage,
    catalog: Arc<dyn MenuCatalog>,
    broadcaster: Arc<dyn Broadcaster>,
    audit: Arc<AuditService>,
    /// Forward-only item transitions
    strict_item_transitions: bool,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &self.storage)
            .field("strict_item_transitions", &self.strict_item_transitions)
            .finish_non_exhaustive()
    }
}

impl OrdersManager {
    pub fn new(
        storage: OrderStorage,
        catalog: Arc<dyn MenuCatalog>,
        broadcaster: Arc<dyn Broadcaster>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            storage,
            catalog,
            broadcaster,
            audit,
            strict_item_transitions: true,
        }
    }

    /// Toggle the forward-only item transition table
    pub fn with_strict_item_transitions(mut self, strict: bool) -> Self {
        self.strict_item_transitions = strict;
        self
    }

    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    pub fn strict_item_transitions(&self) -> bool {
        self.strict_item_transitions
    }

    /// Order with its items and table reference
    pub fn get_order(&self, actor: &Actor, order_id: &str) -> OrderResult<OrderDetail> {
        authorize(actor, Operation::GetOrder)?;
        let (order, items) = self
            .storage
            .find_order_with_items(order_id)?
            .ok_or_else(|| OrderError::not_found(ResourceKind::Order, order_id))?;
        let table = self.storage.get_table(&order.table_id)?;
        Ok(OrderDetail {
            order,
            items,
            table,
        })
    }

    fn audit(
        &self,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        actor: &Actor,
        details: serde_json::Value,
    ) {
        self.audit.log(
            action,
            resource_type,
            resource_id,
            Some(actor.id.clone()),
            details,
        );
    }
}
