use shared::models::{QueueEntry, Station};
use std::sync::Arc;

use crate::auth::{Actor, Operation, authorize};
use crate::catalog::MenuCatalog;
use crate::orders::{OrderResult, OrderStorage};

/// Read-only projection of the items a station still has to prepare
pub struct StationQueue {
    storage: OrderStorage,
    catalog: Arc<dyn MenuCatalog>,
}

impl StationQueue {
    pub fn new(storage: OrderStorage, catalog: Arc<dyn MenuCatalog>) -> Self {
        Self { storage, catalog }
    }

    /// NEW / IN_PROGRESS items of SENT orders routed to `station`
    ///
    /// Ordered by status (NEW first), then `created_at`, then `seq`.
    /// Recipe text and image come from the catalog as it is now.
    pub fn get_queue(&self, actor: &Actor, station: Station) -> OrderResult<Vec<QueueEntry>> {
        authorize(actor, Operation::ViewQueue(station))?;

        let mut pending = self.storage.list_sent_items_for_station(station)?;
        pending.sort_by_key(|p| (p.item.status, p.item.created_at, p.item.seq));

        let entries: Vec<QueueEntry> = pending
            .into_iter()
            .map(|p| {
                let menu_item = self.catalog.get(&p.item.menu_item_id);
                QueueEntry {
                    recipe_text: menu_item.as_ref().and_then(|m| m.recipe_text.clone()),
                    image_ref: menu_item.and_then(|m| m.image_ref),
                    table_id: p.table_id,
                    table_number: p.table_number,
                    item: p.item,
                }
            })
            .collect();

        tracing::debug!(%station, count = entries.len(), "Station queue loaded");
        Ok(entries)
    }
}
