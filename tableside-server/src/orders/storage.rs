//! redb-based storage layer for tables, orders and order items
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `dining_tables` | `table_id` | `DiningTable` | 桌台 |
//! | `orders` | `order_id` | `Order` | 订单（含已关闭） |
//! | `order_items` | `(order_id, seq)` | `OrderItem` | 订单明细，按创建序排列 |
//! | `item_index` | `item_id` | `(order_id, seq)` | 明细 ID 反查 |
//! | `closed_item_markers` | `(close_seq, item_id)` | `order_id` | 已关单明细标记（有保留上限） |
//! | `active_table_orders` | `table_id` | `order_id` | 每桌唯一活动订单 |
//! | `sequence_counter` | `"item_seq"` / `"close_seq"` | `u64` | 明细序号 / 关单序号 |
//!
//! # Concurrency
//!
//! redb serialises write transactions. "Look up the table's active order, else
//! create one" runs inside a single write transaction against
//! `active_table_orders`, so two concurrent opens for the same table can never
//! both insert.
//!
//! # Closed items
//!
//! Closing an order hard-deletes its items. Each removed item keeps an
//! `item_index` entry with `seq = 0` (a closed marker) so a late status update
//! resolves to the closed order. Markers are kept for the most recent
//! `closed_marker_retention` closes only; older ones are pruned in the closing
//! transaction, after which the item ID no longer resolves.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::de::DeserializeOwned;
use shared::models::{DiningTable, Order, OrderItem, OrderStatus, Station};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// key = table_id, value = JSON-serialized DiningTable
const DINING_TABLES: TableDefinition<&str, &[u8]> = TableDefinition::new("dining_tables");

/// key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// key = (order_id, seq), value = JSON-serialized OrderItem
const ORDER_ITEMS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("order_items");

/// key = item_id, value = (order_id, seq)
const ITEM_INDEX_TABLE: TableDefinition<&str, (&str, u64)> = TableDefinition::new("item_index");

/// key = table_id, value = order_id of the table's OPEN/SENT order
const ACTIVE_TABLE_ORDERS: TableDefinition<&str, &str> =
    TableDefinition::new("active_table_orders");

/// key = (close_seq, item_id), value = order_id
const CLOSED_ITEM_MARKERS: TableDefinition<(u64, &str), &str> =
    TableDefinition::new("closed_item_markers");

const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const ITEM_SEQ_KEY: &str = "item_seq";
const CLOSE_SEQ_KEY: &str = "close_seq";

/// `item_index` seq of a closed item (live items start at 1)
const CLOSED_MARKER_SEQ: u64 = 0;

/// Closed orders whose item markers are kept
pub const DEFAULT_CLOSED_MARKER_RETENTION: u64 = 1000;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// An item waiting at a station, with the table it belongs to
#[derive(Debug, Clone)]
pub struct StationItem {
    pub item: OrderItem,
    pub table_id: String,
    pub table_number: Option<u32>,
}

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
    closed_marker_retention: u64,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage")
            .field("closed_marker_retention", &self.closed_marker_retention)
            .finish_non_exhaustive()
    }
}

impl OrderStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: once `commit()`
    /// returns the change is on disk.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DINING_TABLES)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ORDER_ITEMS_TABLE)?;
            let _ = write_txn.open_table(ITEM_INDEX_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_TABLE_ORDERS)?;
            let _ = write_txn.open_table(CLOSED_ITEM_MARKERS)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            for key in [ITEM_SEQ_KEY, CLOSE_SEQ_KEY] {
                if seq_table.get(key)?.is_none() {
                    seq_table.insert(key, 0u64)?;
                }
            }
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(db),
            closed_marker_retention: DEFAULT_CLOSED_MARKER_RETENTION,
        })
    }

    /// Keep closed-item markers for the last `closes` closed orders (at least 1)
    pub fn with_closed_marker_retention(mut self, closes: u64) -> Self {
        self.closed_marker_retention = closes.max(1);
        self
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sequence ==========

    /// Increment and return the item sequence
    pub fn next_item_seq(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        next_seq(txn, ITEM_SEQ_KEY)
    }

    // ========== Dining Tables ==========

    pub fn put_table(&self, txn: &WriteTransaction, table: &DiningTable) -> StorageResult<()> {
        let mut t = txn.open_table(DINING_TABLES)?;
        let value = serde_json::to_vec(table)?;
        t.insert(table.id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn get_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: &str,
    ) -> StorageResult<Option<DiningTable>> {
        let t = txn.open_table(DINING_TABLES)?;
        get_json(&t, table_id)
    }

    pub fn get_table(&self, table_id: &str) -> StorageResult<Option<DiningTable>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(DINING_TABLES)?;
        get_json(&t, table_id)
    }

    /// All tables, ordered by table number
    pub fn list_tables(&self) -> StorageResult<Vec<DiningTable>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(DINING_TABLES)?;
        let mut tables: Vec<DiningTable> = all_json(&t)?;
        tables.sort_by_key(|table| table.number);
        Ok(tables)
    }

    pub fn count_tables(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(DINING_TABLES)?;
        Ok(t.len()?)
    }

    /// Check if a table number is taken (within transaction)
    pub fn table_number_exists_txn(&self, txn: &WriteTransaction, number: u32) -> StorageResult<bool> {
        let t = txn.open_table(DINING_TABLES)?;
        let tables: Vec<DiningTable> = all_json(&t)?;
        Ok(tables.iter().any(|table| table.number == number))
    }

    /// Check if a table number is taken by another table (within transaction)
    pub fn table_number_taken_by_other_txn(
        &self,
        txn: &WriteTransaction,
        number: u32,
        table_id: &str,
    ) -> StorageResult<bool> {
        let t = txn.open_table(DINING_TABLES)?;
        let tables: Vec<DiningTable> = all_json(&t)?;
        Ok(tables
            .iter()
            .any(|table| table.number == number && table.id != table_id))
    }

    /// The table whose `current_order_id` points at this order (within transaction)
    pub fn find_table_by_current_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<DiningTable>> {
        let t = txn.open_table(DINING_TABLES)?;
        let tables: Vec<DiningTable> = all_json(&t)?;
        Ok(tables
            .into_iter()
            .find(|table| table.current_order_id.as_deref() == Some(order_id)))
    }

    pub fn remove_table(&self, txn: &WriteTransaction, table_id: &str) -> StorageResult<bool> {
        let mut t = txn.open_table(DINING_TABLES)?;
        Ok(t.remove(table_id)?.is_some())
    }

    // ========== Orders ==========

    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut t = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        t.insert(order.id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn get_order_txn(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<Option<Order>> {
        let t = txn.open_table(ORDERS_TABLE)?;
        get_json(&t, order_id)
    }

    /// IDs of every order ever opened on a table, closed ones included
    pub fn list_order_ids_for_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: &str,
    ) -> StorageResult<Vec<String>> {
        let t = txn.open_table(ORDERS_TABLE)?;
        let orders: Vec<Order> = all_json(&t)?;
        Ok(orders
            .into_iter()
            .filter(|order| order.table_id == table_id)
            .map(|order| order.id)
            .collect())
    }

    pub fn remove_order(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut t = txn.open_table(ORDERS_TABLE)?;
        t.remove(order_id)?;
        Ok(())
    }

    /// Order plus its items, read from one consistent snapshot
    pub fn find_order_with_items(
        &self,
        order_id: &str,
    ) -> StorageResult<Option<(Order, Vec<OrderItem>)>> {
        let read_txn = self.db.begin_read()?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;
        let Some(order) = get_json::<Order>(&orders, order_id)? else {
            return Ok(None);
        };
        let items_table = read_txn.open_table(ORDER_ITEMS_TABLE)?;
        let items = items_for_order(&items_table, order_id)?;
        Ok(Some((order, items)))
    }

    // ========== Active Table Orders ==========

    /// Find the active order for a table (within transaction)
    pub fn find_active_order_for_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: &str,
    ) -> StorageResult<Option<String>> {
        let t = txn.open_table(ACTIVE_TABLE_ORDERS)?;
        Ok(t.get(table_id)?.map(|guard| guard.value().to_string()))
    }

    pub fn mark_table_active(
        &self,
        txn: &WriteTransaction,
        table_id: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut t = txn.open_table(ACTIVE_TABLE_ORDERS)?;
        t.insert(table_id, order_id)?;
        Ok(())
    }

    pub fn clear_table_active(&self, txn: &WriteTransaction, table_id: &str) -> StorageResult<()> {
        let mut t = txn.open_table(ACTIVE_TABLE_ORDERS)?;
        t.remove(table_id)?;
        Ok(())
    }

    // ========== Order Items ==========

    /// Store an item and its index entry
    pub fn put_item(&self, txn: &WriteTransaction, item: &OrderItem) -> StorageResult<()> {
        let mut items = txn.open_table(ORDER_ITEMS_TABLE)?;
        let value = serde_json::to_vec(item)?;
        items.insert((item.order_id.as_str(), item.seq), value.as_slice())?;

        let mut index = txn.open_table(ITEM_INDEX_TABLE)?;
        index.insert(item.id.as_str(), (item.order_id.as_str(), item.seq))?;
        Ok(())
    }

    /// Resolve an item ID to its order (a closed marker resolves with `seq = 0`)
    pub fn find_item_location_txn(
        &self,
        txn: &WriteTransaction,
        item_id: &str,
    ) -> StorageResult<Option<(String, u64)>> {
        let index = txn.open_table(ITEM_INDEX_TABLE)?;
        Ok(index.get(item_id)?.map(|guard| {
            let (order_id, seq) = guard.value();
            (order_id.to_string(), seq)
        }))
    }

    pub fn get_item_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
        seq: u64,
    ) -> StorageResult<Option<OrderItem>> {
        let items = txn.open_table(ORDER_ITEMS_TABLE)?;
        match items.get((order_id, seq))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn find_item(&self, item_id: &str) -> StorageResult<Option<OrderItem>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ITEM_INDEX_TABLE)?;
        let Some((order_id, seq)) = index.get(item_id)?.map(|guard| {
            let (order_id, seq) = guard.value();
            (order_id.to_string(), seq)
        }) else {
            return Ok(None);
        };
        let items = read_txn.open_table(ORDER_ITEMS_TABLE)?;
        match items.get((order_id.as_str(), seq))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_items_txn(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<Vec<OrderItem>> {
        let items = txn.open_table(ORDER_ITEMS_TABLE)?;
        items_for_order(&items, order_id)
    }

    /// Hard-delete every item of an order with its index entry, returns the removed IDs
    pub fn remove_items_for_order(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Vec<String>> {
        let mut items = txn.open_table(ORDER_ITEMS_TABLE)?;
        let removed = items_for_order(&items, order_id)?;
        for item in &removed {
            items.remove((order_id, item.seq))?;
        }

        let mut index = txn.open_table(ITEM_INDEX_TABLE)?;
        for item in &removed {
            index.remove(item.id.as_str())?;
        }
        Ok(removed.into_iter().map(|item| item.id).collect())
    }

    /// Leave a closed marker for each removed item of a closed order
    ///
    /// Prunes the markers of closes older than the retention window; returns
    /// how many markers were pruned.
    pub fn mark_items_closed(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
        item_ids: &[String],
    ) -> StorageResult<usize> {
        let close_seq = next_seq(txn, CLOSE_SEQ_KEY)?;
        {
            let mut index = txn.open_table(ITEM_INDEX_TABLE)?;
            let mut markers = txn.open_table(CLOSED_ITEM_MARKERS)?;
            for item_id in item_ids {
                index.insert(item_id.as_str(), (order_id, CLOSED_MARKER_SEQ))?;
                markers.insert((close_seq, item_id.as_str()), order_id)?;
            }
        }

        let Some(cutoff) = close_seq.checked_sub(self.closed_marker_retention) else {
            return Ok(0);
        };
        let mut markers = txn.open_table(CLOSED_ITEM_MARKERS)?;
        let mut expired = Vec::new();
        for result in markers.range((0u64, "")..(cutoff + 1, ""))? {
            let (key, _value) = result?;
            let (seq, item_id) = key.value();
            expired.push((seq, item_id.to_string()));
        }
        self.drop_markers(txn, &mut markers, &expired)?;
        Ok(expired.len())
    }

    /// Drop the closed markers of the given orders (table deletion)
    pub fn remove_closed_markers_for_orders(
        &self,
        txn: &WriteTransaction,
        order_ids: &[String],
    ) -> StorageResult<usize> {
        let mut markers = txn.open_table(CLOSED_ITEM_MARKERS)?;
        let mut doomed = Vec::new();
        for result in markers.iter()? {
            let (key, value) = result?;
            if order_ids.iter().any(|id| id == value.value()) {
                let (seq, item_id) = key.value();
                doomed.push((seq, item_id.to_string()));
            }
        }
        self.drop_markers(txn, &mut markers, &doomed)?;
        Ok(doomed.len())
    }

    fn drop_markers(
        &self,
        txn: &WriteTransaction,
        markers: &mut redb::Table<'_, (u64, &'static str), &'static str>,
        keys: &[(u64, String)],
    ) -> StorageResult<()> {
        let mut index = txn.open_table(ITEM_INDEX_TABLE)?;
        for (seq, item_id) in keys {
            markers.remove((*seq, item_id.as_str()))?;
            index.remove(item_id.as_str())?;
        }
        Ok(())
    }

    // ========== Projections ==========

    /// Pending items of SENT orders routed to `station`
    pub fn list_sent_items_for_station(&self, station: Station) -> StorageResult<Vec<StationItem>> {
        let read_txn = self.db.begin_read()?;
        let active = read_txn.open_table(ACTIVE_TABLE_ORDERS)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;
        let tables = read_txn.open_table(DINING_TABLES)?;
        let items_table = read_txn.open_table(ORDER_ITEMS_TABLE)?;

        let mut result = Vec::new();
        for entry in active.iter()? {
            let (table_id, order_id) = entry?;
            let (table_id, order_id) = (table_id.value(), order_id.value());

            let Some(order) = get_json::<Order>(&orders, order_id)? else {
                continue;
            };
            if order.status != OrderStatus::Sent {
                continue;
            }
            let table_number = get_json::<DiningTable>(&tables, table_id)?.map(|t| t.number);

            for item in items_for_order(&items_table, order_id)? {
                if item.station == station && item.status.is_pending() {
                    result.push(StationItem {
                        item,
                        table_id: table_id.to_string(),
                        table_number,
                    });
                }
            }
        }
        Ok(result)
    }

    /// Every table with the items of its current order (empty when free)
    pub fn list_tables_with_active_items(&self) -> StorageResult<Vec<(DiningTable, Vec<OrderItem>)>> {
        let read_txn = self.db.begin_read()?;
        let tables = read_txn.open_table(DINING_TABLES)?;
        let items_table = read_txn.open_table(ORDER_ITEMS_TABLE)?;

        let mut all: Vec<DiningTable> = all_json(&tables)?;
        all.sort_by_key(|table| table.number);

        let mut result = Vec::with_capacity(all.len());
        for table in all {
            let items = match table.current_order_id.as_deref() {
                Some(order_id) => items_for_order(&items_table, order_id)?,
                None => Vec::new(),
            };
            result.push((table, items));
        }
        Ok(result)
    }
}

// ========== Helpers ==========

fn next_seq(txn: &WriteTransaction, key: &str) -> StorageResult<u64> {
    let mut table = txn.open_table(SEQUENCE_TABLE)?;
    let current = table.get(key)?.map(|guard| guard.value()).unwrap_or(0);
    let next = current + 1;
    table.insert(key, next)?;
    Ok(next)
}

fn get_json<T: DeserializeOwned>(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    key: &str,
) -> StorageResult<Option<T>> {
    match table.get(key)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

fn all_json<T: DeserializeOwned>(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
) -> StorageResult<Vec<T>> {
    let mut out = Vec::new();
    for result in table.iter()? {
        let (_key, value) = result?;
        out.push(serde_json::from_slice(value.value())?);
    }
    Ok(out)
}

/// Items of one order in creation order (key order is `(order_id, seq)`)
fn items_for_order(
    table: &impl ReadableTable<(&'static str, u64), &'static [u8]>,
    order_id: &str,
) -> StorageResult<Vec<OrderItem>> {
    let mut items = Vec::new();
    for result in table.range((order_id, 0u64)..=(order_id, u64::MAX))? {
        let (_key, value) = result?;
        items.push(serde_json::from_slice(value.value())?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderItemStatus, TableStatus};

    fn order(id: &str, table_id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            table_id: table_id.to_string(),
            status,
            created_by_actor_id: "srv-1".to_string(),
            created_at: 1,
            closed_at: None,
        }
    }

    fn item(id: &str, order_id: &str, seq: u64, station: Station) -> OrderItem {
        OrderItem {
            id: id.to_string(),
            order_id: order_id.to_string(),
            menu_item_id: "margherita".to_string(),
            name_snapshot: "Margherita".to_string(),
            unit_price_cents: 900,
            quantity: 1,
            notes: None,
            station,
            status: OrderItemStatus::New,
            created_at: 10,
            seq,
        }
    }

    #[test]
    fn test_sequence_increments() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_item_seq(&txn).unwrap(), 1);
        assert_eq!(storage.next_item_seq(&txn).unwrap(), 2);
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_item_seq(&txn).unwrap(), 3);
    }

    #[test]
    fn test_tables_listed_by_number() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_table(&txn, &DiningTable::new("b", 10)).unwrap();
        storage.put_table(&txn, &DiningTable::new("a", 2)).unwrap();
        assert!(storage.table_number_exists_txn(&txn, 10).unwrap());
        assert!(!storage.table_number_exists_txn(&txn, 3).unwrap());
        txn.commit().unwrap();

        let numbers: Vec<u32> = storage
            .list_tables()
            .unwrap()
            .iter()
            .map(|t| t.number)
            .collect();
        assert_eq!(numbers, vec![2, 10]);
        assert_eq!(storage.count_tables().unwrap(), 2);
    }

    #[test]
    fn test_items_scoped_to_order() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_order(&txn, &order("o-1", "t-1", OrderStatus::Open)).unwrap();
        storage.put_order(&txn, &order("o-2", "t-2", OrderStatus::Open)).unwrap();
        storage.put_item(&txn, &item("i-1", "o-1", 1, Station::Kitchen)).unwrap();
        storage.put_item(&txn, &item("i-2", "o-2", 2, Station::Kitchen)).unwrap();
        storage.put_item(&txn, &item("i-3", "o-1", 3, Station::Bar)).unwrap();
        txn.commit().unwrap();

        let (_, items) = storage.find_order_with_items("o-1").unwrap().unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["i-1", "i-3"]);
        assert!(storage.find_order_with_items("missing").unwrap().is_none());
    }

    #[test]
    fn test_removed_items_leave_closed_marker() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_item(&txn, &item("i-1", "o-1", 1, Station::Kitchen)).unwrap();
        storage.put_item(&txn, &item("i-2", "o-1", 2, Station::Bar)).unwrap();
        let removed = storage.remove_items_for_order(&txn, "o-1").unwrap();
        assert_eq!(removed, vec!["i-1".to_string(), "i-2".to_string()]);
        assert!(storage.find_item_location_txn(&txn, "i-2").unwrap().is_none());

        assert_eq!(storage.mark_items_closed(&txn, "o-1", &removed).unwrap(), 0);
        assert_eq!(
            storage.find_item_location_txn(&txn, "i-2").unwrap(),
            Some(("o-1".to_string(), CLOSED_MARKER_SEQ))
        );
        txn.commit().unwrap();

        assert!(storage.find_item("i-1").unwrap().is_none());
    }

    #[test]
    fn test_closed_markers_are_bounded() {
        let storage = OrderStorage::open_in_memory()
            .unwrap()
            .with_closed_marker_retention(2);
        let txn = storage.begin_write().unwrap();
        for (n, order_id) in ["o-1", "o-2", "o-3"].into_iter().enumerate() {
            let item_id = format!("i-{}", n + 1);
            storage
                .put_item(&txn, &item(&item_id, order_id, n as u64 + 1, Station::Kitchen))
                .unwrap();
            let removed = storage.remove_items_for_order(&txn, order_id).unwrap();
            let pruned = storage.mark_items_closed(&txn, order_id, &removed).unwrap();
            assert_eq!(pruned, usize::from(order_id == "o-3"));
        }

        // only the markers of the last two closes survive
        assert!(storage.find_item_location_txn(&txn, "i-1").unwrap().is_none());
        assert!(storage.find_item_location_txn(&txn, "i-2").unwrap().is_some());
        assert!(storage.find_item_location_txn(&txn, "i-3").unwrap().is_some());

        assert_eq!(
            storage
                .remove_closed_markers_for_orders(&txn, &["o-3".to_string()])
                .unwrap(),
            1
        );
        assert!(storage.find_item_location_txn(&txn, "i-3").unwrap().is_none());
        let markers = txn.open_table(CLOSED_ITEM_MARKERS).unwrap();
        assert_eq!(markers.len().unwrap(), 1);
    }

    #[test]
    fn test_table_and_orders_removal() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_table(&txn, &DiningTable::new("t-1", 1)).unwrap();
        storage.put_table(&txn, &DiningTable::new("t-2", 2)).unwrap();
        storage.put_order(&txn, &order("o-1", "t-1", OrderStatus::Closed)).unwrap();
        storage.put_order(&txn, &order("o-2", "t-1", OrderStatus::Open)).unwrap();
        storage.put_order(&txn, &order("o-3", "t-2", OrderStatus::Open)).unwrap();

        let mut ids = storage.list_order_ids_for_table_txn(&txn, "t-1").unwrap();
        ids.sort();
        assert_eq!(ids, vec!["o-1".to_string(), "o-2".to_string()]);

        assert!(storage.table_number_taken_by_other_txn(&txn, 2, "t-1").unwrap());
        assert!(!storage.table_number_taken_by_other_txn(&txn, 1, "t-1").unwrap());

        storage.remove_order(&txn, "o-1").unwrap();
        assert!(storage.get_order_txn(&txn, "o-1").unwrap().is_none());
        assert!(storage.remove_table(&txn, "t-1").unwrap());
        assert!(!storage.remove_table(&txn, "t-1").unwrap());
        txn.commit().unwrap();

        assert_eq!(storage.count_tables().unwrap(), 1);
    }

    #[test]
    fn test_station_items_only_for_sent_orders() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut t1 = DiningTable::new("t-1", 1);
        t1.status = TableStatus::Occupied;
        t1.current_order_id = Some("o-1".into());
        let mut t2 = DiningTable::new("t-2", 2);
        t2.status = TableStatus::Occupied;
        t2.current_order_id = Some("o-2".into());
        storage.put_table(&txn, &t1).unwrap();
        storage.put_table(&txn, &t2).unwrap();
        storage.put_order(&txn, &order("o-1", "t-1", OrderStatus::Sent)).unwrap();
        storage.put_order(&txn, &order("o-2", "t-2", OrderStatus::Open)).unwrap();
        storage.mark_table_active(&txn, "t-1", "o-1").unwrap();
        storage.mark_table_active(&txn, "t-2", "o-2").unwrap();
        storage.put_item(&txn, &item("i-1", "o-1", 1, Station::Kitchen)).unwrap();
        storage.put_item(&txn, &item("i-2", "o-1", 2, Station::Bar)).unwrap();
        storage.put_item(&txn, &item("i-3", "o-2", 3, Station::Kitchen)).unwrap();
        txn.commit().unwrap();

        let kitchen = storage.list_sent_items_for_station(Station::Kitchen).unwrap();
        assert_eq!(kitchen.len(), 1);
        assert_eq!(kitchen[0].item.id, "i-1");
        assert_eq!(kitchen[0].table_number, Some(1));

        let txn = storage.begin_write().unwrap();
        assert_eq!(
            storage
                .find_table_by_current_order_txn(&txn, "o-2")
                .unwrap()
                .map(|t| t.id),
            Some("t-2".to_string())
        );
        assert!(storage.find_table_by_current_order_txn(&txn, "o-9").unwrap().is_none());
    }
}
