//! Station queue entry

use serde::{Deserialize, Serialize};

use super::order_item::OrderItem;

/// One ticket line on a station screen
///
/// `recipe_text` / `image_ref` are read from the menu at query time, not snapshotted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueEntry {
    #[serde(flatten)]
    pub item: OrderItem,
    pub table_id: String,
    pub table_number: Option<u32>,
    pub recipe_text: Option<String>,
    pub image_ref: Option<String>,
}
