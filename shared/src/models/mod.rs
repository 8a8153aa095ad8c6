//! Data models
//!
//! Shared between tableside-server and clients (via API and realtime frames).
//! All IDs are UUID strings; timestamps are Unix millis.

pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod queue;
pub mod station;

// Re-exports
pub use dining_table::*;
pub use menu_item::*;
pub use order::*;
pub use order_item::*;
pub use queue::*;
pub use station::*;
