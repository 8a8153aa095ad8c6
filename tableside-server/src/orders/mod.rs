//! Order lifecycle and item ledger
//!
//! - **manager**: `OrdersManager` — open / send / close orders, add items, update item status
//! - **routing**: menu class → preparation station
//! - **storage**: redb persistence for tables, orders and items
//! - **error**: `OrderError` taxonomy and its HTTP mapping
//!
//! # Architecture
//!
//! ```text
//! Actor action → authorize → OrdersManager ── write txn ──▶ redb
//!                                  │ (after commit)
//!                                  ├─▶ Broadcaster (table / station rooms)
//!                                  └─▶ AuditService (try_send)
//! ```
//!
//! Broadcast and audit happen strictly after the write transaction commits.
//! A crash in between drops the notification; clients reconcile by re-fetching.

pub mod error;
pub mod manager;
pub mod routing;
pub mod storage;

// Re-exports
pub use error::{OrderError, OrderResult, ResourceKind};
pub use manager::{AddItemInput, OrdersManager};
pub use routing::route_station;
pub use storage::{OrderStorage, StorageError};
