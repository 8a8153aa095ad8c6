//! Table occupancy tracker
//!
//! 前厅总览：每张桌台的占用状态 + 当前订单的出品进度计数。

mod occupancy;

pub use occupancy::{TableOccupancy, TableRemoval, indicators_for};
