//! Tableside Server - 餐厅点单 / 出品协同服务
//!
//! # 架构概述
//!
//! 前厅开台、加菜、送单、关单；出品站（厨房 / 吧台）只看到路由给自己的菜品，
//! 状态变化通过房间实时推送。
//!
//! - **订单核心** (`orders`): 订单生命周期 + 明细账本，redb 存储
//! - **出品队列** (`stations`): 按站点的待出品视图
//! - **桌台总览** (`tables`): 占用状态与出品进度
//! - **实时推送** (`realtime`): 房间式 WebSocket 广播
//! - **审计** (`audit`): 哈希链审计日志，fire-and-forget
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! tableside-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # 操作者身份、权限表
//! ├── catalog/       # 菜单查询
//! ├── orders/        # 订单核心 + 存储
//! ├── stations/      # 出品队列
//! ├── tables/        # 桌台占用
//! ├── realtime/      # 房间广播 + WebSocket
//! ├── audit/         # 审计日志
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod orders;
pub mod realtime;
pub mod stations;
pub mod tables;
pub mod utils;

// Re-export 公共类型
pub use auth::{Actor, Role};
pub use core::{Config, Server, ServerState};
pub use orders::{OrderStorage, OrdersManager};
pub use realtime::{Broadcaster, RoomHub};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger;

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
 _____     _     _               _     _
|_   _|_ _| |__ | | ___  ___ ___(_) __| | ___
  | |/ _` | '_ \| |/ _ \/ __/ __| |/ _` |/ _ \
  | | (_| | |_) | |  __/\__ \__ \ | (_| |  __/
  |_|\__,_|_.__/|_|\___||___/___/_|\__,_|\___|
    "#
    );
}
