//! 统一错误处理
//!
//! 错误类型定义在 `shared::error`，这里统一 re-export 并提供响应辅助函数。
//!
//! # 错误码规范
//!
//! | 范围 | 分类 |
//! |------|------|
//! | 0xxx | 通用错误 |
//! | 2xxx | 权限错误 |
//! | 4xxx | 订单错误 |
//! | 6xxx | 菜单错误 |
//! | 7xxx | 桌台错误 |
//! | 9xxx | 系统错误 |
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Order"))
//!
//! // 返回成功响应
//! Ok(ok(order))
//! ```

use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 成功响应
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}
