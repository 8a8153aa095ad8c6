use shared::error::{AppError, ErrorCode};
use shared::models::OrderItemStatus;
use std::fmt;
use thiserror::Error;

use super::storage::StorageError;
use crate::auth::Forbidden;

/// Kind of resource a lookup failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Table,
    Order,
    OrderItem,
    MenuItem,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Table => "Table",
            ResourceKind::Order => "Order",
            ResourceKind::OrderItem => "Order item",
            ResourceKind::MenuItem => "Menu item",
        })
    }
}

/// Order core errors
///
/// All are synchronous, caller-visible failures; nothing is retried internally.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    #[error("Order is closed: {0}")]
    OrderClosed(String),

    #[error("Menu item unavailable: {0}")]
    ItemUnavailable(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    #[error("Invalid item status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: OrderItemStatus,
        to: OrderItemStatus,
    },

    #[error("Table number already exists: {0}")]
    TableNumberExists(u32),

    #[error("Invalid table number: {0}")]
    InvalidTableNumber(u32),

    #[error(transparent)]
    Forbidden(#[from] Forbidden),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl OrderError {
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        OrderError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<redb::CommitError> for OrderError {
    fn from(err: redb::CommitError) -> Self {
        OrderError::Storage(err.into())
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::NotFound { kind, id } => {
                let code = match kind {
                    ResourceKind::Table => ErrorCode::TableNotFound,
                    ResourceKind::Order => ErrorCode::OrderNotFound,
                    ResourceKind::OrderItem => ErrorCode::OrderItemNotFound,
                    ResourceKind::MenuItem => ErrorCode::MenuItemNotFound,
                };
                AppError::with_message(code, message).with_detail("id", id)
            }
            OrderError::OrderClosed(id) => {
                AppError::with_message(ErrorCode::OrderClosed, message).with_detail("order_id", id)
            }
            OrderError::ItemUnavailable(id) => {
                AppError::with_message(ErrorCode::MenuItemUnavailable, message)
                    .with_detail("menu_item_id", id)
            }
            OrderError::InvalidQuantity(q) => {
                AppError::with_message(ErrorCode::InvalidQuantity, message).with_detail("quantity", q)
            }
            OrderError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, message)
                    .with_detail("from", serde_json::to_value(from).unwrap_or_default())
                    .with_detail("to", serde_json::to_value(to).unwrap_or_default())
            }
            OrderError::TableNumberExists(number) => {
                AppError::with_message(ErrorCode::TableNumberExists, message)
                    .with_detail("number", number)
            }
            OrderError::InvalidTableNumber(number) => {
                AppError::validation(message).with_detail("number", number)
            }
            OrderError::Forbidden(f) => f.into(),
            OrderError::Storage(e) => {
                tracing::error!(error = %e, "Order storage failure");
                AppError::database(message)
            }
        }
    }
}
