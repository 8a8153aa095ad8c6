//! Unified error codes for the tableside order service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the floor and station clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,

    // ==================== 1xxx: Auth ====================
    /// Caller identity missing or malformed
    NotAuthenticated = 1001,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is closed and can no longer be mutated
    OrderClosed = 4002,
    /// Order item not found
    OrderItemNotFound = 4006,
    /// Quantity must be positive
    InvalidQuantity = 4008,
    /// Item status change not allowed
    InvalidStatusTransition = 4009,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item unavailable
    MenuItemUnavailable = 6003,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table number already in use
    TableNumberExists = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",

            // Auth
            ErrorCode::NotAuthenticated => "Actor identity required",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderClosed => "Order is closed",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::InvalidQuantity => "Quantity must be greater than zero",
            ErrorCode::InvalidStatusTransition => "Item status transition not allowed",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemUnavailable => "Menu item unavailable",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNumberExists => "Table number already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            1001 => Ok(ErrorCode::NotAuthenticated),
            2001 => Ok(ErrorCode::PermissionDenied),
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderClosed),
            4006 => Ok(ErrorCode::OrderItemNotFound),
            4008 => Ok(ErrorCode::InvalidQuantity),
            4009 => Ok(ErrorCode::InvalidStatusTransition),
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6003 => Ok(ErrorCode::MenuItemUnavailable),
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableNumberExists),
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
