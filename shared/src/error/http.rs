//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::MenuItemNotFound
            | Self::TableNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists | Self::OrderClosed | Self::TableNumberExists => {
                StatusCode::CONFLICT
            }

            // 401 Unauthorized
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied => StatusCode::FORBIDDEN,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (validation/business errors)
            Self::ValidationFailed
            | Self::InvalidQuantity
            | Self::InvalidStatusTransition
            | Self::MenuItemUnavailable => StatusCode::BAD_REQUEST,
        }
    }
}
