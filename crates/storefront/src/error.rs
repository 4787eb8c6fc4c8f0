//! Unified error handling for the application core.
//!
//! Every operation on [`crate::app::App`] returns `Result<T, AppError>`. The
//! UI layer shows `Validation` and `SignInRequired` messages inline; transport
//! variants carry the underlying client error for logging.

use thiserror::Error;

use crate::backend::{AuthError, BackendError, StorageError};
use crate::payments::PaymentsError;
use maison_core::OrderStatus;

/// Application-level error type for the storefront core.
#[derive(Debug, Error)]
pub enum AppError {
    /// Hosted backend row operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Auth service operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Object storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Payment proxy operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentsError),

    /// Input rejected before any call was issued.
    #[error("{0}")]
    Validation(String),

    /// The operation needs a signed-in profile; the caller was routed to the
    /// login page.
    #[error("Please sign in to continue")]
    SignInRequired,

    /// The signed-in profile lacks the required role.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Order status change outside the allowed moves.
    #[error("Order status cannot change from {from} to {to}")]
    InvalidStatusChange { from: OrderStatus, to: OrderStatus },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Errors worth a user-facing message rather than a generic failure.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::SignInRequired
                | Self::Forbidden(_)
                | Self::InvalidStatusChange { .. }
                | Self::NotFound(_)
        )
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AppError::Validation("Shipping address is required".to_string());
        assert_eq!(err.to_string(), "Shipping address is required");

        let err = AppError::InvalidStatusChange {
            from: OrderStatus::Processing,
            to: OrderStatus::Delivered,
        };
        assert_eq!(
            err.to_string(),
            "Order status cannot change from processing to delivered"
        );
    }

    #[test]
    fn test_user_error_classification() {
        assert!(AppError::SignInRequired.is_user_error());
        assert!(AppError::Forbidden("admin access required".to_string()).is_user_error());
        assert!(
            !AppError::Backend(crate::backend::BackendError::Api {
                status: 500,
                message: "boom".to_string(),
            })
            .is_user_error()
        );
    }
}
