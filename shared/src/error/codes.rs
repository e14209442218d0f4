//! Unified error codes for the Brew client
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Cart / checkout errors
//! - 5xxx: Payment errors
//! - 6xxx: Product errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the backend and the terminal agree
/// without sharing string tables.
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
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Operator is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 4xxx: Cart / Checkout ====================
    /// Cart has no lines
    CartEmpty = 4001,
    /// Another checkout flow owns the cart
    CheckoutInProgress = 4002,
    /// Held transaction not found
    HeldTransactionNotFound = 4003,
    /// A per-line submission was rejected
    LineRejected = 4004,
    /// Discount is not in the offered table
    InvalidDiscount = 4005,
    /// Modifier wizard used out of order
    InvalidModifierState = 4006,
    /// Reopened cart edited before it was settled
    ReopenedCartLocked = 4007,

    // ==================== 5xxx: Payment ====================
    /// Tendered cash is below the grand total
    InsufficientTender = 5001,
    /// Payment intent could not be created
    PaymentIntentFailed = 5002,
    /// Scannable code could not be rendered
    QrRenderFailed = 5003,
    /// Payment session already closed
    PaymentSessionClosed = 5004,

    // ==================== 6xxx: Product ====================
    /// Product not found in the catalog
    ProductNotFound = 6001,
    /// Product is out of stock
    ProductOutOfStock = 6002,
    /// Selected size is not available
    SizeUnavailable = 6003,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Backend unreachable or transport failure
    NetworkError = 9002,
    /// Local storage failure
    StorageError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Operator is not authenticated",
            ErrorCode::TokenExpired => "Session token has expired",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Cart / Checkout
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CheckoutInProgress => "Another checkout is in progress",
            ErrorCode::HeldTransactionNotFound => "Held transaction not found",
            ErrorCode::LineRejected => "An item could not be submitted",
            ErrorCode::InvalidDiscount => "Discount is not offered",
            ErrorCode::InvalidModifierState => "Finish or cancel the current selection first",
            ErrorCode::ReopenedCartLocked => "Settle or clear the reopened sale first",

            // Payment
            ErrorCode::InsufficientTender => "Tendered amount is less than the total",
            ErrorCode::PaymentIntentFailed => "Could not start the GCash payment",
            ErrorCode::QrRenderFailed => "Could not render the payment QR code",
            ErrorCode::PaymentSessionClosed => "Payment session is closed",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductOutOfStock => "Product is out of stock",
            ErrorCode::SizeUnavailable => "Selected size is not available",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::NetworkError => "Cannot reach the server",
            ErrorCode::StorageError => "Local storage error",
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
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Cart / Checkout
            4001 => Ok(ErrorCode::CartEmpty),
            4002 => Ok(ErrorCode::CheckoutInProgress),
            4003 => Ok(ErrorCode::HeldTransactionNotFound),
            4004 => Ok(ErrorCode::LineRejected),
            4005 => Ok(ErrorCode::InvalidDiscount),
            4006 => Ok(ErrorCode::InvalidModifierState),
            4007 => Ok(ErrorCode::ReopenedCartLocked),

            // Payment
            5001 => Ok(ErrorCode::InsufficientTender),
            5002 => Ok(ErrorCode::PaymentIntentFailed),
            5003 => Ok(ErrorCode::QrRenderFailed),
            5004 => Ok(ErrorCode::PaymentSessionClosed),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductOutOfStock),
            6003 => Ok(ErrorCode::SizeUnavailable),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::NetworkError),
            9003 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::CartEmpty.code(), 4001);
        assert_eq!(ErrorCode::InsufficientTender.code(), 5001);
        assert_eq!(ErrorCode::ProductOutOfStock.code(), 6002);
        assert_eq!(ErrorCode::StorageError.code(), 9003);
    }

    #[test]
    fn test_try_from_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::CheckoutInProgress,
            ErrorCode::LineRejected,
            ErrorCode::ReopenedCartLocked,
            ErrorCode::PaymentIntentFailed,
            ErrorCode::SizeUnavailable,
            ErrorCode::NetworkError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        assert_eq!(ErrorCode::try_from(5005), Err(InvalidErrorCode(5005)));
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::CartEmpty).unwrap(), "4001");
        let code: ErrorCode = serde_json::from_str("5003").unwrap();
        assert_eq!(code, ErrorCode::QrRenderFailed);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }
}
