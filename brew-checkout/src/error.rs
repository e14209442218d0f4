use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::InvalidDiscount;
use thiserror::Error;

use crate::backend::BackendError;
use crate::guard::CheckoutKind;
use crate::storage::StorageError;

/// Checkout errors
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Tendered {tendered} does not cover total {required}")]
    InsufficientTender { tendered: Decimal, required: Decimal },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error(transparent)]
    InvalidDiscount(#[from] InvalidDiscount),

    #[error("Product is out of stock: {0}")]
    OutOfStock(String),

    #[error("No size available for {0}")]
    NoAvailableSize(String),

    #[error("Size {size_id} is not available for {product}")]
    SizeUnavailable { product: String, size_id: i64 },

    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Invalid modifier step: {0}")]
    InvalidModifierState(String),

    #[error("A {active} checkout is already in progress")]
    CheckoutInProgress { active: CheckoutKind },

    #[error("Invalid checkout state: {0}")]
    InvalidState(String),

    /// First failing line of a fan-out batch, in cart order
    #[error("{line}: {message}")]
    LineRejected {
        line: String,
        message: String,
        /// Names of the lines the backend recorded anyway
        accepted: Vec<String>,
        /// Product ids (held ids for resume batches) of those lines
        accepted_ids: Vec<i64>,
    },

    #[error("Reopened sale must be settled or cleared before it is changed")]
    ReopenedCartLocked,

    #[error("Held transaction not found: {0}")]
    HeldNotFound(i64),

    #[error("Payment intent failed: {0}")]
    PaymentIntent(BackendError),

    #[error("QR code rendering failed: {0}")]
    QrRender(BackendError),

    #[error("Payment session closed: {0}")]
    SessionClosed(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CheckoutError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::EmptyCart => ErrorCode::CartEmpty,
            CheckoutError::InsufficientTender { .. } => ErrorCode::InsufficientTender,
            CheckoutError::InvalidAmount(_) => ErrorCode::ValueOutOfRange,
            CheckoutError::InvalidDiscount(_) => ErrorCode::InvalidDiscount,
            CheckoutError::OutOfStock(_) => ErrorCode::ProductOutOfStock,
            CheckoutError::NoAvailableSize(_) | CheckoutError::SizeUnavailable { .. } => {
                ErrorCode::SizeUnavailable
            }
            CheckoutError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            CheckoutError::InvalidModifierState(_) => ErrorCode::InvalidModifierState,
            CheckoutError::CheckoutInProgress { .. } => ErrorCode::CheckoutInProgress,
            CheckoutError::InvalidState(_) => ErrorCode::InvalidRequest,
            CheckoutError::LineRejected { .. } => ErrorCode::LineRejected,
            CheckoutError::ReopenedCartLocked => ErrorCode::ReopenedCartLocked,
            CheckoutError::HeldNotFound(_) => ErrorCode::HeldTransactionNotFound,
            CheckoutError::PaymentIntent(_) => ErrorCode::PaymentIntentFailed,
            CheckoutError::QrRender(_) => ErrorCode::QrRenderFailed,
            CheckoutError::SessionClosed(_) => ErrorCode::PaymentSessionClosed,
            CheckoutError::Backend(e) => backend_code(e),
            CheckoutError::Storage(_) => ErrorCode::StorageError,
        }
    }

    /// Short text for the operator. Transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::EmptyCart => "Add items to the cart first".to_string(),
            CheckoutError::InsufficientTender { required, .. } => {
                format!("Tendered amount must be at least {}", required)
            }
            CheckoutError::LineRejected { line, message, .. } => {
                format!("Failed to process {}: {}", line, message)
            }
            CheckoutError::PaymentIntent(e) => {
                format!("Could not start GCash payment: {}", e.user_message())
            }
            CheckoutError::QrRender(e) => {
                format!("Could not generate QR code: {}", e.user_message())
            }
            CheckoutError::Backend(e) => e.user_message(),
            CheckoutError::Storage(_) => "Local storage unavailable".to_string(),
            other => other.to_string(),
        }
    }

    /// Build the line failure from the backend error of that line
    pub fn line_rejected(
        line: impl Into<String>,
        err: &BackendError,
        accepted: Vec<(i64, String)>,
    ) -> Self {
        let (accepted_ids, accepted) = accepted.into_iter().unzip();
        CheckoutError::LineRejected {
            line: line.into(),
            message: err.user_message(),
            accepted,
            accepted_ids,
        }
    }

    /// Ids the backend accepted before the batch failed
    pub fn accepted_ids(&self) -> &[i64] {
        match self {
            CheckoutError::LineRejected { accepted_ids, .. } => accepted_ids,
            _ => &[],
        }
    }
}

fn backend_code(err: &BackendError) -> ErrorCode {
    match err {
        BackendError::Transport(_) => ErrorCode::NetworkError,
        BackendError::Unauthorized => ErrorCode::NotAuthenticated,
        BackendError::Rejected { code, .. } => code
            .and_then(|c| ErrorCode::try_from(c).ok())
            .unwrap_or(ErrorCode::InvalidRequest),
        BackendError::InvalidResponse(_) => ErrorCode::InternalError,
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        let code = err.code();
        if let CheckoutError::Storage(e) = &err {
            tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
        }
        let mut app = AppError::with_message(code, err.user_message());
        if let CheckoutError::LineRejected { line, accepted, .. } = &err {
            app = app
                .with_detail("line", line.clone())
                .with_detail("accepted", accepted.clone());
        }
        app
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(CheckoutError::EmptyCart.code(), ErrorCode::CartEmpty);
        assert_eq!(
            CheckoutError::Backend(BackendError::Transport("timeout".into())).code(),
            ErrorCode::NetworkError
        );
        assert_eq!(
            CheckoutError::Backend(BackendError::Rejected {
                code: Some(6002),
                message: "Sold out".into()
            })
            .code(),
            ErrorCode::ProductOutOfStock
        );
    }

    #[test]
    fn test_user_message_hides_transport_detail() {
        let err = CheckoutError::Backend(BackendError::Transport(
            "error sending request for url (http://10.0.0.2/api)".into(),
        ));
        assert!(!err.user_message().contains("10.0.0.2"));
    }

    #[test]
    fn test_line_rejected_into_app_error() {
        let err = CheckoutError::line_rejected(
            "Latte",
            &BackendError::rejected("Insufficient stock"),
            vec![(1, "Americano".into())],
        );
        assert_eq!(err.accepted_ids(), &[1]);
        assert_eq!(err.user_message(), "Failed to process Latte: Insufficient stock");

        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::LineRejected);
        assert_eq!(app.detail("line").and_then(|v| v.as_str()), Some("Latte"));
    }
}
