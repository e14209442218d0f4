//! Client error types

use brew_checkout::BackendError;
use shared::error::ErrorCode;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error envelope
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) if e.is_decode() => BackendError::InvalidResponse(e.to_string()),
            ClientError::Http(e) => BackendError::Transport(e.to_string()),
            ClientError::Unauthorized => BackendError::Unauthorized,
            ClientError::Api { code, .. }
                if code == ErrorCode::NotAuthenticated.code()
                    || code == ErrorCode::TokenExpired.code() =>
            {
                BackendError::Unauthorized
            }
            ClientError::Api { code, message } => BackendError::Rejected {
                code: Some(code),
                message,
            },
            ClientError::Forbidden(message) => BackendError::Rejected {
                code: Some(ErrorCode::PermissionDenied.code()),
                message,
            },
            ClientError::NotFound(message) => BackendError::Rejected {
                code: Some(ErrorCode::NotFound.code()),
                message,
            },
            ClientError::Validation(message) => BackendError::Rejected {
                code: Some(ErrorCode::ValidationFailed.code()),
                message,
            },
            ClientError::Internal(message) => BackendError::Rejected {
                code: Some(ErrorCode::InternalError.code()),
                message,
            },
            ClientError::InvalidResponse(message) => BackendError::InvalidResponse(message),
            ClientError::Serialization(e) => BackendError::InvalidResponse(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_server_message() {
        let err: BackendError = ClientError::Api {
            code: 6002,
            message: "Latte is out of stock".into(),
        }
        .into();
        assert_eq!(
            err,
            BackendError::Rejected {
                code: Some(6002),
                message: "Latte is out of stock".into()
            }
        );
        assert_eq!(err.user_message(), "Latte is out of stock");
    }

    #[test]
    fn test_expired_token_maps_to_unauthorized() {
        let err: BackendError = ClientError::Api {
            code: ErrorCode::TokenExpired.code(),
            message: "expired".into(),
        }
        .into();
        assert_eq!(err, BackendError::Unauthorized);
    }

    #[test]
    fn test_status_fallbacks() {
        let err: BackendError = ClientError::Validation("bad quantity".into()).into();
        assert!(matches!(err, BackendError::Rejected { code: Some(2), .. }));

        let err: BackendError = ClientError::InvalidResponse("missing data".into()).into();
        assert_eq!(err, BackendError::InvalidResponse("missing data".into()));
    }
}
