//! API error types and responses.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tunecraft_core::ValidationError;
use tunecraft_store::LedgerError;

use crate::providers::ProviderError;

/// Message shown when a session cannot pay for a generation.
pub const INSUFFICIENT_CREDITS_MESSAGE: &str = "Insufficient credits. Watch an ad to get more!";

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body could not be parsed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Body exceeded the upload limit.
    #[error("payload too large")]
    PayloadTooLarge,

    /// The request took longer than the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Insufficient credits.
    #[error("insufficient credits: balance={balance}, required={required}")]
    InsufficientCredits {
        /// Current balance.
        balance: u64,
        /// Required amount.
        required: u64,
    },

    /// A provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Upload too large".to_string(),
            ),
            Self::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                "Request timed out".to_string(),
            ),
            Self::InsufficientCredits { .. } => (
                StatusCode::PAYMENT_REQUIRED,
                INSUFFICIENT_CREDITS_MESSAGE.to_string(),
            ),
            Self::Provider(err) => {
                tracing::error!(error = %err, "Provider call failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientCredits { balance, required } => {
                Self::InsufficientCredits { balance, required }
            }
            LedgerError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::BadRequest(rejection.body_text())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunecraft_store::StoreError;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (ApiError::from(ValidationError::MissingPrompt), StatusCode::BAD_REQUEST),
            (
                ApiError::InsufficientCredits {
                    balance: 0,
                    required: 1,
                },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                ApiError::from(ProviderError::JobFailed("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::PayloadTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
            (ApiError::Timeout, StatusCode::REQUEST_TIMEOUT),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn ledger_errors_convert() {
        let err = ApiError::from(LedgerError::InsufficientCredits {
            balance: 0,
            required: 1,
        });
        assert!(matches!(err, ApiError::InsufficientCredits { balance: 0, required: 1 }));

        let err = ApiError::from(LedgerError::Store(StoreError::Backend("down".into())));
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
