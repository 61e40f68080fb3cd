use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::plan::{RedeemError, UpgradeError};

/// Request-handling errors for the server layer.
///
/// Business-rule violations carry a user-facing message; unexpected failures
/// are logged and collapsed to a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No valid session.
    #[error("Unauthorized. Please sign in first.")]
    Unauthorized,

    /// Session exists but does not own the requested resource.
    #[error("Invalid user verification")]
    Forbidden,

    /// Malformed request payload.
    #[error("{0}")]
    InvalidInput(String),

    /// Known business-rule refusal (unknown code, already redeemed, missing proof).
    #[error("{0}")]
    BusinessRule(String),

    /// Upstream service-API call failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Anything unexpected.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            Self::InvalidInput(_) | Self::BusinessRule(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::Upstream(_) => {
                tracing::error!(error = %self, "Upstream failure");
                (StatusCode::BAD_GATEWAY, "Upstream service unavailable".to_string())
            }
            Self::Internal(_) | Self::Config(_) => {
                tracing::error!(error = %self, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<RedeemError> for ApiError {
    fn from(e: RedeemError) -> Self {
        match e {
            RedeemError::InvalidFormat => Self::InvalidInput(e.to_string()),
            RedeemError::UnknownCode | RedeemError::AlreadyRedeemed => {
                Self::BusinessRule(e.to_string())
            }
        }
    }
}

impl From<UpgradeError> for ApiError {
    fn from(e: UpgradeError) -> Self {
        Self::BusinessRule(e.to_string())
    }
}

impl From<crate::error::Error> for ApiError {
    fn from(e: crate::error::Error) -> Self {
        Self::Internal(e.to_string())
    }
}
