use crate::auth::client::IamError;
use crate::auth::identity::AuthError;
use crate::config::ConfigError;
use crate::integrations::smart::SmartExportError;
use crate::integrations::storage::StorageError;
use crate::recruitment::store::StoreError;
use crate::recruitment::validators::ValidationError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Startup/runtime error for the service binary.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

/// Request-level error translated into the HTTP error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<&'static str>,
    },
    #[error("record not found")]
    NotFound,
    #[error("authentication required")]
    AuthRequired,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("insufficient permissions")]
    PermissionDenied,
    #[error(transparent)]
    Iam(#[from] IamError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Export(#[from] SmartExportError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::Validation {
            message: value.message,
            field: value.field,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::MissingToken => Self::AuthRequired,
            AuthError::InvalidToken => Self::InvalidToken,
            AuthError::Iam(err) => Self::Iam(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { message, field } => {
                let mut payload = json!({
                    "error": "VALIDATION_ERROR",
                    "message": message,
                });
                if let Some(field) = field {
                    payload["field"] = json!(field);
                }
                (StatusCode::BAD_REQUEST, Json(payload)).into_response()
            }
            ApiError::NotFound | ApiError::Store(StoreError::NotFound) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "NOT_FOUND" })),
            )
                .into_response(),
            ApiError::AuthRequired => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "AUTH_REQUIRED",
                    "message": "Send Authorization: Bearer <token> or the authentication cookie.",
                })),
            )
                .into_response(),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "INVALID_TOKEN",
                    "message": "Invalid or expired token.",
                })),
            )
                .into_response(),
            ApiError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "PERMISSION_DENIED",
                    "message": "You do not have permission to perform this action.",
                })),
            )
                .into_response(),
            ApiError::Iam(err) => {
                let status = StatusCode::from_u16(err.status())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (status, Json(err.detail())).into_response()
            }
            ApiError::Store(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "INTERNAL", "message": err.to_string() })),
            )
                .into_response(),
            ApiError::Storage(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "STORAGE_ERROR", "message": err.to_string() })),
            )
                .into_response(),
            ApiError::Export(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "EXPORT_ERROR", "message": err.to_string() })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let response = ApiError::validation("DNI must be exactly 8 digits.").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_not_found_is_concealed_as_404() {
        let response = ApiError::Store(StoreError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn iam_errors_carry_the_upstream_status() {
        let response = ApiError::Iam(IamError::Unavailable {
            reason: "timeout".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = ApiError::Iam(IamError::Service {
            status: 401,
            body: json!({ "error": "INVALID_CREDENTIALS" }),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
