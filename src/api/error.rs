use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ErrorBody;
use crate::constants;
use crate::services::LookupError;

#[derive(Debug)]
pub enum ApiError {
    ValidationError(String),

    ConfigurationError { status: StatusCode, message: String },

    /// `message` is what the caller sees; `cause` is logged and only
    /// returned when `expose_cause` is set.
    UpstreamError {
        message: String,
        cause: String,
        expose_cause: bool,
    },

    NotFound(String),

    RateLimited,

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::ConfigurationError { message, .. } => {
                write!(f, "Configuration error: {}", message)
            }
            ApiError::UpstreamError { message, cause, .. } => {
                write!(f, "{}: {}", message, cause)
            }
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::RateLimited => write!(f, "{}", constants::rate_limit::MESSAGE),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg)),
            ApiError::ConfigurationError { status, message } => {
                tracing::error!("Configuration error: {}", message);
                (status, ErrorBody::new(message))
            }
            ApiError::UpstreamError {
                message,
                cause,
                expose_cause,
            } => {
                tracing::error!("{}: {}", message, cause);
                let body = if expose_cause {
                    ErrorBody::with_details(message, cause)
                } else {
                    ErrorBody::new(message)
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::new(msg)),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody::new(constants::rate_limit::MESSAGE),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("An internal error occurred"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("Not found".to_string())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }

    /// Maps a failed lookup at the handler boundary. A missing credential
    /// answers with `config_status`, a cache value that no longer decodes is
    /// an internal error, and anything else is a 500 carrying `message`.
    pub fn lookup(err: &LookupError, message: &str, config_status: StatusCode) -> Self {
        if let LookupError::Encoding(e) = err {
            return ApiError::internal(e.to_string());
        }

        if err.is_configuration() {
            return ApiError::ConfigurationError {
                status: config_status,
                message: err.to_string(),
            };
        }

        ApiError::UpstreamError {
            message: message.to_string(),
            cause: err.to_string(),
            expose_cause: false,
        }
    }

    /// Same as [`ApiError::lookup`] but returns the underlying error text
    /// in a `details` field.
    pub fn lookup_with_details(err: &LookupError, message: &str) -> Self {
        match Self::lookup(err, message, StatusCode::INTERNAL_SERVER_ERROR) {
            ApiError::UpstreamError { message, cause, .. } => ApiError::UpstreamError {
                message,
                cause,
                expose_cause: true,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::UpstreamError;

    #[test]
    fn test_undecodable_cache_value_is_internal() {
        let decode_err = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let err = ApiError::lookup(
            &LookupError::Encoding(decode_err),
            "Failed to fetch info",
            StatusCode::INTERNAL_SERVER_ERROR,
        );
        assert!(matches!(err, ApiError::InternalError(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_credential_uses_endpoint_status() {
        let err = ApiError::lookup(
            &LookupError::Upstream(UpstreamError::MissingCredential("TIMEZONEDB_KEY")),
            "Timezone fetch failed",
            StatusCode::BAD_REQUEST,
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_details_only_when_requested() {
        let upstream = || LookupError::Upstream(UpstreamError::malformed("wikidata", "boom"));

        let plain = ApiError::lookup(&upstream(), "Population lookup failed", StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(plain, ApiError::UpstreamError { expose_cause: false, .. }));

        let detailed = ApiError::lookup_with_details(&upstream(), "Population lookup failed");
        assert!(matches!(detailed, ApiError::UpstreamError { expose_cause: true, .. }));
    }
}
