use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main error type for the PakaiLink SDK and callback receiver
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Private or public key file missing or unparseable
    #[error("Key load error: {0}")]
    KeyLoad(String),

    /// The signing primitive itself failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// Request body is not valid JSON and cannot be minified for signing
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Token fetch/refresh failed, or a request was still rejected after a refresh
    #[error("Authentication failed (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    /// Non-2xx response from the provider
    #[error("PakaiLink API error [{provider_code}] (HTTP {status}): {provider_message}")]
    Api {
        status: u16,
        provider_code: String,
        provider_message: String,
    },

    /// Transport failure (connect, timeout) after retries were exhausted
    #[error("Connection error: {0}")]
    Connection(String),

    /// Callback arrived without X-SIGNATURE or X-TIMESTAMP
    #[error("Missing header: {0}")]
    MissingHeader(String),

    /// Callback signature did not match
    #[error("Invalid callback signature")]
    InvalidSignature,

    /// Validation errors for payloads
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::KeyLoad(_) | AppError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            AppError::Api { .. } => StatusCode::BAD_GATEWAY,
            AppError::Connection(_) => StatusCode::BAD_GATEWAY,
            AppError::MissingHeader(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn authentication(status: u16, msg: impl Into<String>) -> Self {
        AppError::Authentication {
            status,
            message: msg.into(),
        }
    }

    pub fn api(status: u16, code: impl Into<String>, msg: impl Into<String>) -> Self {
        AppError::Api {
            status,
            provider_code: code.into(),
            provider_message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// HTTP status reported by the provider, when the error came from a response
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            AppError::Authentication { status, .. } | AppError::Api { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Whether a caller may reasonably retry the operation later
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Connection(_) => true,
            AppError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
