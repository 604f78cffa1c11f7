//! Error handling module
//! 
//! Defines error types and handling logic used in the project

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gateway error types
///
/// These only ever describe failures of the proxied request itself. Billing
/// failures are logged and never converted into an `AppError`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream API error
    #[error("Upstream API error: {0}")]
    ExternalApi(String),
    
    /// Payload too large
    #[error("Payload too large")]
    PayloadTooLarge,
    
    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Submission failures of an outbound host call
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The named upstream cluster is not known to the host
    #[error("unknown upstream cluster: {0}")]
    UnknownUpstream(String),
    
    /// A required pseudo-header was not supplied
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),
    
    /// A header name or value could not be used
    #[error("invalid header {0}")]
    InvalidHeader(String),
    
    /// No async runtime is available to run the call
    #[error("no async runtime available to run the call")]
    NoRuntime,
    
    /// The call body could not be encoded
    #[error("failed to encode call body: {0}")]
    Serialization(#[from] serde_json::Error),
    
    /// The channel refused the call
    #[error("call rejected: {0}")]
    Rejected(String),
}

/// OpenAI-compatible error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
    
    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::PayloadTooLarge => "invalid_request_error",
            AppError::ExternalApi(_) => "upstream_error",
            AppError::Internal(_) => "api_error",
        }
    }
    
    /// Convert to the JSON error body
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorBody {
                error_type: self.error_type().to_string(),
                message: self.to_string(),
            },
        }
    }
}

/// Implement IntoResponse trait to allow errors to be returned directly as HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        
        if status.is_server_error() {
            tracing::error!("Gateway error: {} - Status code: {}", self, status);
        } else {
            tracing::warn!("Client error: {} - Status code: {}", self.error_type(), status);
        }
        
        (status, Json(self.to_error_response())).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;
