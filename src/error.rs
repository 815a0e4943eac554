//! Error handling for the analytics service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Missing credentials for {provider}")]
    MissingCredentials { provider: &'static str },

    #[error("{provider} upstream error: {message}")]
    Upstream {
        provider: &'static str,
        message: String,
    },

    #[error("Malformed {provider} payload: {message}")]
    MalformedPayload {
        provider: &'static str,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn upstream(source: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: source,
            message: message.into(),
        }
    }

    pub fn malformed(source: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            provider: source,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingCredentials { .. } => StatusCode::BAD_GATEWAY,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::MalformedPayload { .. } => StatusCode::BAD_GATEWAY,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::Configuration { .. } => "CONFIG_ERROR",
            AppError::MissingCredentials { .. } => "MISSING_CREDENTIALS",
            AppError::Upstream { .. } => "UPSTREAM_ERROR",
            AppError::MalformedPayload { .. } => "MALFORMED_PAYLOAD",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::HttpClient(_) => "HTTP_CLIENT_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            code: status.as_u16().to_string(),
        };

        tracing::error!("API Error: {} - {}", self.error_code(), self);

        (status, Json(error_response)).into_response()
    }
}
