use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::response::{ApiError, ErrorCode};

/// Message returned for every failed resolution. Details stay in the logs.
pub const GENERIC_FAILURE_MESSAGE: &str = "Sorry, something went wrong";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Cache store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Provider {provider} unavailable: {message}")]
    ProviderUnavailable {
        provider: &'static str,
        message: String,
    },

    #[error("Provider {provider} timed out after {after_secs}s")]
    ProviderTimeout {
        provider: &'static str,
        after_secs: u64,
    },

    #[error("Provider {provider} returned an unusable response: {message}")]
    ProviderMalformed {
        provider: &'static str,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn provider_unavailable(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider,
            message: message.into(),
        }
    }

    pub fn provider_malformed(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderMalformed {
            provider,
            message: message.into(),
        }
    }

    /// Error code sent to the client for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Validation(_) | AppError::Json(_) => ErrorCode::InvalidRequest,
            AppError::Database(_)
            | AppError::StoreUnavailable(_)
            | AppError::ProviderUnavailable { .. }
            | AppError::ProviderTimeout { .. }
            | AppError::ProviderMalformed { .. }
            | AppError::UrlParse(_)
            | AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        AppError::Validation(format!("Invalid value for: {}", fields.join(", ")))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let message = match (&code, &self) {
            (ErrorCode::InvalidRequest, AppError::Json(e)) => format!("Invalid JSON: {e}"),
            (ErrorCode::InvalidRequest, AppError::Validation(msg)) => msg.clone(),
            (ErrorCode::NotFound, AppError::NotFound(msg)) => msg.clone(),
            _ => {
                tracing::error!(error = %self, "Request failed");
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        };

        ApiError { code, message }.into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
