use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fas_monitor_telegram::TelegramError;
use serde_json::json;
use thiserror::Error;

/// Failure of an API call, rendered as `{"error": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No bot token or chat id has been pushed yet.
    #[error("{0}")]
    MissingConfiguration(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Telegram error: {0}")]
    Messaging(#[from] TelegramError),

    #[error("unknown report: {0}")]
    UnknownReport(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingConfiguration(_) | Self::InvalidParameter(_) | Self::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Messaging(_) => StatusCode::BAD_GATEWAY,
            Self::UnknownReport(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::MissingConfiguration("Bot token mancante").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Storage(anyhow::anyhow!("down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Messaging(TelegramError::Api {
                code: 400,
                description: "Bad Request".to_string()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::UnknownReport("weekly".to_string()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_missing_configuration_message() {
        let err = ApiError::MissingConfiguration("Configurazione mancante");
        assert_eq!(err.to_string(), "Configurazione mancante");
    }
}
