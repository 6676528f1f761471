// error.rs
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("No active poll.")]
    NoActivePoll,

    #[error("Poll is no longer active.")]
    PollNotActive,

    #[error("User already voted.")]
    DuplicateVote,

    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: sqlx::Error,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>, source: sqlx::Error) -> Self {
        AppError::Storage {
            message: message.into(),
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation(_) | AppError::NoActivePoll => StatusCode::BAD_REQUEST,
            AppError::PollNotActive | AppError::DuplicateVote => StatusCode::CONFLICT,
            AppError::Storage { ref message, ref source } => {
                tracing::error!(error = %source, "{message}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
