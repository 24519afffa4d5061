// API errors - converted to JSON responses via IntoResponse
//
// The page script reads `error` for the message and shows it in an alert
// when `alert` is set; otherwise it only goes to the console.

use crate::viewer::actions::ActionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Conflict(String),
    /// Failure the user should see as an alert
    Alert(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    alert: bool,
}

impl From<ActionError> for ApiError {
    fn from(e: ActionError) -> Self {
        match e {
            ActionError::NoProof => ApiError::Conflict(e.to_string()),
            ActionError::Unknown(_) => ApiError::NotFound(e.to_string()),
            ActionError::Copy { alert, .. } => ApiError::Alert(alert.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, alert) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, false),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, false),
            ApiError::Alert(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, true),
        };

        tracing::warn!("API error: {} - {}", status, message);

        let body = ErrorBody {
            error: message,
            alert,
        };
        (status, Json(body)).into_response()
    }
}
